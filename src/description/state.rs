//! The editor state a host saves with the plugin: description plus
//! stylesheet text.

use serde::{Deserialize, Serialize};

use super::{DescriptionError, NodeDescription};
use crate::css::stylesheet::Stylesheet;
use crate::dom::tree::Dom;

/// Format version written by this crate.
pub const STATE_VERSION: u32 = 1;

/// Saved editor state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    pub version: u32,
    pub description: NodeDescription,
    /// Stylesheet in its text form.
    #[serde(default)]
    pub stylesheet: String,
}

impl PersistedState {
    pub fn new(description: NodeDescription, stylesheet: impl Into<String>) -> Self {
        Self { version: STATE_VERSION, description, stylesheet: stylesheet.into() }
    }

    /// Capture the tree rooted at the root of `dom` and the stylesheet.
    /// `None` for an empty tree.
    pub fn capture(dom: &Dom, sheet: &Stylesheet) -> Option<Self> {
        let description = NodeDescription::from_dom(dom, dom.root()?)?;
        Some(Self::new(description, sheet.to_css()))
    }

    pub fn to_json(&self) -> Result<String, DescriptionError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Read saved state. States written by a newer format version are
    /// rejected.
    pub fn from_json(text: &str) -> Result<Self, DescriptionError> {
        let state: PersistedState = serde_json::from_str(text)?;
        if state.version > STATE_VERSION {
            return Err(DescriptionError::MalformedDescription(format!(
                "state version {} is newer than {STATE_VERSION}",
                state.version
            )));
        }
        Ok(state)
    }
}
