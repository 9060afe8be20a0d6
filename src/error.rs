//! Error taxonomy and non-fatal diagnostics.
//!
//! Hard failures are returned as `Result`s: [`StructuralViolation`] for tree
//! mutations, [`ParseError`] for stylesheet text, [`DescriptionError`] for
//! documents that cannot be read at all. Everything the engine can recover
//! from (unknown class, unknown parameter, malformed node) is recorded as a
//! [`Diagnostic`] instead and the build carries on.

use std::fmt;

pub use crate::css::parser::ParseError;
pub use crate::css::properties::PropertyError;
pub use crate::description::DescriptionError;
pub use crate::dom::tree::StructuralViolation;

/// Any error the crate returns.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Property(#[from] PropertyError),
    #[error(transparent)]
    Structure(#[from] StructuralViolation),
    #[error(transparent)]
    Description(#[from] DescriptionError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Category of a recovered problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// A style class, palette entry, parameter id or node type was not found;
    /// a default, inert attachment or placeholder was used instead.
    UnresolvableReference,
    /// A node in a description could not be read; it was replaced by a
    /// placeholder.
    MalformedDescription,
    /// A property value did not parse; the declaration was skipped.
    InvalidProperty,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DiagnosticKind::UnresolvableReference => "unresolvable reference",
            DiagnosticKind::MalformedDescription => "malformed description",
            DiagnosticKind::InvalidProperty => "invalid property",
        })
    }
}

/// A recovered problem, kept for display in an editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Id of the node the problem belongs to, if any.
    pub node: Option<String>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self { kind, node: None, message: message.into() }
    }

    /// Attach the id of the affected node (builder).
    pub fn for_node(mut self, node: impl Into<String>) -> Self {
        self.node = Some(node.into());
        self
    }

    pub fn unresolved(message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::UnresolvableReference, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::MalformedDescription, message)
    }

    pub fn invalid_property(message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::InvalidProperty, message)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.node {
            Some(node) => write!(f, "{} in '{}': {}", self.kind, node, self.message),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

/// An append-only list of diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic and log it.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        log::warn!("{diagnostic}");
        self.entries.push(diagnostic);
    }

    pub fn extend(&mut self, other: impl IntoIterator<Item = Diagnostic>) {
        for d in other {
            self.push(d);
        }
    }

    /// Move diagnostics recorded (and logged) elsewhere into this list.
    pub fn append(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Diagnostics of one kind.
    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
