//! The parameter attachments of a built tree, keyed by node id.

use std::collections::BTreeMap;

use crate::dom::node::{NodeData, NodeType, PARAMETER_ID, PARAMETER_X_ID, PARAMETER_Y_ID};
use crate::param::{AtomicSnapshot, Attachment, AttachmentBridge};

/// The attachment a bindable node holds, typed by what the control edits.
#[derive(Debug)]
pub enum NodeAttachment {
    /// Continuous value (sliders and knobs).
    Value(Attachment<f32>),
    /// On/off (buttons).
    Toggle(Attachment<bool>),
    /// Choice index (combo boxes).
    Choice(Attachment<i32>),
    /// Two continuous values (XY pad).
    Xy { x: Attachment<f32>, y: Attachment<f32> },
}

impl NodeAttachment {
    /// Attach the bindings `node` declares for its type. `None` if the node
    /// has nothing to bind.
    pub fn create(node: &NodeData, bridge: &mut AttachmentBridge) -> Option<Self> {
        let binding = |role: &str| node.bindings.get(role).map(String::as_str);
        match node.node_type {
            NodeType::Slider => Some(Self::Value(bridge.attach_for_node(binding(PARAMETER_ID)?, &node.id))),
            NodeType::TextButton | NodeType::ToggleButton => {
                Some(Self::Toggle(bridge.attach_for_node(binding(PARAMETER_ID)?, &node.id)))
            }
            NodeType::ComboBox => Some(Self::Choice(bridge.attach_for_node(binding(PARAMETER_ID)?, &node.id))),
            NodeType::XyDrag => {
                let (x, y) = (binding(PARAMETER_X_ID)?, binding(PARAMETER_Y_ID)?);
                Some(Self::Xy {
                    x: bridge.attach_for_node(x, &node.id),
                    y: bridge.attach_for_node(y, &node.id),
                })
            }
            _ => None,
        }
    }

    pub fn detach(&self) {
        match self {
            Self::Value(a) => a.detach(),
            Self::Toggle(a) => a.detach(),
            Self::Choice(a) => a.detach(),
            Self::Xy { x, y } => {
                x.detach();
                y.detach();
            }
        }
    }

    /// Whether any binding named an unknown parameter.
    pub fn is_inert(&self) -> bool {
        match self {
            Self::Value(a) => a.is_inert(),
            Self::Toggle(a) => a.is_inert(),
            Self::Choice(a) => a.is_inert(),
            Self::Xy { x, y } => x.is_inert() || y.is_inert(),
        }
    }

    /// The current value mapped to `0..=1`, for display.
    pub fn normalized(&self) -> f32 {
        match self {
            Self::Value(a) => a.value().to_normalized(0),
            Self::Toggle(a) => a.value().to_normalized(0),
            Self::Choice(a) => a.value().to_normalized(a.steps()),
            Self::Xy { x, .. } => x.value().to_normalized(0),
        }
    }

    /// Display text of the bound value.
    pub fn display_text(&self) -> String {
        match self {
            Self::Value(a) => a.display_text(),
            Self::Toggle(a) => a.display_text(),
            Self::Choice(a) => a.display_text(),
            Self::Xy { x, y } => format!("{} / {}", x.display_text(), y.display_text()),
        }
    }
}

#[derive(Debug)]
struct Bound {
    node_type: NodeType,
    bindings: BTreeMap<String, String>,
    attachment: NodeAttachment,
}

/// Attachments of one tree. Dropping an entry detaches it.
#[derive(Debug, Default)]
pub struct Attachments {
    entries: BTreeMap<String, Bound>,
}

impl Attachments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, node_id: &str) -> Option<&NodeAttachment> {
        self.entries.get(node_id).map(|b| &b.attachment)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &NodeAttachment)> {
        self.entries.iter().map(|(id, b)| (id.as_str(), &b.attachment))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn insert(&mut self, node: &NodeData, attachment: NodeAttachment) {
        let bound = Bound {
            node_type: node.node_type,
            bindings: node.bindings.clone(),
            attachment,
        };
        if let Some(previous) = self.entries.insert(node.id.clone(), bound) {
            previous.attachment.detach();
        }
    }

    /// Take the attachment of `node` if it was made for the same type and
    /// bindings.
    pub(crate) fn take_matching(&mut self, node: &NodeData) -> Option<NodeAttachment> {
        let bound = self.entries.get(&node.id)?;
        if bound.node_type != node.node_type || bound.bindings != node.bindings {
            return None;
        }
        self.entries.remove(&node.id).map(|b| b.attachment)
    }

    /// Detach and forget the attachment of `node_id`.
    pub fn remove(&mut self, node_id: &str) -> bool {
        match self.entries.remove(node_id) {
            Some(bound) => {
                bound.attachment.detach();
                true
            }
            None => false,
        }
    }

    /// Detach everything.
    pub fn clear(&mut self) {
        for bound in self.entries.values() {
            bound.attachment.detach();
        }
        self.entries.clear();
    }
}
