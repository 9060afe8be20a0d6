//! Node types: NodeId, NodeType, interaction states, NodeData.

use std::collections::BTreeMap;
use std::fmt;

use slotmap::new_key_type;

use crate::css::value::PropertyValue;

new_key_type! {
    /// Unique identifier for a node in the arena. Copy, lightweight (u64).
    pub struct NodeId;
}

// ---------------------------------------------------------------------------
// NodeType
// ---------------------------------------------------------------------------

/// The closed set of node types a description can instantiate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeType {
    /// Container for other nodes.
    View,
    Slider,
    TextButton,
    ToggleButton,
    Label,
    ComboBox,
    ListBox,
    Meter,
    Plot,
    XyDrag,
    Keyboard,
    Drumpad,
    /// Stand-in for a subtree that failed to build.
    Placeholder,
}

impl NodeType {
    pub const ALL: [NodeType; 13] = [
        NodeType::View,
        NodeType::Slider,
        NodeType::TextButton,
        NodeType::ToggleButton,
        NodeType::Label,
        NodeType::ComboBox,
        NodeType::ListBox,
        NodeType::Meter,
        NodeType::Plot,
        NodeType::XyDrag,
        NodeType::Keyboard,
        NodeType::Drumpad,
        NodeType::Placeholder,
    ];

    /// The tag used in descriptions and as a type selector in stylesheets.
    pub fn tag(self) -> &'static str {
        match self {
            NodeType::View => "View",
            NodeType::Slider => "Slider",
            NodeType::TextButton => "TextButton",
            NodeType::ToggleButton => "ToggleButton",
            NodeType::Label => "Label",
            NodeType::ComboBox => "ComboBox",
            NodeType::ListBox => "ListBox",
            NodeType::Meter => "Meter",
            NodeType::Plot => "Plot",
            NodeType::XyDrag => "XYDragComponent",
            NodeType::Keyboard => "KeyboardComponent",
            NodeType::Drumpad => "DrumpadComponent",
            NodeType::Placeholder => "Placeholder",
        }
    }

    /// Look up a type by its tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.tag() == tag)
    }

    /// Whether this type lays out children.
    pub fn is_container(self) -> bool {
        matches!(self, NodeType::View)
    }

    /// Binding roles this type accepts, e.g. `parameter-id`.
    pub fn binding_roles(self) -> &'static [&'static str] {
        match self {
            NodeType::Slider
            | NodeType::TextButton
            | NodeType::ToggleButton
            | NodeType::ComboBox => &[PARAMETER_ID],
            NodeType::XyDrag => &[PARAMETER_X_ID, PARAMETER_Y_ID],
            _ => &[],
        }
    }

    /// Properties a description must declare for this type.
    pub fn required_properties(self) -> &'static [&'static str] {
        match self {
            NodeType::Meter | NodeType::Plot => &["source"],
            NodeType::XyDrag => &[PARAMETER_X_ID, PARAMETER_Y_ID],
            _ => &[],
        }
    }

    /// Whether the node takes part in keyboard focus and pointer gestures.
    pub fn is_interactive(self) -> bool {
        !self.binding_roles().is_empty() || matches!(self, NodeType::Keyboard | NodeType::Drumpad)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Binding role of the single-parameter controls.
pub const PARAMETER_ID: &str = "parameter-id";
/// Horizontal binding role of the XY pad.
pub const PARAMETER_X_ID: &str = "parameter-x-id";
/// Vertical binding role of the XY pad.
pub const PARAMETER_Y_ID: &str = "parameter-y-id";

// ---------------------------------------------------------------------------
// Interaction states
// ---------------------------------------------------------------------------

/// An interaction state a state-variant rule can require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InteractionState {
    Hover,
    Selected,
    Disabled,
    Focus,
    Pressed,
}

impl InteractionState {
    pub const ALL: [InteractionState; 5] = [
        InteractionState::Hover,
        InteractionState::Selected,
        InteractionState::Disabled,
        InteractionState::Focus,
        InteractionState::Pressed,
    ];

    /// Name used after `:` in selectors.
    pub fn name(self) -> &'static str {
        match self {
            InteractionState::Hover => "hover",
            InteractionState::Selected => "selected",
            InteractionState::Disabled => "disabled",
            InteractionState::Focus => "focus",
            InteractionState::Pressed => "pressed",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }

    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// A small set of [`InteractionState`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StateSet(u8);

impl StateSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn contains(self, state: InteractionState) -> bool {
        self.0 & state.bit() != 0
    }

    /// Whether every state in `other` is also in `self`.
    pub fn contains_all(self, other: StateSet) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, state: InteractionState) {
        self.0 |= state.bit();
    }

    pub fn remove(&mut self, state: InteractionState) {
        self.0 &= !state.bit();
    }

    /// Set or clear a state. Returns `true` if the set changed.
    pub fn set(&mut self, state: InteractionState, on: bool) -> bool {
        let before = self.0;
        if on {
            self.insert(state);
        } else {
            self.remove(state);
        }
        before != self.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// States in declaration order.
    pub fn iter(self) -> impl Iterator<Item = InteractionState> {
        InteractionState::ALL.into_iter().filter(move |s| self.contains(*s))
    }
}

impl FromIterator<InteractionState> for StateSet {
    fn from_iter<I: IntoIterator<Item = InteractionState>>(iter: I) -> Self {
        let mut set = StateSet::empty();
        for state in iter {
            set.insert(state);
        }
        set
    }
}

// ---------------------------------------------------------------------------
// NodeData
// ---------------------------------------------------------------------------

/// UI state that belongs to the live control rather than to the description.
///
/// Survives reconciling reloads for nodes whose id and type are unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TransientState {
    /// Vertical scroll offset of list-like nodes.
    pub scroll_offset: f32,
    /// Active page of a tabbed container.
    pub selected_tab: usize,
}

/// Data associated with a single node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeData {
    pub node_type: NodeType,
    /// Unique within the tree.
    pub id: String,
    /// Style classes in class-list order.
    pub classes: Vec<String>,
    /// Declared properties; highest precedence in the cascade.
    pub properties: BTreeMap<String, PropertyValue>,
    /// Binding role to parameter id, e.g. `parameter-id -> "gain"`.
    pub bindings: BTreeMap<String, String>,
    pub states: StateSet,
    pub transient: TransientState,
}

impl NodeData {
    /// Create a node of the given type with no classes or properties.
    pub fn new(node_type: NodeType, id: impl Into<String>) -> Self {
        Self {
            node_type,
            id: id.into(),
            classes: Vec::new(),
            properties: BTreeMap::new(),
            bindings: BTreeMap::new(),
            states: StateSet::empty(),
            transient: TransientState::default(),
        }
    }

    /// A diagnostic placeholder that shows `message`.
    pub fn placeholder(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NodeType::Placeholder, id)
            .with_property("text", PropertyValue::Text(message.into()))
    }

    /// Add a single style class (builder).
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        let class = class.into();
        if !self.classes.contains(&class) {
            self.classes.push(class);
        }
        self
    }

    /// Add multiple style classes (builder).
    pub fn with_classes(mut self, classes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        for class in classes {
            let class = class.into();
            if !self.classes.contains(&class) {
                self.classes.push(class);
            }
        }
        self
    }

    /// Declare a property (builder).
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Bind the `parameter-id` role (builder).
    pub fn with_parameter(self, parameter_id: impl Into<String>) -> Self {
        self.with_binding(PARAMETER_ID, parameter_id)
    }

    /// Bind a parameter to a role (builder).
    pub fn with_binding(mut self, role: impl Into<String>, parameter_id: impl Into<String>) -> Self {
        self.bindings.insert(role.into(), parameter_id.into());
        self
    }

    /// Set an interaction state (builder).
    pub fn with_state(mut self, state: InteractionState) -> Self {
        self.states.insert(state);
        self
    }

    /// The parameter bound to the `parameter-id` role.
    pub fn parameter_id(&self) -> Option<&str> {
        self.bindings.get(PARAMETER_ID).map(String::as_str)
    }

    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Add a style class. No-op if already present.
    pub fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_owned());
        }
    }

    /// Remove a style class. No-op if not present.
    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }

    /// Toggle a style class: add if absent, remove if present.
    pub fn toggle_class(&mut self, class: &str) {
        if self.has_class(class) {
            self.remove_class(class);
        } else {
            self.add_class(class);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_type_tags_round_trip() {
        for t in NodeType::ALL {
            assert_eq!(NodeType::from_tag(t.tag()), Some(t));
        }
        assert_eq!(NodeType::from_tag("XYDragComponent"), Some(NodeType::XyDrag));
        assert_eq!(NodeType::from_tag("Oscilloscope"), None);
    }

    #[test]
    fn binding_roles() {
        assert_eq!(NodeType::Slider.binding_roles(), &[PARAMETER_ID]);
        assert_eq!(NodeType::XyDrag.binding_roles(), &[PARAMETER_X_ID, PARAMETER_Y_ID]);
        assert!(NodeType::Label.binding_roles().is_empty());
        assert!(NodeType::Slider.is_interactive());
        assert!(!NodeType::View.is_interactive());
    }

    #[test]
    fn state_set_operations() {
        let mut set = StateSet::empty();
        assert!(set.is_empty());
        assert!(set.set(InteractionState::Hover, true));
        assert!(!set.set(InteractionState::Hover, true));
        set.insert(InteractionState::Focus);
        assert_eq!(set.len(), 2);
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![InteractionState::Hover, InteractionState::Focus]
        );

        let hover: StateSet = [InteractionState::Hover].into_iter().collect();
        assert!(set.contains_all(hover));
        assert!(!hover.contains_all(set));
        assert!(set.contains_all(StateSet::empty()));

        assert!(set.set(InteractionState::Hover, false));
        assert!(!set.contains(InteractionState::Hover));
    }

    #[test]
    fn state_names() {
        for s in InteractionState::ALL {
            assert_eq!(InteractionState::from_name(s.name()), Some(s));
        }
        assert_eq!(InteractionState::from_name("active"), None);
    }

    #[test]
    fn builder_methods() {
        let data = NodeData::new(NodeType::Slider, "gain")
            .with_class("knob")
            .with_class("knob")
            .with_classes(["big", "red"])
            .with_property("caption", "Gain")
            .with_parameter("gain-param");
        assert_eq!(data.classes, vec!["knob", "big", "red"]);
        assert_eq!(data.property("caption"), Some(&PropertyValue::Text("Gain".into())));
        assert_eq!(data.parameter_id(), Some("gain-param"));
    }

    #[test]
    fn class_editing() {
        let mut data = NodeData::new(NodeType::View, "v");
        data.add_class("a");
        data.add_class("a");
        data.toggle_class("b");
        assert_eq!(data.classes, vec!["a", "b"]);
        data.toggle_class("a");
        data.remove_class("missing");
        assert_eq!(data.classes, vec!["b"]);
    }

    #[test]
    fn placeholder_carries_message() {
        let data = NodeData::placeholder("bad-1", "unknown type 'Oscilloscope'");
        assert_eq!(data.node_type, NodeType::Placeholder);
        assert_eq!(
            data.property("text").and_then(PropertyValue::as_text),
            Some("unknown type 'Oscilloscope'")
        );
    }
}
