//! The declarative tree description and its JSON form.
//!
//! A description is a nested document, one object per node:
//!
//! ```json
//! { "type": "View", "id": "main", "class-list": "panel dark",
//!   "flex-direction": "column",
//!   "children": [ { "type": "Slider", "parameter-id": "gain" } ] }
//! ```
//!
//! `type`, `id`, `class-list`, `children` and the binding roles
//! (`parameter-id`, `parameter-x-id`, `parameter-y-id`) are structural; every
//! other key is a node property. Reading is lenient: a node object that
//! cannot be understood is kept with its error so the builder can replace
//! just that subtree with a placeholder.

pub mod state;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::css::properties::{self, PropertyError};
use crate::css::value::PropertyValue;
use crate::dom::node::{NodeData, NodeId, NodeType, PARAMETER_ID, PARAMETER_X_ID, PARAMETER_Y_ID};
use crate::dom::tree::Dom;

pub use state::PersistedState;

const KEY_TYPE: &str = "type";
const KEY_ID: &str = "id";
const KEY_CLASSES: &str = "class-list";
const KEY_CHILDREN: &str = "children";
const BINDING_KEYS: [&str; 3] = [PARAMETER_ID, PARAMETER_X_ID, PARAMETER_Y_ID];

/// A description that cannot be turned into a node.
#[derive(Debug, thiserror::Error)]
pub enum DescriptionError {
    #[error("malformed node: {0}")]
    MalformedDescription(String),
    #[error("unknown node type '{0}'")]
    UnknownType(String),
    #[error("{node_type} requires '{property}'")]
    MissingProperty { node_type: String, property: String },
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// NodeDescription
// ---------------------------------------------------------------------------

/// One node of a description with its nested children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "serde_json::Value", into = "serde_json::Value")]
pub struct NodeDescription {
    /// The type tag, e.g. `Slider` or `XYDragComponent`.
    pub node_type: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    /// Property values as written in the document.
    pub properties: BTreeMap<String, Value>,
    /// Binding role to parameter id.
    pub bindings: BTreeMap<String, String>,
    pub children: Vec<NodeDescription>,
    /// Why this node could not be read, if it could not.
    pub malformed: Option<String>,
}

impl NodeDescription {
    pub fn new(node_type: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            id: None,
            classes: Vec::new(),
            properties: BTreeMap::new(),
            bindings: BTreeMap::new(),
            children: Vec::new(),
            malformed: None,
        }
    }

    fn malformed(message: impl Into<String>) -> Self {
        let mut desc = Self::new(NodeType::Placeholder.tag());
        desc.malformed = Some(message.into());
        desc
    }

    /// Parse a JSON document. Only invalid JSON is an error; malformed nodes
    /// are kept and reported by [`validate`](Self::validate).
    pub fn from_json(text: &str) -> Result<Self, DescriptionError> {
        let value: Value = serde_json::from_str(text)?;
        Ok(Self::from(value))
    }

    pub fn to_json(&self) -> String {
        Value::from(self.clone()).to_string()
    }

    pub fn to_json_pretty(&self) -> Result<String, DescriptionError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Set the id (builder).
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Add a style class (builder).
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Set a property (builder).
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Bind `parameter-id` (builder).
    pub fn with_parameter(self, parameter_id: impl Into<String>) -> Self {
        self.with_binding(PARAMETER_ID, parameter_id)
    }

    /// Bind a parameter to a role (builder).
    pub fn with_binding(mut self, role: impl Into<String>, parameter_id: impl Into<String>) -> Self {
        self.bindings.insert(role.into(), parameter_id.into());
        self
    }

    /// Append a child (builder).
    pub fn with_child(mut self, child: NodeDescription) -> Self {
        self.children.push(child);
        self
    }

    /// Whether a property or binding named `key` is present.
    pub fn has(&self, key: &str) -> bool {
        self.properties.contains_key(key) || self.bindings.contains_key(key)
    }

    /// Check this node (not its children) and return its type.
    pub fn validate(&self) -> Result<NodeType, DescriptionError> {
        if let Some(message) = &self.malformed {
            return Err(DescriptionError::MalformedDescription(message.clone()));
        }
        let node_type = NodeType::from_tag(&self.node_type)
            .ok_or_else(|| DescriptionError::UnknownType(self.node_type.clone()))?;
        if let Some(missing) = node_type.required_properties().iter().find(|p| !self.has(p)) {
            return Err(DescriptionError::MissingProperty {
                node_type: self.node_type.clone(),
                property: (*missing).to_owned(),
            });
        }
        Ok(node_type)
    }

    /// Number of nodes in this subtree.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(NodeDescription::count).sum::<usize>()
    }

    /// Describe the subtree of `dom` rooted at `node`.
    pub fn from_dom(dom: &Dom, node: NodeId) -> Option<Self> {
        let data = dom.get(node)?;
        let mut desc = Self::new(data.node_type.tag()).with_id(data.id.clone());
        desc.classes = data.classes.clone();
        desc.properties = data
            .properties
            .iter()
            .map(|(name, value)| (name.clone(), property_to_json(value)))
            .collect();
        desc.bindings = data.bindings.clone();
        desc.children = dom
            .children(node)
            .iter()
            .filter_map(|child| Self::from_dom(dom, *child))
            .collect();
        Some(desc)
    }

    /// Typed node data for this description. Properties that do not parse
    /// are skipped and returned as errors alongside the node.
    pub fn to_node_data(&self, node_type: NodeType, id: String) -> (NodeData, Vec<PropertyError>) {
        let mut data = NodeData::new(node_type, id).with_classes(self.classes.iter().cloned());
        let mut errors = Vec::new();
        for (name, value) in &self.properties {
            match property_from_json(name, value) {
                Ok(value) => {
                    data.properties.insert(name.clone(), value);
                }
                Err(err) => errors.push(err),
            }
        }
        for (role, parameter) in &self.bindings {
            data.bindings.insert(role.clone(), parameter.clone());
        }
        (data, errors)
    }
}

impl From<Value> for NodeDescription {
    fn from(value: Value) -> Self {
        let Value::Object(map) = value else {
            return Self::malformed(format!("expected an object, found {}", kind_name(&value)));
        };
        read_object(map)
    }
}

fn read_object(map: Map<String, Value>) -> NodeDescription {
    let node_type = match map.get(KEY_TYPE) {
        Some(Value::String(tag)) => tag.clone(),
        Some(other) => return NodeDescription::malformed(format!("'type' must be a string, found {}", kind_name(other))),
        None => return NodeDescription::malformed("missing 'type'"),
    };
    let mut desc = NodeDescription::new(node_type);

    for (key, value) in map {
        match key.as_str() {
            KEY_TYPE => {}
            KEY_ID => match value {
                Value::String(id) if !id.is_empty() => desc.id = Some(id),
                Value::String(_) => {}
                other => desc.malformed = Some(format!("'id' must be a string, found {}", kind_name(&other))),
            },
            KEY_CLASSES => match read_classes(value) {
                Ok(classes) => desc.classes = classes,
                Err(message) => desc.malformed = Some(message),
            },
            KEY_CHILDREN => match value {
                Value::Array(children) => desc.children = children.into_iter().map(NodeDescription::from).collect(),
                other => desc.malformed = Some(format!("'children' must be an array, found {}", kind_name(&other))),
            },
            k if BINDING_KEYS.contains(&k) => match value {
                Value::String(parameter) => {
                    desc.bindings.insert(key, parameter);
                }
                other => desc.malformed = Some(format!("'{key}' must be a string, found {}", kind_name(&other))),
            },
            _ => {
                desc.properties.insert(key, value);
            }
        }
    }
    desc
}

/// A class list is either one string of space or comma separated names or
/// an array of strings.
fn read_classes(value: Value) -> Result<Vec<String>, String> {
    match value {
        Value::String(list) => Ok(list
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect()),
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Ok(s),
                other => Err(format!("class names must be strings, found {}", kind_name(&other))),
            })
            .collect(),
        other => Err(format!("'class-list' must be a string or an array, found {}", kind_name(&other))),
    }
}

impl From<NodeDescription> for Value {
    fn from(desc: NodeDescription) -> Self {
        let mut map = Map::new();
        map.insert(KEY_TYPE.to_owned(), Value::String(desc.node_type));
        if let Some(id) = desc.id {
            map.insert(KEY_ID.to_owned(), Value::String(id));
        }
        if !desc.classes.is_empty() {
            map.insert(KEY_CLASSES.to_owned(), Value::String(desc.classes.join(" ")));
        }
        for (role, parameter) in desc.bindings {
            map.insert(role, Value::String(parameter));
        }
        for (name, value) in desc.properties {
            map.insert(name, value);
        }
        if !desc.children.is_empty() {
            let children = desc.children.into_iter().map(Value::from).collect();
            map.insert(KEY_CHILDREN.to_owned(), Value::Array(children));
        }
        Value::Object(map)
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ---------------------------------------------------------------------------
// Property values
// ---------------------------------------------------------------------------

/// The JSON form of a property value. Numbers, booleans and box lists stay
/// native; everything else is written in stylesheet syntax.
pub fn property_to_json(value: &PropertyValue) -> Value {
    match value {
        PropertyValue::Number(n) => Value::from(*n),
        PropertyValue::Bool(b) => Value::Bool(*b),
        PropertyValue::List(ns) => Value::Array(ns.iter().map(|n| Value::from(*n)).collect()),
        other => Value::String(other.to_text()),
    }
}

/// Type a JSON property value for `property`.
pub fn property_from_json(property: &str, value: &Value) -> Result<PropertyValue, PropertyError> {
    let invalid = |message: &str| PropertyError::InvalidValue {
        property: property.to_owned(),
        message: message.to_owned(),
    };
    match value {
        Value::String(text) => properties::coerce_text(property, text),
        Value::Bool(b) => Ok(PropertyValue::Bool(*b)),
        Value::Number(n) => n.as_f64().map(PropertyValue::Number).ok_or_else(|| invalid("number out of range")),
        Value::Array(items) => {
            let numbers: Option<Vec<f64>> = items.iter().map(Value::as_f64).collect();
            match numbers {
                Some(ns) if ns.len() == 1 => Ok(PropertyValue::Number(ns[0])),
                Some(ns) if (2..=4).contains(&ns.len()) => Ok(PropertyValue::List(ns)),
                _ => Err(invalid("expected one to four numbers")),
            }
        }
        Value::Null | Value::Object(_) => Err(invalid("expected a string, number, boolean or list")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn reads_structural_keys() {
        let desc = NodeDescription::from(json!({
            "type": "View",
            "id": "main",
            "class-list": "panel, dark",
            "flex-direction": "column",
            "children": [
                { "type": "Slider", "parameter-id": "gain", "class-list": ["knob"] }
            ]
        }));
        assert_eq!(desc.node_type, "View");
        assert_eq!(desc.id.as_deref(), Some("main"));
        assert_eq!(desc.classes, vec!["panel", "dark"]);
        assert_eq!(desc.properties.get("flex-direction"), Some(&json!("column")));
        let slider = &desc.children[0];
        assert_eq!(slider.bindings.get(PARAMETER_ID).map(String::as_str), Some("gain"));
        assert_eq!(slider.classes, vec!["knob"]);
        assert_eq!(desc.count(), 2);
    }

    #[test]
    fn malformed_children_are_isolated() {
        let desc = NodeDescription::from(json!({
            "type": "View",
            "children": [ 42, { "id": "no-type" }, { "type": "Label", "class-list": 3 } ]
        }));
        assert!(desc.validate().is_ok());
        let errors: Vec<String> = desc.children.iter().map(|c| c.validate().unwrap_err().to_string()).collect();
        assert_eq!(
            errors,
            vec![
                "malformed node: expected an object, found a number",
                "malformed node: missing 'type'",
                "malformed node: 'class-list' must be a string or an array, found a number",
            ]
        );
    }

    #[test]
    fn validate_checks_type_and_required_properties() {
        assert!(matches!(
            NodeDescription::new("Oscilloscope").validate(),
            Err(DescriptionError::UnknownType(t)) if t == "Oscilloscope"
        ));
        let err = NodeDescription::new("XYDragComponent").with_binding(PARAMETER_X_ID, "x").validate().unwrap_err();
        assert_eq!(err.to_string(), "XYDragComponent requires 'parameter-y-id'");
        assert_eq!(
            NodeDescription::new("Meter").with_property("source", "input").validate().unwrap(),
            NodeType::Meter
        );
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(matches!(NodeDescription::from_json("{ nope"), Err(DescriptionError::Json(_))));
    }

    #[test]
    fn json_text_round_trips() {
        let desc = NodeDescription::new("View")
            .with_id("root")
            .with_class("a")
            .with_class("b")
            .with_property("margin", json!([1, 2]))
            .with_child(NodeDescription::new("Slider").with_parameter("gain").with_property("caption", "Gain"));
        let text = desc.to_json();
        assert_eq!(NodeDescription::from_json(&text).unwrap(), desc);
    }

    #[test]
    fn property_values_convert() {
        assert_eq!(property_from_json("margin", &json!([2, 4])).unwrap(), PropertyValue::List(vec![2.0, 4.0]));
        assert_eq!(property_from_json("visibility", &json!(false)).unwrap(), PropertyValue::Bool(false));
        assert!(matches!(
            property_from_json("background-color", &json!("#ff0000")).unwrap(),
            PropertyValue::Colour(_)
        ));
        assert!(property_from_json("margin", &json!({})).is_err());

        let colour = property_from_json("color", &json!("#102030")).unwrap();
        assert_eq!(property_from_json("color", &property_to_json(&colour)).unwrap(), colour);
    }
}
