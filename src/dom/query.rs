//! Tree queries: by class, type, bound parameter; generic predicate matching.

use super::node::{NodeData, NodeId, NodeType};
use super::tree::Dom;

impl Dom {
    /// Find all nodes that have the given style class.
    pub fn query_by_class(&self, class: &str) -> Vec<NodeId> {
        self.query_all(|data| data.has_class(class))
    }

    /// Find all nodes of the given type.
    pub fn query_by_type(&self, node_type: NodeType) -> Vec<NodeId> {
        self.query_all(|data| data.node_type == node_type)
    }

    /// Find all nodes with any binding role bound to `parameter_id`.
    pub fn query_by_parameter(&self, parameter_id: &str) -> Vec<NodeId> {
        self.query_all(|data| data.bindings.values().any(|p| p == parameter_id))
    }

    /// Find all nodes matching an arbitrary predicate, in tree order.
    pub fn query_all(&self, predicate: impl Fn(&NodeData) -> bool) -> Vec<NodeId> {
        let Some(root) = self.root() else {
            return Vec::new();
        };
        self.walk_depth_first(root)
            .into_iter()
            .filter(|&id| self.nodes.get(id).is_some_and(&predicate))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::dom::node::{NodeData, NodeType};
    use crate::dom::tree::Dom;

    /// Build a test tree for queries:
    /// ```text
    ///        root (View)
    ///       /          \
    ///   sidebar         main
    ///   (View .nav)     (Slider .knob -> gain)
    ///    /     \
    ///  save    pad
    /// (Button  (XY .knob -> cutoff, gain)
    ///  .knob)
    /// ```
    fn build_query_tree() -> Dom {
        let (mut dom, root) = Dom::with_root(NodeData::new(NodeType::View, "root"));
        let sidebar = dom
            .push_child(root, NodeData::new(NodeType::View, "sidebar").with_class("nav"))
            .unwrap();
        dom.push_child(
            root,
            NodeData::new(NodeType::Slider, "main").with_class("knob").with_parameter("gain"),
        )
        .unwrap();
        dom.push_child(sidebar, NodeData::new(NodeType::TextButton, "save").with_class("knob"))
            .unwrap();
        dom.push_child(
            sidebar,
            NodeData::new(NodeType::XyDrag, "pad")
                .with_class("knob")
                .with_binding("parameter-x-id", "cutoff")
                .with_binding("parameter-y-id", "gain"),
        )
        .unwrap();
        dom
    }

    fn ids(dom: &Dom, nodes: Vec<crate::dom::NodeId>) -> Vec<String> {
        nodes.into_iter().map(|n| dom.get(n).unwrap().id.clone()).collect()
    }

    #[test]
    fn query_by_class_in_tree_order() {
        let dom = build_query_tree();
        assert_eq!(ids(&dom, dom.query_by_class("knob")), vec!["save", "pad", "main"]);
        assert!(dom.query_by_class("nonexistent").is_empty());
    }

    #[test]
    fn query_by_type() {
        let dom = build_query_tree();
        assert_eq!(ids(&dom, dom.query_by_type(NodeType::View)), vec!["root", "sidebar"]);
        assert_eq!(ids(&dom, dom.query_by_type(NodeType::XyDrag)), vec!["pad"]);
    }

    #[test]
    fn query_by_parameter_checks_every_role() {
        let dom = build_query_tree();
        assert_eq!(ids(&dom, dom.query_by_parameter("gain")), vec!["pad", "main"]);
        assert_eq!(ids(&dom, dom.query_by_parameter("cutoff")), vec!["pad"]);
    }

    #[test]
    fn query_all_custom_predicate() {
        let dom = build_query_tree();
        let bound = dom.query_all(|d| !d.bindings.is_empty());
        assert_eq!(bound.len(), 2);
        assert!(Dom::new().query_all(|_| true).is_empty());
    }
}
