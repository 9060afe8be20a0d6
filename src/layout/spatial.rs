//! Spatial map for pointer hit testing.
//!
//! [`SpatialMap`] keeps node frames in paint order (depth-first, so children
//! come after their parents) and answers which node is under the pointer.

use crate::dom::node::NodeId;
use crate::geometry::{Point, Region};

use super::engine::LayoutMap;

/// Node frames ordered by z-order; the last entry is frontmost.
#[derive(Debug, Clone, Default)]
pub struct SpatialMap {
    entries: Vec<(NodeId, Region)>,
}

impl SpatialMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from layout results. Empty frames (hidden nodes, inactive tab
    /// pages) are skipped.
    pub fn from_layout(layout: &LayoutMap) -> Self {
        let entries = layout
            .iter()
            .map(|(id, l)| (id, l.decoration.frame))
            .filter(|(_, frame)| !frame.is_empty())
            .collect();
        Self { entries }
    }

    /// All nodes containing `point`, frontmost first.
    pub fn hit_test(&self, point: Point) -> Vec<NodeId> {
        self.entries
            .iter()
            .rev()
            .filter(|(_, region)| region.contains(point))
            .map(|(id, _)| *id)
            .collect()
    }

    /// The frontmost node under `point`.
    pub fn node_at(&self, point: Point) -> Option<NodeId> {
        self.entries
            .iter()
            .rev()
            .find(|(_, region)| region.contains(point))
            .map(|(id, _)| *id)
    }

    /// The frontmost node under `point` that satisfies `accept`.
    pub fn node_at_where(&self, point: Point, accept: impl Fn(NodeId) -> bool) -> Option<NodeId> {
        self.entries
            .iter()
            .rev()
            .find(|(id, region)| region.contains(point) && accept(*id))
            .map(|(id, _)| *id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::cascade::CascadeEnv;
    use crate::css::stylesheet::Stylesheet;
    use crate::dom::node::{NodeData, NodeType};
    use crate::dom::tree::Dom;
    use crate::geometry::Size;
    use crate::layout::engine::layout_tree;

    fn setup() -> (SpatialMap, NodeId, NodeId, NodeId) {
        let sheet = Stylesheet::parse("View { margin: 0; padding: 0; } Slider { margin: 0; padding: 0; }").unwrap();
        let (mut dom, root) = Dom::with_root(NodeData::new(NodeType::View, "root"));
        let a = dom.push_child(root, NodeData::new(NodeType::Slider, "a")).unwrap();
        let b = dom.push_child(root, NodeData::new(NodeType::Slider, "b")).unwrap();
        let env = CascadeEnv::new(Size::new(200.0, 100.0));
        let layout = layout_tree(&mut dom, &sheet, &env, root, Region::new(0.0, 0.0, 200.0, 100.0));
        (SpatialMap::from_layout(&layout), root, a, b)
    }

    #[test]
    fn children_are_in_front_of_parents() {
        let (map, root, a, b) = setup();
        assert_eq!(map.len(), 3);
        assert_eq!(map.node_at(Point::new(10.0, 10.0)), Some(a));
        assert_eq!(map.node_at(Point::new(150.0, 10.0)), Some(b));
        assert_eq!(map.hit_test(Point::new(150.0, 10.0)), vec![b, root]);
    }

    #[test]
    fn misses_outside() {
        let (map, ..) = setup();
        assert_eq!(map.node_at(Point::new(500.0, 10.0)), None);
        assert!(map.hit_test(Point::new(-1.0, -1.0)).is_empty());
    }

    #[test]
    fn filtered_lookup() {
        let (map, root, a, _b) = setup();
        assert_eq!(map.node_at_where(Point::new(10.0, 10.0), |id| id != a), Some(root));
    }
}
