//! Recursive layout of a node tree into per-node decorations.
//!
//! Each node gets outer bounds from its parent; the box model reduces them to
//! a client area, and the node's `display` mode places its children inside
//! that client area:
//!
//! - `flexbox`: stacked, computed with taffy
//! - `contents`: free-form, `pos-x/pos-y/pos-width/pos-height` per child
//! - `grid`: `grid-columns` equal columns, rows in child order
//! - `tabbed`: a tab bar plus the selected child only

use std::collections::HashMap;

use taffy::style::AvailableSpace;
use taffy::TaffyTree;

use super::box_model::{BoxModel, Decoration};
use super::resolve::{child_style, container_style};
use crate::css::cascade::{CascadeEnv, ResolvedStyle};
use crate::css::stylesheet::Stylesheet;
use crate::css::value::PropertyValue;
use crate::dom::node::NodeId;
use crate::dom::tree::Dom;
use crate::geometry::{Region, Size};

/// Height of the tab bar when `tab-height` is unreadable.
pub const DEFAULT_TAB_HEIGHT: f32 = 30.0;

/// How a container arranges its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutMode {
    #[default]
    Stacked,
    FreeForm,
    Grid,
    Tabbed,
}

impl LayoutMode {
    pub fn of(style: &ResolvedStyle) -> Self {
        match style.text("display").as_deref() {
            Some("contents") => LayoutMode::FreeForm,
            Some("grid") => LayoutMode::Grid,
            Some("tabbed") => LayoutMode::Tabbed,
            _ => LayoutMode::Stacked,
        }
    }
}

/// Layout result of one node.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NodeLayout {
    pub decoration: Decoration,
    /// Tab bar of a tabbed container.
    pub tab_bar: Option<Region>,
}

impl NodeLayout {
    pub fn outer(&self) -> Region {
        self.decoration.outer
    }

    pub fn client(&self) -> Region {
        self.decoration.client
    }
}

/// Layout results for a tree, in depth-first order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutMap {
    entries: Vec<(NodeId, NodeLayout)>,
    index: HashMap<NodeId, usize>,
}

impl LayoutMap {
    pub fn get(&self, node: NodeId) -> Option<&NodeLayout> {
        self.index.get(&node).map(|&i| &self.entries[i].1)
    }

    /// Entries in depth-first (paint) order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &NodeLayout)> {
        self.entries.iter().map(|(id, layout)| (*id, layout))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, node: NodeId, layout: NodeLayout) {
        self.index.insert(node, self.entries.len());
        self.entries.push((node, layout));
    }
}

/// Resolve styles below `root` and lay the subtree out in `bounds`.
pub fn layout_tree(
    dom: &mut Dom,
    sheet: &Stylesheet,
    env: &CascadeEnv,
    root: NodeId,
    bounds: Region,
) -> LayoutMap {
    dom.resolve_styles(root, sheet, env);
    layout_resolved(dom, root, bounds)
}

/// Lay out `root` in `bounds` using the styles already cached in `dom`.
///
/// Nodes without a cached style use built-in defaults. Pure: reads the tree
/// and its styles, never changes them.
pub fn layout_resolved(dom: &Dom, root: NodeId, bounds: Region) -> LayoutMap {
    let mut map = LayoutMap::default();
    layout_node(dom, root, bounds, &mut map);
    map
}

fn style_of(dom: &Dom, node: NodeId) -> ResolvedStyle {
    dom.cached_style(node).cloned().unwrap_or_default()
}

fn layout_node(dom: &Dom, node: NodeId, outer: Region, map: &mut LayoutMap) {
    let style = style_of(dom, node);
    if !style.is_visible() {
        hide_subtree(dom, node, outer, map);
        return;
    }

    let decoration = BoxModel::from_style(&style).decorate(outer);
    let mut layout = NodeLayout { decoration, tab_bar: None };
    let client = decoration.client;

    let children: Vec<NodeId> = dom
        .children(node)
        .iter()
        .copied()
        .filter(|&c| style_of(dom, c).is_visible())
        .collect();

    let placed: Vec<(NodeId, Region)> = match LayoutMode::of(&style) {
        LayoutMode::Stacked => stacked(dom, &style, client, &children),
        LayoutMode::FreeForm => free_form(dom, client, &children),
        LayoutMode::Grid => grid(&style, client, &children),
        LayoutMode::Tabbed => {
            let height = style.number_or("tab-height", DEFAULT_TAB_HEIGHT);
            let (bar, page) = client.split_top(height);
            layout.tab_bar = Some(bar);
            let selected = dom
                .get(node)
                .map_or(0, |d| d.transient.selected_tab)
                .min(children.len().saturating_sub(1));
            children
                .iter()
                .enumerate()
                .map(|(i, &c)| (c, if i == selected { page } else { Region::EMPTY }))
                .collect()
        }
    };

    map.insert(node, layout);
    for &child in dom.children(node) {
        match placed.iter().find(|(c, _)| *c == child) {
            Some((_, bounds)) => layout_node(dom, child, *bounds, map),
            None => hide_subtree(dom, child, Region::new(client.x, client.y, 0.0, 0.0), map),
        }
    }
}

/// Hidden nodes and their subtrees get empty bounds.
fn hide_subtree(dom: &Dom, node: NodeId, at: Region, map: &mut LayoutMap) {
    let empty = Region::new(at.x, at.y, 0.0, 0.0);
    for id in dom.walk_depth_first(node) {
        let decoration = Decoration { outer: empty, frame: empty, caption: None, client: empty };
        map.insert(id, NodeLayout { decoration, tab_bar: None });
    }
}

/// Stacked layout: a flexbox container computed with taffy.
fn stacked(dom: &Dom, style: &ResolvedStyle, client: Region, children: &[NodeId]) -> Vec<(NodeId, Region)> {
    if children.is_empty() {
        return Vec::new();
    }

    // taffy has no `order`; sort by flex-order, keeping document order on ties.
    let mut ordered: Vec<(i64, NodeId)> = children
        .iter()
        .map(|&c| (style_of(dom, c).number_or("flex-order", 0.0) as i64, c))
        .collect();
    ordered.sort_by_key(|(order, _)| *order);

    let mut tree: TaffyTree<()> = TaffyTree::new();
    let mut leaves = Vec::with_capacity(ordered.len());
    for (_, child) in &ordered {
        match tree.new_leaf(child_style(&style_of(dom, *child))) {
            Ok(leaf) => leaves.push((*child, leaf)),
            Err(e) => log::warn!("layout: could not create flex item: {e}"),
        }
    }
    let leaf_ids: Vec<_> = leaves.iter().map(|(_, leaf)| *leaf).collect();
    let container = match tree.new_with_children(container_style(style, client.size()), &leaf_ids) {
        Ok(container) => container,
        Err(e) => {
            log::warn!("layout: could not create flex container: {e}");
            return Vec::new();
        }
    };
    let available = taffy::geometry::Size {
        width: AvailableSpace::Definite(client.width),
        height: AvailableSpace::Definite(client.height),
    };
    if let Err(e) = tree.compute_layout(container, available) {
        log::warn!("layout: flexbox computation failed: {e}");
        return Vec::new();
    }

    leaves
        .into_iter()
        .filter_map(|(child, leaf)| {
            let layout = tree.layout(leaf).ok()?;
            Some((
                child,
                Region::new(
                    client.x + layout.location.x,
                    client.y + layout.location.y,
                    layout.size.width,
                    layout.size.height,
                ),
            ))
        })
        .collect()
}

/// A free-form coordinate: pixels, or a percentage of `extent`.
fn coordinate(value: Option<&PropertyValue>, extent: f32, fallback: f32) -> f32 {
    match value {
        Some(PropertyValue::Number(n)) => *n as f32,
        Some(PropertyValue::Percent(p)) => *p as f32 / 100.0 * extent,
        _ => fallback,
    }
}

/// Free-form layout: each child places itself with `pos-*`.
fn free_form(dom: &Dom, client: Region, children: &[NodeId]) -> Vec<(NodeId, Region)> {
    children
        .iter()
        .map(|&child| {
            let style = style_of(dom, child);
            let x = coordinate(style.get("pos-x").as_ref(), client.width, 0.0);
            let y = coordinate(style.get("pos-y").as_ref(), client.height, 0.0);
            let w = coordinate(style.get("pos-width").as_ref(), client.width, client.width);
            let h = coordinate(style.get("pos-height").as_ref(), client.height, client.height);
            (child, Region::new(client.x + x, client.y + y, w.max(0.0), h.max(0.0)))
        })
        .collect()
}

/// Grid layout: equal columns, as many equal rows as needed.
fn grid(style: &ResolvedStyle, client: Region, children: &[NodeId]) -> Vec<(NodeId, Region)> {
    if children.is_empty() {
        return Vec::new();
    }
    let columns = (style.number_or("grid-columns", 2.0).max(1.0) as usize).min(children.len());
    let rows = children.len().div_ceil(columns);
    let cell = Size::new(client.width / columns as f32, client.height / rows as f32);

    children
        .iter()
        .enumerate()
        .map(|(i, &child)| {
            let (row, col) = (i / columns, i % columns);
            let region = Region::new(
                client.x + col as f32 * cell.width,
                client.y + row as f32 * cell.height,
                cell.width,
                cell.height,
            );
            (child, region)
        })
        .collect()
}
