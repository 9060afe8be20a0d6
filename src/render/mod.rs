//! Rendering pipeline: paint strategies, display lists, frame publishing.
//!
//! The engine does not rasterise. [`render_tree`] walks a laid-out tree in
//! paint order and produces a [`DisplayList`]; a [`FramePublisher`] hands it
//! to whatever draws it, together with the regions that changed.

pub mod display_list;
pub mod frame;
pub mod paint;

pub use display_list::{DisplayList, DrawCommand, Fill, TextAlign};
pub use frame::{Frame, FramePublisher, FrameReader};
pub use paint::{paint_node, strategy_for, Classic, Flat, PaintContext, PaintStrategy, Skeuomorphic};

use crate::builder::Attachments;
use crate::css::cascade::ResolvedStyle;
use crate::dom::node::NodeId;
use crate::dom::tree::Dom;
use crate::layout::engine::LayoutMap;

/// Paint every laid-out node of `dom`, parents before children.
///
/// Hidden nodes have no visible layout entry and are skipped with their
/// subtrees.
pub fn render_tree(dom: &Dom, layout: &LayoutMap, attachments: &Attachments) -> DisplayList {
    let fallback = ResolvedStyle::default();
    let mut list = DisplayList::new();
    for (id, node_layout) in layout.iter() {
        let Some(node) = dom.get(id) else {
            continue;
        };
        let style = dom.cached_style(id).unwrap_or(&fallback);
        if !style.is_visible() || node_layout.outer().is_empty() {
            continue;
        }
        let tabs = tab_labels(dom, id);
        list.begin_node(&node.id, node_layout.outer());
        let mut cx = PaintContext::new(node, style, node_layout, &mut list)
            .with_attachment(attachments.get(&node.id))
            .with_tabs(&tabs);
        paint_node(strategy_for(style), &mut cx);
    }
    log::trace!("painted {} commands", list.len());
    list
}

/// Page labels of a tabbed container: each child's caption, else its id.
fn tab_labels(dom: &Dom, node: NodeId) -> Vec<String> {
    if dom.cached_style(node).and_then(|s| s.text("display")).as_deref() != Some("tabbed") {
        return Vec::new();
    }
    dom.children(node)
        .iter()
        .filter_map(|&child| {
            let data = dom.get(child)?;
            let caption = dom.cached_style(child).and_then(|s| s.text("caption"));
            Some(caption.filter(|c| !c.is_empty()).unwrap_or_else(|| data.id.clone()))
        })
        .collect()
}
