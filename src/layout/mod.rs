//! Decorator box model and layout modes: stacked (taffy), free-form, grid, tabbed.

pub mod box_model;
pub mod engine;
pub mod resolve;
pub mod spatial;

pub use box_model::{client_bounds, BoxModel, CaptionPlacement, Decoration};
pub use engine::{layout_resolved, layout_tree, LayoutMap, LayoutMode, NodeLayout};
pub use spatial::SpatialMap;
