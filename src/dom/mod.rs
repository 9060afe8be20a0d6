//! Node tree: slotmap-backed arena of typed nodes with a per-node style cache.

pub mod node;
pub mod tree;
pub mod query;

pub use node::{InteractionState, NodeData, NodeId, NodeType, StateSet, TransientState};
pub use tree::{Dom, StructuralViolation};
