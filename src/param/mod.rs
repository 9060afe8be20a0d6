//! Parameter attachment bridge between the audio thread and the UI.
//!
//! - [`parameter`]: the host-facing [`AudioParameter`] and
//!   [`ParameterRegistry`] traits, with in-memory implementations.
//! - [`snapshot`]: [`AtomicSnapshot`], the value types an attachment carries.
//! - [`attachment`]: [`Attachment<T>`], the UI handle of one binding.
//! - [`bridge`]: [`AttachmentBridge`] (UI side) and [`AudioProcessor`]
//!   (audio side).

pub mod attachment;
pub mod bridge;
pub mod parameter;
pub mod snapshot;

pub use attachment::Attachment;
pub use bridge::{AttachmentBridge, AudioProcessor};
pub use parameter::{AudioParameter, ListenerToken, ParameterListener, ParameterMap, ParameterRegistry, SimpleParameter};
pub use snapshot::AtomicSnapshot;
