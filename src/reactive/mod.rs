//! UI-thread reactivity: observable values and explicit subscription handles.

pub mod observable;

pub use observable::{Observable, Subscription, Subscriptions};
