//! # gilt-plug
//!
//! A CSS-styled, declarative GUI composition engine for audio plugins.
//!
//! A plugin describes its editor as a tree of nodes (JSON or built in code),
//! styles it with a small stylesheet language and binds controls to audio
//! parameters by id. gilt-plug resolves styles, lays the tree out, paints it
//! into display lists and keeps controls and parameters in sync across the
//! audio and UI threads without locks. Descriptions and stylesheets can be
//! reloaded while the editor is open; nodes that survive keep their state.
//!
//! ## Core Systems
//!
//! - **[`css`]**: tokenizer, parser, typed values, stylesheet with classes
//!   and palettes, and the cascade resolver
//! - **[`dom`]**: slotmap-backed node tree with structural checks and style cache
//! - **[`layout`]**: box-model decorator and flexbox, free-form, grid and
//!   tabbed layout (taffy for flexbox)
//! - **[`param`]**: lock-free parameter attachments between audio and UI thread
//! - **[`description`]**: serde node descriptions and persisted editor state
//! - **[`builder`]**: build, reconcile and last-request-wins reload
//! - **[`render`]**: paint strategies, display lists, frame publishing
//! - **[`interaction`]**: hover, press, drag gestures and focus chain
//! - **[`editor`]**: the per-tick loop tying everything together
//! - **[`context`]**: editor configuration and the shared context
//! - **[`reactive`]**, **[`scheduler`]**: UI-thread observables and timers
//! - **[`geometry`]**: Point, Size, Region, Spacing primitives

// Foundation
pub mod error;
pub mod geometry;

// Core systems
pub mod css;
pub mod dom;
pub mod layout;

// Parameters and descriptions
pub mod description;
pub mod param;

// UI thread
pub mod reactive;
pub mod scheduler;

// Building and rendering
pub mod builder;
pub mod interaction;
pub mod render;

// Editor
pub mod context;
pub mod editor;

pub use builder::{Builder, ReloadRequest};
pub use context::{EditorConfig, SharedContext};
pub use description::NodeDescription;
pub use editor::Editor;
pub use error::{Diagnostic, DiagnosticKind, Error, Result};
