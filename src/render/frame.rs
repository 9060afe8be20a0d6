//! Frame hand-off to a renderer on another thread.
//!
//! The editor publishes a complete [`Frame`] after each tick that changed
//! something; a renderer holding a [`FrameReader`] always sees either the
//! previous or the new frame, never a partial one.

use std::sync::Arc;

use arc_swap::ArcSwap;

use super::display_list::DisplayList;
use crate::geometry::{Region, Size};

/// One published frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    /// Increments with every publish; 0 is the empty initial frame.
    pub generation: u64,
    pub size: Size,
    pub list: DisplayList,
    /// Regions that differ from the previous frame.
    pub dirty: Vec<Region>,
}

/// Editor side: publishes frames.
#[derive(Debug)]
pub struct FramePublisher {
    current: Arc<ArcSwap<Frame>>,
}

impl FramePublisher {
    pub fn new() -> Self {
        Self { current: Arc::new(ArcSwap::from_pointee(Frame::default())) }
    }

    /// Publish `list` as the next frame. Returns the new generation.
    pub fn publish(&self, size: Size, list: DisplayList) -> u64 {
        let previous = self.current.load();
        let dirty = if previous.size == size {
            list.diff(&previous.list)
        } else {
            vec![Region::new(0.0, 0.0, size.width, size.height)]
        };
        let generation = previous.generation + 1;
        self.current.store(Arc::new(Frame { generation, size, list, dirty }));
        generation
    }

    /// The last published frame.
    pub fn current(&self) -> Arc<Frame> {
        self.current.load_full()
    }

    /// A reader for a render thread.
    pub fn reader(&self) -> FrameReader {
        FrameReader { current: Arc::clone(&self.current), seen: 0 }
    }
}

impl Default for FramePublisher {
    fn default() -> Self {
        Self::new()
    }
}

/// Render side: reads the newest frame. `Send`.
#[derive(Debug, Clone)]
pub struct FrameReader {
    current: Arc<ArcSwap<Frame>>,
    seen: u64,
}

impl FrameReader {
    /// The newest frame, whether or not it was seen before.
    pub fn latest(&self) -> Arc<Frame> {
        self.current.load_full()
    }

    /// The newest frame if it was published since the last call.
    pub fn next_frame(&mut self) -> Option<Arc<Frame>> {
        let frame = self.current.load_full();
        if frame.generation == self.seen {
            return None;
        }
        self.seen = frame.generation;
        Some(frame)
    }
}
