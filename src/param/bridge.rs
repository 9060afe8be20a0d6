//! The attachment bridge: creates attachments and drives both sides.
//!
//! The UI owns the [`AttachmentBridge`]. The audio thread owns an
//! [`AudioProcessor`] obtained from it and calls
//! [`process_block`](AudioProcessor::process_block) once per buffer. The two
//! share only an `arc-swap`ed list of audio entries, which the UI replaces
//! whole when attachments come and go. Replaced lists are kept on the UI side
//! until the audio thread has let go of them, so nothing is freed there.

use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use arc_swap::ArcSwap;

use super::attachment::{Attachment, AudioEntry, UiEntry};
use super::parameter::{AudioParameter, ParameterRegistry};
use super::snapshot::AtomicSnapshot;
use crate::error::{Diagnostic, Diagnostics};

type AudioList = Vec<Arc<dyn AudioEntry>>;

/// Audio-thread handle. Cheap to clone, `Send + Sync`.
#[derive(Clone)]
pub struct AudioProcessor {
    entries: Arc<ArcSwap<AudioList>>,
}

impl AudioProcessor {
    /// Apply UI requests and broadcast parameter changes for every live
    /// attachment, and wind down detached ones. Takes no locks and does not
    /// allocate. Call from one audio thread only.
    ///
    /// The guard held here may become the last reference to a list the UI
    /// has just replaced; the bridge keeps replaced lists alive until that
    /// guard is gone, so the drop never happens on this thread.
    pub fn process_block(&self) {
        let entries = self.entries.load();
        for entry in entries.iter() {
            entry.process();
        }
    }
}

impl fmt::Debug for AudioProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioProcessor").field("entries", &self.entries.load().len()).finish()
    }
}

/// Creates [`Attachment`]s against a registry and delivers their
/// notifications on the UI tick.
pub struct AttachmentBridge {
    registry: Arc<dyn ParameterRegistry>,
    audio: Arc<ArcSwap<AudioList>>,
    /// Lists swapped out of `audio`, dropped once nobody else holds them.
    retired: Vec<Arc<AudioList>>,
    ui: Vec<Rc<dyn UiEntry>>,
    diagnostics: Diagnostics,
}

impl AttachmentBridge {
    pub fn new(registry: Arc<dyn ParameterRegistry>) -> Self {
        Self {
            registry,
            audio: Arc::new(ArcSwap::from_pointee(Vec::new())),
            retired: Vec::new(),
            ui: Vec::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn registry(&self) -> &Arc<dyn ParameterRegistry> {
        &self.registry
    }

    pub fn parameter(&self, id: &str) -> Option<Arc<dyn AudioParameter>> {
        self.registry.lookup(id)
    }

    /// Handle for the audio thread.
    pub fn audio_processor(&self) -> AudioProcessor {
        AudioProcessor { entries: Arc::clone(&self.audio) }
    }

    /// Attach to the parameter `parameter_id`. An unknown id yields an
    /// inert attachment and records a diagnostic.
    pub fn attach<T: AtomicSnapshot>(&mut self, parameter_id: &str) -> Attachment<T> {
        self.attach_inner(parameter_id, None)
    }

    /// As [`attach`](Self::attach), naming the node that asked for the
    /// binding in any diagnostic.
    pub fn attach_for_node<T: AtomicSnapshot>(&mut self, parameter_id: &str, node_id: &str) -> Attachment<T> {
        self.attach_inner(parameter_id, Some(node_id))
    }

    fn attach_inner<T: AtomicSnapshot>(&mut self, parameter_id: &str, node_id: Option<&str>) -> Attachment<T> {
        let param = self.registry.lookup(parameter_id);
        if param.is_none() {
            let mut diagnostic = Diagnostic::unresolved(format!("unknown parameter '{parameter_id}'"));
            if let Some(node_id) = node_id {
                diagnostic = diagnostic.for_node(node_id);
            }
            self.diagnostics.push(diagnostic);
        }

        let (attachment, entries) = Attachment::create(parameter_id, param);
        if let Some(entries) = entries {
            let mut next = AudioList::clone(&self.audio.load());
            next.push(Arc::clone(&entries.audio));
            self.replace_audio_list(next);
            self.ui.push(entries.ui);
        }
        attachment
    }

    /// Deliver at most one notification per attachment carrying its latest
    /// value, then forget detached attachments. Returns the number of
    /// notifications fired.
    pub fn deliver_pending(&mut self) -> usize {
        let mut delivered = 0;
        for entry in &self.ui {
            if entry.deliver() {
                delivered += 1;
            }
        }
        self.prune();
        if delivered > 0 {
            log::trace!("delivered {delivered} parameter notifications");
        }
        delivered
    }

    fn prune(&mut self) {
        self.ui.retain(|entry| entry.is_attached());
        let current = self.audio.load_full();
        if current.iter().any(|entry| entry.is_retired()) {
            let next: AudioList = current.iter().filter(|entry| !entry.is_retired()).cloned().collect();
            self.replace_audio_list(next);
        }
        drop(current);
        // After a swap, arc-swap has turned every outstanding audio-side
        // guard into a strong count, so a count of one means only we hold it.
        self.retired.retain(|list| Arc::strong_count(list) > 1);
    }

    /// Swap in `next`, keeping the old list alive on this side.
    fn replace_audio_list(&mut self, next: AudioList) {
        let previous = self.audio.swap(Arc::new(next));
        self.retired.push(previous);
    }

    /// Detached entries the audio thread has not wound down yet.
    pub fn retiring_count(&self) -> usize {
        self.audio.load().iter().filter(|entry| !entry.is_attached() && !entry.is_retired()).count()
    }

    /// Live (attached, non-inert) attachments.
    pub fn active_count(&self) -> usize {
        self.ui.iter().filter(|entry| entry.is_attached()).count()
    }

    /// Unknown-parameter diagnostics recorded so far.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Diagnostics {
        std::mem::take(&mut self.diagnostics)
    }
}

impl fmt::Debug for AttachmentBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttachmentBridge")
            .field("parameters", &self.registry.ids())
            .field("attachments", &self.ui.len())
            .finish()
    }
}
