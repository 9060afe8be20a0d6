//! One binding between an audio parameter and a UI-observable value.
//!
//! The state both threads touch lives in [`Shared`]: an atomic snapshot of
//! the last broadcast value plus a pending flag (audio to UI), an atomic
//! requested value plus its own flag (UI to audio), and gesture counters.
//! Only the audio thread writes the snapshot; parameter listeners merely
//! mark it dirty. The UI side swaps the pending flag and publishes the
//! snapshot. Many audio-side stores between two UI passes collapse into one
//! notification with the newest value.

use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

use atomic_float::AtomicF32;

use super::parameter::{AudioParameter, ListenerToken, ParameterListener};
use super::snapshot::AtomicSnapshot;
use crate::reactive::{Observable, Subscription};

/// Token value meaning "no listener registered".
const NO_TOKEN: u64 = 0;

/// Audio-thread view of an attachment.
pub(crate) trait AudioEntry: Send + Sync {
    /// Run once per processed audio block. Never blocks or allocates.
    fn process(&self);
    fn is_attached(&self) -> bool;
    /// Detached and wound down by the audio thread; safe to drop.
    fn is_retired(&self) -> bool;
}

/// UI-thread view of an attachment.
pub(crate) trait UiEntry {
    /// Deliver a pending notification, if any. Returns `true` if one fired.
    fn deliver(&self) -> bool;
    fn is_attached(&self) -> bool;
}

// ---------------------------------------------------------------------------
// Shared
// ---------------------------------------------------------------------------

pub(crate) struct Shared<T: AtomicSnapshot> {
    parameter_id: String,
    param: Option<Arc<dyn AudioParameter>>,
    steps: usize,
    snapshot: T::Cell,
    /// Normalized value stored with the snapshot. Audio thread only.
    last_broadcast: AtomicF32,
    pending: AtomicBool,
    /// Set by parameter listeners on any thread; consumed by `process`.
    dirty: AtomicBool,
    attached: AtomicBool,
    retired: AtomicBool,
    requested: AtomicF32,
    request_pending: AtomicBool,
    gestures_begun: AtomicU32,
    gestures_ended: AtomicU32,
    /// Gestures forwarded to the parameter and not yet ended. Audio thread only.
    open_gestures: AtomicU32,
    token: AtomicU64,
}

impl<T: AtomicSnapshot> Shared<T> {
    fn new(parameter_id: &str, param: Option<Arc<dyn AudioParameter>>) -> Self {
        let steps = param.as_ref().map_or(0, |p| p.choices().len());
        let normalized = param.as_ref().map_or(0.0, |p| p.current_value());
        let initial = match param {
            Some(_) => T::from_normalized(normalized, steps),
            None => T::default(),
        };
        Self {
            parameter_id: parameter_id.to_owned(),
            attached: AtomicBool::new(param.is_some()),
            retired: AtomicBool::new(param.is_none()),
            // The value may move before the listener is registered.
            dirty: AtomicBool::new(param.is_some()),
            param,
            steps,
            snapshot: T::new_cell(initial),
            last_broadcast: AtomicF32::new(normalized),
            pending: AtomicBool::new(false),
            requested: AtomicF32::new(normalized),
            request_pending: AtomicBool::new(false),
            gestures_begun: AtomicU32::new(0),
            gestures_ended: AtomicU32::new(0),
            open_gestures: AtomicU32::new(0),
            token: AtomicU64::new(NO_TOKEN),
        }
    }

    /// Store `current` as the newest value if it differs from the stored one.
    fn broadcast(&self, current: f32) {
        if current == self.last_broadcast.load(Ordering::Relaxed) {
            return;
        }
        self.last_broadcast.store(current, Ordering::Relaxed);
        T::store(&self.snapshot, T::from_normalized(current, self.steps));
        // Release: the snapshot store above is visible to whoever swaps
        // the flag with Acquire.
        self.pending.store(true, Ordering::Release);
    }

    /// UI side of detaching. Gestures already forwarded stay open until the
    /// audio thread retires the entry.
    fn detach(&self) {
        if !self.attached.swap(false, Ordering::AcqRel) {
            return;
        }
        self.pending.store(false, Ordering::Release);
        self.request_pending.store(false, Ordering::Release);
        let token = self.token.swap(NO_TOKEN, Ordering::AcqRel);
        if let (Some(param), true) = (&self.param, token != NO_TOKEN) {
            param.remove_listener(ListenerToken(token));
        }
    }

    /// Audio side of detaching: drop unforwarded gestures and end every
    /// open one, so the host never stays inside an edit.
    fn retire(&self, param: &dyn AudioParameter) {
        if self.retired.load(Ordering::Acquire) {
            return;
        }
        self.gestures_begun.store(0, Ordering::Release);
        self.gestures_ended.store(0, Ordering::Release);
        for _ in 0..self.open_gestures.swap(0, Ordering::AcqRel) {
            param.end_gesture();
        }
        self.retired.store(true, Ordering::Release);
    }
}

impl<T: AtomicSnapshot> ParameterListener for Shared<T> {
    fn parameter_changed(&self, _id: &str, _normalized: f32) {
        if self.attached.load(Ordering::Acquire) {
            self.dirty.store(true, Ordering::Release);
        }
    }
}

impl<T: AtomicSnapshot> AudioEntry for Shared<T> {
    fn process(&self) {
        let Some(param) = &self.param else { return };
        if !self.attached.load(Ordering::Acquire) {
            self.retire(param.as_ref());
            return;
        }

        // Begin, set, end: a drag that starts and finishes within one
        // block still reaches the host as a bracketed edit.
        let begun = self.gestures_begun.swap(0, Ordering::AcqRel);
        for _ in 0..begun {
            param.begin_gesture();
        }
        let mut open = self.open_gestures.load(Ordering::Acquire) + begun;
        if self.request_pending.swap(false, Ordering::AcqRel) {
            param.set_value(self.requested.load(Ordering::Acquire));
        }
        let ended = self.gestures_ended.swap(0, Ordering::AcqRel);
        for _ in 0..ended {
            param.end_gesture();
        }
        open = open.saturating_sub(ended);
        self.open_gestures.store(open, Ordering::Release);

        // Read the value after consuming the flag: a later change sets it
        // again and is picked up on the next block.
        if self.dirty.swap(false, Ordering::AcqRel) {
            self.broadcast(param.current_value());
        }
    }

    fn is_attached(&self) -> bool {
        self.attached.load(Ordering::Acquire)
    }

    fn is_retired(&self) -> bool {
        self.retired.load(Ordering::Acquire)
    }
}

// ---------------------------------------------------------------------------
// UI side
// ---------------------------------------------------------------------------

pub(crate) struct UiSide<T: AtomicSnapshot> {
    shared: Arc<Shared<T>>,
    observable: Observable<T>,
}

impl<T: AtomicSnapshot> UiEntry for UiSide<T> {
    fn deliver(&self) -> bool {
        if !self.shared.pending.swap(false, Ordering::AcqRel) {
            return false;
        }
        // A notification that raced with detach is dropped here.
        if !self.shared.attached.load(Ordering::Acquire) {
            return false;
        }
        self.observable.publish(T::load(&self.shared.snapshot));
        true
    }

    fn is_attached(&self) -> bool {
        self.shared.attached.load(Ordering::Acquire)
    }
}

/// The entries the bridge keeps for a freshly created attachment.
pub(crate) struct Entries {
    pub audio: Arc<dyn AudioEntry>,
    pub ui: Rc<dyn UiEntry>,
}

// ---------------------------------------------------------------------------
// Attachment
// ---------------------------------------------------------------------------

/// UI handle of one parameter binding.
///
/// Reads and subscriptions see values delivered by
/// [`AttachmentBridge::deliver_pending`](super::AttachmentBridge::deliver_pending).
/// Dropping the handle detaches it.
pub struct Attachment<T: AtomicSnapshot> {
    ui: Rc<UiSide<T>>,
}

impl<T: AtomicSnapshot> Attachment<T> {
    /// Create a live attachment to `param`, or an inert one when `param` is
    /// `None`. Live attachments also return the entries the bridge drives.
    pub(crate) fn create(parameter_id: &str, param: Option<Arc<dyn AudioParameter>>) -> (Self, Option<Entries>) {
        let shared = Arc::new(Shared::<T>::new(parameter_id, param));
        let observable = Observable::new(T::load(&shared.snapshot));
        let ui = Rc::new(UiSide { shared: Arc::clone(&shared), observable });

        let Some(param) = shared.param.clone() else {
            return (Self { ui }, None);
        };
        let listener: Arc<dyn ParameterListener> = shared.clone();
        let token = param.add_listener(listener);
        shared.token.store(token.0, Ordering::Release);

        let entries = Entries {
            audio: shared,
            ui: ui.clone(),
        };
        (Self { ui }, Some(entries))
    }

    /// An attachment bound to nothing: reads return `T::default()`, requests
    /// are dropped and no notification ever fires.
    pub fn inert(parameter_id: &str) -> Self {
        Self::create(parameter_id, None).0
    }

    pub fn parameter_id(&self) -> &str {
        &self.ui.shared.parameter_id
    }

    /// The value last delivered to (or requested by) the UI.
    pub fn value(&self) -> T {
        self.ui.observable.get()
    }

    /// The newest value broadcast by the audio side, delivered or not.
    pub fn latest(&self) -> T {
        T::load(&self.ui.shared.snapshot)
    }

    /// Ask the audio side to set the parameter to `value` on its next block.
    /// The UI value follows immediately. Dropped when inert or detached.
    pub fn request(&self, value: T) {
        let shared = &self.ui.shared;
        if shared.param.is_none() || !shared.attached.load(Ordering::Acquire) {
            return;
        }
        shared.requested.store(value.to_normalized(shared.steps), Ordering::Release);
        shared.request_pending.store(true, Ordering::Release);
        self.ui.observable.set(value);
    }

    pub fn begin_gesture(&self) {
        if self.is_live() {
            self.ui.shared.gestures_begun.fetch_add(1, Ordering::AcqRel);
        }
    }

    pub fn end_gesture(&self) {
        if self.is_live() {
            self.ui.shared.gestures_ended.fetch_add(1, Ordering::AcqRel);
        }
    }

    /// Stop both directions. No notification is delivered afterwards, even
    /// one that was already pending. Idempotent.
    pub fn detach(&self) {
        self.ui.shared.detach();
    }

    /// Whether the parameter id was unknown when attaching.
    pub fn is_inert(&self) -> bool {
        self.ui.shared.param.is_none()
    }

    pub fn is_attached(&self) -> bool {
        self.ui.shared.attached.load(Ordering::Acquire)
    }

    /// Call `callback` with every delivered value until the handle drops.
    pub fn on_change(&self, callback: impl FnMut(&T) + 'static) -> Subscription {
        self.ui.observable.subscribe(callback)
    }

    /// Display text of the current value, from the parameter.
    pub fn display_text(&self) -> String {
        let shared = &self.ui.shared;
        match &shared.param {
            Some(param) => param.display_text(self.value().to_normalized(shared.steps)),
            None => String::new(),
        }
    }

    /// Choice names of a discrete parameter.
    pub fn choices(&self) -> Vec<String> {
        self.ui.shared.param.as_ref().map(|p| p.choices().to_vec()).unwrap_or_default()
    }

    /// Number of discrete steps (0 for continuous parameters).
    pub fn steps(&self) -> usize {
        self.ui.shared.steps
    }

    fn is_live(&self) -> bool {
        !self.is_inert() && self.is_attached()
    }
}

impl<T: AtomicSnapshot> Drop for Attachment<T> {
    fn drop(&mut self) {
        self.detach();
    }
}

impl<T: AtomicSnapshot> fmt::Debug for Attachment<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("parameter_id", &self.parameter_id())
            .field("value", &self.value())
            .field("inert", &self.is_inert())
            .field("attached", &self.is_attached())
            .finish()
    }
}
