//! The host-side parameter abstraction the bridge attaches to.
//!
//! A plugin exposes its parameters through a [`ParameterRegistry`]. Each
//! [`AudioParameter`] is shared between the audio thread and the UI, so all
//! of its methods take `&self` and must be safe to call from either side.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;
use atomic_float::AtomicF32;

/// Identifies one listener registration on a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerToken(pub u64);

/// Receives parameter changes. May be called from any thread.
pub trait ParameterListener: Send + Sync {
    fn parameter_changed(&self, id: &str, normalized: f32);
}

/// A plugin parameter with a normalized `0..=1` value.
pub trait AudioParameter: Send + Sync {
    fn id(&self) -> &str;

    /// Human-readable name; the id by default.
    fn name(&self) -> &str {
        self.id()
    }

    /// Current normalized value.
    fn current_value(&self) -> f32;

    fn default_value(&self) -> f32 {
        0.0
    }

    /// Set the normalized value and notify listeners.
    fn set_value(&self, normalized: f32);

    fn begin_gesture(&self);
    fn end_gesture(&self);

    /// Choice names of a discrete parameter; empty for continuous ones.
    fn choices(&self) -> &[String] {
        &[]
    }

    /// Display text for a normalized value.
    fn display_text(&self, normalized: f32) -> String {
        let choices = self.choices();
        if choices.len() > 1 {
            let index = (normalized.clamp(0.0, 1.0) * (choices.len() - 1) as f32).round() as usize;
            return choices[index.min(choices.len() - 1)].clone();
        }
        format!("{normalized:.2}")
    }

    fn add_listener(&self, listener: Arc<dyn ParameterListener>) -> ListenerToken;
    fn remove_listener(&self, token: ListenerToken);
}

impl fmt::Debug for dyn AudioParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioParameter")
            .field("id", &self.id())
            .field("value", &self.current_value())
            .finish()
    }
}

/// Looks parameters up by id.
pub trait ParameterRegistry: Send + Sync {
    fn lookup(&self, id: &str) -> Option<Arc<dyn AudioParameter>>;

    /// Every parameter id, sorted.
    fn ids(&self) -> Vec<String>;
}

type ListenerList = Vec<(ListenerToken, Arc<dyn ParameterListener>)>;

/// An in-memory [`AudioParameter`] backed by atomics.
///
/// The listener list is swapped as a whole on add and remove, so
/// [`set_value`](AudioParameter::set_value) reads it without locking.
pub struct SimpleParameter {
    id: String,
    name: String,
    default: f32,
    value: AtomicF32,
    choices: Vec<String>,
    listeners: ArcSwap<ListenerList>,
    next_token: AtomicU64,
    gestures_begun: AtomicU32,
    gestures_ended: AtomicU32,
}

impl SimpleParameter {
    pub fn new(id: impl Into<String>, default: f32) -> Self {
        let id = id.into();
        let default = default.clamp(0.0, 1.0);
        Self {
            name: id.clone(),
            id,
            default,
            value: AtomicF32::new(default),
            choices: Vec::new(),
            listeners: ArcSwap::from_pointee(Vec::new()),
            next_token: AtomicU64::new(1),
            gestures_begun: AtomicU32::new(0),
            gestures_ended: AtomicU32::new(0),
        }
    }

    /// Set the display name (builder).
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Make this a discrete parameter with the given choices (builder).
    pub fn with_choices(mut self, choices: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.choices = choices.into_iter().map(Into::into).collect();
        self
    }

    /// Gestures begun and ended so far.
    pub fn gesture_counts(&self) -> (u32, u32) {
        (
            self.gestures_begun.load(Ordering::Acquire),
            self.gestures_ended.load(Ordering::Acquire),
        )
    }

    /// Whether a gesture is open.
    pub fn in_gesture(&self) -> bool {
        let (begun, ended) = self.gesture_counts();
        begun > ended
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.load().len()
    }
}

impl fmt::Debug for SimpleParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleParameter")
            .field("id", &self.id)
            .field("value", &self.value.load(Ordering::Relaxed))
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl AudioParameter for SimpleParameter {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn current_value(&self) -> f32 {
        self.value.load(Ordering::Acquire)
    }

    fn default_value(&self) -> f32 {
        self.default
    }

    fn set_value(&self, normalized: f32) {
        let normalized = normalized.clamp(0.0, 1.0);
        self.value.store(normalized, Ordering::Release);
        for (_, listener) in self.listeners.load().iter() {
            listener.parameter_changed(&self.id, normalized);
        }
    }

    fn begin_gesture(&self) {
        self.gestures_begun.fetch_add(1, Ordering::AcqRel);
    }

    fn end_gesture(&self) {
        self.gestures_ended.fetch_add(1, Ordering::AcqRel);
    }

    fn choices(&self) -> &[String] {
        &self.choices
    }

    fn add_listener(&self, listener: Arc<dyn ParameterListener>) -> ListenerToken {
        let token = ListenerToken(self.next_token.fetch_add(1, Ordering::Relaxed));
        self.listeners.rcu(|current| {
            let mut next = ListenerList::clone(current);
            next.push((token, Arc::clone(&listener)));
            next
        });
        token
    }

    fn remove_listener(&self, token: ListenerToken) {
        self.listeners.rcu(|current| {
            let mut next = ListenerList::clone(current);
            next.retain(|(t, _)| *t != token);
            next
        });
    }
}

/// A [`ParameterRegistry`] over a fixed map of parameters.
#[derive(Default)]
pub struct ParameterMap {
    params: BTreeMap<String, Arc<dyn AudioParameter>>,
}

impl ParameterMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a parameter under its own id, replacing any previous one.
    pub fn insert(&mut self, param: Arc<dyn AudioParameter>) {
        self.params.insert(param.id().to_owned(), param);
    }

    /// Register a parameter (builder).
    pub fn with(mut self, param: impl AudioParameter + 'static) -> Self {
        self.insert(Arc::new(param));
        self
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl fmt::Debug for ParameterMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.params.keys()).finish()
    }
}

impl ParameterRegistry for ParameterMap {
    fn lookup(&self, id: &str) -> Option<Arc<dyn AudioParameter>> {
        self.params.get(id).cloned()
    }

    fn ids(&self) -> Vec<String> {
        self.params.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<(String, f32)>>);

    impl ParameterListener for Recorder {
        fn parameter_changed(&self, id: &str, normalized: f32) {
            self.0.lock().unwrap().push((id.to_owned(), normalized));
        }
    }

    #[test]
    fn set_value_clamps_and_notifies() {
        let param = SimpleParameter::new("gain", 0.5);
        let recorder = Arc::new(Recorder::default());
        let token = param.add_listener(recorder.clone());

        param.set_value(1.5);
        assert_eq!(param.current_value(), 1.0);

        param.remove_listener(token);
        param.set_value(0.2);
        assert_eq!(param.current_value(), 0.2);
        assert_eq!(*recorder.0.lock().unwrap(), vec![("gain".to_owned(), 1.0)]);
        assert_eq!(param.listener_count(), 0);
    }

    #[test]
    fn gestures_are_counted() {
        let param = SimpleParameter::new("gain", 0.0);
        param.begin_gesture();
        assert!(param.in_gesture());
        param.end_gesture();
        assert!(!param.in_gesture());
        assert_eq!(param.gesture_counts(), (1, 1));
    }

    #[test]
    fn display_text_uses_choices() {
        let mode = SimpleParameter::new("mode", 0.0).with_choices(["Off", "Low", "High"]);
        assert_eq!(mode.display_text(0.5), "Low");
        assert_eq!(mode.display_text(1.0), "High");
        let gain = SimpleParameter::new("gain", 0.0);
        assert_eq!(gain.display_text(0.25), "0.25");
    }

    #[test]
    fn registry_lookup() {
        let map = ParameterMap::new()
            .with(SimpleParameter::new("gain", 0.5))
            .with(SimpleParameter::new("attack", 0.1));
        assert_eq!(map.ids(), vec!["attack", "gain"]);
        assert_eq!(map.lookup("gain").map(|p| p.current_value()), Some(0.5));
        assert!(map.lookup("nope").is_none());
    }
}
