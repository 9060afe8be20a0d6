//! The editor: one live GUI instance driven by the host's UI loop.
//!
//! The host calls [`Editor::tick`] at the configured refresh rate. A tick:
//!
//! 1. applies the newest pending reload, if any, by reconciling into a
//!    staged tree and swapping it in whole
//! 2. applies shared settings changes (flags, active palette)
//! 3. delivers parameter changes from the audio side, one per attachment
//! 4. runs due scheduled callbacks
//! 5. resolves styles, lays the tree out and paints it
//! 6. publishes a frame if the display list changed
//!
//! Pointer and key events go through [`Editor::pointer`] and [`Editor::key`]
//! between ticks.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use crate::builder::{Attachments, Builder, ReloadQueue, ReloadRequest, ReloadSender};
use crate::context::{EditorConfig, SharedContext};
use crate::css::cascade::CascadeEnv;
use crate::css::stylesheet::Stylesheet;
use crate::description::state::PersistedState;
use crate::description::NodeDescription;
use crate::dom::tree::Dom;
use crate::error::{Diagnostic, Diagnostics, Result};
use crate::geometry::{Region, Size};
use crate::interaction::{Interaction, Key, PointerEvent, Scene};
use crate::layout::engine::{layout_tree, LayoutMap};
use crate::param::{AttachmentBridge, AudioProcessor};
use crate::reactive::Subscription;
use crate::render::{render_tree, FramePublisher, FrameReader};

/// What one tick did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// A reload request was applied.
    pub reloaded: bool,
    /// Parameter notifications delivered.
    pub delivered: usize,
    /// Scheduled callbacks run.
    pub tasks_run: usize,
    /// Generation of the frame published by this tick.
    pub frame: Option<u64>,
}

/// A live editor.
pub struct Editor {
    config: EditorConfig,
    context: SharedContext,
    sheet: Stylesheet,
    bridge: AttachmentBridge,
    dom: Dom,
    attachments: Attachments,
    layout: LayoutMap,
    env: CascadeEnv,
    diagnostics: Diagnostics,
    reloads: ReloadQueue,
    interaction: Interaction,
    frames: FramePublisher,
    settings_changed: Rc<Cell<bool>>,
    _settings: Subscription,
}

impl Editor {
    /// Create an editor and build `description` right away.
    ///
    /// Fails only if the configured stylesheet does not parse.
    pub fn new(config: EditorConfig, context: SharedContext, description: &NodeDescription) -> Result<Self> {
        let sheet = match &config.stylesheet {
            Some(text) => Stylesheet::parse(text)?,
            None => Stylesheet::new(),
        };
        let settings_changed = Rc::new(Cell::new(false));
        let flag = Rc::clone(&settings_changed);
        let subscription = context.settings().subscribe(move |_| flag.set(true));

        let mut editor = Self {
            env: CascadeEnv::new(config.size),
            bridge: AttachmentBridge::new(context.registry()),
            config,
            context,
            sheet,
            dom: Dom::new(),
            attachments: Attachments::new(),
            layout: LayoutMap::default(),
            diagnostics: Diagnostics::new(),
            reloads: ReloadQueue::new(),
            interaction: Interaction::new(),
            frames: FramePublisher::new(),
            settings_changed,
            _settings: subscription,
        };
        editor.rebuild(description);
        editor.apply_settings();
        log::debug!("editor {:?} created", editor.config.title.as_deref().unwrap_or(""));
        Ok(editor)
    }

    // -- Accessors ------------------------------------------------------------

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn context(&self) -> &SharedContext {
        &self.context
    }

    pub fn dom(&self) -> &Dom {
        &self.dom
    }

    /// Mutable tree access for live edits (classes, states).
    pub fn dom_mut(&mut self) -> &mut Dom {
        &mut self.dom
    }

    pub fn attachments(&self) -> &Attachments {
        &self.attachments
    }

    pub fn layout(&self) -> &LayoutMap {
        &self.layout
    }

    pub fn stylesheet(&self) -> &Stylesheet {
        &self.sheet
    }

    /// Diagnostics of the current tree.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn size(&self) -> Size {
        self.env.media
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    /// The handle the audio thread calls once per block.
    pub fn audio_processor(&self) -> AudioProcessor {
        self.bridge.audio_processor()
    }

    /// A reader for a render thread.
    pub fn frame_reader(&self) -> FrameReader {
        self.frames.reader()
    }

    /// A sender other threads can post reloads with.
    pub fn reload_sender(&self) -> ReloadSender {
        self.reloads.sender()
    }

    // -- Host input -----------------------------------------------------------

    /// Queue a reload for the next tick. A newer request replaces it.
    pub fn request_reload(&self, request: ReloadRequest) {
        self.reloads.request(request);
    }

    /// Change the editor size; media-dependent classes re-evaluate.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.env.media = Size::new(width, height);
    }

    pub fn pointer(&mut self, event: PointerEvent) -> bool {
        let scene = Scene { dom: &mut self.dom, layout: &self.layout, attachments: &self.attachments };
        self.interaction.pointer(scene, event)
    }

    pub fn key(&mut self, key: Key) -> bool {
        let scene = Scene { dom: &mut self.dom, layout: &self.layout, attachments: &self.attachments };
        self.interaction.key(scene, key)
    }

    // -- Tick -------------------------------------------------------------------

    /// Run one UI tick; `elapsed` is the time since the previous one.
    pub fn tick(&mut self, elapsed: Duration) -> TickReport {
        let mut report = TickReport::default();

        if let Some(request) = self.reloads.take() {
            self.apply_reload(&request);
            report.reloaded = true;
        }
        if self.settings_changed.replace(false) {
            self.apply_settings();
        }
        report.delivered = self.bridge.deliver_pending();
        report.tasks_run = self.context.scheduler().advance(elapsed);

        self.relayout();
        let list = render_tree(&self.dom, &self.layout, &self.attachments);
        let current = self.frames.current();
        if current.generation == 0 || current.size != self.env.media || current.list != list {
            report.frame = Some(self.frames.publish(self.env.media, list));
        }
        report
    }

    // -- Persistence ------------------------------------------------------------

    /// The current tree and stylesheet. `None` for an empty tree.
    pub fn save_state(&self) -> Option<PersistedState> {
        PersistedState::capture(&self.dom, &self.sheet)
    }

    pub fn save_json(&self) -> Result<Option<String>> {
        match self.save_state() {
            Some(state) => Ok(Some(state.to_json()?)),
            None => Ok(None),
        }
    }

    /// Load saved state. It is applied on the next tick like any reload.
    pub fn load_state(&self, state: PersistedState) {
        let mut request = ReloadRequest::new(state.description);
        if !state.stylesheet.is_empty() {
            request = request.with_stylesheet(state.stylesheet);
        }
        self.request_reload(request);
    }

    pub fn load_json(&self, text: &str) -> Result<()> {
        self.load_state(PersistedState::from_json(text)?);
        Ok(())
    }

    // -- Internals ----------------------------------------------------------------

    fn rebuild(&mut self, description: &NodeDescription) {
        let previous = std::mem::take(&mut self.attachments);
        let out = Builder::new(&self.sheet, &mut self.bridge).reconcile(&self.dom, previous, description);
        self.dom = out.dom;
        self.attachments = out.attachments;
        self.diagnostics = out.diagnostics;
        self.relayout();
    }

    fn apply_reload(&mut self, request: &ReloadRequest) {
        let mut sheet_error = None;
        if let Some(text) = &request.stylesheet {
            match Stylesheet::parse(text) {
                Ok(sheet) => self.sheet = sheet,
                Err(err) => sheet_error = Some(err),
            }
        }
        self.rebuild(&request.description);
        self.apply_palette();
        if let Some(err) = sheet_error {
            self.diagnostics.push(Diagnostic::malformed(format!("stylesheet kept, new one failed: {err}")));
        }
        log::debug!("reload applied, {} nodes", self.dom.len());
    }

    fn apply_settings(&mut self) {
        self.env.flags = self.context.settings().with(|s| s.flags.clone());
        self.apply_palette();
    }

    fn apply_palette(&mut self) {
        let wanted = self
            .context
            .settings()
            .with(|s| s.palette.clone())
            .or_else(|| self.config.palette.clone());
        let Some(name) = wanted else {
            return;
        };
        if self.sheet.active_palette() != Some(name.as_str()) && !self.sheet.set_active_palette(&name) {
            self.diagnostics.push(Diagnostic::unresolved(format!("unknown palette '{name}'")));
        }
    }

    fn relayout(&mut self) {
        self.layout = match self.dom.root() {
            Some(root) => {
                let bounds = Region::new(0.0, 0.0, self.env.media.width, self.env.media.height);
                layout_tree(&mut self.dom, &self.sheet, &self.env, root, bounds)
            }
            None => LayoutMap::default(),
        };
        self.interaction.sync(&self.dom, &self.layout, &self.attachments);
    }
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("title", &self.config.title)
            .field("nodes", &self.dom.len())
            .field("attachments", &self.attachments.len())
            .field("diagnostics", &self.diagnostics.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::NodeAttachment;
    use crate::error::DiagnosticKind;
    use crate::geometry::Point;
    use crate::param::{AudioParameter, ParameterMap, SimpleParameter};
    use std::sync::Arc;

    const TICK: Duration = Duration::from_millis(33);

    fn context() -> (Arc<SimpleParameter>, SharedContext) {
        let gain = Arc::new(SimpleParameter::new("gain", 0.5));
        let mut map = ParameterMap::new();
        map.insert(gain.clone());
        (gain, SharedContext::new(Arc::new(map)))
    }

    fn panel(children: &[&str]) -> NodeDescription {
        children.iter().fold(NodeDescription::new("View").with_id("root"), |desc, id| {
            desc.with_child(NodeDescription::new("Slider").with_id(*id).with_parameter("gain"))
        })
    }

    fn editor(css: &str, desc: &NodeDescription) -> (Arc<SimpleParameter>, Editor) {
        let (gain, context) = context();
        let config = EditorConfig::new().with_stylesheet(css).with_size(300.0, 200.0);
        (gain, Editor::new(config, context, desc).unwrap())
    }

    // ── Construction ─────────────────────────────────────────────────

    #[test]
    fn builds_on_creation() {
        let (_, editor) = editor("", &panel(&["a", "b"]));
        assert_eq!(editor.dom().len(), 3);
        assert_eq!(editor.attachments().len(), 2);
        assert!(!editor.layout().is_empty());
        assert!(editor.diagnostics().is_empty());
    }

    #[test]
    fn bad_stylesheet_fails_creation() {
        let (_, context) = context();
        let config = EditorConfig::new().with_stylesheet("@bogus { }");
        assert!(Editor::new(config, context, &panel(&[])).is_err());
    }

    // ── Tick ─────────────────────────────────────────────────────────

    #[test]
    fn frames_only_when_something_changed() {
        let (_, mut editor) = editor("", &panel(&["a"]));
        let mut reader = editor.frame_reader();
        assert_eq!(editor.tick(TICK).frame, Some(1));
        assert!(reader.next_frame().is_some());
        assert_eq!(editor.tick(TICK).frame, None);
        assert!(reader.next_frame().is_none());
        editor.resize(400.0, 200.0);
        assert_eq!(editor.tick(TICK).frame, Some(2));
    }

    #[test]
    fn audio_changes_reach_the_next_frame() {
        let (gain, mut editor) = editor("", &panel(&["a"]));
        editor.tick(TICK);
        let audio = editor.audio_processor();
        gain.set_value(0.1);
        gain.set_value(0.9);
        audio.process_block();
        let report = editor.tick(TICK);
        assert_eq!(report.delivered, 1);
        assert!(report.frame.is_some());
        match editor.attachments().get("a") {
            Some(NodeAttachment::Value(a)) => assert_eq!(a.value(), 0.9),
            other => panic!("unexpected attachment {other:?}"),
        }
    }

    #[test]
    fn reloads_apply_on_the_next_tick_newest_first() {
        let (_, mut editor) = editor("", &panel(&["a"]));
        let before = editor.dom().find_by_id("a").unwrap();
        let sender = editor.reload_sender();
        sender.request(ReloadRequest::new(panel(&["a", "b"])));
        sender.request(ReloadRequest::new(panel(&["a", "c"])));
        assert!(editor.dom().find_by_id("c").is_none());

        let report = editor.tick(TICK);
        assert!(report.reloaded);
        assert_eq!(editor.dom().find_by_id("a"), Some(before));
        assert!(editor.dom().find_by_id("b").is_none());
        assert!(editor.dom().find_by_id("c").is_some());
        assert!(!editor.tick(TICK).reloaded);
    }

    #[test]
    fn reload_removing_a_dragged_slider_closes_the_gesture() {
        let (gain, mut editor) = editor("", &panel(&["a"]));
        editor.tick(TICK);
        let audio = editor.audio_processor();
        let a = editor.dom().find_by_id("a").unwrap();
        let centre = editor.layout().get(a).unwrap().client().centre();

        editor.pointer(PointerEvent::Down(centre));
        editor.pointer(PointerEvent::Move(Point::new(centre.x, centre.y - 20.0)));
        audio.process_block();
        assert!(gain.in_gesture());

        editor.request_reload(ReloadRequest::new(panel(&[])));
        editor.tick(TICK);
        assert!(!editor.interaction().is_dragging());
        editor.pointer(PointerEvent::Up(centre));
        audio.process_block();

        assert_eq!(gain.gesture_counts(), (1, 1));
        assert!(!gain.in_gesture());
    }

    #[test]
    fn unparsable_stylesheet_reload_keeps_the_old_sheet() {
        let (_, mut editor) = editor("Slider { size: 3; }", &panel(&["a"]));
        editor.request_reload(ReloadRequest::new(panel(&["a"])).with_stylesheet("@bogus { }"));
        editor.tick(TICK);
        let a = editor.dom().find_by_id("a").unwrap();
        assert_eq!(editor.dom().cached_style(a).and_then(|s| s.number("size")), Some(3.0));
        assert_eq!(editor.diagnostics().of_kind(DiagnosticKind::MalformedDescription).count(), 1);
    }

    #[test]
    fn shared_flags_switch_active_classes() {
        let desc = NodeDescription::new("View")
            .with_id("root")
            .with_child(NodeDescription::new("Slider").with_id("a").with_class("lit"));
        let (_, mut editor) = editor(".lit { active: power; size: 9; }", &desc);
        editor.tick(TICK);
        let a = editor.dom().find_by_id("a").unwrap();
        assert_eq!(editor.dom().cached_style(a).and_then(|s| s.number("size")), None);

        editor.context().set_flag("power", true);
        editor.tick(TICK);
        assert_eq!(editor.dom().cached_style(a).and_then(|s| s.number("size")), Some(9.0));
    }

    #[test]
    fn unknown_palette_is_reported() {
        let (_, context) = context();
        context.set_palette("nope");
        let config = EditorConfig::new().with_stylesheet("@palette dark { accent: #000000; }");
        let mut editor = Editor::new(config, context, &panel(&[])).unwrap();
        assert_eq!(editor.diagnostics().of_kind(DiagnosticKind::UnresolvableReference).count(), 1);
        editor.tick(TICK);
        assert_eq!(editor.diagnostics().of_kind(DiagnosticKind::UnresolvableReference).count(), 1);
        assert_eq!(editor.stylesheet().active_palette(), Some("dark"));
    }

    // ── Persistence ──────────────────────────────────────────────────

    #[test]
    fn save_and_load_round_trip() {
        let (_, mut first) = editor(".knob { size: 4; }", &panel(&["a", "b"]));
        first.tick(TICK);
        let json = first.save_json().unwrap().unwrap();

        let (_, mut second) = editor("", &NodeDescription::new("View").with_id("other"));
        second.load_json(&json).unwrap();
        second.tick(TICK);
        assert_eq!(second.save_state(), first.save_state());
        assert_eq!(second.attachments().len(), 2);
    }
}
