//! Pointer and keyboard interaction.
//!
//! [`Interaction`] turns pointer and key events into interaction states on
//! the tree (`hover`, `pressed`, `focus`) and into parameter edits through
//! the nodes' attachments. Every edit is bracketed by a gesture: a drag holds
//! one gesture from press to release, single-step edits (toggle, choice
//! step, key nudge) open and close one around the request.
//!
//! [`FocusChain`] keeps the tab order of interactive nodes.

use crate::builder::{Attachments, NodeAttachment};
use crate::css::cascade::ResolvedStyle;
use crate::dom::node::{InteractionState, NodeId};
use crate::dom::tree::Dom;
use crate::geometry::{Point, Region};
use crate::layout::engine::LayoutMap;
use crate::layout::spatial::SpatialMap;
use crate::param::{AtomicSnapshot, Attachment};
use crate::render::paint::SliderShape;

/// Normalised change of one arrow key press.
pub const KEY_STEP: f32 = 0.01;
/// Vertical drag distance that sweeps a rotary slider over its full range.
pub const ROTARY_DRAG_PIXELS: f32 = 200.0;

// ---------------------------------------------------------------------------
// FocusChain
// ---------------------------------------------------------------------------

/// Ordered list of focusable nodes for tab navigation.
///
/// Rebuilt from the tree after every build or layout change. Focus wraps in
/// both directions.
#[derive(Debug, Default)]
pub struct FocusChain {
    /// Focusable nodes in tab order (depth-first).
    nodes: Vec<NodeId>,
    current: Option<usize>,
}

impl FocusChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect interactive, enabled, laid-out nodes in depth-first order.
    /// The focused node keeps focus if it is still in the chain.
    pub fn rebuild(&mut self, dom: &Dom, layout: &LayoutMap) {
        let old_focused = self.current_node();
        self.nodes.clear();
        self.current = None;

        let Some(root) = dom.root() else {
            return;
        };
        for id in dom.walk_depth_first(root) {
            let Some(data) = dom.get(id) else {
                continue;
            };
            let shown = layout.get(id).is_some_and(|l| !l.decoration.frame.is_empty());
            if data.node_type.is_interactive() && shown && !data.states.contains(InteractionState::Disabled) {
                self.nodes.push(id);
            }
        }

        if let Some(old) = old_focused {
            self.current = self.nodes.iter().position(|&n| n == old);
        }
    }

    pub fn current_node(&self) -> Option<NodeId> {
        self.current.and_then(|idx| self.nodes.get(idx).copied())
    }

    /// Focus the next node, wrapping around.
    pub fn focus_next(&mut self) -> Option<NodeId> {
        if self.nodes.is_empty() {
            return None;
        }
        let next = match self.current {
            Some(idx) => (idx + 1) % self.nodes.len(),
            None => 0,
        };
        self.current = Some(next);
        self.nodes.get(next).copied()
    }

    /// Focus the previous node, wrapping around.
    pub fn focus_previous(&mut self) -> Option<NodeId> {
        if self.nodes.is_empty() {
            return None;
        }
        let prev = match self.current {
            Some(0) | None => self.nodes.len() - 1,
            Some(idx) => idx - 1,
        };
        self.current = Some(prev);
        self.nodes.get(prev).copied()
    }

    /// Focus `id`. `false` if it is not in the chain.
    pub fn focus_node(&mut self, id: NodeId) -> bool {
        match self.nodes.iter().position(|&n| n == id) {
            Some(pos) => {
                self.current = Some(pos);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// A pointer event in editor coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// Movement; drags the pressed control while a button is down.
    Move(Point),
    Down(Point),
    Up(Point),
    /// The pointer left the editor.
    Leave,
}

/// A navigation or editing key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Tab,
    BackTab,
    Up,
    Down,
    Left,
    Right,
    /// Space or Enter.
    Activate,
}

#[derive(Debug, Clone, Copy)]
enum DragMode {
    /// Relative drag; `extent` pixels sweep the full range.
    Slider { start: f32, extent: f32, vertical: bool },
    Xy { client: Region },
    /// Pressed but nothing to drag (buttons).
    Press,
}

#[derive(Debug, Clone, Copy)]
struct Drag {
    node: NodeId,
    origin: Point,
    mode: DragMode,
}

/// The borrowed state of a built, laid-out editor that events act on.
pub struct Scene<'a> {
    pub dom: &'a mut Dom,
    pub layout: &'a LayoutMap,
    pub attachments: &'a Attachments,
}

// ---------------------------------------------------------------------------
// Interaction
// ---------------------------------------------------------------------------

/// Tracks hover, press and focus across events.
#[derive(Debug, Default)]
pub struct Interaction {
    focus: FocusChain,
    hovered: Option<NodeId>,
    drag: Option<Drag>,
}

impl Interaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hovered(&self) -> Option<NodeId> {
        self.hovered
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focus.current_node()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn focus_chain(&self) -> &FocusChain {
        &self.focus
    }

    /// Refresh the focus chain after the tree or its layout changed, and
    /// forget nodes that no longer exist.
    ///
    /// A drag on a node that became hidden or disabled ends its gesture
    /// here. A removed node's attachment was detached with it, and the
    /// audio side closes the gesture.
    pub fn sync(&mut self, dom: &Dom, layout: &LayoutMap, attachments: &Attachments) {
        self.focus.rebuild(dom, layout);
        if self.hovered.is_some_and(|h| !dom.contains(h)) {
            self.hovered = None;
        }
        let Some(drag) = self.drag else {
            return;
        };
        match dom.get(drag.node) {
            None => self.drag = None,
            Some(data) => {
                let shown = layout.get(drag.node).is_some_and(|l| !l.decoration.frame.is_empty());
                if !shown || data.states.contains(InteractionState::Disabled) {
                    if let Some(attachment) = attachments.get(&data.id) {
                        end_gesture(attachment);
                    }
                    self.drag = None;
                }
            }
        }
    }

    /// Handle a pointer event. Returns `true` if a state or value changed.
    pub fn pointer(&mut self, scene: Scene<'_>, event: PointerEvent) -> bool {
        match event {
            PointerEvent::Move(point) => {
                let mut changed = self.update_hover(scene.dom, scene.layout, Some(point));
                if let Some(drag) = self.drag {
                    changed |= drag_to(&drag, point, scene.attachments, scene.dom);
                }
                changed
            }
            PointerEvent::Down(point) => self.press(scene, point),
            PointerEvent::Up(point) => self.release(scene, point),
            PointerEvent::Leave => self.update_hover(scene.dom, scene.layout, None),
        }
    }

    /// Handle a key. Returns `true` if a state or value changed.
    pub fn key(&mut self, scene: Scene<'_>, key: Key) -> bool {
        match key {
            Key::Tab | Key::BackTab => {
                let old = self.focus.current_node();
                let new = if key == Key::Tab { self.focus.focus_next() } else { self.focus.focus_previous() };
                move_state(scene.dom, InteractionState::Focus, old, new)
            }
            _ => {
                let Some(node) = self.focus.current_node() else {
                    return false;
                };
                let Some(data) = scene.dom.get(node) else {
                    return false;
                };
                match scene.attachments.get(&data.id) {
                    Some(attachment) => key_edit(attachment, key),
                    None => false,
                }
            }
        }
    }

    fn update_hover(&mut self, dom: &mut Dom, layout: &LayoutMap, point: Option<Point>) -> bool {
        let target = point.and_then(|p| SpatialMap::from_layout(layout).node_at(p));
        if target == self.hovered {
            return false;
        }
        let old = std::mem::replace(&mut self.hovered, target);
        move_state(dom, InteractionState::Hover, old, target)
    }

    fn press(&mut self, scene: Scene<'_>, point: Point) -> bool {
        let spatial = SpatialMap::from_layout(scene.layout);
        let dom = &*scene.dom;
        let target = spatial.node_at_where(point, |id| {
            dom.get(id).is_some_and(|d| {
                d.node_type.is_interactive() && !d.states.contains(InteractionState::Disabled)
            })
        });
        let Some(node) = target else {
            return select_tab(scene.dom, scene.layout, point);
        };

        let old_focus = self.focus.current_node();
        let mut changed = false;
        if self.focus.focus_node(node) {
            changed |= move_state(scene.dom, InteractionState::Focus, old_focus, Some(node));
        }
        changed |= scene.dom.set_state(node, InteractionState::Pressed, true);

        let Some(data) = scene.dom.get(node) else {
            return changed;
        };
        let client = scene.layout.get(node).map(|l| l.client()).unwrap_or_default();
        let fallback = ResolvedStyle::default();
        let style = scene.dom.cached_style(node).unwrap_or(&fallback);

        let mode = match scene.attachments.get(&data.id) {
            Some(NodeAttachment::Value(a)) => {
                a.begin_gesture();
                let (extent, vertical) = match SliderShape::of(style, client) {
                    SliderShape::Horizontal => (client.width, false),
                    SliderShape::Vertical => (client.height, true),
                    SliderShape::Rotary => (ROTARY_DRAG_PIXELS, true),
                };
                DragMode::Slider { start: a.value(), extent, vertical }
            }
            Some(NodeAttachment::Choice(a)) => {
                changed |= step_choice(a, 1);
                DragMode::Press
            }
            Some(NodeAttachment::Xy { x, y }) => {
                x.begin_gesture();
                y.begin_gesture();
                let (nx, ny) = xy_position(client, point);
                x.request(nx);
                y.request(ny);
                changed = true;
                DragMode::Xy { client }
            }
            _ => DragMode::Press,
        };
        self.drag = Some(Drag { node, origin: point, mode });
        changed
    }

    fn release(&mut self, scene: Scene<'_>, point: Point) -> bool {
        let Some(drag) = self.drag.take() else {
            return false;
        };
        let mut changed = scene.dom.set_state(drag.node, InteractionState::Pressed, false);
        let Some(data) = scene.dom.get(drag.node) else {
            return changed;
        };
        let inside = scene.layout.get(drag.node).is_some_and(|l| l.decoration.frame.contains(point));
        match scene.attachments.get(&data.id) {
            Some(attachment @ (NodeAttachment::Value(_) | NodeAttachment::Xy { .. })) => end_gesture(attachment),
            Some(NodeAttachment::Toggle(a)) if inside => {
                single_edit(a, !a.value());
                changed = true;
            }
            _ => {}
        }
        changed
    }
}

/// Move `state` from `old` to `new`.
fn move_state(dom: &mut Dom, state: InteractionState, old: Option<NodeId>, new: Option<NodeId>) -> bool {
    if old == new {
        return false;
    }
    let mut changed = false;
    if let Some(old) = old {
        changed |= dom.set_state(old, state, false);
    }
    if let Some(new) = new {
        changed |= dom.set_state(new, state, true);
    }
    changed
}

fn drag_to(drag: &Drag, point: Point, attachments: &Attachments, dom: &Dom) -> bool {
    let Some(data) = dom.get(drag.node) else {
        return false;
    };
    match (drag.mode, attachments.get(&data.id)) {
        (DragMode::Slider { start, extent, vertical }, Some(NodeAttachment::Value(a))) => {
            if extent <= 0.0 {
                return false;
            }
            let delta = if vertical { drag.origin.y - point.y } else { point.x - drag.origin.x };
            a.request((start + delta / extent).clamp(0.0, 1.0));
            true
        }
        (DragMode::Xy { client }, Some(NodeAttachment::Xy { x, y })) => {
            let (nx, ny) = xy_position(client, point);
            x.request(nx);
            y.request(ny);
            true
        }
        _ => false,
    }
}

/// Normalised XY position of `point` in `client`, y growing upwards.
fn xy_position(client: Region, point: Point) -> (f32, f32) {
    let fraction = |offset: f32, extent: f32| if extent > 0.0 { (offset / extent).clamp(0.0, 1.0) } else { 0.0 };
    (fraction(point.x - client.x, client.width), fraction(client.bottom() - point.y, client.height))
}

/// End the drag gesture a press on `attachment` began.
fn end_gesture(attachment: &NodeAttachment) {
    match attachment {
        NodeAttachment::Value(a) => a.end_gesture(),
        NodeAttachment::Xy { x, y } => {
            x.end_gesture();
            y.end_gesture();
        }
        _ => {}
    }
}

/// One request bracketed by its own gesture.
fn single_edit<T: AtomicSnapshot>(attachment: &Attachment<T>, value: T) {
    attachment.begin_gesture();
    attachment.request(value);
    attachment.end_gesture();
}

fn step_choice(attachment: &Attachment<i32>, delta: i32) -> bool {
    let steps = attachment.steps() as i32;
    if steps < 2 || attachment.is_inert() {
        return false;
    }
    single_edit(attachment, (attachment.value() + delta).rem_euclid(steps));
    true
}

fn nudge(attachment: &Attachment<f32>, delta: f32) -> bool {
    if attachment.is_inert() {
        return false;
    }
    single_edit(attachment, (attachment.value() + delta).clamp(0.0, 1.0));
    true
}

fn key_edit(attachment: &NodeAttachment, key: Key) -> bool {
    let up = matches!(key, Key::Up | Key::Right);
    match attachment {
        NodeAttachment::Value(a) => match key {
            Key::Up | Key::Right | Key::Down | Key::Left => nudge(a, if up { KEY_STEP } else { -KEY_STEP }),
            _ => false,
        },
        NodeAttachment::Toggle(a) if key == Key::Activate && !a.is_inert() => {
            single_edit(a, !a.value());
            true
        }
        NodeAttachment::Choice(a) => match key {
            Key::Up | Key::Right | Key::Activate => step_choice(a, 1),
            Key::Down | Key::Left => step_choice(a, -1),
            _ => false,
        },
        NodeAttachment::Xy { x, y } => match key {
            Key::Left => nudge(x, -KEY_STEP),
            Key::Right => nudge(x, KEY_STEP),
            Key::Up => nudge(y, KEY_STEP),
            Key::Down => nudge(y, -KEY_STEP),
            _ => false,
        },
        _ => false,
    }
}

/// Select the page of a tabbed container whose tab is under `point`.
fn select_tab(dom: &mut Dom, layout: &LayoutMap, point: Point) -> bool {
    let hit = layout.iter().filter_map(|(id, l)| l.tab_bar.map(|bar| (id, bar))).filter(|(_, bar)| bar.contains(point)).last();
    let Some((node, bar)) = hit else {
        return false;
    };
    let pages = dom.children(node).len();
    if pages == 0 || bar.width <= 0.0 {
        return false;
    }
    let index = (((point.x - bar.x) / bar.width * pages as f32) as usize).min(pages - 1);
    match dom.transient_mut(node) {
        Some(transient) if transient.selected_tab != index => {
            transient.selected_tab = index;
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Builder;
    use crate::css::cascade::CascadeEnv;
    use crate::css::stylesheet::Stylesheet;
    use crate::description::NodeDescription;
    use crate::geometry::Size;
    use crate::layout::engine::layout_tree;
    use crate::param::{AttachmentBridge, AudioParameter, ParameterMap, SimpleParameter};
    use std::sync::Arc;

    struct Fixture {
        dom: Dom,
        layout: LayoutMap,
        attachments: Attachments,
        bridge: AttachmentBridge,
        gain: Arc<SimpleParameter>,
        interaction: Interaction,
    }

    impl Fixture {
        fn new(desc: NodeDescription) -> Self {
            let gain = Arc::new(SimpleParameter::new("gain", 0.5));
            let mut map = ParameterMap::new()
                .with(SimpleParameter::new("bypass", 0.0))
                .with(SimpleParameter::new("mode", 0.0).with_choices(["a", "b", "c"]))
                .with(SimpleParameter::new("x", 0.0))
                .with(SimpleParameter::new("y", 0.0));
            map.insert(gain.clone());
            let sheet = Stylesheet::new();
            let mut bridge = AttachmentBridge::new(Arc::new(map));
            let mut out = Builder::new(&sheet, &mut bridge).build(&desc);
            let root = out.dom.root().unwrap();
            let env = CascadeEnv::new(Size::new(200.0, 100.0));
            let layout = layout_tree(&mut out.dom, &sheet, &env, root, Region::new(0.0, 0.0, 200.0, 100.0));
            let mut interaction = Interaction::new();
            interaction.sync(&out.dom, &layout, &out.attachments);
            Self { dom: out.dom, layout, attachments: out.attachments, bridge, gain, interaction }
        }

        fn pointer(&mut self, event: PointerEvent) -> bool {
            let scene = Scene { dom: &mut self.dom, layout: &self.layout, attachments: &self.attachments };
            self.interaction.pointer(scene, event)
        }

        fn key(&mut self, key: Key) -> bool {
            let scene = Scene { dom: &mut self.dom, layout: &self.layout, attachments: &self.attachments };
            self.interaction.key(scene, key)
        }

        fn node(&self, id: &str) -> NodeId {
            self.dom.find_by_id(id).unwrap()
        }

        fn client(&self, id: &str) -> Region {
            self.layout.get(self.node(id)).unwrap().client()
        }

        fn has_state(&self, id: &str, state: InteractionState) -> bool {
            self.dom.get(self.node(id)).unwrap().states.contains(state)
        }

        fn value(&self, id: &str) -> f32 {
            self.attachments.get(id).unwrap().normalized()
        }
    }

    fn single(child: NodeDescription) -> NodeDescription {
        NodeDescription::new("View").with_id("root").with_child(child)
    }

    // ── FocusChain ───────────────────────────────────────────────────

    #[test]
    fn empty_chain() {
        let mut chain = FocusChain::new();
        assert!(chain.is_empty());
        assert!(chain.focus_next().is_none());
        assert!(chain.focus_previous().is_none());
    }

    #[test]
    fn tab_cycles_over_interactive_nodes() {
        let mut f = Fixture::new(
            NodeDescription::new("View")
                .with_id("root")
                .with_child(NodeDescription::new("Slider").with_id("a").with_parameter("gain"))
                .with_child(NodeDescription::new("Label").with_id("title"))
                .with_child(NodeDescription::new("Slider").with_id("b").with_parameter("gain")),
        );
        assert_eq!(f.interaction.focus_chain().len(), 2);
        assert!(f.key(Key::Tab));
        assert!(f.has_state("a", InteractionState::Focus));
        f.key(Key::Tab);
        assert!(f.has_state("b", InteractionState::Focus));
        assert!(!f.has_state("a", InteractionState::Focus));
        f.key(Key::Tab);
        assert_eq!(f.interaction.focused(), Some(f.node("a")));
        f.key(Key::BackTab);
        assert_eq!(f.interaction.focused(), Some(f.node("b")));
    }

    #[test]
    fn disabled_nodes_are_not_focusable() {
        let mut f = Fixture::new(single(NodeDescription::new("Slider").with_id("a").with_parameter("gain")));
        let a = f.node("a");
        f.dom.set_state(a, InteractionState::Disabled, true);
        f.interaction.sync(&f.dom, &f.layout, &f.attachments);
        assert!(f.interaction.focus_chain().is_empty());
    }

    // ── Pointer ──────────────────────────────────────────────────────

    #[test]
    fn hover_follows_the_pointer() {
        let mut f = Fixture::new(single(NodeDescription::new("Slider").with_id("s").with_parameter("gain")));
        let centre = f.client("s").centre();
        assert!(f.pointer(PointerEvent::Move(centre)));
        assert!(f.has_state("s", InteractionState::Hover));
        assert!(!f.pointer(PointerEvent::Move(centre)));
        f.pointer(PointerEvent::Leave);
        assert!(!f.has_state("s", InteractionState::Hover));
        assert!(f.interaction.hovered().is_none());
    }

    #[test]
    fn slider_drag_is_one_gesture() {
        let mut f = Fixture::new(single(
            NodeDescription::new("Slider")
                .with_id("s")
                .with_parameter("gain")
                .with_property("slider-type", "linear-horizontal"),
        ));
        let client = f.client("s");
        let start = client.centre();
        f.pointer(PointerEvent::Down(start));
        assert!(f.has_state("s", InteractionState::Pressed));
        f.pointer(PointerEvent::Move(Point::new(start.x + client.width / 8.0, start.y)));
        f.pointer(PointerEvent::Move(Point::new(start.x + client.width / 4.0, start.y)));
        f.pointer(PointerEvent::Up(Point::new(start.x + client.width / 4.0, start.y)));
        assert!(!f.has_state("s", InteractionState::Pressed));
        assert!((f.value("s") - 0.75).abs() < 1e-4);

        f.bridge.audio_processor().process_block();
        assert_eq!(f.gain.gesture_counts(), (1, 1));
        assert!((f.gain.current_value() - 0.75).abs() < 1e-4);
    }

    #[test]
    fn disabling_the_dragged_node_ends_its_gesture() {
        let mut f = Fixture::new(single(NodeDescription::new("Slider").with_id("s").with_parameter("gain")));
        let start = f.client("s").centre();
        f.pointer(PointerEvent::Down(start));
        assert!(f.interaction.is_dragging());

        let s = f.node("s");
        f.dom.set_state(s, InteractionState::Disabled, true);
        f.interaction.sync(&f.dom, &f.layout, &f.attachments);
        assert!(!f.interaction.is_dragging());

        f.bridge.audio_processor().process_block();
        assert_eq!(f.gain.gesture_counts(), (1, 1));
        assert!(!f.gain.in_gesture());
    }

    #[test]
    fn click_toggles_a_button() {
        let mut f = Fixture::new(single(NodeDescription::new("ToggleButton").with_id("t").with_parameter("bypass")));
        let centre = f.client("t").centre();
        f.pointer(PointerEvent::Down(centre));
        assert_eq!(f.value("t"), 0.0);
        f.pointer(PointerEvent::Up(centre));
        assert_eq!(f.value("t"), 1.0);
    }

    #[test]
    fn release_outside_does_not_toggle() {
        let mut f = Fixture::new(single(NodeDescription::new("ToggleButton").with_id("t").with_parameter("bypass")));
        let centre = f.client("t").centre();
        f.pointer(PointerEvent::Down(centre));
        f.pointer(PointerEvent::Up(Point::new(-10.0, -10.0)));
        assert_eq!(f.value("t"), 0.0);
    }

    #[test]
    fn combo_steps_and_wraps() {
        let mut f = Fixture::new(single(NodeDescription::new("ComboBox").with_id("c").with_parameter("mode")));
        let centre = f.client("c").centre();
        let mut seen = Vec::new();
        for _ in 0..3 {
            f.pointer(PointerEvent::Down(centre));
            f.pointer(PointerEvent::Up(centre));
            match f.attachments.get("c") {
                Some(NodeAttachment::Choice(a)) => seen.push(a.value()),
                other => panic!("unexpected attachment {other:?}"),
            }
        }
        assert_eq!(seen, vec![1, 2, 0]);
    }

    #[test]
    fn xy_drag_sets_both_axes() {
        let mut f = Fixture::new(single(
            NodeDescription::new("XYDragComponent")
                .with_id("xy")
                .with_binding("parameter-x-id", "x")
                .with_binding("parameter-y-id", "y"),
        ));
        let client = f.client("xy");
        f.pointer(PointerEvent::Down(Point::new(client.x, client.bottom())));
        f.pointer(PointerEvent::Move(Point::new(client.right(), client.y)));
        f.pointer(PointerEvent::Up(Point::new(client.right(), client.y)));
        match f.attachments.get("xy") {
            Some(NodeAttachment::Xy { x, y }) => {
                assert_eq!(x.value(), 1.0);
                assert_eq!(y.value(), 1.0);
            }
            other => panic!("unexpected attachment {other:?}"),
        }
    }

    // ── Keys ─────────────────────────────────────────────────────────

    #[test]
    fn arrow_keys_nudge_the_focused_slider() {
        let mut f = Fixture::new(single(NodeDescription::new("Slider").with_id("s").with_parameter("gain")));
        assert!(!f.key(Key::Up));
        f.key(Key::Tab);
        assert!(f.key(Key::Up));
        assert!((f.value("s") - (0.5 + KEY_STEP)).abs() < 1e-6);
        f.key(Key::Down);
        f.key(Key::Down);
        assert!((f.value("s") - (0.5 - KEY_STEP)).abs() < 1e-6);
    }

    #[test]
    fn tab_bar_click_selects_page() {
        let mut f = Fixture::new(
            NodeDescription::new("View")
                .with_id("tabs")
                .with_property("display", "tabbed")
                .with_child(NodeDescription::new("View").with_id("one"))
                .with_child(NodeDescription::new("View").with_id("two")),
        );
        let bar = f.layout.get(f.node("tabs")).unwrap().tab_bar.unwrap();
        assert!(f.pointer(PointerEvent::Down(Point::new(bar.right() - 1.0, bar.centre().y))));
        assert_eq!(f.dom.get(f.node("tabs")).unwrap().transient.selected_tab, 1);
    }
}
