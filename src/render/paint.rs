//! Paint strategies: turn a laid-out, styled node into draw commands.
//!
//! Every node gets its decorator painted (background, border, caption) and
//! then its control. How controls look depends on the inherited
//! `look-and-feel` property, which selects a [`PaintStrategy`].

use std::f32::consts::PI;

use super::display_list::{DisplayList, DrawCommand, Fill, TextAlign};
use crate::builder::NodeAttachment;
use crate::css::cascade::ResolvedStyle;
use crate::css::value::{Colour, Gradient, GradientKind};
use crate::dom::node::{NodeData, NodeType};
use crate::geometry::{Point, Region, Spacing};
use crate::layout::engine::NodeLayout;

/// Rotary sliders sweep 270 degrees, starting at seven thirty.
const ROTARY_START: f32 = -0.75 * PI;
const ROTARY_END: f32 = 0.75 * PI;

/// Everything a strategy needs to paint one node.
pub struct PaintContext<'a> {
    pub node: &'a NodeData,
    pub style: &'a ResolvedStyle,
    pub layout: &'a NodeLayout,
    pub attachment: Option<&'a NodeAttachment>,
    /// Labels of the pages of a tabbed container.
    pub tabs: &'a [String],
    list: &'a mut DisplayList,
}

impl<'a> PaintContext<'a> {
    pub fn new(
        node: &'a NodeData,
        style: &'a ResolvedStyle,
        layout: &'a NodeLayout,
        list: &'a mut DisplayList,
    ) -> Self {
        Self { node, style, layout, attachment: None, tabs: &[], list }
    }

    pub fn with_attachment(mut self, attachment: Option<&'a NodeAttachment>) -> Self {
        self.attachment = attachment;
        self
    }

    pub fn with_tabs(mut self, tabs: &'a [String]) -> Self {
        self.tabs = tabs;
        self
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.list.push(&self.node.id, command);
    }

    /// A colour property, or black if it cannot be read.
    pub fn colour(&self, property: &str) -> Colour {
        self.style.colour(property).unwrap_or(Colour::rgb(0, 0, 0))
    }

    pub fn font_size(&self) -> f32 {
        self.style.number_or("font-size", 12.0)
    }

    pub fn client(&self) -> Region {
        self.layout.client()
    }

    /// Normalised value of the bound parameter; 0 when unbound.
    pub fn normalized(&self) -> f32 {
        self.attachment.map(|a| a.normalized()).unwrap_or(0.0)
    }

    /// Text to show on a control: the `text` property, else the bound
    /// value's display text.
    pub fn label(&self) -> String {
        if let Some(text) = self.style.text("text").filter(|t| !t.is_empty()) {
            return text;
        }
        self.attachment.map(|a| a.display_text()).unwrap_or_default()
    }

    fn text(&mut self, region: Region, text: String, colour: Colour, align: TextAlign) {
        if text.is_empty() || region.is_empty() {
            return;
        }
        let size = self.font_size();
        self.push(DrawCommand::Text { region, text, size, colour, align });
    }
}

/// Orientation of a slider after resolving `slider-type: auto`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliderShape {
    Horizontal,
    Vertical,
    Rotary,
}

impl SliderShape {
    /// `auto` picks linear when one side is at least twice the other.
    pub fn of(style: &ResolvedStyle, bounds: Region) -> Self {
        match style.text("slider-type").as_deref() {
            Some("linear-horizontal") => Self::Horizontal,
            Some("linear-vertical") => Self::Vertical,
            Some("rotary") => Self::Rotary,
            _ if bounds.width >= 2.0 * bounds.height => Self::Horizontal,
            _ if bounds.height >= 2.0 * bounds.width => Self::Vertical,
            _ => Self::Rotary,
        }
    }
}

// ---------------------------------------------------------------------------
// PaintStrategy
// ---------------------------------------------------------------------------

/// A look-and-feel. Default methods give the flat look; other strategies
/// override what they draw differently.
pub trait PaintStrategy {
    fn name(&self) -> &'static str;

    /// Background, border and caption.
    fn decorator(&self, cx: &mut PaintContext<'_>) {
        paint_background(cx, None);
        paint_border(cx);
        paint_caption(cx);
    }

    fn rotary(&self, cx: &mut PaintContext<'_>, value: f32) {
        let client = cx.client();
        let radius = client.width.min(client.height) / 2.0 - 4.0;
        if radius <= 0.0 {
            return;
        }
        let centre = client.centre();
        let width = (radius * 0.2).max(2.0);
        let angle = ROTARY_START + (ROTARY_END - ROTARY_START) * value;
        cx.push(DrawCommand::Arc {
            centre,
            radius,
            start: ROTARY_START,
            end: ROTARY_END,
            width,
            colour: cx.colour("slider-track-color"),
        });
        cx.push(DrawCommand::Arc {
            centre,
            radius,
            start: ROTARY_START,
            end: angle,
            width,
            colour: cx.colour("slider-fill-color"),
        });
        cx.push(DrawCommand::Line {
            from: centre,
            to: on_circle(centre, radius, angle),
            width: 2.0,
            colour: cx.colour("slider-thumb-color"),
        });
    }

    fn linear(&self, cx: &mut PaintContext<'_>, value: f32, vertical: bool) {
        let client = cx.client();
        let (track, fill, thumb) = linear_parts(client, value, vertical);
        cx.push(DrawCommand::FillRect {
            region: track,
            radius: 2.0,
            fill: Fill::Solid(cx.colour("slider-track-color")),
        });
        cx.push(DrawCommand::FillRect {
            region: fill,
            radius: 2.0,
            fill: Fill::Solid(cx.colour("slider-fill-color")),
        });
        cx.push(DrawCommand::Ellipse { region: thumb, colour: cx.colour("slider-thumb-color") });
    }

    fn button(&self, cx: &mut PaintContext<'_>, on: bool) {
        let client = cx.client();
        let colour = if on { cx.colour("button-on-color") } else { cx.colour("button-off-color") };
        let radius = cx.style.number_or("radius", 5.0);
        cx.push(DrawCommand::FillRect { region: client, radius, fill: Fill::Solid(colour) });
        let label = cx.label();
        let colour = cx.colour("text-color");
        cx.text(client, label, colour, TextAlign::Centre);
    }
}

/// Flat, borderless controls.
#[derive(Debug, Clone, Copy, Default)]
pub struct Flat;

impl PaintStrategy for Flat {
    fn name(&self) -> &'static str {
        "flat"
    }
}

/// Shaded backgrounds and a knob body under rotary sliders.
#[derive(Debug, Clone, Copy, Default)]
pub struct Skeuomorphic;

impl PaintStrategy for Skeuomorphic {
    fn name(&self) -> &'static str {
        "skeuomorphic"
    }

    fn decorator(&self, cx: &mut PaintContext<'_>) {
        let base = cx.colour("background-color");
        let shade = base.interpolate(Colour::rgb(0, 0, 0), 0.3);
        paint_background(cx, Some(shade));
        paint_border(cx);
        paint_caption(cx);
    }

    fn rotary(&self, cx: &mut PaintContext<'_>, value: f32) {
        let client = cx.client();
        let side = client.width.min(client.height) - 8.0;
        if side <= 0.0 {
            return;
        }
        let centre = client.centre();
        let body = Region::new(centre.x - side / 2.0, centre.y - side / 2.0, side, side);
        cx.push(DrawCommand::Ellipse { region: body, colour: cx.colour("slider-track-color") });
        let angle = ROTARY_START + (ROTARY_END - ROTARY_START) * value;
        cx.push(DrawCommand::Line {
            from: on_circle(centre, side * 0.2, angle),
            to: on_circle(centre, side * 0.45, angle),
            width: 3.0,
            colour: cx.colour("slider-thumb-color"),
        });
    }

    fn button(&self, cx: &mut PaintContext<'_>, on: bool) {
        let client = cx.client();
        let colour = if on { cx.colour("button-on-color") } else { cx.colour("button-off-color") };
        let radius = cx.style.number_or("radius", 5.0);
        cx.push(DrawCommand::FillRect { region: client, radius, fill: Fill::Solid(colour) });
        cx.push(DrawCommand::StrokeRect {
            region: client,
            radius,
            width: 1.0,
            colour: colour.interpolate(Colour::rgb(255, 255, 255), 0.4),
        });
        let label = cx.label();
        let colour = cx.colour("text-color");
        cx.text(client, label, colour, TextAlign::Centre);
    }
}

/// Square outlines; the slider thumb is a rectangle.
#[derive(Debug, Clone, Copy, Default)]
pub struct Classic;

impl PaintStrategy for Classic {
    fn name(&self) -> &'static str {
        "classic"
    }

    fn linear(&self, cx: &mut PaintContext<'_>, value: f32, vertical: bool) {
        let (track, _, thumb) = linear_parts(cx.client(), value, vertical);
        cx.push(DrawCommand::StrokeRect {
            region: track,
            radius: 0.0,
            width: 1.0,
            colour: cx.colour("slider-track-color"),
        });
        cx.push(DrawCommand::FillRect {
            region: thumb,
            radius: 0.0,
            fill: Fill::Solid(cx.colour("slider-thumb-color")),
        });
    }
}

/// The strategy named by the node's `look-and-feel`.
pub fn strategy_for(style: &ResolvedStyle) -> &'static dyn PaintStrategy {
    match style.text("look-and-feel").as_deref() {
        Some("skeuomorphic") => &Skeuomorphic,
        Some("classic") => &Classic,
        _ => &Flat,
    }
}

// ---------------------------------------------------------------------------
// Node painting
// ---------------------------------------------------------------------------

/// Paint one node: decorator, then the control of its type.
pub fn paint_node(strategy: &dyn PaintStrategy, cx: &mut PaintContext<'_>) {
    strategy.decorator(cx);
    match cx.node.node_type {
        NodeType::View => paint_tabs(cx),
        NodeType::Slider => {
            let value = cx.normalized();
            match SliderShape::of(cx.style, cx.client()) {
                SliderShape::Rotary => strategy.rotary(cx, value),
                SliderShape::Horizontal => strategy.linear(cx, value, false),
                SliderShape::Vertical => strategy.linear(cx, value, true),
            }
        }
        NodeType::TextButton | NodeType::ToggleButton => {
            let on = cx.normalized() >= 0.5;
            strategy.button(cx, on);
        }
        NodeType::ComboBox => paint_combo(cx),
        NodeType::Label => {
            let (text, colour) = (cx.style.text("text").unwrap_or_default(), cx.colour("text-color"));
            cx.text(cx.client(), text, colour, TextAlign::Left);
        }
        NodeType::ListBox => {
            let client = cx.client();
            let colour = cx.colour("slider-track-color");
            cx.push(DrawCommand::FillRect { region: client, radius: 0.0, fill: Fill::Solid(colour) });
        }
        NodeType::Meter => {
            let client = cx.client();
            cx.push(DrawCommand::StrokeRect {
                region: client,
                radius: 0.0,
                width: 1.0,
                colour: cx.colour("meter-color"),
            });
        }
        NodeType::Plot => {
            let client = cx.client();
            cx.push(DrawCommand::StrokeRect {
                region: client,
                radius: 0.0,
                width: 1.0,
                colour: cx.colour("plot-color"),
            });
        }
        NodeType::XyDrag => paint_xy(cx),
        NodeType::Keyboard => paint_keys(cx, 14),
        NodeType::Drumpad => paint_pads(cx, 4),
        NodeType::Placeholder => {
            let client = cx.layout.decoration.frame;
            cx.push(DrawCommand::StrokeRect {
                region: client,
                radius: 0.0,
                width: 1.0,
                colour: Colour::rgb(255, 0, 0),
            });
            let text = cx.style.text("text").unwrap_or_default();
            cx.text(client, text, Colour::rgb(255, 0, 0), TextAlign::Centre);
        }
    }
}

fn paint_background(cx: &mut PaintContext<'_>, shade: Option<Colour>) {
    let frame = cx.layout.decoration.frame;
    if frame.is_empty() {
        return;
    }
    let radius = cx.style.number_or("radius", 5.0);
    let alpha = cx.style.number_or("background-alpha", 1.0).clamp(0.0, 1.0);
    let fill = match cx.style.get("background-gradient").and_then(|v| v.as_gradient().cloned()) {
        Some(gradient) => Fill::Gradient(gradient),
        None => {
            let base = cx.colour("background-color");
            let base = base.with_alpha((base.a as f32 * alpha).round() as u8);
            match shade {
                Some(shade) => Fill::Gradient(Gradient {
                    kind: GradientKind::Linear { angle: 0.0 },
                    stops: vec![(0.0, shade.with_alpha(base.a)), (1.0, base)],
                }),
                None => Fill::Solid(base),
            }
        }
    };
    if matches!(&fill, Fill::Solid(c) if c.a == 0) {
        return;
    }
    cx.push(DrawCommand::FillRect { region: frame, radius, fill });
}

fn paint_border(cx: &mut PaintContext<'_>) {
    let border = cx
        .style
        .get("border")
        .and_then(|v| v.as_numbers())
        .and_then(|values| Spacing::from_shorthand(&values))
        .unwrap_or(Spacing::ZERO);
    let width = border.top.max(border.right).max(border.bottom).max(border.left);
    if width <= 0.0 {
        return;
    }
    let frame = cx.layout.decoration.frame;
    let radius = cx.style.number_or("radius", 5.0);
    let colour = cx.colour("border-color");
    cx.push(DrawCommand::StrokeRect { region: frame, radius, width, colour });
}

fn paint_caption(cx: &mut PaintContext<'_>) {
    let Some(strip) = cx.layout.decoration.caption else {
        return;
    };
    let caption = cx.style.text("caption").unwrap_or_default();
    let colour = cx.colour("caption-color");
    cx.text(strip, caption, colour, TextAlign::Centre);
}

fn paint_tabs(cx: &mut PaintContext<'_>) {
    let Some(bar) = cx.layout.tab_bar else {
        return;
    };
    if cx.tabs.is_empty() {
        return;
    }
    let selected = cx.node.transient.selected_tab.min(cx.tabs.len() - 1);
    let width = bar.width / cx.tabs.len() as f32;
    let text_colour = cx.colour("text-color");
    for (i, label) in cx.tabs.iter().enumerate() {
        let tab = Region::new(bar.x + width * i as f32, bar.y, width, bar.height);
        let colour = if i == selected {
            cx.colour("tab-selected-color")
        } else {
            cx.colour("tab-color")
        };
        cx.push(DrawCommand::FillRect { region: tab, radius: 0.0, fill: Fill::Solid(colour) });
        cx.text(tab, label.clone(), text_colour, TextAlign::Centre);
    }
}

fn paint_combo(cx: &mut PaintContext<'_>) {
    let client = cx.client();
    let radius = cx.style.number_or("radius", 5.0);
    let colour = cx.colour("button-off-color");
    cx.push(DrawCommand::FillRect { region: client, radius, fill: Fill::Solid(colour) });
    let label = cx.label();
    let text_colour = cx.colour("text-color");
    let (text, arrow) = client.split_right(client.height.min(client.width));
    cx.text(text, label, text_colour, TextAlign::Left);
    let c = arrow.centre();
    let d = arrow.height * 0.15;
    cx.push(DrawCommand::Line {
        from: Point::new(c.x - d, c.y - d / 2.0),
        to: Point::new(c.x, c.y + d / 2.0),
        width: 1.5,
        colour: text_colour,
    });
    cx.push(DrawCommand::Line {
        from: Point::new(c.x, c.y + d / 2.0),
        to: Point::new(c.x + d, c.y - d / 2.0),
        width: 1.5,
        colour: text_colour,
    });
}

fn paint_xy(cx: &mut PaintContext<'_>) {
    let client = cx.client();
    let track = cx.colour("slider-track-color");
    cx.push(DrawCommand::FillRect { region: client, radius: 0.0, fill: Fill::Solid(track) });
    let (x, y) = match cx.attachment {
        Some(NodeAttachment::Xy { x, y }) => (x.value(), y.value()),
        _ => (0.0, 0.0),
    };
    let dot = 10.0_f32.min(client.width).min(client.height);
    let centre = Point::new(
        client.x + client.width * x.clamp(0.0, 1.0),
        client.bottom() - client.height * y.clamp(0.0, 1.0),
    );
    cx.push(DrawCommand::Ellipse {
        region: Region::new(centre.x - dot / 2.0, centre.y - dot / 2.0, dot, dot),
        colour: cx.colour("slider-thumb-color"),
    });
}

fn paint_keys(cx: &mut PaintContext<'_>, keys: usize) {
    let client = cx.client();
    let width = client.width / keys as f32;
    let colour = cx.colour("border-color");
    for i in 0..keys {
        let key = Region::new(client.x + width * i as f32, client.y, width, client.height);
        cx.push(DrawCommand::StrokeRect { region: key, radius: 0.0, width: 1.0, colour });
    }
}

fn paint_pads(cx: &mut PaintContext<'_>, per_side: usize) {
    let client = cx.client();
    let (w, h) = (client.width / per_side as f32, client.height / per_side as f32);
    let colour = cx.colour("button-off-color");
    for row in 0..per_side {
        for col in 0..per_side {
            let pad = Region::new(client.x + w * col as f32, client.y + h * row as f32, w, h)
                .shrink(Spacing::all(2.0));
            cx.push(DrawCommand::FillRect { region: pad, radius: 3.0, fill: Fill::Solid(colour) });
        }
    }
}

fn on_circle(centre: Point, radius: f32, angle: f32) -> Point {
    Point::new(centre.x + radius * angle.sin(), centre.y - radius * angle.cos())
}

/// Track, filled part and thumb of a linear slider.
fn linear_parts(client: Region, value: f32, vertical: bool) -> (Region, Region, Region) {
    let value = value.clamp(0.0, 1.0);
    if vertical {
        let track = Region::new(client.centre().x - 2.0, client.y, 4.0, client.height);
        let filled = client.height * value;
        let fill = Region::new(track.x, client.bottom() - filled, 4.0, filled);
        let thumb_y = client.bottom() - filled;
        let thumb = Region::new(client.centre().x - 6.0, thumb_y - 6.0, 12.0, 12.0);
        (track, fill, thumb)
    } else {
        let track = Region::new(client.x, client.centre().y - 2.0, client.width, 4.0);
        let filled = client.width * value;
        let fill = Region::new(client.x, track.y, filled, 4.0);
        let thumb = Region::new(client.x + filled - 6.0, client.centre().y - 6.0, 12.0, 12.0);
        (track, fill, thumb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::cascade::{resolve, CascadeEnv};
    use crate::css::stylesheet::Stylesheet;
    use crate::geometry::Size;
    use crate::layout::box_model::BoxModel;

    fn styled(node: &NodeData, css: &str) -> (ResolvedStyle, NodeLayout) {
        let sheet = Stylesheet::parse(css).unwrap();
        let style = resolve(node, &sheet, &[], &CascadeEnv::new(Size::new(600.0, 400.0)));
        let decoration = BoxModel::from_style(&style).decorate(Region::new(0.0, 0.0, 100.0, 100.0));
        (style, NodeLayout { decoration, tab_bar: None })
    }

    fn paint(node: &NodeData, css: &str) -> DisplayList {
        let (style, layout) = styled(node, css);
        let mut list = DisplayList::new();
        let mut cx = PaintContext::new(node, &style, &layout, &mut list);
        paint_node(strategy_for(&style), &mut cx);
        list
    }

    #[test]
    fn strategy_follows_look_and_feel() {
        let node = NodeData::new(NodeType::Slider, "s");
        let (style, _) = styled(&node, "Slider { look-and-feel: classic; }");
        assert_eq!(strategy_for(&style).name(), "classic");
        let (style, _) = styled(&node, "");
        assert_eq!(strategy_for(&style).name(), "flat");
    }

    #[test]
    fn slider_shape_auto() {
        let style = ResolvedStyle::default();
        assert_eq!(SliderShape::of(&style, Region::new(0.0, 0.0, 100.0, 20.0)), SliderShape::Horizontal);
        assert_eq!(SliderShape::of(&style, Region::new(0.0, 0.0, 20.0, 100.0)), SliderShape::Vertical);
        assert_eq!(SliderShape::of(&style, Region::new(0.0, 0.0, 50.0, 60.0)), SliderShape::Rotary);
    }

    #[test]
    fn decorator_paints_background_border_and_caption() {
        let node = NodeData::new(NodeType::View, "v");
        let list = paint(&node, "View { background-color: #102030; border: 2; caption: Main; }");
        let kinds: Vec<&str> = list
            .iter()
            .map(|c| match c {
                DrawCommand::FillRect { .. } => "fill",
                DrawCommand::StrokeRect { .. } => "stroke",
                DrawCommand::Text { .. } => "text",
                _ => "other",
            })
            .collect();
        assert_eq!(kinds, vec!["fill", "stroke", "text"]);
        assert!(matches!(
            list.iter().next(),
            Some(DrawCommand::FillRect { fill: Fill::Solid(c), .. }) if *c == Colour::rgb(0x10, 0x20, 0x30)
        ));
    }

    #[test]
    fn transparent_background_is_skipped() {
        let node = NodeData::new(NodeType::View, "v");
        let list = paint(&node, "View { background-alpha: 0; }");
        assert!(list.is_empty());
    }

    #[test]
    fn placeholder_shows_its_message() {
        let node = NodeData::placeholder("p", "unknown node type 'Knob'");
        let list = paint(&node, "");
        assert!(list.iter().any(|c| matches!(
            c,
            DrawCommand::Text { text, .. } if text == "unknown node type 'Knob'"
        )));
    }

    #[test]
    fn unbound_rotary_slider_sits_at_start() {
        let node = NodeData::new(NodeType::Slider, "s");
        let list = paint(&node, "Slider { slider-type: rotary; }");
        let fill_arc = list
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Arc { start, end, .. } => Some((*start, *end)),
                _ => None,
            })
            .nth(1)
            .unwrap();
        assert_eq!(fill_arc, (ROTARY_START, ROTARY_START));
    }
}
