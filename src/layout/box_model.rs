//! Decorator box model: margin, border, padding and the caption strip.
//!
//! ```text
//! +------------------ outer -------------------+
//! |  margin                                    |
//! |  +--------------- frame ----------------+  |
//! |  |  border + padding                    |  |
//! |  |  +----------- caption -----------+   |  |
//! |  |  +----------- client ------------+   |  |
//! |  |  |                               |   |  |
//! |  |  +-------------------------------+   |  |
//! |  +--------------------------------------+  |
//! +--------------------------------------------+
//! ```

use crate::css::cascade::ResolvedStyle;
use crate::geometry::{Region, Spacing};

/// Side of the client area the caption strip sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptionPlacement {
    #[default]
    Top,
    Bottom,
    Left,
    Right,
}

impl CaptionPlacement {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "top" => Some(Self::Top),
            "bottom" => Some(Self::Bottom),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }
}

/// Box-model parameters of one node, read from its resolved style.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxModel {
    pub margin: Spacing,
    pub border: Spacing,
    pub padding: Spacing,
    /// Caption text; no strip is reserved without one.
    pub caption: Option<String>,
    pub caption_size: f32,
    pub caption_placement: CaptionPlacement,
}

/// The regions a decorator computes for one node.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Decoration {
    /// Bounds assigned by the parent.
    pub outer: Region,
    /// `outer` minus margin: the painted background and border.
    pub frame: Region,
    pub caption: Option<Region>,
    /// Content area handed to the node's children or its control.
    pub client: Region,
}

impl BoxModel {
    pub fn from_style(style: &ResolvedStyle) -> Self {
        Self {
            margin: spacing(style, "margin"),
            border: spacing(style, "border"),
            padding: spacing(style, "padding"),
            caption: style.text("caption").filter(|c| !c.is_empty()),
            caption_size: style.number_or("caption-size", 20.0).max(0.0),
            caption_placement: style
                .text("caption-placement")
                .and_then(|p| CaptionPlacement::from_name(&p))
                .unwrap_or_default(),
        }
    }

    /// Split `outer` into frame, caption and client regions. Sizes that would
    /// go negative clamp to zero.
    pub fn decorate(&self, outer: Region) -> Decoration {
        let frame = outer.shrink(self.margin);
        let inner = frame.shrink(self.border).shrink(self.padding);

        let (caption, client) = match self.caption {
            None => (None, inner),
            Some(_) => {
                let (strip, rest) = match self.caption_placement {
                    CaptionPlacement::Top => inner.split_top(self.caption_size),
                    CaptionPlacement::Bottom => inner.split_bottom(self.caption_size),
                    CaptionPlacement::Left => inner.split_left(self.caption_size),
                    CaptionPlacement::Right => inner.split_right(self.caption_size),
                };
                (Some(strip), rest)
            }
        };

        Decoration { outer, frame, caption, client }
    }
}

/// A box shorthand property as [`Spacing`]; anything unreadable is zero.
fn spacing(style: &ResolvedStyle, property: &str) -> Spacing {
    style
        .get(property)
        .and_then(|v| v.as_numbers())
        .and_then(|values| Spacing::from_shorthand(&values))
        .unwrap_or(Spacing::ZERO)
}

/// Client bounds of a node with `style` placed in `outer`.
pub fn client_bounds(style: &ResolvedStyle, outer: Region) -> Region {
    BoxModel::from_style(style).decorate(outer).client
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::cascade::{resolve, CascadeEnv};
    use crate::css::stylesheet::Stylesheet;
    use crate::dom::node::{NodeData, NodeType};
    use crate::geometry::Size;

    fn style_of(css: &str) -> ResolvedStyle {
        let sheet = Stylesheet::parse(css).unwrap();
        let node = NodeData::new(NodeType::Slider, "n");
        resolve(&node, &sheet, &[], &CascadeEnv::new(Size::new(600.0, 400.0)))
    }

    #[test]
    fn defaults_reduce_by_margin_and_padding() {
        let style = style_of("");
        let outer = Region::new(0.0, 0.0, 100.0, 50.0);
        assert_eq!(client_bounds(&style, outer), Region::new(10.0, 10.0, 80.0, 30.0));
        assert_eq!(BoxModel::from_style(&style).decorate(outer).frame, Region::new(5.0, 5.0, 90.0, 40.0));
    }

    #[test]
    fn shorthands_and_border() {
        let style = style_of("Slider { margin: 1 2; border: 3; padding: 0 0 4 8; }");
        let client = client_bounds(&style, Region::new(0.0, 0.0, 100.0, 100.0));
        // x: 2 + 3 + 8, y: 1 + 3 + 0
        assert_eq!(client, Region::new(13.0, 4.0, 100.0 - 4.0 - 6.0 - 8.0, 100.0 - 2.0 - 6.0 - 4.0));
    }

    #[test]
    fn caption_strip_on_each_side() {
        let outer = Region::new(0.0, 0.0, 100.0, 100.0);
        let base = "margin: 0; padding: 0; caption: 'Gain'; caption-size: 10;";

        let top = BoxModel::from_style(&style_of(&format!("Slider {{ {base} }}"))).decorate(outer);
        assert_eq!(top.caption, Some(Region::new(0.0, 0.0, 100.0, 10.0)));
        assert_eq!(top.client, Region::new(0.0, 10.0, 100.0, 90.0));

        let left = BoxModel::from_style(&style_of(&format!(
            "Slider {{ {base} caption-placement: left; }}"
        )))
        .decorate(outer);
        assert_eq!(left.caption, Some(Region::new(0.0, 0.0, 10.0, 100.0)));
        assert_eq!(left.client, Region::new(10.0, 0.0, 90.0, 100.0));

        let bottom = BoxModel::from_style(&style_of(&format!(
            "Slider {{ {base} caption-placement: bottom; }}"
        )))
        .decorate(outer);
        assert_eq!(bottom.client, Region::new(0.0, 0.0, 100.0, 90.0));
    }

    #[test]
    fn no_caption_no_strip() {
        let d = BoxModel::from_style(&style_of("Slider { margin: 0; padding: 0; }"))
            .decorate(Region::new(0.0, 0.0, 40.0, 40.0));
        assert_eq!(d.caption, None);
        assert_eq!(d.client, Region::new(0.0, 0.0, 40.0, 40.0));
    }

    #[test]
    fn oversized_spacing_clamps_to_zero() {
        let style = style_of("Slider { margin: 30; }");
        let client = client_bounds(&style, Region::new(0.0, 0.0, 40.0, 40.0));
        assert_eq!(client.width, 0.0);
        assert_eq!(client.height, 0.0);
    }
}
