//! Resolved style -> taffy Style conversion for stacked (flexbox) layout.
//!
//! Maps the `flex-*` and sizing properties of a [`ResolvedStyle`] to taffy's
//! layout types. Margins, borders and padding are not passed to taffy: the
//! decorator applies them inside each child's outer bounds.

use taffy::prelude::{FromLength, FromPercent, TaffyAuto};
use taffy::style::{AlignItems, AlignSelf, Dimension, Display, FlexDirection, FlexWrap, JustifyContent, Style};

use crate::css::cascade::ResolvedStyle;
use crate::css::value::PropertyValue;
use crate::geometry::Size;

fn keyword(style: &ResolvedStyle, property: &str) -> String {
    style.text(property).unwrap_or_default()
}

/// Convert a length property to a taffy [`Dimension`]: numbers are pixels,
/// percentages are relative to the container; anything else is auto.
fn dimension(style: &ResolvedStyle, property: &str) -> Dimension {
    match style.declared(property) {
        Some(PropertyValue::Number(n)) => Dimension::from_length(*n as f32),
        Some(PropertyValue::Percent(p)) => Dimension::from_percent(*p as f32 / 100.0),
        _ => Dimension::AUTO,
    }
}

fn flex_direction(style: &ResolvedStyle) -> FlexDirection {
    match keyword(style, "flex-direction").as_str() {
        "column" => FlexDirection::Column,
        "row-reverse" => FlexDirection::RowReverse,
        "column-reverse" => FlexDirection::ColumnReverse,
        _ => FlexDirection::Row,
    }
}

fn flex_wrap(style: &ResolvedStyle) -> FlexWrap {
    match keyword(style, "flex-wrap").as_str() {
        "wrap" => FlexWrap::Wrap,
        "wrap-reverse" => FlexWrap::WrapReverse,
        _ => FlexWrap::NoWrap,
    }
}

fn align(name: &str) -> Option<AlignItems> {
    match name {
        "start" => Some(AlignItems::FlexStart),
        "end" => Some(AlignItems::FlexEnd),
        "center" => Some(AlignItems::Center),
        "stretch" => Some(AlignItems::Stretch),
        _ => None,
    }
}

fn justify(name: &str) -> Option<JustifyContent> {
    match name {
        "start" => Some(JustifyContent::FlexStart),
        "end" => Some(JustifyContent::FlexEnd),
        "center" => Some(JustifyContent::Center),
        "space-between" => Some(JustifyContent::SpaceBetween),
        "space-around" => Some(JustifyContent::SpaceAround),
        _ => None,
    }
}

/// The taffy style of a stacked container whose client area is `client`.
pub fn container_style(style: &ResolvedStyle, client: Size) -> Style {
    Style {
        display: Display::Flex,
        flex_direction: flex_direction(style),
        flex_wrap: flex_wrap(style),
        align_items: align(&keyword(style, "flex-align-items")),
        justify_content: justify(&keyword(style, "flex-justify-content")),
        size: taffy::geometry::Size {
            width: Dimension::from_length(client.width),
            height: Dimension::from_length(client.height),
        },
        ..Style::default()
    }
}

/// The taffy style of one child inside a stacked container.
///
/// Children without an explicit size start from a zero basis and share the
/// free space by `flex-grow`.
pub fn child_style(style: &ResolvedStyle) -> Style {
    let align_self: Option<AlignSelf> = align(&keyword(style, "flex-align-self"));
    Style {
        display: Display::Flex,
        flex_grow: style.number_or("flex-grow", 1.0).max(0.0),
        flex_shrink: style.number_or("flex-shrink", 1.0).max(0.0),
        flex_basis: Dimension::from_length(0.0),
        align_self,
        size: taffy::geometry::Size {
            width: dimension(style, "width"),
            height: dimension(style, "height"),
        },
        min_size: taffy::geometry::Size {
            width: dimension(style, "min-width"),
            height: dimension(style, "min-height"),
        },
        max_size: taffy::geometry::Size {
            width: dimension(style, "max-width"),
            height: dimension(style, "max-height"),
        },
        ..Style::default()
    }
}

/// Whether the main axis of a stacked container runs vertically.
pub fn is_column(style: &ResolvedStyle) -> bool {
    matches!(flex_direction(style), FlexDirection::Column | FlexDirection::ColumnReverse)
}
