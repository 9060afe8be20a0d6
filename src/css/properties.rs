//! Property catalogue: value kinds, built-in defaults, inheritance.
//!
//! Converts raw declaration tokens (from a stylesheet) or plain text (from a
//! tree description) into typed [`PropertyValue`]s. Properties missing from the
//! catalogue are accepted and their type is inferred from the value.

use crate::css::model::DeclarationValue;
use crate::css::parser::parse_values;
use crate::css::value::{Colour, Gradient, PropertyValue};

/// Errors from property parsing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PropertyError {
    #[error("invalid value for {property}: {message}")]
    InvalidValue { property: String, message: String },
}

/// The value type a known property accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Colour,
    Number,
    /// A number (pixels) or a percentage.
    Length,
    /// One to four numbers in box shorthand order.
    Box,
    Bool,
    /// One identifier from a fixed set.
    Keyword(&'static [&'static str]),
    Gradient,
    /// Free text, taken verbatim.
    Text,
}

const DISPLAY: &[&str] = &["flexbox", "contents", "grid", "tabbed"];
const FLEX_DIRECTION: &[&str] = &["row", "row-reverse", "column", "column-reverse"];
const FLEX_WRAP: &[&str] = &["nowrap", "wrap", "wrap-reverse"];
const FLEX_ALIGN: &[&str] = &["stretch", "start", "end", "center"];
const FLEX_ALIGN_SELF: &[&str] = &["auto", "stretch", "start", "end", "center"];
const FLEX_JUSTIFY: &[&str] = &["start", "end", "center", "space-between", "space-around"];
const CAPTION_PLACEMENT: &[&str] = &["top", "bottom", "left", "right"];
const LOOK_AND_FEEL: &[&str] = &["flat", "skeuomorphic", "classic"];
const SLIDER_TYPE: &[&str] = &["auto", "linear-horizontal", "linear-vertical", "rotary"];

/// Catalogue entry.
struct PropertyDef {
    name: &'static str,
    kind: PropertyKind,
    inherited: bool,
}

const fn def(name: &'static str, kind: PropertyKind, inherited: bool) -> PropertyDef {
    PropertyDef { name, kind, inherited }
}

const CATALOGUE: &[PropertyDef] = &[
    // Colours
    def("color", PropertyKind::Colour, true),
    def("caption-color", PropertyKind::Colour, true),
    def("text-color", PropertyKind::Colour, true),
    def("tab-color", PropertyKind::Colour, true),
    def("tab-selected-color", PropertyKind::Colour, true),
    def("background-color", PropertyKind::Colour, false),
    def("border-color", PropertyKind::Colour, false),
    def("slider-thumb-color", PropertyKind::Colour, false),
    def("slider-track-color", PropertyKind::Colour, false),
    def("slider-fill-color", PropertyKind::Colour, false),
    def("button-on-color", PropertyKind::Colour, false),
    def("button-off-color", PropertyKind::Colour, false),
    def("meter-color", PropertyKind::Colour, false),
    def("plot-color", PropertyKind::Colour, false),
    def("plot-fill-color", PropertyKind::Colour, false),
    // Decorator
    def("margin", PropertyKind::Box, false),
    def("padding", PropertyKind::Box, false),
    def("border", PropertyKind::Box, false),
    def("radius", PropertyKind::Number, false),
    def("caption", PropertyKind::Text, false),
    def("caption-size", PropertyKind::Number, false),
    def("caption-placement", PropertyKind::Keyword(CAPTION_PLACEMENT), false),
    def("background-gradient", PropertyKind::Gradient, false),
    def("background-alpha", PropertyKind::Number, false),
    def("visibility", PropertyKind::Bool, false),
    // Text
    def("font-size", PropertyKind::Number, true),
    def("font-family", PropertyKind::Text, true),
    def("text", PropertyKind::Text, false),
    def("tooltip", PropertyKind::Text, false),
    def("source", PropertyKind::Text, false),
    def("look-and-feel", PropertyKind::Keyword(LOOK_AND_FEEL), true),
    def("slider-type", PropertyKind::Keyword(SLIDER_TYPE), false),
    // Layout
    def("display", PropertyKind::Keyword(DISPLAY), false),
    def("flex-direction", PropertyKind::Keyword(FLEX_DIRECTION), false),
    def("flex-wrap", PropertyKind::Keyword(FLEX_WRAP), false),
    def("flex-align-items", PropertyKind::Keyword(FLEX_ALIGN), false),
    def("flex-align-self", PropertyKind::Keyword(FLEX_ALIGN_SELF), false),
    def("flex-justify-content", PropertyKind::Keyword(FLEX_JUSTIFY), false),
    def("flex-grow", PropertyKind::Number, false),
    def("flex-shrink", PropertyKind::Number, false),
    def("flex-order", PropertyKind::Number, false),
    def("width", PropertyKind::Length, false),
    def("height", PropertyKind::Length, false),
    def("min-width", PropertyKind::Number, false),
    def("min-height", PropertyKind::Number, false),
    def("max-width", PropertyKind::Number, false),
    def("max-height", PropertyKind::Number, false),
    def("pos-x", PropertyKind::Length, false),
    def("pos-y", PropertyKind::Length, false),
    def("pos-width", PropertyKind::Length, false),
    def("pos-height", PropertyKind::Length, false),
    def("grid-columns", PropertyKind::Number, false),
    def("tab-height", PropertyKind::Number, false),
    def("size", PropertyKind::Number, false),
    // Class options
    def("recursive", PropertyKind::Bool, false),
    def("active", PropertyKind::Text, false),
    def("media-min-width", PropertyKind::Number, false),
    def("media-max-width", PropertyKind::Number, false),
    def("media-min-height", PropertyKind::Number, false),
    def("media-max-height", PropertyKind::Number, false),
];

/// Keys of a class body that configure the class instead of styling nodes.
pub const CLASS_OPTIONS: &[&str] = &[
    "recursive",
    "active",
    "media-min-width",
    "media-max-width",
    "media-min-height",
    "media-max-height",
];

fn lookup(name: &str) -> Option<&'static PropertyDef> {
    CATALOGUE.iter().find(|d| d.name == name)
}

/// The kind of a catalogued property, `None` for custom properties.
pub fn kind_of(name: &str) -> Option<PropertyKind> {
    lookup(name).map(|d| d.kind)
}

/// Whether unset values of this property fall through to ancestors.
pub fn is_inherited(name: &str) -> bool {
    lookup(name).is_some_and(|d| d.inherited)
}

/// Whether `name` is a class option rather than a style property.
pub fn is_class_option(name: &str) -> bool {
    CLASS_OPTIONS.contains(&name)
}

/// Built-in default of a property, used when nothing in the cascade sets it.
pub fn default_value(name: &str) -> Option<PropertyValue> {
    let num = |n: f64| Some(PropertyValue::Number(n));
    let kw = |s: &str| Some(PropertyValue::Text(s.to_owned()));
    let colour = |r, g, b| Some(PropertyValue::Colour(Colour::rgb(r, g, b)));
    match name {
        "margin" | "padding" | "radius" => num(5.0),
        "border" => num(0.0),
        "caption-size" => num(20.0),
        "caption-placement" => kw("top"),
        "background-color" => colour(169, 169, 169),
        "border-color" => colour(192, 192, 192),
        "color" | "caption-color" | "text-color" => colour(255, 255, 255),
        "tab-color" => colour(64, 64, 64),
        "tab-selected-color" => colour(96, 96, 96),
        "slider-thumb-color" | "button-on-color" | "meter-color" | "plot-color" => {
            colour(255, 69, 0)
        }
        "slider-track-color" | "button-off-color" => colour(64, 64, 64),
        "slider-fill-color" | "plot-fill-color" => colour(255, 165, 0),
        "background-alpha" => num(1.0),
        "visibility" => Some(PropertyValue::Bool(true)),
        "font-size" => num(12.0),
        "font-family" => kw("sans-serif"),
        "look-and-feel" => kw("flat"),
        "slider-type" => kw("auto"),
        "display" => kw("flexbox"),
        "flex-direction" => kw("row"),
        "flex-wrap" => kw("nowrap"),
        "flex-align-items" => kw("stretch"),
        "flex-align-self" => kw("auto"),
        "flex-justify-content" => kw("start"),
        "flex-grow" | "flex-shrink" => num(1.0),
        "flex-order" | "min-width" | "min-height" | "pos-x" | "pos-y" => num(0.0),
        "pos-width" | "pos-height" => Some(PropertyValue::Percent(100.0)),
        "grid-columns" => num(2.0),
        "tab-height" => num(30.0),
        _ => None,
    }
}

fn invalid(property: &str, message: impl Into<String>) -> PropertyError {
    PropertyError::InvalidValue { property: property.to_owned(), message: message.into() }
}

/// Coerce raw declaration values into the typed value of `property`.
pub fn coerce(property: &str, values: &[DeclarationValue]) -> Result<PropertyValue, PropertyError> {
    if values.is_empty() {
        return Err(invalid(property, "missing value"));
    }
    if let [DeclarationValue::Variable(name)] = values {
        return Ok(PropertyValue::Palette(name.clone()));
    }

    let Some(kind) = kind_of(property) else {
        return Ok(infer(values));
    };

    match kind {
        PropertyKind::Colour => match values {
            [DeclarationValue::Color(hex)] => Colour::from_hex(hex)
                .map(PropertyValue::Colour)
                .ok_or_else(|| invalid(property, format!("invalid hex colour #{hex}"))),
            [DeclarationValue::Ident(name)] | [DeclarationValue::String(name)] => {
                Colour::parse(name)
                    .map(PropertyValue::Colour)
                    .ok_or_else(|| invalid(property, format!("unknown colour '{name}'")))
            }
            _ => Err(invalid(property, "expected a colour")),
        },
        PropertyKind::Number => match values {
            [DeclarationValue::Number(n)] => Ok(PropertyValue::Number(*n)),
            _ => Err(invalid(property, "expected a number")),
        },
        PropertyKind::Length => match values {
            [DeclarationValue::Number(n)] => Ok(PropertyValue::Number(*n)),
            [DeclarationValue::Percent(n)] => Ok(PropertyValue::Percent(*n)),
            _ => Err(invalid(property, "expected a number or a percentage")),
        },
        PropertyKind::Box => {
            let numbers = values
                .iter()
                .map(|v| match v {
                    DeclarationValue::Number(n) => Ok(*n),
                    _ => Err(invalid(property, "expected numbers")),
                })
                .collect::<Result<Vec<f64>, _>>()?;
            match numbers.len() {
                1 => Ok(PropertyValue::Number(numbers[0])),
                2..=4 => Ok(PropertyValue::List(numbers)),
                n => Err(invalid(property, format!("expected 1-4 values, got {n}"))),
            }
        }
        PropertyKind::Bool => match values {
            [DeclarationValue::Ident(s)] if s == "true" => Ok(PropertyValue::Bool(true)),
            [DeclarationValue::Ident(s)] if s == "false" => Ok(PropertyValue::Bool(false)),
            [DeclarationValue::Number(n)] => Ok(PropertyValue::Bool(*n != 0.0)),
            _ => Err(invalid(property, "expected true or false")),
        },
        PropertyKind::Keyword(allowed) => match values {
            [DeclarationValue::Ident(s)] | [DeclarationValue::String(s)]
                if allowed.contains(&s.as_str()) =>
            {
                Ok(PropertyValue::Text(s.clone()))
            }
            _ => Err(invalid(property, format!("expected one of {}", allowed.join(", ")))),
        },
        PropertyKind::Gradient => match values {
            [DeclarationValue::Function(text)] | [DeclarationValue::String(text)] => {
                Gradient::parse(text)
                    .map(PropertyValue::Gradient)
                    .ok_or_else(|| invalid(property, format!("invalid gradient '{text}'")))
            }
            _ => Err(invalid(property, "expected a gradient")),
        },
        PropertyKind::Text => Ok(PropertyValue::Text(join_text(values))),
    }
}

/// Coerce a plain text value (as found in a tree description).
///
/// Text properties keep the string verbatim; everything else goes through
/// the stylesheet value grammar.
pub fn coerce_text(property: &str, text: &str) -> Result<PropertyValue, PropertyError> {
    match kind_of(property) {
        Some(PropertyKind::Text) => Ok(PropertyValue::Text(text.to_owned())),
        Some(_) => {
            let values = parse_values(text).map_err(|e| invalid(property, e.to_string()))?;
            coerce(property, &values)
        }
        None => match parse_values(text) {
            Ok(values) if values.len() == 1 || all_numbers(&values) && !values.is_empty() => {
                Ok(infer(&values))
            }
            _ => Ok(PropertyValue::Text(text.to_owned())),
        },
    }
}

fn all_numbers(values: &[DeclarationValue]) -> bool {
    values.iter().all(|v| matches!(v, DeclarationValue::Number(_)))
}

/// Best-effort typing of a custom property.
fn infer(values: &[DeclarationValue]) -> PropertyValue {
    match values {
        [DeclarationValue::Number(n)] => PropertyValue::Number(*n),
        [DeclarationValue::Percent(n)] => PropertyValue::Percent(*n),
        [DeclarationValue::Color(hex)] => Colour::from_hex(hex)
            .map(PropertyValue::Colour)
            .unwrap_or_else(|| PropertyValue::Text(format!("#{hex}"))),
        [DeclarationValue::Variable(name)] => PropertyValue::Palette(name.clone()),
        [DeclarationValue::Ident(s)] if s == "true" => PropertyValue::Bool(true),
        [DeclarationValue::Ident(s)] if s == "false" => PropertyValue::Bool(false),
        [DeclarationValue::Function(text)] => Gradient::parse(text)
            .map(PropertyValue::Gradient)
            .unwrap_or_else(|| PropertyValue::Text(text.clone())),
        _ if values.len() > 1 && all_numbers(values) => PropertyValue::List(
            values
                .iter()
                .filter_map(|v| match v {
                    DeclarationValue::Number(n) => Some(*n),
                    _ => None,
                })
                .collect(),
        ),
        _ => PropertyValue::Text(join_text(values)),
    }
}

fn join_text(values: &[DeclarationValue]) -> String {
    values
        .iter()
        .map(|v| match v {
            DeclarationValue::Ident(s) | DeclarationValue::String(s) => s.clone(),
            DeclarationValue::Number(n) => n.to_string(),
            DeclarationValue::Percent(n) => format!("{n}%"),
            DeclarationValue::Color(hex) => format!("#{hex}"),
            DeclarationValue::Variable(name) => format!("${name}"),
            DeclarationValue::Function(text) => text.clone(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::value::GradientKind;

    fn ident(s: &str) -> DeclarationValue {
        DeclarationValue::Ident(s.into())
    }

    // ── Catalogue ────────────────────────────────────────────────────

    #[test]
    fn inherited_properties() {
        assert!(is_inherited("color"));
        assert!(is_inherited("font-size"));
        assert!(is_inherited("look-and-feel"));
        assert!(!is_inherited("margin"));
        assert!(!is_inherited("size"));
        assert!(!is_inherited("custom-thing"));
    }

    #[test]
    fn documented_defaults() {
        assert_eq!(default_value("margin"), Some(PropertyValue::Number(5.0)));
        assert_eq!(default_value("padding"), Some(PropertyValue::Number(5.0)));
        assert_eq!(default_value("border"), Some(PropertyValue::Number(0.0)));
        assert_eq!(default_value("caption-size"), Some(PropertyValue::Number(20.0)));
        assert_eq!(default_value("display"), Some(PropertyValue::Text("flexbox".into())));
        assert_eq!(default_value("pos-width"), Some(PropertyValue::Percent(100.0)));
        assert_eq!(default_value("size"), None);
    }

    #[test]
    fn every_default_coerces_back() {
        for def in CATALOGUE {
            if let Some(value) = default_value(def.name) {
                let text = value.to_text();
                assert_eq!(
                    coerce_text(def.name, &text),
                    Ok(value),
                    "default of {} does not round-trip",
                    def.name
                );
            }
        }
    }

    // ── coerce ───────────────────────────────────────────────────────

    #[test]
    fn coerce_colours() {
        assert_eq!(
            coerce("color", &[ident("red")]),
            Ok(PropertyValue::Colour(Colour::rgb(255, 0, 0)))
        );
        assert_eq!(
            coerce("color", &[DeclarationValue::Color("00ff00".into())]),
            Ok(PropertyValue::Colour(Colour::rgb(0, 255, 0)))
        );
        assert!(coerce("color", &[ident("notacolour")]).is_err());
        assert!(coerce("color", &[DeclarationValue::Number(1.0)]).is_err());
    }

    #[test]
    fn coerce_palette_reference_for_any_kind() {
        assert_eq!(
            coerce("background-color", &[DeclarationValue::Variable("panel".into())]),
            Ok(PropertyValue::Palette("panel".into()))
        );
    }

    #[test]
    fn coerce_box_shorthand() {
        assert_eq!(
            coerce("margin", &[DeclarationValue::Number(3.0)]),
            Ok(PropertyValue::Number(3.0))
        );
        assert_eq!(
            coerce("padding", &[DeclarationValue::Number(1.0), DeclarationValue::Number(2.0)]),
            Ok(PropertyValue::List(vec![1.0, 2.0]))
        );
        assert!(coerce("margin", &vec![DeclarationValue::Number(1.0); 5]).is_err());
        assert!(coerce("margin", &[ident("auto")]).is_err());
    }

    #[test]
    fn coerce_keywords() {
        assert_eq!(
            coerce("flex-direction", &[ident("column")]),
            Ok(PropertyValue::Text("column".into()))
        );
        assert!(coerce("flex-direction", &[ident("diagonal")]).is_err());
    }

    #[test]
    fn coerce_lengths_and_bools() {
        assert_eq!(
            coerce("pos-x", &[DeclarationValue::Percent(25.0)]),
            Ok(PropertyValue::Percent(25.0))
        );
        assert_eq!(coerce("visibility", &[ident("false")]), Ok(PropertyValue::Bool(false)));
        assert!(coerce("visibility", &[ident("maybe")]).is_err());
    }

    #[test]
    fn coerce_gradient() {
        let value = coerce(
            "background-gradient",
            &[DeclarationValue::Function("linear-gradient(45, red 0, blue 1)".into())],
        )
        .unwrap();
        match value {
            PropertyValue::Gradient(g) => assert_eq!(g.kind, GradientKind::Linear { angle: 45.0 }),
            other => panic!("expected gradient, got {other:?}"),
        }
    }

    #[test]
    fn coerce_text_joins_tokens() {
        assert_eq!(
            coerce("caption", &[ident("Main"), ident("Out")]),
            Ok(PropertyValue::Text("Main Out".into()))
        );
    }

    // ── coerce_text ──────────────────────────────────────────────────

    #[test]
    fn coerce_text_keeps_text_properties_verbatim() {
        assert_eq!(
            coerce_text("caption", "Gain (dB)!"),
            Ok(PropertyValue::Text("Gain (dB)!".into()))
        );
    }

    #[test]
    fn coerce_text_parses_typed_properties() {
        assert_eq!(coerce_text("margin", "2 4"), Ok(PropertyValue::List(vec![2.0, 4.0])));
        assert_eq!(
            coerce_text("color", "#0000ff"),
            Ok(PropertyValue::Colour(Colour::rgb(0, 0, 255)))
        );
        assert!(coerce_text("flex-grow", "lots").is_err());
    }

    #[test]
    fn coerce_text_infers_custom_properties() {
        assert_eq!(coerce_text("my-number", "7"), Ok(PropertyValue::Number(7.0)));
        assert_eq!(coerce_text("my-list", "1 2"), Ok(PropertyValue::List(vec![1.0, 2.0])));
        assert_eq!(coerce_text("my-flag", "true"), Ok(PropertyValue::Bool(true)));
        assert_eq!(
            coerce_text("my-label", "hello world"),
            Ok(PropertyValue::Text("hello world".into()))
        );
        assert_eq!(coerce_text("my-word", "hello"), Ok(PropertyValue::Text("hello".into())));
    }
}
