//! Typed property values: colours, gradients, numbers, text.
//!
//! [`PropertyValue`] is what node declarations, stylesheet rules and resolved
//! styles store. Every value has a canonical text form (`to_text`) that parses
//! back to the same value, which the description serializer relies on.

use std::fmt;

// ---------------------------------------------------------------------------
// Colour
// ---------------------------------------------------------------------------

/// An 8-bit RGBA colour.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Colour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Named colours accepted by the stylesheet and descriptions.
const NAMED_COLOURS: &[(&str, Colour)] = &[
    ("black", Colour::rgb(0, 0, 0)),
    ("white", Colour::rgb(255, 255, 255)),
    ("red", Colour::rgb(255, 0, 0)),
    ("green", Colour::rgb(0, 128, 0)),
    ("blue", Colour::rgb(0, 0, 255)),
    ("yellow", Colour::rgb(255, 255, 0)),
    ("orange", Colour::rgb(255, 165, 0)),
    ("purple", Colour::rgb(128, 0, 128)),
    ("grey", Colour::rgb(128, 128, 128)),
    ("gray", Colour::rgb(128, 128, 128)),
    ("darkgrey", Colour::rgb(169, 169, 169)),
    ("darkgray", Colour::rgb(169, 169, 169)),
    ("lightgrey", Colour::rgb(211, 211, 211)),
    ("silver", Colour::rgb(192, 192, 192)),
    ("orangered", Colour::rgb(255, 69, 0)),
    ("transparent", Colour::TRANSPARENT),
];

impl Colour {
    pub const TRANSPARENT: Colour = Colour { r: 0, g: 0, b: 0, a: 0 };

    /// Opaque colour from components.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa` (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let byte = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            3 => {
                let mut c = [0u8; 3];
                for (i, ch) in hex.chars().enumerate() {
                    let v = ch.to_digit(16)? as u8;
                    c[i] = v * 16 + v;
                }
                Some(Self::rgb(c[0], c[1], c[2]))
            }
            6 => Some(Self::rgb(byte(&hex[0..2])?, byte(&hex[2..4])?, byte(&hex[4..6])?)),
            8 => Some(Self::rgba(
                byte(&hex[0..2])?,
                byte(&hex[2..4])?,
                byte(&hex[4..6])?,
                byte(&hex[6..8])?,
            )),
            _ => None,
        }
    }

    /// Look up a named colour (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        NAMED_COLOURS
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, c)| *c)
    }

    /// Parse either a hex string or a colour name.
    pub fn parse(text: &str) -> Option<Self> {
        if text.starts_with('#') {
            Self::from_hex(text)
        } else {
            Self::from_name(text)
        }
    }

    /// The same colour with a different alpha.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Mix towards `other` by `amount` (0 keeps `self`, 1 gives `other`).
    pub fn interpolate(self, other: Colour, amount: f32) -> Colour {
        let t = amount.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Colour {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if self.a != 255 {
            write!(f, "{:02x}", self.a)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Gradient
// ---------------------------------------------------------------------------

/// Shape of a [`Gradient`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum GradientKind {
    /// Linear gradient along `angle` degrees (0 = bottom to top, clockwise).
    Linear { angle: f32 },
    /// Radial gradient from the centre outwards.
    Radial,
}

/// A colour gradient with two or more stops.
#[derive(Clone, Debug, PartialEq)]
pub struct Gradient {
    pub kind: GradientKind,
    /// `(position in 0..=1, colour)`, sorted by position.
    pub stops: Vec<(f32, Colour)>,
}

impl Gradient {
    /// Parse `linear-gradient(<angle>, <colour> <pos>, ...)` or
    /// `radial-gradient(<colour> <pos>, ...)`.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let (kind_name, rest) = text.split_once('(')?;
        let args = rest.strip_suffix(')')?;
        let mut parts = args.split(',').map(str::trim);

        let kind = match kind_name.trim() {
            "linear-gradient" => {
                let angle: f32 = parts.next()?.parse().ok()?;
                GradientKind::Linear { angle }
            }
            "radial-gradient" => GradientKind::Radial,
            _ => return None,
        };

        let mut stops = Vec::new();
        for part in parts {
            let mut words = part.split_whitespace();
            let colour = Colour::parse(words.next()?)?;
            let position: f32 = words.next()?.parse().ok()?;
            if words.next().is_some() {
                return None;
            }
            stops.push((position.clamp(0.0, 1.0), colour));
        }
        if stops.len() < 2 {
            return None;
        }
        stops.sort_by(|a, b| a.0.total_cmp(&b.0));
        Some(Self { kind, stops })
    }

    /// Colour at position `t` (0..=1) along the gradient.
    pub fn colour_at(&self, t: f32) -> Colour {
        let t = t.clamp(0.0, 1.0);
        let mut previous = self.stops[0];
        for &stop in &self.stops {
            if t <= stop.0 {
                let span = stop.0 - previous.0;
                if span <= f32::EPSILON {
                    return stop.1;
                }
                return previous.1.interpolate(stop.1, (t - previous.0) / span);
            }
            previous = stop;
        }
        previous.1
    }
}

impl fmt::Display for Gradient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            GradientKind::Linear { angle } => write!(f, "linear-gradient({angle}")?,
            GradientKind::Radial => write!(f, "radial-gradient(")?,
        }
        for (i, (pos, colour)) in self.stops.iter().enumerate() {
            let sep = match (self.kind, i) {
                (GradientKind::Radial, 0) => "",
                _ => ", ",
            };
            write!(f, "{sep}{colour} {pos}")?;
        }
        write!(f, ")")
    }
}

// ---------------------------------------------------------------------------
// PropertyValue
// ---------------------------------------------------------------------------

/// A typed property value.
#[derive(Clone, Debug, PartialEq)]
pub enum PropertyValue {
    Number(f64),
    /// A percentage, stored as written (`50%` is `Percent(50.0)`).
    Percent(f64),
    /// Box shorthand with two to four numbers (`margin: 2 4`).
    List(Vec<f64>),
    Bool(bool),
    Colour(Colour),
    Gradient(Gradient),
    Text(String),
    /// A `$name` palette reference, replaced during the cascade.
    Palette(String),
}

impl PropertyValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        self.as_number().map(|n| n as f32)
    }

    pub fn as_colour(&self) -> Option<Colour> {
        match self {
            PropertyValue::Colour(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_gradient(&self) -> Option<&Gradient> {
        match self {
            PropertyValue::Gradient(g) => Some(g),
            _ => None,
        }
    }

    /// Numbers of a box shorthand; a single number counts as a one-element list.
    pub fn as_numbers(&self) -> Option<Vec<f32>> {
        match self {
            PropertyValue::Number(n) => Some(vec![*n as f32]),
            PropertyValue::List(ns) => Some(ns.iter().map(|n| *n as f32).collect()),
            _ => None,
        }
    }

    /// Canonical text form.
    pub fn to_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Number(n) => write!(f, "{n}"),
            PropertyValue::Percent(n) => write!(f, "{n}%"),
            PropertyValue::List(ns) => {
                for (i, n) in ns.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{n}")?;
                }
                Ok(())
            }
            PropertyValue::Bool(b) => write!(f, "{b}"),
            PropertyValue::Colour(c) => write!(f, "{c}"),
            PropertyValue::Gradient(g) => write!(f, "{g}"),
            PropertyValue::Text(s) => write!(f, "{s}"),
            PropertyValue::Palette(name) => write!(f, "${name}"),
        }
    }
}

impl From<f64> for PropertyValue {
    fn from(n: f64) -> Self {
        PropertyValue::Number(n)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Bool(b)
    }
}

impl From<Colour> for PropertyValue {
    fn from(c: Colour) -> Self {
        PropertyValue::Colour(c)
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::Text(s.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colours() {
        assert_eq!(Colour::from_hex("#fff"), Some(Colour::rgb(255, 255, 255)));
        assert_eq!(Colour::from_hex("#ff8000"), Some(Colour::rgb(255, 128, 0)));
        assert_eq!(Colour::from_hex("ff800080"), Some(Colour::rgba(255, 128, 0, 128)));
        assert_eq!(Colour::from_hex("#ff80"), None);
        assert_eq!(Colour::from_hex("#gggggg"), None);
    }

    #[test]
    fn named_colours() {
        assert_eq!(Colour::parse("Red"), Some(Colour::rgb(255, 0, 0)));
        assert_eq!(Colour::parse("silver"), Some(Colour::rgb(192, 192, 192)));
        assert_eq!(Colour::parse("chartreuse-ish"), None);
    }

    #[test]
    fn colour_display_round_trips() {
        for c in [Colour::rgb(1, 2, 3), Colour::rgba(250, 128, 0, 7), Colour::TRANSPARENT] {
            assert_eq!(Colour::parse(&c.to_string()), Some(c));
        }
        assert_eq!(Colour::rgb(255, 0, 0).to_string(), "#ff0000");
    }

    #[test]
    fn colour_interpolate() {
        let black = Colour::rgb(0, 0, 0);
        let white = Colour::rgb(255, 255, 255);
        assert_eq!(black.interpolate(white, 0.0), black);
        assert_eq!(black.interpolate(white, 1.0), white);
        assert_eq!(black.interpolate(white, 0.5), Colour::rgb(128, 128, 128));
    }

    #[test]
    fn linear_gradient_parse_and_display() {
        let g = Gradient::parse("linear-gradient(90, red 0, #0000ff 1)").unwrap();
        assert_eq!(g.kind, GradientKind::Linear { angle: 90.0 });
        assert_eq!(g.stops.len(), 2);
        assert_eq!(g.to_string(), "linear-gradient(90, #ff0000 0, #0000ff 1)");
        assert_eq!(Gradient::parse(&g.to_string()), Some(g));
    }

    #[test]
    fn radial_gradient_sorts_stops() {
        let g = Gradient::parse("radial-gradient(white 1, black 0)").unwrap();
        assert_eq!(g.kind, GradientKind::Radial);
        assert_eq!(g.stops[0].0, 0.0);
        assert_eq!(g.colour_at(0.0), Colour::rgb(0, 0, 0));
        assert_eq!(g.colour_at(1.0), Colour::rgb(255, 255, 255));
        assert_eq!(Gradient::parse(&g.to_string()), Some(g));
    }

    #[test]
    fn gradient_needs_two_stops() {
        assert_eq!(Gradient::parse("linear-gradient(0, red 0)"), None);
        assert_eq!(Gradient::parse("conic-gradient(red 0, blue 1)"), None);
    }

    #[test]
    fn property_value_text_forms() {
        assert_eq!(PropertyValue::Number(5.0).to_text(), "5");
        assert_eq!(PropertyValue::Number(2.5).to_text(), "2.5");
        assert_eq!(PropertyValue::Percent(50.0).to_text(), "50%");
        assert_eq!(PropertyValue::List(vec![1.0, 2.0]).to_text(), "1 2");
        assert_eq!(PropertyValue::Palette("accent".into()).to_text(), "$accent");
        assert_eq!(PropertyValue::Bool(false).to_text(), "false");
    }

    #[test]
    fn numbers_accessor() {
        assert_eq!(PropertyValue::Number(3.0).as_numbers(), Some(vec![3.0]));
        assert_eq!(
            PropertyValue::List(vec![1.0, 2.0, 3.0]).as_numbers(),
            Some(vec![1.0, 2.0, 3.0])
        );
        assert_eq!(PropertyValue::Text("x".into()).as_numbers(), None);
    }
}
