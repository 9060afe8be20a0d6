//! Stylesheet AST: selectors, declarations, rule blocks, palettes.

use crate::dom::node::{InteractionState, StateSet};

/// What a selector matches on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SelectorTarget {
    /// Node type tag (e.g. `Slider`).
    Type(String),
    /// Style class: `.knob`.
    Class(String),
    /// Node id: `#gain`.
    Id(String),
}

/// A selector: one target plus the interaction states it requires.
///
/// `.knob:hover` is `Class("knob")` with `{hover}`; it only matches while the
/// node is hovered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    pub target: SelectorTarget,
    pub states: StateSet,
}

impl Selector {
    pub fn new(target: SelectorTarget) -> Self {
        Self { target, states: StateSet::empty() }
    }

    /// Require an interaction state (builder).
    pub fn with_state(mut self, state: InteractionState) -> Self {
        self.states.insert(state);
        self
    }

    /// Whether this is a state variant.
    pub fn is_state_variant(&self) -> bool {
        !self.states.is_empty()
    }
}

/// A value token within a declaration, before it is coerced to a
/// [`PropertyValue`](crate::css::value::PropertyValue).
#[derive(Debug, Clone, PartialEq)]
pub enum DeclarationValue {
    /// An identifier like `red`, `column`, `true`.
    Ident(String),
    /// A bare number like `10`, `3.14`.
    Number(f64),
    /// A percentage like `50%` (stored as `50.0`).
    Percent(f64),
    /// A hex colour string (without the `#` prefix), e.g. `"ff00aa"`.
    Color(String),
    /// A quoted string value.
    String(String),
    /// A palette reference (without the `$` prefix).
    Variable(String),
    /// A function call kept as source text, e.g. `linear-gradient(90, red 0, blue 1)`.
    Function(String),
}

/// A single property declaration, e.g. `color: red` or `margin: 1 2`.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub property: String,
    pub values: Vec<DeclarationValue>,
}

impl Declaration {
    pub fn new(property: impl Into<String>, values: Vec<DeclarationValue>) -> Self {
        Self { property: property.into(), values }
    }
}

/// A rule block: selectors, an optional `extends` base, and declarations.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleBlock {
    pub selectors: Vec<Selector>,
    /// Base class named by `.derived extends base { }`.
    pub extends: Option<String>,
    pub declarations: Vec<Declaration>,
}

/// `@palette name { key: colour; }`
#[derive(Debug, Clone, PartialEq)]
pub struct PaletteBlock {
    pub name: String,
    pub declarations: Vec<Declaration>,
}

/// One top-level item of a stylesheet document.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Rule(RuleBlock),
    Palette(PaletteBlock),
}

/// A parsed stylesheet document, in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleDocument {
    pub items: Vec<Item>,
}
