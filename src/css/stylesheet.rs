//! Compiled stylesheet: type rules, named classes, id rules, palettes.
//!
//! A [`Stylesheet`] is compiled from a parsed [`StyleDocument`]. Declarations
//! are coerced to typed values once, at compile time; invalid declarations are
//! skipped and recorded as diagnostics. Every edit bumps the sheet's
//! generation so node style caches know to recompute.

use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::css::cascade::CascadeEnv;
use crate::css::model::{Declaration, Item, Selector, SelectorTarget, StyleDocument};
use crate::css::parser::{parse_stylesheet, ParseError};
use crate::css::properties::{coerce, is_class_option};
use crate::css::value::{Colour, PropertyValue};
use crate::dom::node::NodeType;
use crate::error::Diagnostic;
use crate::geometry::Size;

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

fn next_generation() -> u64 {
    NEXT_GENERATION.fetch_add(1, Ordering::Relaxed)
}

// ---------------------------------------------------------------------------
// Rules and classes
// ---------------------------------------------------------------------------

/// A compiled rule: one selector and its typed declarations.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub selector: Selector,
    /// Declarations in source order; later entries win.
    pub declarations: Vec<(String, PropertyValue)>,
    /// Position of the rule in the stylesheet.
    pub source_order: u32,
}

impl Rule {
    pub fn get(&self, property: &str) -> Option<&PropertyValue> {
        self.declarations.iter().rev().find(|(p, _)| p == property).map(|(_, v)| v)
    }

    fn set(&mut self, property: &str, value: PropertyValue) {
        self.declarations.retain(|(p, _)| p != property);
        self.declarations.push((property.to_owned(), value));
    }
}

/// Editor size range in which a class applies. Minimums are inclusive,
/// maximums exclusive; unset bounds are open.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MediaRange {
    pub min_width: Option<f32>,
    pub max_width: Option<f32>,
    pub min_height: Option<f32>,
    pub max_height: Option<f32>,
}

impl MediaRange {
    pub fn contains(&self, size: Size) -> bool {
        self.min_width.map_or(true, |m| size.width >= m)
            && self.max_width.map_or(true, |m| size.width < m)
            && self.min_height.map_or(true, |m| size.height >= m)
            && self.max_height.map_or(true, |m| size.height < m)
    }

    fn is_unbounded(&self) -> bool {
        *self == MediaRange::default()
    }
}

/// A named style class: its rules (plain and state variants) and options.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleClass {
    pub name: String,
    /// Base class whose rules apply first.
    pub extends: Option<String>,
    pub rules: Vec<Rule>,
    /// Descendants of a node with this class also receive its properties.
    pub recursive: bool,
    /// UI flag that must be on for the class to apply.
    pub active_flag: Option<String>,
    pub media: MediaRange,
}

impl StyleClass {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            extends: None,
            rules: Vec::new(),
            recursive: false,
            active_flag: None,
            media: MediaRange::default(),
        }
    }

    /// Whether the class applies under the current media size and UI flags.
    pub fn applies(&self, env: &CascadeEnv) -> bool {
        self.media.contains(env.media)
            && self.active_flag.as_ref().map_or(true, |flag| env.flags.contains(flag))
    }

    fn apply_option(&mut self, property: &str, value: &PropertyValue) {
        match property {
            "recursive" => self.recursive = value.as_bool().unwrap_or(false),
            "active" => self.active_flag = value.as_text().map(str::to_owned),
            "media-min-width" => self.media.min_width = value.as_f32(),
            "media-max-width" => self.media.max_width = value.as_f32(),
            "media-min-height" => self.media.min_height = value.as_f32(),
            "media-max-height" => self.media.max_height = value.as_f32(),
            _ => {}
        }
    }
}

/// A named set of colours referenced as `$name`.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    pub name: String,
    pub colours: Vec<(String, Colour)>,
}

impl Palette {
    pub fn get(&self, key: &str) -> Option<Colour> {
        self.colours.iter().rev().find(|(k, _)| k == key).map(|(_, c)| *c)
    }
}

// ---------------------------------------------------------------------------
// Stylesheet
// ---------------------------------------------------------------------------

/// A compiled stylesheet ready for cascade resolution.
#[derive(Debug, Clone)]
pub struct Stylesheet {
    type_rules: Vec<Rule>,
    classes: Vec<StyleClass>,
    class_index: HashMap<String, usize>,
    id_rules: Vec<Rule>,
    palettes: Vec<Palette>,
    active_palette: Option<String>,
    diagnostics: Vec<Diagnostic>,
    generation: u64,
    next_order: u32,
}

impl Default for Stylesheet {
    fn default() -> Self {
        Self::new()
    }
}

impl Stylesheet {
    /// An empty stylesheet: every node resolves to built-in defaults.
    pub fn new() -> Self {
        Self {
            type_rules: Vec::new(),
            classes: Vec::new(),
            class_index: HashMap::new(),
            id_rules: Vec::new(),
            palettes: Vec::new(),
            active_palette: None,
            diagnostics: Vec::new(),
            generation: next_generation(),
            next_order: 0,
        }
    }

    /// Parse and compile stylesheet text.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        Ok(Self::compile(&parse_stylesheet(text)?))
    }

    /// Compile a parsed document.
    pub fn compile(document: &StyleDocument) -> Self {
        let mut sheet = Self::new();

        for item in &document.items {
            match item {
                Item::Palette(block) => {
                    let mut palette = Palette { name: block.name.clone(), colours: Vec::new() };
                    for decl in &block.declarations {
                        match coerce("color", &decl.values) {
                            Ok(PropertyValue::Colour(c)) => {
                                palette.colours.push((decl.property.clone(), c));
                            }
                            _ => sheet.diagnostics.push(Diagnostic::invalid_property(format!(
                                "palette '{}': '{}' is not a colour",
                                block.name, decl.property
                            ))),
                        }
                    }
                    sheet.palettes.push(palette);
                }
                Item::Rule(block) => {
                    for selector in &block.selectors {
                        sheet.add_rule(selector, block.extends.as_deref(), &block.declarations);
                    }
                }
            }
        }

        if sheet.active_palette.is_none() {
            sheet.active_palette = sheet.palettes.first().map(|p| p.name.clone());
        }
        sheet.check_extends();
        sheet
    }

    fn add_rule(&mut self, selector: &Selector, extends: Option<&str>, declarations: &[Declaration]) {
        let plain_class = matches!(selector.target, SelectorTarget::Class(_))
            && !selector.is_state_variant();
        let mut rule = Rule {
            selector: selector.clone(),
            declarations: Vec::new(),
            source_order: self.next_order,
        };
        self.next_order += 1;

        let mut options = Vec::new();
        for decl in declarations {
            match coerce(&decl.property, &decl.values) {
                Ok(value) if is_class_option(&decl.property) => {
                    if plain_class {
                        options.push((decl.property.clone(), value));
                    } else {
                        self.diagnostics.push(Diagnostic::invalid_property(format!(
                            "'{}' is only valid in a plain class rule",
                            decl.property
                        )));
                    }
                }
                Ok(value) => rule.set(&decl.property, value),
                Err(e) => self.diagnostics.push(Diagnostic::invalid_property(e.to_string())),
            }
        }

        match &selector.target {
            SelectorTarget::Type(tag) => {
                if NodeType::from_tag(tag).is_none() {
                    self.diagnostics
                        .push(Diagnostic::unresolved(format!("unknown node type '{tag}'")));
                }
                self.type_rules.push(rule);
            }
            SelectorTarget::Id(_) => self.id_rules.push(rule),
            SelectorTarget::Class(name) => {
                let class = self.class_entry(name);
                if plain_class {
                    if let Some(base) = extends {
                        class.extends = Some(base.to_owned());
                    }
                    for (property, value) in &options {
                        class.apply_option(property, value);
                    }
                }
                class.rules.push(rule);
            }
        }
    }

    fn class_entry(&mut self, name: &str) -> &mut StyleClass {
        let index = match self.class_index.get(name) {
            Some(&i) => i,
            None => {
                self.classes.push(StyleClass::new(name));
                self.class_index.insert(name.to_owned(), self.classes.len() - 1);
                self.classes.len() - 1
            }
        };
        &mut self.classes[index]
    }

    /// Record diagnostics for unknown or cyclic `extends` links.
    fn check_extends(&mut self) {
        let mut found = Vec::new();
        for class in &self.classes {
            if let Some(base) = &class.extends {
                if !self.class_index.contains_key(base) {
                    found.push(Diagnostic::unresolved(format!(
                        "class '{}' extends unknown class '{base}'",
                        class.name
                    )));
                }
            }
            let mut chain = Vec::new();
            if !self.extension_chain(&class.name, &mut chain) {
                found.push(Diagnostic::unresolved(format!(
                    "class '{}' has a cyclic extends chain",
                    class.name
                )));
            }
        }
        self.diagnostics.extend(found);
    }

    /// Collect `name` and its bases, base-most first. Returns `false` on a
    /// cycle; the chain then holds the classes up to the repeat.
    fn extension_chain<'a>(&'a self, name: &str, chain: &mut Vec<&'a StyleClass>) -> bool {
        let mut seen = HashSet::new();
        let mut current = self.class(name);
        let mut reversed = Vec::new();
        let mut acyclic = true;
        while let Some(class) = current {
            if !seen.insert(class.name.as_str()) {
                acyclic = false;
                break;
            }
            reversed.push(class);
            current = class.extends.as_deref().and_then(|base| self.class(base));
        }
        chain.extend(reversed.into_iter().rev());
        acyclic
    }

    // -- Queries --------------------------------------------------------------

    /// Monotonic version; changes on every edit.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn type_rules(&self) -> &[Rule] {
        &self.type_rules
    }

    pub fn id_rules(&self) -> &[Rule] {
        &self.id_rules
    }

    pub fn classes(&self) -> &[StyleClass] {
        &self.classes
    }

    pub fn class(&self, name: &str) -> Option<&StyleClass> {
        self.class_index.get(name).map(|&i| &self.classes[i])
    }

    pub fn palettes(&self) -> &[Palette] {
        &self.palettes
    }

    pub fn active_palette(&self) -> Option<&str> {
        self.active_palette.as_deref()
    }

    /// Problems found while compiling.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Expand a node's class list: each class is preceded by its bases.
    ///
    /// Classes that do not exist or do not apply under `env` are skipped;
    /// a class reached twice keeps its last position, so a class listed
    /// after one that extends it still overrides it. Unknown names are
    /// reported through `missing`.
    pub fn expand_classes<'a>(
        &'a self,
        class_list: &[String],
        env: &CascadeEnv,
        missing: &mut Vec<String>,
    ) -> Vec<&'a StyleClass> {
        let mut expanded: Vec<&StyleClass> = Vec::new();
        for name in class_list {
            if self.class(name).is_none() {
                missing.push(name.clone());
                continue;
            }
            let mut chain = Vec::new();
            // Cycles are reported at compile time; the chain stops at the repeat.
            self.extension_chain(name, &mut chain);
            for class in chain {
                if class.applies(env) {
                    expanded.retain(|c| c.name != class.name);
                    expanded.push(class);
                }
            }
        }
        expanded
    }

    /// Resolve a `$name` reference: the active palette first, then the others
    /// in declaration order.
    pub fn palette_colour(&self, key: &str) -> Option<Colour> {
        let active = self
            .active_palette
            .as_deref()
            .and_then(|name| self.palettes.iter().find(|p| p.name == name));
        active
            .and_then(|p| p.get(key))
            .or_else(|| self.palettes.iter().find_map(|p| p.get(key)))
    }

    // -- Live edits -----------------------------------------------------------

    /// Select the palette `$name` references resolve against.
    ///
    /// Returns `false` if no palette has that name.
    pub fn set_active_palette(&mut self, name: &str) -> bool {
        if !self.palettes.iter().any(|p| p.name == name) {
            return false;
        }
        self.active_palette = Some(name.to_owned());
        self.generation = next_generation();
        true
    }

    /// Set a palette colour, creating the palette if needed.
    pub fn set_palette_colour(&mut self, palette: &str, key: &str, colour: Colour) {
        match self.palettes.iter_mut().find(|p| p.name == palette) {
            Some(p) => {
                p.colours.retain(|(k, _)| k != key);
                p.colours.push((key.to_owned(), colour));
            }
            None => {
                self.palettes.push(Palette {
                    name: palette.to_owned(),
                    colours: vec![(key.to_owned(), colour)],
                });
                if self.active_palette.is_none() {
                    self.active_palette = Some(palette.to_owned());
                }
            }
        }
        self.generation = next_generation();
    }

    /// Set a property on the plain rule of `selector`, creating the rule (and
    /// class) if needed.
    pub fn set_property(&mut self, selector: &Selector, property: &str, value: PropertyValue) {
        if let SelectorTarget::Class(name) = &selector.target {
            if !selector.is_state_variant() && is_class_option(property) {
                self.class_entry(name).apply_option(property, &value);
                self.generation = next_generation();
                return;
            }
        }

        let order = self.next_order;
        let rules = self.rules_for_mut(selector);
        let created = match rules.iter().rposition(|r| &r.selector == selector) {
            Some(i) => {
                rules[i].set(property, value);
                false
            }
            None => {
                let mut rule =
                    Rule { selector: selector.clone(), declarations: Vec::new(), source_order: order };
                rule.set(property, value);
                rules.push(rule);
                true
            }
        };
        if created {
            self.next_order += 1;
        }
        self.generation = next_generation();
    }

    /// Remove a property from every rule with exactly this selector.
    pub fn remove_property(&mut self, selector: &Selector, property: &str) {
        for rule in self.rules_for_mut(selector).iter_mut().filter(|r| &r.selector == selector) {
            rule.declarations.retain(|(p, _)| p != property);
        }
        self.generation = next_generation();
    }

    /// Declare or change the base of a class.
    pub fn set_extends(&mut self, class: &str, base: Option<&str>) {
        self.class_entry(class).extends = base.map(str::to_owned);
        self.generation = next_generation();
    }

    /// Remove a class and all its rules. Nodes naming it fall back to the
    /// remaining rules.
    pub fn remove_class(&mut self, name: &str) -> bool {
        let Some(index) = self.class_index.remove(name) else {
            return false;
        };
        self.classes.remove(index);
        for i in self.class_index.values_mut() {
            if *i > index {
                *i -= 1;
            }
        }
        self.generation = next_generation();
        true
    }

    fn rules_for_mut(&mut self, selector: &Selector) -> &mut Vec<Rule> {
        match &selector.target {
            SelectorTarget::Type(_) => &mut self.type_rules,
            SelectorTarget::Id(_) => &mut self.id_rules,
            SelectorTarget::Class(name) => &mut self.class_entry(name).rules,
        }
    }

    // -- Serialization --------------------------------------------------------

    /// Serialize back to stylesheet text.
    ///
    /// Palettes come first, then type rules, classes (plain rule with options
    /// first, then state variants) and id rules.
    pub fn to_css(&self) -> String {
        let mut out = String::new();

        for palette in &self.palettes {
            let _ = writeln!(out, "@palette {} {{", palette.name);
            for (key, colour) in &palette.colours {
                let _ = writeln!(out, "    {key}: {colour};");
            }
            out.push_str("}\n");
        }

        for rule in &self.type_rules {
            write_rule(&mut out, rule, None, &[]);
        }

        for class in &self.classes {
            let mut options: Vec<(&str, String)> = Vec::new();
            if class.recursive {
                options.push(("recursive", "true".into()));
            }
            if let Some(flag) = &class.active_flag {
                options.push(("active", flag.clone()));
            }
            if !class.media.is_unbounded() {
                let bounds = [
                    ("media-min-width", class.media.min_width),
                    ("media-max-width", class.media.max_width),
                    ("media-min-height", class.media.min_height),
                    ("media-max-height", class.media.max_height),
                ];
                for (key, bound) in bounds {
                    if let Some(v) = bound {
                        options.push((key, v.to_string()));
                    }
                }
            }

            let plain = class.rules.iter().position(|r| !r.selector.is_state_variant());
            match plain {
                Some(i) => write_rule(&mut out, &class.rules[i], class.extends.as_deref(), &options),
                None if class.extends.is_some() || !options.is_empty() => {
                    let empty = Rule {
                        selector: Selector::new(SelectorTarget::Class(class.name.clone())),
                        declarations: Vec::new(),
                        source_order: 0,
                    };
                    write_rule(&mut out, &empty, class.extends.as_deref(), &options);
                }
                None => {}
            }
            for (i, rule) in class.rules.iter().enumerate() {
                if Some(i) != plain {
                    write_rule(&mut out, rule, None, &[]);
                }
            }
        }

        for rule in &self.id_rules {
            write_rule(&mut out, rule, None, &[]);
        }

        out
    }
}

fn write_selector(out: &mut String, selector: &Selector) {
    match &selector.target {
        SelectorTarget::Type(name) => out.push_str(name),
        SelectorTarget::Class(name) => {
            out.push('.');
            out.push_str(name);
        }
        SelectorTarget::Id(name) => {
            out.push('#');
            out.push_str(name);
        }
    }
    for state in selector.states.iter() {
        out.push(':');
        out.push_str(state.name());
    }
}

fn write_rule(out: &mut String, rule: &Rule, extends: Option<&str>, options: &[(&str, String)]) {
    write_selector(out, &rule.selector);
    if let Some(base) = extends {
        let _ = write!(out, " extends {base}");
    }
    out.push_str(" {\n");
    for (key, value) in options {
        let _ = writeln!(out, "    {key}: {value};");
    }
    for (property, value) in &rule.declarations {
        let text = match value {
            PropertyValue::Text(s) => format!("\"{s}\""),
            other => other.to_text(),
        };
        let _ = writeln!(out, "    {property}: {text};");
    }
    out.push_str("}\n");
}
