//! Cascade resolution: from a node, its ancestors and a stylesheet to the
//! node's effective property values.

use std::collections::{BTreeMap, BTreeSet};

use crate::css::model::SelectorTarget;
use crate::css::properties::{default_value, is_inherited};
use crate::css::specificity::Specificity;
use crate::css::stylesheet::{Rule, Stylesheet};
use crate::css::value::{Colour, PropertyValue};
use crate::dom::node::NodeData;
use crate::error::Diagnostic;
use crate::geometry::Size;

/// Conditions classes are filtered by: the editor size and the UI flags
/// that are currently on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CascadeEnv {
    pub media: Size,
    pub flags: BTreeSet<String>,
}

impl CascadeEnv {
    pub fn new(media: Size) -> Self {
        Self { media, flags: BTreeSet::new() }
    }

    /// Turn a UI flag on (builder).
    pub fn with_flag(mut self, flag: impl Into<String>) -> Self {
        self.flags.insert(flag.into());
        self
    }

    /// Turn a UI flag on or off. Returns `true` if it changed.
    pub fn set_flag(&mut self, flag: &str, on: bool) -> bool {
        if on {
            self.flags.insert(flag.to_owned())
        } else {
            self.flags.remove(flag)
        }
    }
}

/// The effective properties of one node.
///
/// Only values set somewhere in the cascade are stored; [`get`](Self::get)
/// falls back to the built-in default for everything else.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedStyle {
    properties: BTreeMap<String, PropertyValue>,
    /// Properties of recursive classes on this node and its ancestors, handed
    /// down to descendants.
    propagated: BTreeMap<String, PropertyValue>,
    diagnostics: Vec<Diagnostic>,
}

impl ResolvedStyle {
    /// The effective value: cascaded, or the built-in default.
    pub fn get(&self, property: &str) -> Option<PropertyValue> {
        self.properties.get(property).cloned().or_else(|| default_value(property))
    }

    /// The cascaded value only, `None` if nothing set it.
    pub fn declared(&self, property: &str) -> Option<&PropertyValue> {
        self.properties.get(property)
    }

    pub fn number(&self, property: &str) -> Option<f32> {
        self.get(property).and_then(|v| v.as_f32())
    }

    pub fn number_or(&self, property: &str, fallback: f32) -> f32 {
        self.number(property).unwrap_or(fallback)
    }

    pub fn colour(&self, property: &str) -> Option<Colour> {
        self.get(property).and_then(|v| v.as_colour())
    }

    pub fn text(&self, property: &str) -> Option<String> {
        self.get(property).and_then(|v| v.as_text().map(str::to_owned))
    }

    pub fn flag(&self, property: &str) -> bool {
        self.get(property).and_then(|v| v.as_bool()).unwrap_or(false)
    }

    /// Whether the node takes part in layout and painting.
    pub fn is_visible(&self) -> bool {
        self.get("visibility").and_then(|v| v.as_bool()).unwrap_or(true)
    }

    /// Cascaded properties in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Problems met while resolving this node.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

/// Resolve `node` given its ancestors, nearest first.
///
/// Ancestors are resolved from the root down so that inherited and
/// recursive-class values reach `node`. Pure: the same inputs always give
/// the same result.
pub fn resolve(
    node: &NodeData,
    sheet: &Stylesheet,
    ancestors: &[&NodeData],
    env: &CascadeEnv,
) -> ResolvedStyle {
    let mut parent: Option<ResolvedStyle> = None;
    for ancestor in ancestors.iter().rev() {
        parent = Some(resolve_with_parent(ancestor, sheet, parent.as_ref(), env));
    }
    resolve_with_parent(node, sheet, parent.as_ref(), env)
}

/// Resolve `node` given the already resolved style of its parent.
pub fn resolve_with_parent(
    node: &NodeData,
    sheet: &Stylesheet,
    parent: Option<&ResolvedStyle>,
    env: &CascadeEnv,
) -> ResolvedStyle {
    let mut style = ResolvedStyle::default();

    // Lowest tiers: recursive classes of ancestors, then inherited values.
    if let Some(parent) = parent {
        style.properties = parent.propagated.clone();
        style.propagated = parent.propagated.clone();
        for (property, value) in &parent.properties {
            if is_inherited(property) {
                style.properties.insert(property.clone(), value.clone());
            }
        }
    }

    let mut matched: Vec<(Specificity, &Rule)> = Vec::new();
    let tag = node.node_type.tag();

    for rule in sheet.type_rules() {
        if matches!(&rule.selector.target, SelectorTarget::Type(t) if t == tag)
            && node.states.contains_all(rule.selector.states)
        {
            let spec = if rule.selector.is_state_variant() {
                Specificity::state_rule(0, rule.source_order)
            } else {
                Specificity::type_rule(rule.source_order)
            };
            matched.push((spec, rule));
        }
    }

    let mut missing = Vec::new();
    let classes = sheet.expand_classes(&node.classes, env, &mut missing);
    for name in missing {
        style.diagnostics.push(
            Diagnostic::unresolved(format!("unknown class '{name}'")).for_node(node.id.clone()),
        );
    }
    for (position, class) in (0u32..).zip(classes.iter()) {
        for rule in &class.rules {
            if !node.states.contains_all(rule.selector.states) {
                continue;
            }
            let spec = if rule.selector.is_state_variant() {
                Specificity::state_rule(position + 1, rule.source_order)
            } else {
                if class.recursive {
                    for (property, value) in &rule.declarations {
                        style.propagated.insert(property.clone(), value.clone());
                    }
                }
                Specificity::class_rule(position, rule.source_order)
            };
            matched.push((spec, rule));
        }
    }

    for rule in sheet.id_rules() {
        if matches!(&rule.selector.target, SelectorTarget::Id(id) if *id == node.id)
            && node.states.contains_all(rule.selector.states)
        {
            let states = rule.selector.states.len() as u32;
            matched.push((Specificity::id_rule(states, rule.source_order), rule));
        }
    }

    matched.sort_by_key(|(spec, _)| *spec);
    for (_, rule) in &matched {
        for (property, value) in &rule.declarations {
            style.properties.insert(property.clone(), value.clone());
        }
    }
    for (property, value) in &node.properties {
        style.properties.insert(property.clone(), value.clone());
    }

    resolve_palette_references(&mut style.properties, &mut style.diagnostics, sheet, &node.id);
    resolve_palette_references(&mut style.propagated, &mut Vec::new(), sheet, &node.id);
    style
}

/// Replace `$name` values by palette colours. Unknown names are removed, so
/// the property falls back to its default.
fn resolve_palette_references(
    properties: &mut BTreeMap<String, PropertyValue>,
    diagnostics: &mut Vec<Diagnostic>,
    sheet: &Stylesheet,
    node_id: &str,
) {
    properties.retain(|property, value| {
        let PropertyValue::Palette(name) = value else {
            return true;
        };
        match sheet.palette_colour(name) {
            Some(colour) => {
                *value = PropertyValue::Colour(colour);
                true
            }
            None => {
                diagnostics.push(
                    Diagnostic::unresolved(format!("'{property}' references unknown palette colour '${name}'"))
                        .for_node(node_id),
                );
                false
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::node::{InteractionState, NodeType};
    use crate::error::DiagnosticKind;
    use pretty_assertions::assert_eq;

    fn sheet(text: &str) -> Stylesheet {
        Stylesheet::parse(text).unwrap_or_else(|e| panic!("parse failed: {e}"))
    }

    fn env() -> CascadeEnv {
        CascadeEnv::new(Size::new(600.0, 400.0))
    }

    fn slider(id: &str) -> NodeData {
        NodeData::new(NodeType::Slider, id)
    }

    fn num(n: f64) -> Option<PropertyValue> {
        Some(PropertyValue::Number(n))
    }

    // ── Tiers ────────────────────────────────────────────────────────

    #[test]
    fn defaults_when_nothing_matches() {
        let style = resolve(&slider("a"), &Stylesheet::new(), &[], &env());
        assert_eq!(style.get("margin"), num(5.0));
        assert_eq!(style.colour("background-color"), Some(Colour::rgb(169, 169, 169)));
        assert_eq!(style.declared("margin"), None);
        assert!(style.is_visible());
    }

    #[test]
    fn class_beats_type_and_id_beats_class() {
        let s = sheet("#a { size: 3; } .knob { size: 2; } Slider { size: 1; }");
        let plain = resolve(&slider("b"), &s, &[], &env());
        assert_eq!(plain.get("size"), num(1.0));

        let classed = resolve(&slider("b").with_class("knob"), &s, &[], &env());
        assert_eq!(classed.get("size"), num(2.0));

        let with_id = resolve(&slider("a").with_class("knob"), &s, &[], &env());
        assert_eq!(with_id.get("size"), num(3.0));
    }

    #[test]
    fn node_properties_beat_everything() {
        let s = sheet("#a { size: 3; }");
        let node = slider("a").with_property("size", PropertyValue::Number(9.0));
        assert_eq!(resolve(&node, &s, &[], &env()).get("size"), num(9.0));
    }

    #[test]
    fn later_class_in_list_wins() {
        let s = sheet(".b { size: 2; } .a { size: 1; }");
        let ab = resolve(&slider("n").with_classes(["a", "b"]), &s, &[], &env());
        assert_eq!(ab.get("size"), num(2.0));
        let ba = resolve(&slider("n").with_classes(["b", "a"]), &s, &[], &env());
        assert_eq!(ba.get("size"), num(1.0));
    }

    #[test]
    fn extended_base_applies_before_derived() {
        let s = sheet(".knob { color: red; size: 10; } .big extends knob { size: 40; }");
        let style = resolve(&slider("n").with_class("big"), &s, &[], &env());
        assert_eq!(style.colour("color"), Some(Colour::rgb(255, 0, 0)));
        assert_eq!(style.get("size"), num(40.0));
    }

    #[test]
    fn state_variants_apply_only_in_state() {
        let s = sheet(".knob { color: red; } .knob:hover { color: blue; }");
        let node = slider("n").with_class("knob");
        let idle = resolve(&node, &s, &[], &env());
        assert_eq!(idle.colour("color"), Some(Colour::rgb(255, 0, 0)));
        let hovered = resolve(&node.with_state(InteractionState::Hover), &s, &[], &env());
        assert_eq!(hovered.colour("color"), Some(Colour::rgb(0, 0, 255)));
    }

    #[test]
    fn state_variant_beats_later_plain_class() {
        let s = sheet(".low:hover { size: 1; } .high { size: 2; }");
        let node = slider("n").with_classes(["low", "high"]).with_state(InteractionState::Hover);
        assert_eq!(resolve(&node, &s, &[], &env()).get("size"), num(1.0));
    }

    #[test]
    fn id_variant_with_more_states_wins() {
        let s = sheet("#n:hover:pressed { size: 2; } #n:hover { size: 1; }");
        let node = slider("n")
            .with_state(InteractionState::Hover)
            .with_state(InteractionState::Pressed);
        assert_eq!(resolve(&node, &s, &[], &env()).get("size"), num(2.0));
    }

    // ── Inheritance ──────────────────────────────────────────────────

    #[test]
    fn inheritable_properties_flow_down() {
        let s = sheet("View { color: red; margin: 9; }");
        let parent = NodeData::new(NodeType::View, "root");
        let style = resolve(&slider("child"), &s, &[&parent], &env());
        assert_eq!(style.colour("color"), Some(Colour::rgb(255, 0, 0)));
        assert_eq!(style.get("margin"), num(5.0));
    }

    #[test]
    fn nearest_ancestor_wins_inheritance() {
        let s = sheet("#outer { font-size: 20; } #inner { font-size: 14; }");
        let outer = NodeData::new(NodeType::View, "outer");
        let inner = NodeData::new(NodeType::View, "inner");
        let style = resolve(&slider("leaf"), &s, &[&inner, &outer], &env());
        assert_eq!(style.get("font-size"), num(14.0));
    }

    #[test]
    fn recursive_classes_reach_descendants() {
        let s = sheet(".panel { recursive: true; radius: 0; }");
        let root = NodeData::new(NodeType::View, "root").with_class("panel");
        let mid = NodeData::new(NodeType::View, "mid");
        let style = resolve(&slider("leaf"), &s, &[&mid, &root], &env());
        assert_eq!(style.get("radius"), num(0.0));
    }

    #[test]
    fn base_listed_after_its_extender_overrides_it() {
        let s = sheet(".knob { size: 10; } .big extends knob { size: 40; }");
        let later_base = slider("n").with_classes(["big", "knob"]);
        assert_eq!(resolve(&later_base, &s, &[], &env()).get("size"), num(10.0));
        let later_extender = slider("n").with_classes(["knob", "big"]);
        assert_eq!(resolve(&later_extender, &s, &[], &env()).get("size"), num(40.0));
    }

    // ── Environment ──────────────────────────────────────────────────

    #[test]
    fn media_and_flags_filter_classes() {
        let s = sheet(".compact { media-max-width: 400; margin: 2; } .lit { active: power; color: red; }");
        let node = slider("n").with_classes(["compact", "lit"]);

        let wide = resolve(&node, &s, &[], &env());
        assert_eq!(wide.get("margin"), num(5.0));
        assert_eq!(wide.colour("color"), Some(Colour::rgb(255, 255, 255)));

        let narrow = CascadeEnv::new(Size::new(300.0, 300.0)).with_flag("power");
        let style = resolve(&node, &s, &[], &narrow);
        assert_eq!(style.get("margin"), num(2.0));
        assert_eq!(style.colour("color"), Some(Colour::rgb(255, 0, 0)));
    }

    #[test]
    fn media_maximum_is_exclusive() {
        let s = sheet(".compact { media-max-width: 400; media-min-height: 300; margin: 2; }");
        let node = slider("n").with_class("compact");
        let at_max = CascadeEnv::new(Size::new(400.0, 300.0));
        assert_eq!(resolve(&node, &s, &[], &at_max).get("margin"), num(5.0));
        let below_max = CascadeEnv::new(Size::new(399.0, 300.0));
        assert_eq!(resolve(&node, &s, &[], &below_max).get("margin"), num(2.0));
    }

    // ── Palettes and diagnostics ─────────────────────────────────────

    #[test]
    fn palette_references_resolve() {
        let s = sheet("@palette p { accent: #ff8000; } Slider { color: $accent; border-color: $nope; }");
        let style = resolve(&slider("n"), &s, &[], &env());
        assert_eq!(style.colour("color"), Some(Colour::rgb(255, 128, 0)));
        assert_eq!(style.colour("border-color"), Some(Colour::rgb(192, 192, 192)));
        assert_eq!(style.diagnostics().len(), 1);
        assert_eq!(style.diagnostics()[0].kind, DiagnosticKind::UnresolvableReference);
    }

    #[test]
    fn unknown_class_is_reported_and_ignored() {
        let s = sheet(".knob { size: 2; }");
        let style = resolve(&slider("n").with_classes(["knobz", "knob"]), &s, &[], &env());
        assert_eq!(style.get("size"), num(2.0));
        assert_eq!(style.diagnostics()[0].node.as_deref(), Some("n"));
    }

    #[test]
    fn resolution_is_deterministic() {
        let s = sheet("Slider { size: 1; color: red; } .a { margin: 1 2; } .a:hover { size: 3; }");
        let node = slider("n").with_class("a").with_state(InteractionState::Hover);
        let first = resolve(&node, &s, &[], &env());
        let second = resolve(&node, &s, &[], &env());
        assert_eq!(first, second);
        assert_eq!(format!("{first:?}"), format!("{second:?}"));
    }
}
