//! Cascade ordering of matched rules.
//!
//! Every rule that applies to a node is ranked by a [`Specificity`] triple:
//!
//! ```text
//! (tier, rank, source_order)
//! ```
//!
//! Fields are ordered so that the derived `Ord` (lexicographic) gives the
//! cascade order. Rules are applied from lowest to highest; the last value
//! written for a property wins.
//!
//! - `tier`: the precedence tier (type < class < state variant < id < inline)
//! - `rank`: position inside the tier, e.g. the position of a class in the
//!   node's expanded class list
//! - `source_order`: declaration order in the stylesheet, the final tie-breaker

/// Precedence tiers, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    /// Plain type rules (`Slider { }`).
    Type,
    /// Plain class rules, in class-list order.
    Class,
    /// State variants (`Slider:hover`, `.knob:hover`) whose states are all active.
    ///
    /// Every active state variant outranks every plain class rule, so a hovered
    /// variant of an earlier class beats a later class without a state.
    State,
    /// The node's id rule and its state variants.
    Id,
    /// Properties declared on the node itself.
    Inline,
}

/// Cascade rank of one matched rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Specificity {
    pub tier: Tier,
    /// Position within the tier (class position, or number of required states
    /// for id variants). Higher wins.
    pub rank: u32,
    /// Declaration order in the stylesheet (later rules have higher values).
    pub source_order: u32,
}

impl Specificity {
    pub const fn new(tier: Tier, rank: u32, source_order: u32) -> Self {
        Self { tier, rank, source_order }
    }

    /// Specificity of a plain type rule.
    pub const fn type_rule(source_order: u32) -> Self {
        Self::new(Tier::Type, 0, source_order)
    }

    /// Specificity of a plain class rule whose class sits at `position` in
    /// the node's expanded class list.
    pub const fn class_rule(position: u32, source_order: u32) -> Self {
        Self::new(Tier::Class, position, source_order)
    }

    /// Specificity of a state variant. Type variants use rank 0; class
    /// variants use their class position plus one.
    pub const fn state_rule(rank: u32, source_order: u32) -> Self {
        Self::new(Tier::State, rank, source_order)
    }

    /// Specificity of an id rule; `states` is the number of states the
    /// variant requires (0 for the plain id rule).
    pub const fn id_rule(states: u32, source_order: u32) -> Self {
        Self::new(Tier::Id, states, source_order)
    }

    /// Node-declared properties: above every stylesheet rule.
    pub const fn inline() -> Self {
        Self::new(Tier::Inline, 0, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_dominates_rank_and_order() {
        let late_type = Specificity::type_rule(100);
        let early_class = Specificity::class_rule(0, 0);
        assert!(early_class > late_type);

        let late_class = Specificity::class_rule(9, 100);
        let early_state = Specificity::state_rule(0, 0);
        assert!(early_state > late_class);

        assert!(Specificity::id_rule(0, 0) > Specificity::state_rule(50, 50));
        assert!(Specificity::inline() > Specificity::id_rule(5, 1000));
    }

    #[test]
    fn rank_before_source_order() {
        // A later class in the class list wins even if declared earlier.
        let first_class_late_decl = Specificity::class_rule(0, 10);
        let second_class_early_decl = Specificity::class_rule(1, 2);
        assert!(second_class_early_decl > first_class_late_decl);
    }

    #[test]
    fn source_order_breaks_ties() {
        assert!(Specificity::class_rule(1, 5) > Specificity::class_rule(1, 4));
        assert_eq!(Specificity::class_rule(1, 5), Specificity::class_rule(1, 5));
    }

    #[test]
    fn sorting_matches_cascade_order() {
        let mut specs = vec![
            Specificity::inline(),
            Specificity::id_rule(0, 1),
            Specificity::type_rule(3),
            Specificity::state_rule(2, 0),
            Specificity::class_rule(1, 7),
        ];
        specs.sort();
        let tiers: Vec<Tier> = specs.iter().map(|s| s.tier).collect();
        assert_eq!(tiers, vec![Tier::Type, Tier::Class, Tier::State, Tier::Id, Tier::Inline]);
    }
}
