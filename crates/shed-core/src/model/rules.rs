use crate::model::rank::Rank;

/// Special effect a rank can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ability {
    /// Wild: the next play is unconstrained by rank.
    Reset,
    /// Skipped when determining the effective top card.
    Invisible,
    /// While on top, only ranks at or below it may follow.
    ConstrainLower,
    /// Clears the play stack into the discard pile.
    Burn,
}

/// Bit-mask over the 13 ranks (bit 0 = Two .. bit 12 = Ace).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RankMask(u16);

impl RankMask {
    pub const EMPTY: Self = Self(0);
    pub const ALL: Self = Self((1 << 13) - 1);

    pub const fn contains(self, rank: Rank) -> bool {
        self.0 & (1 << (rank.value() - 2)) != 0
    }

    pub const fn with(self, rank: Rank) -> Self {
        Self(self.0 | (1 << (rank.value() - 2)))
    }

    /// Mask of every rank up to and including `max`.
    pub const fn up_to(max: Rank) -> Self {
        Self((1 << (max.value() - 1)) - 1)
    }
}

/// One catalog entry: the ability, the ranks it may be played onto, and
/// whether its effect fires the instant it is played.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbilityRule {
    pub ability: Ability,
    pub playable_on: RankMask,
    pub immediate: bool,
}

impl AbilityRule {
    pub const fn new(ability: Ability, playable_on: RankMask, immediate: bool) -> Self {
        Self {
            ability,
            playable_on,
            immediate,
        }
    }
}

/// Immutable mapping from ranks to their special abilities. Passed by value
/// into every component that judges legality; never ambient state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleCatalog {
    rules: [Option<AbilityRule>; 13],
}

impl RuleCatalog {
    pub const fn empty() -> Self {
        Self { rules: [None; 13] }
    }

    /// The standard rule set: 2 resets, 3 is invisible, 7 constrains lower,
    /// 10 burns immediately.
    pub fn standard() -> Self {
        Self::empty()
            .with_rule(
                Rank::Two,
                AbilityRule::new(Ability::Reset, RankMask::ALL, false),
            )
            .with_rule(
                Rank::Three,
                AbilityRule::new(Ability::Invisible, RankMask::ALL, false),
            )
            .with_rule(
                Rank::Seven,
                AbilityRule::new(Ability::ConstrainLower, RankMask::up_to(Rank::Seven), false),
            )
            .with_rule(
                Rank::Ten,
                AbilityRule::new(Ability::Burn, RankMask::ALL, true),
            )
    }

    pub fn with_rule(mut self, rank: Rank, rule: AbilityRule) -> Self {
        self.rules[(rank.value() - 2) as usize] = Some(rule);
        self
    }

    pub fn rule(&self, rank: Rank) -> Option<&AbilityRule> {
        self.rules[(rank.value() - 2) as usize].as_ref()
    }

    pub fn ability(&self, rank: Rank) -> Option<Ability> {
        self.rule(rank).map(|rule| rule.ability)
    }

    pub fn is_ability_rank(&self, rank: Rank) -> bool {
        self.rule(rank).is_some()
    }

    pub fn is_invisible(&self, rank: Rank) -> bool {
        matches!(self.ability(rank), Some(Ability::Invisible))
    }

    /// Whether `candidate` is legal against `effective_top`, the first
    /// non-invisible rank from the top of the stack (None when the stack is
    /// empty or entirely invisible).
    pub fn can_play(&self, candidate: Rank, effective_top: Option<Rank>) -> bool {
        let Some(top) = effective_top else {
            return true;
        };

        if let Some(rule) = self.rule(candidate) {
            return rule.playable_on.contains(top);
        }

        if let Some(rule) = self.rule(top) {
            return match rule.ability {
                Ability::ConstrainLower => candidate <= top,
                // Invisible tops are filtered out by the effective-top scan;
                // Reset and an un-burned Burn impose no rank constraint.
                Ability::Reset | Ability::Invisible | Ability::Burn => true,
            };
        }

        candidate >= top
    }
}

impl Default for RuleCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
