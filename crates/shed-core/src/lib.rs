pub mod game;
pub mod model;

pub use game::engine::{GameError, GamePhase, GameState, PlayOutcome, RosterError, RuleViolation};
pub use model::action::{Action, TurnEvent};
pub use model::card::Card;
pub use model::rank::Rank;
pub use model::rules::{Ability, AbilityRule, RuleCatalog};
pub use model::suit::Suit;
