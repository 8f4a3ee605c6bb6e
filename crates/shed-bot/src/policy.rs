use crate::belief::{BeliefModel, Location};
use crate::search::SearchNode;
use shed_core::game::engine::GameState;
use shed_core::model::action::{Action, TurnEvent};
use shed_core::model::card::Card;
use shed_core::model::player::PileKind;
use shed_core::model::rules::RuleCatalog;
use tracing::{Level, event};

/// Decision seam between a driver and a move-chooser. Implementations only
/// get the legal options the engine computed; the state reference is for
/// reading the caller's own piles and the public table, not for peeking at
/// hidden cards.
pub trait Policy {
    /// Called once right after the deal so observers can seed beliefs.
    fn game_started(&mut self, _state: &GameState, _player_index: usize) {}

    /// Called with the engine-emitted events of every accepted turn.
    fn observe(&mut self, _state: &GameState, _actor: usize, _events: &[TurnEvent]) {}

    /// Picks the action batch to submit for this turn.
    fn choose(&mut self, state: &GameState, player_index: usize, legal: &[Action]) -> Vec<Action>;
}

/// Plays the lowest-ranked legal card and batches its duplicates.
#[derive(Debug, Default)]
pub struct GreedyPolicy;

impl GreedyPolicy {
    pub fn new() -> Self {
        Self
    }
}

impl Policy for GreedyPolicy {
    fn choose(&mut self, _state: &GameState, _player_index: usize, legal: &[Action]) -> Vec<Action> {
        greedy_batch(legal)
    }
}

/// One-ply belief search: keeps an observer [`BeliefModel`] synchronised
/// from the engine's event stream and ranks the legal moves by how unlikely
/// the opponent is to have a reply afterwards. Two-seat games only; larger
/// rosters fall back to greedy play.
#[derive(Debug)]
pub struct SearchPolicy {
    catalog: RuleCatalog,
    belief: Option<BeliefModel>,
    player_index: usize,
}

impl SearchPolicy {
    pub fn new(catalog: RuleCatalog) -> Self {
        Self {
            catalog,
            belief: None,
            player_index: 0,
        }
    }

    /// The observer model, for callers that want to inspect or test it.
    pub fn belief(&self) -> Option<&BeliefModel> {
        self.belief.as_ref()
    }

    /// Resolves which location a just-observed play came from: a certain
    /// location if the observer knew the card, otherwise the actor's most
    /// plausible blind bucket.
    fn source_of(belief: &BeliefModel, card: Card, own: bool) -> Location {
        for location in [
            Location::OwnHand,
            Location::OwnFaceUp,
            Location::OpponentHand,
            Location::OpponentFaceUp,
        ] {
            if belief.card_probability(card, location) == 1.0 {
                return location;
            }
        }
        if own {
            Location::OwnFaceDown
        } else if belief.unseen_count(Location::OpponentHand) > 0 {
            Location::OpponentHand
        } else {
            Location::OpponentFaceDown
        }
    }

    /// Pins every card the engine says is in our hand. Replacement draws
    /// arrive here: they were recorded as blind own-hand mass (or still sit
    /// in the deck) until the hand becomes visible again.
    fn reconcile_own_hand(&mut self, state: &GameState) {
        let Some(belief) = self.belief.as_mut() else {
            return;
        };
        let hand: Vec<Card> = state.players()[self.player_index]
            .hand()
            .iter()
            .copied()
            .collect();
        for card in hand {
            if belief.card_probability(card, Location::OwnHand) == 1.0 {
                continue;
            }
            let from = if belief.card_probability(card, Location::OwnHand) > 0.0 {
                Location::OwnHand
            } else {
                Location::Deck
            };
            if let Err(err) = belief.move_card(card, from, Location::OwnHand) {
                tracing::warn!(%card, %err, "belief lost track of an own-hand card");
            }
        }
        belief.update_probabilities();
    }
}

impl Policy for SearchPolicy {
    fn game_started(&mut self, state: &GameState, player_index: usize) {
        if state.players().len() != 2 {
            tracing::warn!(
                players = state.players().len(),
                "search policy tracks two-seat games only, falling back to greedy play"
            );
            self.belief = None;
            return;
        }
        self.player_index = player_index;
        let opponent = 1 - player_index;
        let own = &state.players()[player_index];
        let other = &state.players()[opponent];

        let mut belief = BeliefModel::new(self.catalog.clone());
        let result = belief.initialize(
            own.hand().cards(),
            own.face_up().cards(),
            other.face_up().cards(),
        );
        match result {
            Ok(()) => self.belief = Some(belief),
            Err(err) => {
                tracing::warn!(%err, "belief initialisation failed");
                self.belief = None;
            }
        }
    }

    fn observe(&mut self, _state: &GameState, actor: usize, events: &[TurnEvent]) {
        let own = actor == self.player_index;
        let Some(belief) = self.belief.as_mut() else {
            return;
        };
        for event in events {
            let result = match event {
                TurnEvent::Play(card) => {
                    let from = Self::source_of(belief, *card, own);
                    belief.note_play(*card, from).and_then(|_| {
                        // The engine replaces every played card while the
                        // deck lasts; the draw is blind to this observer.
                        if belief.unseen_count(Location::Deck) > 0 {
                            let hand = if own {
                                Location::OwnHand
                            } else {
                                Location::OpponentHand
                            };
                            belief.note_draw(1, hand)
                        } else {
                            Ok(())
                        }
                    })
                }
                TurnEvent::Pickup => belief.note_pickup(if own {
                    Location::OwnHand
                } else {
                    Location::OpponentHand
                }),
                TurnEvent::Burn => belief.note_burn(),
            };
            if let Err(err) = result {
                tracing::warn!(%err, "belief update failed, observer desynchronised");
            }
        }
    }

    fn choose(&mut self, state: &GameState, player_index: usize, legal: &[Action]) -> Vec<Action> {
        if self.belief.is_none() {
            return greedy_batch(legal);
        }
        self.reconcile_own_hand(state);

        let legal_cards: Vec<Card> = legal
            .iter()
            .filter_map(|action| match action {
                Action::Play(card) => Some(*card),
                Action::Pickup => None,
            })
            .collect();
        if legal_cards.is_empty() {
            return vec![Action::Pickup];
        }

        let own_location = match state.players()[player_index].active_pile() {
            Some(PileKind::Hand) => Location::OwnHand,
            Some(PileKind::FaceUp) => Location::OwnFaceUp,
            // Face-down plays are blind: ranking them would be cheating.
            Some(PileKind::FaceDown) | None => {
                return vec![Action::Play(legal_cards[0])];
            }
        };

        let belief = self.belief.as_ref().expect("checked above");
        let mut node = SearchNode::new(belief.clone(), 0);
        node.expand_playable(own_location);
        if let Err(err) = node.simulate(own_location) {
            tracing::warn!(%err, "search simulation failed, falling back to greedy play");
            return greedy_batch(legal);
        }

        for ranked in node.best_moves(Location::OpponentHand) {
            if legal_cards.contains(&ranked.card) {
                event!(
                    Level::DEBUG,
                    card = %ranked.card,
                    score = ranked.score,
                    "search policy decision"
                );
                return batch_of_rank(legal, ranked.card);
            }
        }

        tracing::warn!("search produced no playable overlap, falling back to greedy play");
        greedy_batch(legal)
    }
}

/// Lowest legal rank first, duplicates batched; pickup when forced.
fn greedy_batch(legal: &[Action]) -> Vec<Action> {
    let lowest = legal
        .iter()
        .filter_map(|action| match action {
            Action::Play(card) => Some(*card),
            Action::Pickup => None,
        })
        .min_by_key(|card| (card.rank, card.suit));
    match lowest {
        Some(card) => batch_of_rank(legal, card),
        None => vec![Action::Pickup],
    }
}

/// Every legal play sharing `card`'s rank, `card` first.
fn batch_of_rank(legal: &[Action], card: Card) -> Vec<Action> {
    let mut batch = vec![Action::Play(card)];
    for action in legal {
        if let Action::Play(other) = action {
            if other.rank == card.rank && *other != card {
                batch.push(*action);
            }
        }
    }
    batch
}

#[cfg(test)]
mod tests {
    use super::{GreedyPolicy, Policy, SearchPolicy, greedy_batch};
    use shed_core::game::engine::GameState;
    use shed_core::model::action::Action;
    use shed_core::model::card::Card;
    use shed_core::model::rank::Rank;
    use shed_core::model::rules::RuleCatalog;
    use shed_core::model::suit::Suit;

    fn play(rank: Rank, suit: Suit) -> Action {
        Action::Play(Card::new(rank, suit))
    }

    #[test]
    fn greedy_batches_duplicates_of_the_lowest_rank() {
        let legal = vec![
            play(Rank::Nine, Suit::Clubs),
            play(Rank::Four, Suit::Hearts),
            play(Rank::Four, Suit::Spades),
        ];
        let batch = greedy_batch(&legal);
        assert_eq!(
            batch,
            vec![play(Rank::Four, Suit::Hearts), play(Rank::Four, Suit::Spades)]
        );
    }

    #[test]
    fn greedy_picks_up_when_forced() {
        assert_eq!(greedy_batch(&[Action::Pickup]), vec![Action::Pickup]);
    }

    #[test]
    fn search_policy_submits_only_legal_actions() {
        let mut state = GameState::new(vec!["Ada", "Ben"], RuleCatalog::standard()).unwrap();
        state.start_with_seed(77).unwrap();

        let mut policies = [
            SearchPolicy::new(RuleCatalog::standard()),
            SearchPolicy::new(RuleCatalog::standard()),
        ];
        for (index, policy) in policies.iter_mut().enumerate() {
            policy.game_started(&state, index);
        }

        let actor = state.turn_index();
        let legal = state.legal_moves(actor);
        let batch = policies[actor].choose(&state, actor, &legal);
        assert!(!batch.is_empty());
        for action in &batch {
            assert!(legal.contains(action), "{action:?} was not offered");
        }
        state.play(actor, &batch).unwrap();
    }

    #[test]
    fn greedy_policy_drives_a_turn() {
        let mut state = GameState::new(vec!["Ada", "Ben"], RuleCatalog::standard()).unwrap();
        state.start_with_seed(8).unwrap();

        let mut policy = GreedyPolicy::new();
        let actor = state.turn_index();
        let legal = state.legal_moves(actor);
        let batch = policy.choose(&state, actor, &legal);
        assert!(state.play(actor, &batch).is_ok());
    }
}
