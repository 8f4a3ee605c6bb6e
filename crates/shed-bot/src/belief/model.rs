use super::location::Location;
use shed_core::model::card::Card;
use shed_core::model::rules::RuleCatalog;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BeliefError {
    /// The observer's record disagrees with what the engine reported.
    #[error("card {card} is not believed to be in {location}")]
    Inconsistency { card: Card, location: Location },
    #[error("cannot deal unseen cards into {0}")]
    NotHidden(Location),
    #[error("cannot deal {requested} unseen cards, only {remaining} left in the deck")]
    DeckExhausted { requested: u8, remaining: u8 },
}

/// Playable cards at one location together with the chance that at least one
/// of them is actually held there.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayableEstimate {
    /// `1 − Π(1 − p_i)` over the candidates: an independence approximation,
    /// not an exact joint probability.
    pub at_least_one: f32,
    pub candidates: Vec<(Card, f32)>,
}

impl PlayableEstimate {
    pub fn none() -> Self {
        Self {
            at_least_one: 0.0,
            candidates: Vec::new(),
        }
    }
}

/// Probability table over card locations for one observer. Each of the 52
/// cards gets a probability per location; a card whose location is certain
/// holds 1.0 in exactly one row. Mutated strictly in the order actions
/// actually happened; replaying out of order desynchronises the model.
#[derive(Debug, Clone, PartialEq)]
pub struct BeliefModel {
    catalog: RuleCatalog,
    probs: [[f32; 52]; Location::COUNT],
    unseen: [bool; 52],
    deck_count: u8,
    own_hand_unseen: u8,
    opponent_hand_unseen: u8,
    own_face_down_unseen: u8,
    opponent_face_down_unseen: u8,
    top_card: Option<Card>,
}

impl BeliefModel {
    /// A fresh model: every card certainly in the deck, nothing seen yet.
    pub fn new(catalog: RuleCatalog) -> Self {
        let mut probs = [[0.0; 52]; Location::COUNT];
        probs[Location::Deck.index()] = [1.0; 52];
        Self {
            catalog,
            probs,
            unseen: [true; 52],
            deck_count: 52,
            own_hand_unseen: 0,
            opponent_hand_unseen: 0,
            own_face_down_unseen: 0,
            opponent_face_down_unseen: 0,
            top_card: None,
        }
    }

    /// Standard opening from the observer's seat: own hand and both face-up
    /// triples are visible, everything else is dealt blind.
    pub fn initialize(
        &mut self,
        own_hand: &[Card],
        own_face_up: &[Card],
        opponent_face_up: &[Card],
    ) -> Result<(), BeliefError> {
        for card in own_hand {
            self.move_card(*card, Location::Deck, Location::OwnHand)?;
        }
        for card in own_face_up {
            self.move_card(*card, Location::Deck, Location::OwnFaceUp)?;
        }
        for card in opponent_face_up {
            self.move_card(*card, Location::Deck, Location::OpponentFaceUp)?;
        }
        self.deal_unseen(own_hand.len() as u8, Location::OpponentHand)?;
        self.deal_unseen(3, Location::OwnFaceDown)?;
        self.deal_unseen(3, Location::OpponentFaceDown)?;
        self.update_probabilities();
        Ok(())
    }

    pub fn catalog(&self) -> &RuleCatalog {
        &self.catalog
    }

    /// Known effective top of the play stack. Invisible ranks never take
    /// this slot, so the field tracks the card legality is judged against.
    pub fn top_card(&self) -> Option<Card> {
        self.top_card
    }

    pub fn card_probability(&self, card: Card, location: Location) -> f32 {
        self.probs[location.index()][card.to_id() as usize]
    }

    pub fn is_unseen(&self, card: Card) -> bool {
        self.unseen[card.to_id() as usize]
    }

    /// Unseen cards currently attributed to a hidden bucket (or the deck).
    pub fn unseen_count(&self, location: Location) -> u8 {
        match location {
            Location::Deck => self.deck_count,
            Location::OwnHand => self.own_hand_unseen,
            Location::OpponentHand => self.opponent_hand_unseen,
            Location::OwnFaceDown => self.own_face_down_unseen,
            Location::OpponentFaceDown => self.opponent_face_down_unseen,
            _ => 0,
        }
    }

    /// Pins `card` to `to` with certainty. The card must currently carry
    /// probability mass at `from`; anything else means the observer's record
    /// disagrees with engine-emitted truth and must surface.
    pub fn move_card(
        &mut self,
        card: Card,
        from: Location,
        to: Location,
    ) -> Result<(), BeliefError> {
        let index = card.to_id() as usize;
        if self.probs[from.index()][index] == 0.0 {
            return Err(BeliefError::Inconsistency {
                card,
                location: from,
            });
        }

        if self.unseen[index] {
            self.unseen[index] = false;
            match from {
                Location::Deck => self.deck_count = self.deck_count.saturating_sub(1),
                Location::OwnHand => self.own_hand_unseen = self.own_hand_unseen.saturating_sub(1),
                Location::OpponentHand => {
                    self.opponent_hand_unseen = self.opponent_hand_unseen.saturating_sub(1)
                }
                Location::OwnFaceDown => {
                    self.own_face_down_unseen = self.own_face_down_unseen.saturating_sub(1)
                }
                Location::OpponentFaceDown => {
                    self.opponent_face_down_unseen =
                        self.opponent_face_down_unseen.saturating_sub(1)
                }
                _ => {}
            }
        }

        for location in Location::LOOP {
            self.probs[location.index()][index] = if location == to { 1.0 } else { 0.0 };
        }
        if to == Location::PlayStack && !self.catalog.is_invisible(card.rank) {
            self.top_card = Some(card);
        }
        Ok(())
    }

    /// Relocates every card known with certainty to sit at `from` (observed
    /// pickups and burns move the whole stack at once).
    pub fn move_stack(&mut self, from: Location, to: Location) -> Result<(), BeliefError> {
        for id in 0..52u8 {
            if self.probs[from.index()][id as usize] == 1.0 {
                let card = Card::from_id(id).expect("id in range");
                self.move_card(card, from, to)?;
            }
        }
        if from == Location::PlayStack {
            self.top_card = None;
        }
        Ok(())
    }

    /// Records `count` blind cards moving from the deck into a hidden
    /// bucket without revealing identity.
    pub fn deal_unseen(&mut self, count: u8, location: Location) -> Result<(), BeliefError> {
        if !location.is_hidden_bucket() {
            return Err(BeliefError::NotHidden(location));
        }
        if self.deck_count < count {
            return Err(BeliefError::DeckExhausted {
                requested: count,
                remaining: self.deck_count,
            });
        }
        self.deck_count -= count;
        match location {
            Location::OwnHand => self.own_hand_unseen += count,
            Location::OpponentHand => self.opponent_hand_unseen += count,
            Location::OwnFaceDown => self.own_face_down_unseen += count,
            Location::OpponentFaceDown => self.opponent_face_down_unseen += count,
            _ => unreachable!("hidden bucket checked above"),
        }
        Ok(())
    }

    /// Re-estimates every still-unseen card uniformly: its probability of
    /// sitting in a hidden bucket is that bucket's unseen count over the
    /// total number of unseen cards. Known cards are untouched.
    pub fn update_probabilities(&mut self) {
        let total_unseen = self.unseen.iter().filter(|unseen| **unseen).count() as f32;
        if total_unseen == 0.0 {
            return;
        }
        for index in 0..52 {
            if !self.unseen[index] {
                continue;
            }
            self.probs[Location::Deck.index()][index] = self.deck_count as f32 / total_unseen;
            self.probs[Location::OwnHand.index()][index] =
                self.own_hand_unseen as f32 / total_unseen;
            self.probs[Location::OpponentHand.index()][index] =
                self.opponent_hand_unseen as f32 / total_unseen;
            self.probs[Location::OwnFaceDown.index()][index] =
                self.own_face_down_unseen as f32 / total_unseen;
            self.probs[Location::OpponentFaceDown.index()][index] =
                self.opponent_face_down_unseen as f32 / total_unseen;
        }
    }

    /// Cards at `location` that would be legal against `top_card`, with the
    /// chance at least one of them is really there.
    pub fn playable_probability(
        &self,
        location: Location,
        top_card: Option<Card>,
    ) -> PlayableEstimate {
        let top_rank = top_card.map(|card| card.rank);
        let mut candidates = Vec::new();
        for id in 0..52u8 {
            let probability = self.probs[location.index()][id as usize];
            if probability <= 0.0 {
                continue;
            }
            let card = Card::from_id(id).expect("id in range");
            if self.catalog.can_play(card.rank, top_rank) {
                candidates.push((card, probability));
            }
        }
        if candidates.is_empty() {
            return PlayableEstimate::none();
        }
        let none_playable: f32 = candidates
            .iter()
            .map(|(_, probability)| 1.0 - probability)
            .product();
        PlayableEstimate {
            at_least_one: (1.0 - none_playable).clamp(0.0, 1.0),
            candidates,
        }
    }

    /// Per-card probability mass summed across all locations. A debug view:
    /// mass is not conserved once blind buckets approximate identities.
    pub fn aggregate(&self) -> [f32; 52] {
        let mut totals = [0.0; 52];
        for location in Location::LOOP {
            for (total, probability) in totals.iter_mut().zip(self.probs[location.index()]) {
                *total += probability;
            }
        }
        totals
    }

    // --- observer feed -----------------------------------------------------
    // Translates the engine's emitted action stream into primitive updates.

    /// A card was observed hitting the play stack from `from`.
    pub fn note_play(&mut self, card: Card, from: Location) -> Result<(), BeliefError> {
        self.move_card(card, from, Location::PlayStack)?;
        self.update_probabilities();
        Ok(())
    }

    /// The play stack was picked up into `hand` (own or opponent).
    pub fn note_pickup(&mut self, hand: Location) -> Result<(), BeliefError> {
        self.move_stack(Location::PlayStack, hand)?;
        self.update_probabilities();
        Ok(())
    }

    /// The play stack burned into the discard pile.
    pub fn note_burn(&mut self) -> Result<(), BeliefError> {
        self.move_stack(Location::PlayStack, Location::Discard)?;
        self.update_probabilities();
        Ok(())
    }

    /// Blind replacement draws were observed going into `location`.
    pub fn note_draw(&mut self, count: u8, location: Location) -> Result<(), BeliefError> {
        self.deal_unseen(count, location)?;
        self.update_probabilities();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{BeliefError, BeliefModel, Location};
    use shed_core::model::card::Card;
    use shed_core::model::rank::Rank;
    use shed_core::model::rules::RuleCatalog;
    use shed_core::model::suit::Suit;

    fn card(rank: Rank, suit: Suit) -> Card {
        Card::new(rank, suit)
    }

    fn initialized() -> BeliefModel {
        let mut model = BeliefModel::new(RuleCatalog::standard());
        model
            .initialize(
                &[
                    card(Rank::Six, Suit::Hearts),
                    card(Rank::Three, Suit::Diamonds),
                    card(Rank::Ten, Suit::Clubs),
                ],
                &[
                    card(Rank::Five, Suit::Hearts),
                    card(Rank::Six, Suit::Diamonds),
                    card(Rank::Seven, Suit::Clubs),
                ],
                &[
                    card(Rank::Eight, Suit::Hearts),
                    card(Rank::Nine, Suit::Diamonds),
                    card(Rank::Four, Suit::Clubs),
                ],
            )
            .unwrap();
        model
    }

    #[test]
    fn fresh_model_puts_everything_in_the_deck() {
        let model = BeliefModel::new(RuleCatalog::standard());
        let ace = card(Rank::Ace, Suit::Spades);
        assert_eq!(model.card_probability(ace, Location::Deck), 1.0);
        assert!(model.is_unseen(ace));
        assert_eq!(model.unseen_count(Location::Deck), 52);
    }

    #[test]
    fn move_card_pins_probability_to_one_location() {
        let mut model = BeliefModel::new(RuleCatalog::standard());
        let six = card(Rank::Six, Suit::Hearts);
        model
            .move_card(six, Location::Deck, Location::OwnHand)
            .unwrap();

        assert_eq!(model.card_probability(six, Location::OwnHand), 1.0);
        for location in Location::LOOP {
            if location != Location::OwnHand {
                assert_eq!(model.card_probability(six, location), 0.0);
            }
        }
        assert!(!model.is_unseen(six));
        assert_eq!(model.unseen_count(Location::Deck), 51);
    }

    #[test]
    fn moving_from_a_zero_probability_location_is_an_inconsistency() {
        let mut model = BeliefModel::new(RuleCatalog::standard());
        let six = card(Rank::Six, Suit::Hearts);
        model
            .move_card(six, Location::Deck, Location::OwnHand)
            .unwrap();
        let err = model
            .move_card(six, Location::OpponentHand, Location::PlayStack)
            .unwrap_err();
        assert_eq!(
            err,
            BeliefError::Inconsistency {
                card: six,
                location: Location::OpponentHand
            }
        );
    }

    #[test]
    fn deal_unseen_moves_bucket_counts() {
        let mut model = BeliefModel::new(RuleCatalog::standard());
        model.deal_unseen(3, Location::OpponentHand).unwrap();
        assert_eq!(model.unseen_count(Location::OpponentHand), 3);
        assert_eq!(model.unseen_count(Location::Deck), 49);

        assert_eq!(
            model.deal_unseen(2, Location::Discard).unwrap_err(),
            BeliefError::NotHidden(Location::Discard)
        );
        assert!(matches!(
            model.deal_unseen(50, Location::OwnHand).unwrap_err(),
            BeliefError::DeckExhausted { requested: 50, .. }
        ));
    }

    #[test]
    fn update_distributes_unseen_mass_uniformly() {
        let model = initialized();
        // 9 cards are known, leaving 43 unseen across deck (34), opponent
        // hand (3) and the two face-down piles (3 each).
        let hidden = card(Rank::Ace, Suit::Spades);
        assert!(model.is_unseen(hidden));
        let deck = model.card_probability(hidden, Location::Deck);
        let opp = model.card_probability(hidden, Location::OpponentHand);
        assert!((deck - 34.0 / 43.0).abs() < 1e-6);
        assert!((opp - 3.0 / 43.0).abs() < 1e-6);
        assert_eq!(model.card_probability(hidden, Location::OwnHand), 0.0);
    }

    #[test]
    fn known_top_card_tracks_play_and_burn() {
        let mut model = initialized();
        let ten = card(Rank::Ten, Suit::Clubs);
        model.note_play(ten, Location::OwnHand).unwrap();
        assert_eq!(model.top_card(), Some(ten));
        assert_eq!(model.card_probability(ten, Location::PlayStack), 1.0);

        model.note_burn().unwrap();
        assert_eq!(model.top_card(), None);
        assert_eq!(model.card_probability(ten, Location::Discard), 1.0);
    }

    #[test]
    fn invisible_ranks_never_become_the_known_top() {
        let mut model = initialized();
        let three = card(Rank::Three, Suit::Diamonds);
        model.note_play(three, Location::OwnHand).unwrap();
        assert_eq!(model.top_card(), None);

        let six = card(Rank::Six, Suit::Hearts);
        model.note_play(six, Location::OwnHand).unwrap();
        assert_eq!(model.top_card(), Some(six));
    }

    #[test]
    fn pickup_moves_known_stack_cards_into_a_hand() {
        let mut model = initialized();
        let six = card(Rank::Six, Suit::Hearts);
        model.note_play(six, Location::OwnHand).unwrap();
        model.note_pickup(Location::OpponentHand).unwrap();

        assert_eq!(model.top_card(), None);
        assert_eq!(model.card_probability(six, Location::OpponentHand), 1.0);
    }

    #[test]
    fn playable_probability_stays_in_bounds() {
        let model = initialized();
        let top = Some(card(Rank::Jack, Suit::Hearts));
        let estimate = model.playable_probability(Location::OpponentHand, top);
        assert!(estimate.at_least_one >= 0.0 && estimate.at_least_one <= 1.0);
        for (candidate, probability) in &estimate.candidates {
            assert!(model.catalog().can_play(candidate.rank, Some(Rank::Jack)));
            assert!(*probability > 0.0 && *probability <= 1.0);
        }
    }

    #[test]
    fn playable_probability_is_zero_when_nothing_is_legal() {
        let mut model = BeliefModel::new(RuleCatalog::standard());
        let nine = card(Rank::Nine, Suit::Clubs);
        model
            .move_card(nine, Location::Deck, Location::OwnHand)
            .unwrap();
        // Own hand holds only a nine; an ace on top blocks it.
        let top = Some(card(Rank::Ace, Suit::Spades));
        let estimate = model.playable_probability(Location::OwnHand, top);
        assert_eq!(estimate.at_least_one, 0.0);
        assert!(estimate.candidates.is_empty());
    }

    #[test]
    fn aggregate_sums_mass_per_card() {
        let model = initialized();
        let totals = model.aggregate();
        let six = card(Rank::Six, Suit::Hearts);
        // Known cards carry exactly their single certain location.
        assert!((totals[six.to_id() as usize] - 1.0).abs() < 1e-6);
    }
}
