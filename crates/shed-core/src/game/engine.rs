use crate::game::history::GameHistory;
use crate::game::serialization::GameSnapshot;
use crate::model::action::{Action, TurnEvent};
use crate::model::card::Card;
use crate::model::deck::Deck;
use crate::model::player::{PileKind, PlayerState};
use crate::model::rank::Rank;
use crate::model::rules::{Ability, RuleCatalog};
use crate::model::table::TableCards;
use std::collections::{BTreeSet, HashSet};
use thiserror::Error;

const CARDS_PER_PILE: usize = 3;
const STALEMATE_ROUND_LIMIT: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    NotStarted,
    InProgress,
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterError {
    #[error("at least one player is required")]
    Empty,
    #[error("duplicate player name '{0}'")]
    DuplicateName(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleViolation {
    #[error("game is not in progress")]
    NotInProgress,
    #[error("player {actual} acted out of turn (expected player {expected})")]
    OutOfTurn { expected: usize, actual: usize },
    #[error("player has no cards left to act with")]
    PlayerFinished,
    #[error("a turn must contain at least one action")]
    EmptyTurn,
    #[error("card {card} is not in the acting {pile} pile")]
    CardNotOwned { card: Card, pile: PileKind },
    #[error("card {card} is not a legal play on the current stack")]
    IllegalCard { card: Card },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error(transparent)]
    Rule(#[from] RuleViolation),
    #[error(transparent)]
    Roster(#[from] RosterError),
    #[error("cannot deal {requested} cards, only {remaining} in the deck")]
    InsufficientDeck { requested: usize, remaining: usize },
    #[error("unknown player index {0}")]
    UnknownPlayer(usize),
}

/// What one `play` call did, for transports and observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayOutcome {
    /// Events recorded by this call, burn markers included.
    pub events: Vec<TurnEvent>,
    pub burned: bool,
    pub player_finished: bool,
    pub game_over: bool,
    /// Acting player for the next turn; None once the game is over.
    pub next_player: Option<usize>,
}

/// Repeated-position detector for deadlocked endgames. Compares the *set* of
/// cards sitting in hands and on the play stack at each round boundary; equal
/// sets with different multiplicities are treated as unchanged, a known
/// approximation.
#[derive(Debug, Clone, Default)]
struct StalemateDetector {
    previous: Option<BTreeSet<u8>>,
    unchanged_rounds: u32,
}

impl StalemateDetector {
    fn reset(&mut self) {
        self.previous = None;
        self.unchanged_rounds = 0;
    }

    /// Records the visible-card set for this boundary; true when the limit
    /// of unchanged rounds is reached.
    fn observe(&mut self, visible: BTreeSet<u8>) -> bool {
        if self.previous.as_ref() == Some(&visible) {
            self.unchanged_rounds += 1;
        } else {
            self.unchanged_rounds = 0;
        }
        self.previous = Some(visible);
        self.unchanged_rounds >= STALEMATE_ROUND_LIMIT
    }
}

/// Authoritative game state machine. Single-threaded by design: transports
/// multiplexing remote players must serialize calls per game instance.
#[derive(Debug, Clone)]
pub struct GameState {
    catalog: RuleCatalog,
    players: Vec<PlayerState>,
    table: TableCards,
    start_index: usize,
    turn_index: usize,
    round_index: usize,
    winning_order: Vec<String>,
    phase: GamePhase,
    stalemate: StalemateDetector,
    reached_stalemate: bool,
    history: Option<GameHistory>,
}

impl GameState {
    pub fn new<S: Into<String>>(
        names: impl IntoIterator<Item = S>,
        catalog: RuleCatalog,
    ) -> Result<Self, RosterError> {
        let players = build_roster(names)?;
        Ok(Self {
            catalog,
            players,
            table: TableCards::new(Deck::standard()),
            start_index: 0,
            turn_index: 0,
            round_index: 0,
            winning_order: Vec::new(),
            phase: GamePhase::NotStarted,
            stalemate: StalemateDetector::default(),
            reached_stalemate: false,
            history: None,
        })
    }

    pub fn catalog(&self) -> &RuleCatalog {
        &self.catalog
    }

    pub fn players(&self) -> &[PlayerState] {
        &self.players
    }

    pub fn player(&self, index: usize) -> Option<&PlayerState> {
        self.players.get(index)
    }

    pub fn table(&self) -> &TableCards {
        &self.table
    }

    pub fn start_index(&self) -> usize {
        self.start_index
    }

    pub fn turn_index(&self) -> usize {
        self.turn_index
    }

    pub fn round_index(&self) -> usize {
        self.round_index
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn is_game_over(&self) -> bool {
        matches!(self.phase, GamePhase::Finished)
    }

    pub fn ended_in_stalemate(&self) -> bool {
        self.reached_stalemate
    }

    /// Player names in the order they emptied their piles. The one player
    /// left unfinished at game end is implicitly last and never appended.
    pub fn winning_order(&self) -> &[String] {
        &self.winning_order
    }

    pub fn history(&self) -> Option<&GameHistory> {
        self.history.as_ref()
    }

    /// Deals a fresh game from a random seed.
    pub fn start(&mut self) -> Result<(), GameError> {
        self.start_with_seed(rand::random())
    }

    /// Deals a fresh game: 3 cards to each of hand, face-up and face-down
    /// per player, first actor chosen by the lowest non-ability hand card.
    pub fn start_with_seed(&mut self, seed: u64) -> Result<(), GameError> {
        let requested = self.players.len() * CARDS_PER_PILE * 3;
        if requested > 52 {
            return Err(GameError::InsufficientDeck {
                requested,
                remaining: 52,
            });
        }

        self.table = TableCards::new(Deck::shuffled_with_seed(seed));
        for player in &mut self.players {
            *player = PlayerState::new(player.name().to_string());
        }
        for index in 0..self.players.len() {
            for _ in 0..CARDS_PER_PILE {
                for kind in [PileKind::Hand, PileKind::FaceUp, PileKind::FaceDown] {
                    let card = self
                        .table
                        .deck_mut()
                        .draw()
                        .expect("deal size checked against deck");
                    self.players[index].pile_mut(kind).push(card);
                }
            }
        }

        self.start_index = self.choose_first_player();
        self.turn_index = self.start_index;
        self.round_index = 0;
        self.winning_order.clear();
        self.phase = GamePhase::InProgress;
        self.stalemate.reset();
        self.reached_stalemate = false;

        self.history = Some(GameHistory::started_now());
        let snapshot = GameSnapshot::capture(self);
        if let Some(history) = self.history.as_mut() {
            history.open_round(self.players.len(), snapshot);
        }
        Ok(())
    }

    /// Legal options for `player_index` right now, restricted to the first
    /// non-empty pile. A forced pickup is the sole option when that pile has
    /// no legal card; a finished player has no moves.
    pub fn legal_moves(&self, player_index: usize) -> Vec<Action> {
        if !matches!(self.phase, GamePhase::InProgress) {
            return Vec::new();
        }
        let Some(player) = self.players.get(player_index) else {
            return Vec::new();
        };
        let Some(kind) = player.active_pile() else {
            return Vec::new();
        };

        let playable: Vec<Action> = player
            .pile(kind)
            .iter()
            .filter(|card| self.can_play_card(player_index, **card))
            .map(|card| Action::Play(*card))
            .collect();

        if playable.is_empty() {
            vec![Action::Pickup]
        } else {
            playable
        }
    }

    /// Whether `card` would be accepted from `player_index` right now.
    pub fn can_play_card(&self, player_index: usize, card: Card) -> bool {
        if self.opening_lead_applies(player_index) {
            if let Some(lowest) = self.lowest_free_rank(player_index) {
                return card.rank == lowest;
            }
        }
        let top = self
            .table
            .effective_top_card(&self.catalog)
            .map(|card| card.rank);
        self.catalog.can_play(card.rank, top)
    }

    /// Applies a batch of atomic actions for `player_index`. Each action is
    /// validated before it mutates anything; an error aborts the batch but
    /// leaves previously applied actions in place.
    pub fn play(
        &mut self,
        player_index: usize,
        actions: &[Action],
    ) -> Result<PlayOutcome, GameError> {
        if !matches!(self.phase, GamePhase::InProgress) {
            return Err(RuleViolation::NotInProgress.into());
        }
        if player_index >= self.players.len() {
            return Err(GameError::UnknownPlayer(player_index));
        }
        if player_index != self.turn_index {
            return Err(RuleViolation::OutOfTurn {
                expected: self.turn_index,
                actual: player_index,
            }
            .into());
        }
        if actions.is_empty() {
            return Err(RuleViolation::EmptyTurn.into());
        }

        let mut events = Vec::new();
        for action in actions {
            match action {
                Action::Pickup => {
                    let picked = self.table.stack_play_mut().drain();
                    self.players[player_index].hand_mut().extend(picked);
                    self.record(player_index, TurnEvent::Pickup, &mut events);
                }
                Action::Play(card) => {
                    self.play_card(player_index, *card, &mut events)?;
                }
            }
        }
        let burned = matches!(events.last(), Some(TurnEvent::Burn));

        let player_finished = self.players[player_index].is_finished();
        if player_finished {
            let name = self.players[player_index].name().to_string();
            if !self.winning_order.contains(&name) {
                self.winning_order.push(name);
            }
        }

        let unfinished = self
            .players
            .iter()
            .filter(|player| !player.is_finished())
            .count();
        if unfinished == 0 || (self.players.len() > 1 && unfinished == 1) {
            self.finish_game();
        } else if burned && !player_finished {
            // A burn keeps the turn: same player, fresh stack.
        } else {
            self.advance_turn();
        }

        Ok(PlayOutcome {
            events,
            burned,
            player_finished,
            game_over: self.is_game_over(),
            next_player: if self.is_game_over() {
                None
            } else {
                Some(self.turn_index)
            },
        })
    }

    /// Rotates the seating by one, swaps departed players for newcomers and
    /// returns the machine to `NotStarted` for the next deal.
    pub fn reset<S: Into<String>>(
        &mut self,
        names: impl IntoIterator<Item = S>,
    ) -> Result<(), RosterError> {
        let incoming = build_roster(names)?;
        let incoming_names: Vec<String> =
            incoming.iter().map(|p| p.name().to_string()).collect();

        self.players.rotate_right(1);

        let mut fresh: Vec<PlayerState> = Vec::new();
        let mut replacements = incoming_names
            .iter()
            .filter(|name| {
                !self
                    .players
                    .iter()
                    .any(|player| player.name() == name.as_str())
            })
            .cloned()
            .collect::<Vec<_>>()
            .into_iter();
        for player in &self.players {
            if incoming_names.iter().any(|name| name == player.name()) {
                fresh.push(PlayerState::new(player.name().to_string()));
            } else if let Some(replacement) = replacements.next() {
                fresh.push(PlayerState::new(replacement));
            }
        }
        fresh.extend(replacements.map(PlayerState::new));
        self.players = fresh;

        self.table = TableCards::new(Deck::standard());
        self.start_index = 0;
        self.turn_index = 0;
        self.round_index = 0;
        self.winning_order.clear();
        self.phase = GamePhase::NotStarted;
        self.stalemate.reset();
        self.reached_stalemate = false;
        self.history = None;
        Ok(())
    }

    fn play_card(
        &mut self,
        player_index: usize,
        card: Card,
        events: &mut Vec<TurnEvent>,
    ) -> Result<(), GameError> {
        let Some(kind) = self.players[player_index].active_pile() else {
            return Err(RuleViolation::PlayerFinished.into());
        };
        if !self.players[player_index].pile(kind).contains(card) {
            return Err(RuleViolation::CardNotOwned { card, pile: kind }.into());
        }
        if !self.can_play_card(player_index, card) {
            return Err(RuleViolation::IllegalCard { card }.into());
        }

        self.players[player_index].pile_mut(kind).remove(card);
        self.table.stack_play_mut().push(card);
        self.record(player_index, TurnEvent::Play(card), events);

        // Replacements only ever enter the hand, one per card played.
        if let Some(drawn) = self.table.deck_mut().draw() {
            self.players[player_index].hand_mut().push(drawn);
        }

        let immediate_burn = self
            .catalog
            .rule(card.rank)
            .is_some_and(|rule| matches!(rule.ability, Ability::Burn) && rule.immediate);
        if immediate_burn || self.table.last_four_match() {
            self.table.burn_play_stack();
            self.record(player_index, TurnEvent::Burn, events);
        }
        Ok(())
    }

    fn record(&mut self, player_index: usize, event: TurnEvent, events: &mut Vec<TurnEvent>) {
        if let Some(history) = self.history.as_mut() {
            history.record(player_index, event);
        }
        events.push(event);
    }

    fn advance_turn(&mut self) {
        let count = self.players.len();
        for _ in 0..count {
            self.turn_index = (self.turn_index + 1) % count;
            if self.turn_index == self.start_index {
                self.on_round_boundary();
                if self.is_game_over() {
                    return;
                }
            }
            if !self.players[self.turn_index].is_finished() {
                return;
            }
        }
    }

    fn on_round_boundary(&mut self) {
        self.round_index += 1;

        if self.table.deck().is_empty() && self.stalemate.observe(self.visible_card_set()) {
            self.reached_stalemate = true;
            self.finish_game();
            return;
        }

        let snapshot = GameSnapshot::capture(self);
        if let Some(history) = self.history.as_mut() {
            history.open_round(self.players.len(), snapshot);
        }
    }

    fn finish_game(&mut self) {
        self.phase = GamePhase::Finished;
        let snapshot = GameSnapshot::capture(self);
        if let Some(history) = self.history.as_mut() {
            history.finish(snapshot);
        }
    }

    fn visible_card_set(&self) -> BTreeSet<u8> {
        let mut visible = BTreeSet::new();
        for player in &self.players {
            for card in player.hand().iter() {
                visible.insert(card.to_id());
            }
        }
        for card in self.table.stack_play().iter() {
            visible.insert(card.to_id());
        }
        visible
    }

    /// The very first play of the match must be the starting player's lowest
    /// non-ability card. The constraint binds the lead card only: once the
    /// stack is non-empty the ordinary rules take over (which still admits
    /// batching further cards of the lead rank).
    fn opening_lead_applies(&self, player_index: usize) -> bool {
        self.round_index == 0
            && player_index == self.start_index
            && player_index == self.turn_index
            && self.table.stack_play().is_empty()
    }

    /// Lowest hand rank carrying no ability; None when the hand is empty or
    /// all abilities.
    fn lowest_free_rank(&self, player_index: usize) -> Option<Rank> {
        self.players[player_index]
            .hand()
            .iter()
            .map(|card| card.rank)
            .filter(|rank| !self.catalog.is_ability_rank(*rank))
            .min()
    }

    /// The player holding the strictly lowest non-ability hand card leads;
    /// ties go to seating order, all-ability hands cannot win the tie.
    fn choose_first_player(&self) -> usize {
        let mut best_index = 0;
        let mut best_rank = u8::MAX;
        for index in 0..self.players.len() {
            let rank = self
                .lowest_free_rank(index)
                .map(Rank::value)
                .unwrap_or(u8::MAX);
            if rank < best_rank {
                best_rank = rank;
                best_index = index;
            }
        }
        best_index
    }
}

fn build_roster<S: Into<String>>(
    names: impl IntoIterator<Item = S>,
) -> Result<Vec<PlayerState>, RosterError> {
    let mut seen = HashSet::new();
    let mut players = Vec::new();
    for name in names {
        let name: String = name.into();
        if !seen.insert(name.clone()) {
            return Err(RosterError::DuplicateName(name));
        }
        players.push(PlayerState::new(name));
    }
    if players.is_empty() {
        return Err(RosterError::Empty);
    }
    Ok(players)
}
