use crate::game::serialization::GameSnapshot;
use crate::model::action::TurnEvent;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Events submitted during one round, per player, plus the full-state
/// snapshot taken when the round opened.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoundRecord {
    pub actions: Vec<Vec<TurnEvent>>,
    pub snapshot: GameSnapshot,
}

impl RoundRecord {
    pub fn new(player_count: usize, snapshot: GameSnapshot) -> Self {
        Self {
            actions: vec![Vec::new(); player_count],
            snapshot,
        }
    }
}

/// Replayable action history for one game, keyed by its start timestamp.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameHistory {
    pub started_at_ms: u128,
    pub rounds: Vec<RoundRecord>,
    pub final_snapshot: Option<GameSnapshot>,
}

impl GameHistory {
    pub fn started_now() -> Self {
        Self {
            started_at_ms: unix_timestamp_ms(),
            rounds: Vec::new(),
            final_snapshot: None,
        }
    }

    pub fn open_round(&mut self, player_count: usize, snapshot: GameSnapshot) {
        self.rounds.push(RoundRecord::new(player_count, snapshot));
    }

    pub fn record(&mut self, player_index: usize, event: TurnEvent) {
        if let Some(round) = self.rounds.last_mut() {
            if let Some(events) = round.actions.get_mut(player_index) {
                events.push(event);
            }
        }
    }

    /// Most recent event recorded for `player_index` in the current round.
    pub fn last_event(&self, player_index: usize) -> Option<TurnEvent> {
        self.rounds
            .last()
            .and_then(|round| round.actions.get(player_index))
            .and_then(|events| events.last())
            .copied()
    }

    pub fn finish(&mut self, snapshot: GameSnapshot) {
        self.final_snapshot = Some(snapshot);
    }

    pub fn rounds(&self) -> &[RoundRecord] {
        &self.rounds
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

fn unix_timestamp_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
}
