use crate::game::engine::GameState;
use crate::model::card::Card;
use crate::model::pile::Pile;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerSnapshot {
    pub name: String,
    pub hand: Vec<String>,
    pub face_up: Vec<String>,
    pub face_down: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TableSnapshot {
    pub deck: Vec<String>,
    pub stack_play: Vec<String>,
    pub stack_discard: Vec<String>,
}

/// Full observable state at a round boundary, exported with card literals so
/// offline consumers never depend on this crate's binary layout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameSnapshot {
    pub round_index: usize,
    pub turn_index: usize,
    pub start_index: usize,
    pub players: Vec<PlayerSnapshot>,
    pub table: TableSnapshot,
    pub winning_order: Vec<String>,
}

impl GameSnapshot {
    pub fn capture(state: &GameState) -> Self {
        GameSnapshot {
            round_index: state.round_index(),
            turn_index: state.turn_index(),
            start_index: state.start_index(),
            players: state
                .players()
                .iter()
                .map(|player| PlayerSnapshot {
                    name: player.name().to_string(),
                    hand: pile_literals(player.hand()),
                    face_up: pile_literals(player.face_up()),
                    face_down: pile_literals(player.face_down()),
                })
                .collect(),
            table: TableSnapshot {
                deck: state
                    .table()
                    .deck()
                    .cards()
                    .iter()
                    .map(Card::to_string)
                    .collect(),
                stack_play: pile_literals(state.table().stack_play()),
                stack_discard: pile_literals(state.table().stack_discard()),
            },
            winning_order: state.winning_order().to_vec(),
        }
    }

    /// Placeholder snapshot used by history tests.
    pub fn empty(player_count: usize) -> Self {
        GameSnapshot {
            round_index: 0,
            turn_index: 0,
            start_index: 0,
            players: (0..player_count)
                .map(|index| PlayerSnapshot {
                    name: format!("player-{index}"),
                    hand: Vec::new(),
                    face_up: Vec::new(),
                    face_down: Vec::new(),
                })
                .collect(),
            table: TableSnapshot {
                deck: Vec::new(),
                stack_play: Vec::new(),
                stack_discard: Vec::new(),
            },
            winning_order: Vec::new(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

fn pile_literals(pile: &Pile) -> Vec<String> {
    pile.iter().map(Card::to_string).collect()
}
