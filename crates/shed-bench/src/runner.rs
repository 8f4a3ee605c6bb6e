use anyhow::{Context, Result, bail};
use clap::ValueEnum;
use serde::Serialize;
use shed_bot::policy::{GreedyPolicy, Policy, SearchPolicy};
use shed_core::game::engine::GameState;
use shed_core::model::rules::RuleCatalog;
use std::collections::BTreeMap;
use tracing::{Level, event};

const TURN_LIMIT: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyKind {
    /// Lowest legal card, duplicates batched.
    Greedy,
    /// Belief-tracking one-ply search (two-seat games).
    Search,
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub games: usize,
    pub seed: u64,
    pub players: Vec<String>,
    pub policy: PolicyKind,
    pub emit_history: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub games_played: usize,
    pub base_seed: u64,
    pub wins: BTreeMap<String, usize>,
    pub stalemates: usize,
    pub total_rounds: usize,
    pub total_turns: usize,
}

/// Plays `config.games` deterministic self-play games (game `i` is dealt
/// from `seed + i`) and tallies the outcomes.
pub fn run(config: &RunConfig) -> Result<RunSummary> {
    if config.games == 0 {
        bail!("at least one game is required");
    }

    let mut summary = RunSummary {
        games_played: 0,
        base_seed: config.seed,
        wins: BTreeMap::new(),
        stalemates: 0,
        total_rounds: 0,
        total_turns: 0,
    };

    for game_index in 0..config.games {
        let seed = config.seed.wrapping_add(game_index as u64);
        let mut state = GameState::new(config.players.clone(), RuleCatalog::standard())
            .context("building the roster")?;
        state
            .start_with_seed(seed)
            .context("dealing the opening hands")?;

        let mut policies = build_policies(config);
        for (index, policy) in policies.iter_mut().enumerate() {
            policy.game_started(&state, index);
        }

        let mut turns = 0usize;
        while !state.is_game_over() {
            turns += 1;
            if turns > TURN_LIMIT {
                bail!("game {game_index} (seed {seed}) exceeded {TURN_LIMIT} turns");
            }

            let actor = state.turn_index();
            let legal = state.legal_moves(actor);
            let batch = policies[actor].choose(&state, actor, &legal);
            let outcome = state
                .play(actor, &batch)
                .with_context(|| format!("game {game_index} (seed {seed}), turn {turns}"))?;
            for policy in policies.iter_mut() {
                policy.observe(&state, actor, &outcome.events);
            }
        }

        summary.games_played += 1;
        summary.total_rounds += state.round_index();
        summary.total_turns += turns;
        if state.ended_in_stalemate() {
            summary.stalemates += 1;
        } else if let Some(winner) = state.winning_order().first() {
            *summary.wins.entry(winner.clone()).or_insert(0) += 1;
        }

        event!(
            Level::INFO,
            game = game_index,
            seed,
            turns,
            rounds = state.round_index(),
            stalemate = state.ended_in_stalemate(),
            winner = state.winning_order().first().map(String::as_str),
            "game finished"
        );

        if config.emit_history {
            let history = state
                .history()
                .context("a finished game always has a history")?;
            println!("{}", history.to_json()?);
        }
    }

    Ok(summary)
}

fn build_policies(config: &RunConfig) -> Vec<Box<dyn Policy>> {
    config
        .players
        .iter()
        .map(|_| match config.policy {
            PolicyKind::Greedy => Box::new(GreedyPolicy::new()) as Box<dyn Policy>,
            PolicyKind::Search => Box::new(SearchPolicy::new(RuleCatalog::standard())),
        })
        .collect()
}
