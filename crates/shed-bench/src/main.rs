use clap::Parser;

use shed_bench::logging::init_logging;
use shed_bench::runner::{PolicyKind, RunConfig, RunSummary, run};

/// Deterministic self-play harness for shed bots.
#[derive(Debug, Parser)]
#[command(name = "shed-bench", author, version, about = "Deterministic shed self-play harness")]
struct Cli {
    /// Number of games to play.
    #[arg(long, value_name = "COUNT", default_value_t = 20)]
    games: usize,

    /// Base RNG seed; game i is dealt from seed + i. Random when omitted.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Player names, one per seat.
    #[arg(long = "player", value_name = "NAME", num_args = 1..)]
    players: Vec<String>,

    /// Decision policy used by every seat.
    #[arg(long, value_enum, default_value_t = PolicyKind::Search)]
    policy: PolicyKind,

    /// Print each finished game's history as JSON on stdout.
    #[arg(long)]
    emit_history: bool,

    /// Print the run summary as JSON instead of plain text.
    #[arg(long)]
    json: bool,

    /// Enable debug-level logging.
    #[arg(long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let players = if cli.players.is_empty() {
        vec!["Ada".to_string(), "Ben".to_string()]
    } else {
        cli.players
    };
    let config = RunConfig {
        games: cli.games,
        seed: cli.seed.unwrap_or_else(rand::random),
        players,
        policy: cli.policy,
        emit_history: cli.emit_history,
    };

    let summary = run(&config)?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!(
        "Completed {} games from seed {} ({} rounds, {} turns)",
        summary.games_played, summary.base_seed, summary.total_rounds, summary.total_turns
    );
    for (name, wins) in &summary.wins {
        println!("  {name}: {wins} wins");
    }
    if summary.stalemates > 0 {
        println!("  stalemates: {}", summary.stalemates);
    }
}
