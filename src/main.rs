use chrono::Local;
use clap::Parser;
use itertools::Itertools;
use rayon::prelude::*;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use risk_simulator::{
    error::{Result, SimError},
    game::GameState,
    game_config::{MapConfig, RulesConfig},
    render::{render_folder, TextRenderer, SNAPSHOT_FILE},
    snapshot::{BincodeSnapshotStore, NullStore, SnapshotStore},
    strategy::{Strategy, StrategyKind},
};

/// Plays automated Risk games between strategy policies and reports the wins.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// One policy per nation, in turn order.
    #[arg(
        long,
        value_enum,
        value_delimiter = ',',
        default_values_t = vec![
            StrategyKind::PathSearch,
            StrategyKind::Ranked,
            StrategyKind::Ranked,
            StrategyKind::Ranked,
        ]
    )]
    players: Vec<StrategyKind>,

    #[arg(long, default_value_t = 1)]
    games: u64,

    /// Seed of the first game; game `i` uses `seed + i`.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Map JSON file. The classic 42-territory map is used when omitted.
    #[arg(long)]
    map: Option<String>,

    #[arg(long)]
    max_rounds: Option<u32>,

    #[arg(long, default_value_t = 5)]
    card_bonus: u32,

    /// Store per-turn snapshots and render them (single game only).
    #[arg(long)]
    snapshots: bool,

    #[arg(long, default_value = "past_games")]
    out_dir: PathBuf,
}

enum GameResult {
    Winner(String),
    Stalemate,
}

fn play_game(
    args: &Args,
    map: &MapConfig,
    seed: u64,
    store: &mut dyn SnapshotStore,
) -> Result<GameResult> {
    let rules = RulesConfig {
        card_bonus: args.card_bonus,
        seed,
        max_rounds: args.max_rounds,
    };
    let nations = map.nations_for(args.players.len())?;
    let mut game = GameState::new(map, nations, rules)?;
    let mut strategies: Vec<Box<dyn Strategy>> =
        args.players.iter().map(|kind| kind.build()).collect();

    match game.run_with_snapshots(&mut strategies, store) {
        Ok(winner) => Ok(GameResult::Winner(format!(
            "{} ({})",
            game.board().nation_name(winner),
            strategies[winner.0].name()
        ))),
        Err(SimError::RoundLimit(rounds)) => {
            info!("Game {} stalled after {} rounds", seed, rounds);
            Ok(GameResult::Stalemate)
        }
        Err(e) => Err(e),
    }
}

fn run(args: &Args) -> Result<()> {
    let map = match &args.map {
        Some(path) => MapConfig::load_from_file(path)?,
        None => MapConfig::classic()?,
    };
    let start = Instant::now();

    if args.games == 1 && args.snapshots {
        let folder = args
            .out_dir
            .join(format!("{}_game", Local::now().format("%Y%m%d_%H%M%S")));
        fs::create_dir_all(&folder)?;
        let mut store = BincodeSnapshotStore::new(folder.join(SNAPSHOT_FILE));
        let result = play_game(args, &map, args.seed, &mut store)?;
        if let GameResult::Winner(name) = result {
            info!("Winner: {}", name);
        }
        let rendered = render_folder(&folder, &mut TextRenderer::new(&folder))?;
        info!("Rendered {} snapshots to {}", rendered, folder.display());
    } else {
        let results = (0..args.games)
            .into_par_iter()
            .map(|i| play_game(args, &map, args.seed + i, &mut NullStore))
            .collect::<Result<Vec<_>>>()?;

        let stalemates = results
            .iter()
            .filter(|r| matches!(r, GameResult::Stalemate))
            .count();
        let wins = results
            .into_iter()
            .filter_map(|r| match r {
                GameResult::Winner(name) => Some(name),
                GameResult::Stalemate => None,
            })
            .counts();
        for (name, count) in wins.into_iter().sorted_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0))) {
            info!("{}: {}", name, count);
        }
        if stalemates > 0 {
            info!("Stalemates: {}", stalemates);
        }
    }

    info!("Total time: {} ms", start.elapsed().as_millis());
    Ok(())
}

fn main() {
    let args = Args::parse();

    let default_level = if args.games >= 10 { "info" } else { "debug" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("risk_simulator={}", default_level))),
        )
        .init();

    if let Err(e) = run(&args) {
        error!("{}", e);
        std::process::exit(1);
    }
}
