//! Diagnostic tool for ant-game states: evaluate, step, compress, and
//! inspect learned utility tables.

use anyhow::{anyhow, Context, Result};
use antics_agents::td::{CompressionScheme, MsgPackRepository};
use antics_agents::{AgentConfig, Evaluator, HeuristicPreset};
use antics_core::{FixedMoves, GameState, Move};
use clap::{Parser, Subcommand};
use log::{debug, LevelFilter};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "antics")]
#[command(version, about = "Inspect ant-game states and learned tables", long_about = None)]
struct Cli {
    /// Agent configuration (defaults are used when the file is missing)
    #[arg(long, global = true, default_value = "antics.toml")]
    config: PathBuf,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the heuristic value of a state for the player to move
    Eval {
        state: PathBuf,
        /// forager, raider or hoarder
        #[arg(long)]
        preset: Option<String>,
    },

    /// Apply a move and print the successor state
    Apply {
        state: PathBuf,
        #[arg(value_name = "MOVE")]
        mv: PathBuf,
        /// Seed for attack target selection
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Print the compressed key of a state for the player to move
    Compress {
        state: PathBuf,
        /// raider or forager
        #[arg(long)]
        scheme: Option<String>,
    },

    /// Print size and utility range of a saved table
    Table { file: PathBuf },
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

fn eval(config: &AgentConfig, path: &Path, preset: Option<&str>) -> Result<()> {
    let state: GameState = read_json(path)?;
    let mut heuristic = config.heuristic.clone();
    if let Some(name) = preset {
        heuristic.preset = name.parse::<HeuristicPreset>().map_err(|e| anyhow!(e))?;
        heuristic.weights = None;
    }

    let value = heuristic
        .evaluator()
        .evaluate(&state, &FixedMoves::default());
    println!("{:?} to move: {:.6}", state.whose_turn, value);
    Ok(())
}

fn apply(config: &AgentConfig, state: &Path, mv: &Path, seed: Option<u64>) -> Result<()> {
    let state: GameState = read_json(state)?;
    let mv: Move = read_json(mv)?;
    let mut rng = StdRng::seed_from_u64(seed.or(config.seed).unwrap_or(0));

    let next = state
        .apply_move(&mv, &mut rng)
        .with_context(|| format!("applying '{}'", mv))?;
    println!("{}", serde_json::to_string_pretty(&next)?);
    Ok(())
}

fn compress(config: &AgentConfig, path: &Path, scheme: Option<&str>) -> Result<()> {
    let state: GameState = read_json(path)?;
    let scheme = match scheme {
        Some(name) => name.parse::<CompressionScheme>().map_err(|e| anyhow!(e))?,
        None => config.td.compression,
    };
    println!("{}", scheme.compress(&state, state.whose_turn));
    Ok(())
}

fn table(path: &Path) -> Result<()> {
    let snapshot = MsgPackRepository::new(path)
        .read_snapshot()
        .with_context(|| format!("loading {}", path.display()))?;
    println!("fingerprint: {}", snapshot.fingerprint);

    let table = snapshot.into_table();
    match table.stats() {
        Some(stats) => {
            println!("states: {}", stats.len);
            println!(
                "utility: min {:.4}, mean {:.4}, max {:.4}",
                stats.min, stats.mean, stats.max
            );
        }
        None => println!("states: 0"),
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(if cli.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .parse_default_env()
        .init();

    let config = AgentConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config {}", cli.config.display()))?;
    debug!("config: {:?}", config);

    match cli.command {
        Commands::Eval { state, preset } => eval(&config, &state, preset.as_deref()),
        Commands::Apply { state, mv, seed } => apply(&config, &state, &mv, seed),
        Commands::Compress { state, scheme } => compress(&config, &state, scheme.as_deref()),
        Commands::Table { file } => table(&file),
    }
}
