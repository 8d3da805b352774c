use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{Context, bail, ensure};
use clap::Parser;
use match3_core::{Animation, Board, BoardConfig, Direction, KIND_COUNT, PieceGenerator};
use rand::prelude::*;
use rand::rngs::SmallRng;

#[derive(Parser, Debug)]
#[command(version, about = "Plays random swaps on a headless match-3 board", long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// JSON file holding a board config, flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long)]
    width: Option<u8>,

    #[arg(long)]
    height: Option<u8>,

    /// Visual variants per kind, comma separated
    #[arg(long, value_delimiter = ',')]
    variants: Option<Vec<u8>>,

    /// Force a seed instead of random
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of swaps to attempt
    #[arg(short, long, default_value_t = 100)]
    moves: u32,

    /// Animation steps a single swap may take to settle
    #[arg(long, default_value_t = 10_000)]
    max_steps: u32,

    /// Print the final board as JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Default)]
struct Stats {
    attempted: u32,
    reverted: u32,
    cleared: usize,
    longest_chain: u32,
}

fn load_config(args: &Args) -> anyhow::Result<BoardConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
            serde_json::from_reader(BufReader::new(file))
                .with_context(|| format!("parsing {}", path.display()))?
        }
        None => BoardConfig::default(),
    };

    if let Some(width) = args.width {
        config.size.0 = width;
    }
    if let Some(height) = args.height {
        config.size.1 = height;
    }
    if let Some(variants) = &args.variants {
        config.variants = variants.as_slice().try_into().with_context(|| {
            format!("expected {KIND_COUNT} variant counts, got {}", variants.len())
        })?;
    }

    Ok(BoardConfig::new(config.size, config.variants))
}

/// Plays the presentation side: acknowledges every animation right away.
fn resolve<G: PieceGenerator>(board: &mut Board<G>, max_steps: u32, stats: &mut Stats) -> anyhow::Result<()> {
    let mut steps = 0;
    while let Some(animation) = board.pending_animation() {
        match animation {
            Animation::Swap { reversal: true, .. } => stats.reverted += 1,
            Animation::Destroy { removals } => stats.cleared += removals.len(),
            _ => {}
        }
        ensure!(steps < max_steps, "board did not settle within {max_steps} steps");

        board.finish_animation()?;
        steps += 1;
    }
    stats.longest_chain = stats.longest_chain.max(board.chain_length());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .try_init()
        .context("initializing logger")?;

    let config = load_config(&args)?;
    let seed = args.seed.unwrap_or_else(rand::random);
    log::info!("seed: {seed}, config: {config:?}");

    let mut board = Board::new(config, seed);
    board.stabilize()?;
    let mut stats = Stats::default();
    resolve(&mut board, args.max_steps, &mut stats)?;
    let spawn_clears = stats.cleared;

    let mut rng = SmallRng::seed_from_u64(seed);
    let (width, height) = board.size();
    for _ in 0..args.moves {
        let coords = (rng.random_range(0..width), rng.random_range(0..height));
        let direction = Direction::ALL[rng.random_range(0..Direction::ALL.len())];
        let Some(moved) = board.piece_at(coords) else {
            bail!("cell {coords:?} is empty on a settled board");
        };
        let Some(other) = board.neighbor_of(moved, direction) else {
            log::debug!("No neighbor {direction:?} of {coords:?}");
            continue;
        };

        stats.attempted += 1;
        if !board.request_swap(moved, other)?.has_update() {
            continue;
        }
        resolve(&mut board, args.max_steps, &mut stats)?;
    }

    log::info!(
        "swaps: {}, reverted: {}, cleared: {} (+{spawn_clears} at spawn), longest chain: {}",
        stats.attempted,
        stats.reverted,
        stats.cleared - spawn_clears,
        stats.longest_chain
    );

    let snapshot = board.snapshot();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print!("{snapshot}");
    }
    Ok(())
}
