use std::error::Error;
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use crossterm::style::Stylize;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

use slider_puzzle_ida::{Board, Outcome, SolverConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "Optimal sliding puzzle solver", long_about = None)]
struct Args {
    /// Board side used when no tiles are given
    #[arg(short, long, default_value_t = 4)]
    size: usize,

    /// Comma separated tiles in row-major order, 0 for the blank
    #[arg(short, long, value_delimiter = ',')]
    tiles: Option<Vec<u8>>,

    /// Random slides applied to the goal when no tiles are given
    #[arg(long, default_value_t = 40)]
    scramble: usize,

    /// Deal a uniformly random solvable board instead of scrambling; large
    /// boards may need limits to finish
    #[arg(long)]
    shuffle: bool,

    /// Seed for the shuffle or scramble
    #[arg(long)]
    seed: Option<u64>,

    /// TOML file with solver settings; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long)]
    skip_verify: bool,

    #[arg(long)]
    parallel: bool,

    #[arg(long)]
    max_nodes: Option<u64>,

    #[arg(long)]
    time_limit_ms: Option<u64>,

    /// Only print the move sequence instead of every intermediate board
    #[arg(short, long)]
    quiet: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("slider_puzzle_ida=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_config(args: &Args) -> Result<SolverConfig, Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => SolverConfig::load(path)?,
        None => SolverConfig::default(),
    };
    if args.skip_verify {
        config.verify_solvability = false;
    }
    if args.parallel {
        config.parallel = true;
    }
    if args.max_nodes.is_some() {
        config.max_nodes = args.max_nodes;
    }
    if args.time_limit_ms.is_some() {
        config.time_limit_ms = args.time_limit_ms;
    }
    Ok(config)
}

fn build_board(args: &Args, config: &SolverConfig) -> Result<Board, Box<dyn Error>> {
    if let Some(tiles) = &args.tiles {
        return Ok(Board::from_tiles_with(tiles, config.verification())?);
    }

    let mut board = Board::new(args.size)?;
    let mut rng = match args.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    };
    if args.shuffle {
        board.shuffle(&mut rng);
    } else {
        board.scramble(&mut rng, args.scramble);
    }
    Ok(board)
}

/// Renders the board with tiles already in place highlighted.
fn render(board: &Board) -> String {
    let width = (board.cells() - 1).to_string().len();
    let mut out = String::new();
    for (index, &tile) in board.tiles().iter().enumerate() {
        let cell = format!("{:>width$}", tile, width = width);
        let styled = if tile == 0 {
            cell.dark_grey().to_string()
        } else if tile as usize == index + 1 {
            cell.green().to_string()
        } else {
            cell.yellow().to_string()
        };
        out.push_str(&styled);
        out.push(if (index + 1) % board.side() == 0 { '\n' } else { ' ' });
    }
    out
}

fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();
    let args = Args::parse();
    let config = load_config(&args)?;
    let board = build_board(&args, &config)?;

    println!("Initial Puzzle:\n{}", render(&board));

    let started = Instant::now();
    let solution = match config.solve(&board) {
        Outcome::Found(solution) => solution,
        Outcome::Aborted {
            reason,
            nodes,
            threshold,
        } => {
            println!(
                "Gave up ({:?}) after {} nodes while searching depth {}",
                reason, nodes, threshold
            );
            return Ok(());
        }
    };
    let elapsed = started.elapsed();

    println!(
        "Found optimal solution with {} moves ({} nodes, {:.3}s)",
        solution.cost,
        solution.nodes,
        elapsed.as_secs_f64()
    );
    println!("{}", solution.notation());

    if !args.quiet {
        let mut replay = board;
        for item in &solution.moves {
            replay.apply_move(*item)?;
            println!("{}\n{}", item, render(&replay));
        }
    }
    Ok(())
}
