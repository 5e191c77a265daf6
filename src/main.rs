//! Ninuki engine command line.
//!
//! ## Usage
//!
//! - `ninuki` - Show a demo
//! - `ninuki demo` - Run the demo
//! - `ninuki selfplay` - Play a full game between two engine instances

use std::time::Duration;

use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use ninuki::board::{Board, Color, Point};
use ninuki::config::{MctsConfig, SolverConfig};
use ninuki::constants::{DEFAULT_SIZE, EXPLORATION, HEURISTIC_WEIGHT, PASS, TIME_LIMIT_MS};
use ninuki::mcts::MctsEngine;
use ninuki::solver::AlphaBetaSolver;
use ninuki::watchdog::{DecisionSource, Watchdog};

/// Extra time the watchdog allows past the search's own limit.
const WATCHDOG_GRACE_MS: u64 = 250;

/// Ninuki: MCTS and alpha-beta engine for the stone-capture game
#[derive(Parser)]
#[command(name = "ninuki")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log filter used when RUST_LOG is not set (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a short demo of the board, MCTS and the solver
    Demo,
    /// Play a whole game between two MCTS engines
    Selfplay(SelfplayArgs),
}

#[derive(Args)]
struct SelfplayArgs {
    /// Board side length
    #[arg(long, default_value_t = DEFAULT_SIZE)]
    size: usize,

    /// Time per move in milliseconds
    #[arg(long, default_value_t = TIME_LIMIT_MS)]
    time_ms: u64,

    /// UCT exploration constant
    #[arg(long, default_value_t = EXPLORATION)]
    exploration: f64,

    /// Weight of the heuristic term in selection
    #[arg(long, default_value_t = HEURISTIC_WEIGHT)]
    heuristic_weight: f64,

    /// Seed for reproducible games
    #[arg(long)]
    seed: Option<u64>,

    /// Switch to the exact solver once this many empty points remain
    #[arg(long, default_value_t = 12)]
    solver_threshold: usize,
}

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    match cli.command {
        Some(Commands::Selfplay(args)) => run_selfplay(&args),
        Some(Commands::Demo) | None => run_demo(),
    }
}

fn format_point(board: &Board, point: Point) -> String {
    if point == PASS {
        return "pass".to_string();
    }
    let (row, col) = board.row_col(point);
    format!("({row}, {col})")
}

fn run_demo() -> Result<()> {
    println!("Ninuki: MCTS and alpha-beta engine\n");

    // Demo 1: captures
    println!("=== Capture Demo ===");
    let mut board = Board::new(7)?;
    board.play(board.point(3, 1), Color::Black);
    board.play(board.point(3, 2), Color::White);
    board.play(board.point(0, 0), Color::Black);
    board.play(board.point(3, 3), Color::White);
    let capture = board.point(3, 4);
    println!("{board}");
    println!("Black plays {}", format_point(&board, capture));
    board.play(capture, Color::Black);
    println!("{board}");

    // Demo 2: MCTS
    println!("=== MCTS Demo ===");
    let config = MctsConfig::default().with_time_limit(Duration::from_millis(300));
    config.validate()?;
    let mut engine = MctsEngine::new();
    let color = board.current_player();
    let best = engine.get_move(&board, color, &config);
    println!(
        "{color} to play, best move {} after {} rollouts ({} nodes)",
        format_point(&board, best),
        engine.root_visits(),
        engine.tree_size()
    );

    // Demo 3: solver
    println!("\n=== Solver Demo ===");
    let mut board = Board::new(7)?;
    for (col, white) in [(0, (6, 0)), (1, (6, 2)), (2, (4, 4)), (3, (2, 6))] {
        board.play(board.point(0, col), Color::Black);
        board.play(board.point(white.0, white.1), Color::White);
    }
    println!("{board}");
    let mut solver = AlphaBetaSolver::default();
    let result = solver.solve(&board, Duration::from_secs(2))?;
    println!(
        "{result:?} at {} ({:?})",
        format_point(&board, result.best_move()),
        solver.stats()
    );
    Ok(())
}

fn run_selfplay(args: &SelfplayArgs) -> Result<()> {
    let time_limit = Duration::from_millis(args.time_ms);
    let mcts_config = MctsConfig::default()
        .with_exploration(args.exploration)
        .with_heuristic_weight(args.heuristic_weight)
        .with_time_limit(time_limit);
    mcts_config.validate()?;
    let solver_config = SolverConfig::default();
    solver_config.validate(time_limit)?;

    let mut board = Board::new(args.size)?;
    let (mut black, mut white) = match args.seed {
        Some(seed) => (MctsEngine::with_seed(seed), MctsEngine::with_seed(seed ^ 1)),
        None => (MctsEngine::new(), MctsEngine::new()),
    };
    let mut solver = AlphaBetaSolver::new(solver_config);
    let mut watchdog = Watchdog::new(time_limit + Duration::from_millis(WATCHDOG_GRACE_MS));
    if let Some(seed) = args.seed {
        watchdog = watchdog.with_seed(seed);
    }

    info!(size = args.size, time_ms = args.time_ms, "starting self-play");

    loop {
        let (terminal, winner) = board.is_terminal();
        if terminal {
            match winner {
                Some(color) => println!("{color} wins after {} moves", board.ply()),
                None => println!("Draw after {} moves", board.ply()),
            }
            break;
        }

        let color = board.current_player();
        let use_solver = board.empty_count() <= args.solver_threshold;
        let decision = watchdog.run(&board, || {
            if use_solver {
                match solver.solve(&board, time_limit) {
                    Ok(result) => {
                        info!(?result, "solver");
                        result.best_move()
                    }
                    Err(_) => PASS,
                }
            } else {
                let engine = match color {
                    Color::Black => &mut black,
                    Color::White => &mut white,
                };
                engine.get_move(&board, color, &mcts_config)
            }
        });
        if decision.source == DecisionSource::Fallback {
            println!("(watchdog fallback)");
        }

        let point = decision.point;
        if !board.play(point, color) {
            bail!("engine chose occupied point {}", format_point(&board, point));
        }
        black.update_with_move(point);
        white.update_with_move(point);

        println!("{color} plays {}", format_point(&board, point));
        println!("{board}");
    }
    Ok(())
}
