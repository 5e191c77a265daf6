//! Ninuki: a search engine for the five-in-a-row stone-capture game.
//!
//! Stones go on empty points. Flanking exactly two opponent stones between
//! two of your own captures them. Five in a row or ten captured stones wins.
//!
//! ## Modules
//!
//! - [`constants`] - Board limits, rule thresholds and search defaults
//! - [`board`] - Board state: play, undo, captures, game end
//! - [`heuristic`] - Static scoring of candidate moves
//! - [`zobrist`] - Position hashing
//! - [`tree`] - Arena-allocated MCTS tree
//! - [`playout`] - Random game simulation for position evaluation
//! - [`mcts`] - Monte Carlo Tree Search with a heuristic-augmented UCT rule
//! - [`tt`] - Transposition table with bound types
//! - [`solver`] - Exact alpha-beta AND/OR solver
//! - [`watchdog`] - Random fallback move when a search misses its deadline
//! - [`config`] - Runtime search configuration
//!
//! ## Example
//!
//! ```
//! use ninuki::board::{Board, Color};
//! use ninuki::config::MctsConfig;
//! use ninuki::mcts::MctsEngine;
//!
//! // Create a new game
//! let mut board = Board::new(7).unwrap();
//! board.play(board.point(3, 3), Color::Black);
//!
//! // Run MCTS to find White's reply
//! let mut engine = MctsEngine::with_seed(1);
//! engine.update_with_move(board.point(3, 3));
//! let best = engine.run_iterations(&board, Color::White, 100, &MctsConfig::default());
//! assert!(board.is_legal(best, Color::White));
//! ```

pub mod board;
pub mod config;
pub mod constants;
pub mod heuristic;
pub mod mcts;
pub mod playout;
pub mod solver;
pub mod tree;
pub mod tt;
pub mod watchdog;
pub mod zobrist;
