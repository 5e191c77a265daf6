//! Constants for board geometry, game rules, search defaults and heuristic values.
//!
//! The board uses a 1D array representation with padding for boundary detection.
//! Unlike a fixed-size Go board, the side length is chosen at runtime, so only the
//! limits and the padding width live here.

// =============================================================================
// Board Geometry
// =============================================================================

/// Smallest supported side length.
pub const MIN_SIZE: usize = 2;

/// Largest supported side length.
pub const MAX_SIZE: usize = 25;

/// Default side length used by the binary.
pub const DEFAULT_SIZE: usize = 7;

/// Border cells on every side of the grid. A capture probe reaches three points
/// away from the placed stone, so three layers keep every probe inside the array.
pub const PADDING: usize = 3;

/// Largest padded array any board can allocate. Sizes the Zobrist table.
pub const MAX_ARRAY_LEN: usize = (MAX_SIZE + 2 * PADDING + 1) * (MAX_SIZE + PADDING);

// =============================================================================
// Special Move Values
// =============================================================================

/// Pass move marker (index 0 is padding, so safe to use).
pub const PASS: usize = 0;

/// Marker for "no move played yet" and for the move of a tree root.
pub const NO_POINT: usize = usize::MAX;

// =============================================================================
// Game Rules
// =============================================================================

/// Stones in a line needed to win.
pub const WIN_LENGTH: usize = 5;

/// Captured stones needed to win.
pub const CAPTURE_WIN: u32 = 10;

// =============================================================================
// MCTS Parameters
// =============================================================================

/// Default UCT exploration constant.
pub const EXPLORATION: f64 = 0.6;

/// Default weight of the cached heuristic term in the selection rule.
pub const HEURISTIC_WEIGHT: f64 = 1.0;

/// Stop this long before the time limit so the reply is not late.
pub const MCTS_SAFETY_MARGIN_MS: u64 = 30;

/// Default time budget per move.
pub const TIME_LIMIT_MS: u64 = 1000;

// =============================================================================
// Solver Parameters
// =============================================================================

/// The solver stops this long before its time limit.
pub const SOLVER_SAFETY_MARGIN_MS: u64 = 200;

/// Base score of a proven win. Remaining empty points are added on top.
pub const WIN_SCORE: i64 = 1_000_000;

/// Alpha-beta bound, larger than any reachable score.
pub const INF: i64 = i64::MAX / 2;

// =============================================================================
// Heuristic Values
// =============================================================================

/// Saturating score for a completed line or a capture reaching the threshold.
pub const HEURISTIC_WIN: f64 = 100_000.0;

/// Base of the exponential run-length bonus.
pub const RUN_BASE: f64 = 10.0;

/// Discount applied when a run is only extended through a one-point gap.
pub const GAP_DISCOUNT: f64 = 0.9;

/// Share of the selection heuristic taken from the opponent's score at the
/// point, i.e. the value of blocking it.
pub const BLOCK_WEIGHT: f64 = 1.0 / 6.0;

/// Share taken from the mover's own score, which is also scaled down by 10.
pub const OWN_WEIGHT: f64 = (1.0 - BLOCK_WEIGHT) / 10.0;

// =============================================================================
// Direction Offsets
// =============================================================================

/// Axis directions as (row, col) steps: horizontal, vertical and both diagonals.
/// Each axis is scanned in both senses, which covers all 8 directions.
pub const AXES: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];
