//! Exact AND/OR alpha-beta solver with a transposition table.
//!
//! OR nodes are positions with the root mover to play and take the maximum
//! over their children. AND nodes take the minimum. Scores are from the root
//! mover's perspective: a won leaf is worth `WIN_SCORE` plus the empty points
//! left, so faster wins score higher, and a drawn leaf is worth 0.
//!
//! The search always runs to terminal positions; the only thing that stops it
//! early is the wall clock. A timed-out search returns its best move so far
//! as [`SolveResult::BestEffort`].
//!
//! The table stores scores from the perspective of the side to move in each
//! position, so one solver instance can be reused for either color.

use std::cmp::Reverse;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, info};

use crate::board::{Board, Color, Point};
use crate::config::SolverConfig;
use crate::constants::{INF, WIN_SCORE};
use crate::tt::{Bound, TranspositionTable, TtEntry};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolveError {
    #[error("game is already over")]
    GameOver,
}

/// Which side a proven result favours, relative to the player to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Mover,
    Opponent,
}

/// Outcome of [`AlphaBetaSolver::solve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveResult {
    /// Proven win. For `Side::Opponent` the move delays the loss the longest.
    Win { winner: Side, best_move: Point },
    /// Proven draw.
    Draw { best_move: Point },
    /// Time ran out; the move is the best found so far and may not be optimal.
    BestEffort { score: i64, best_move: Point },
}

impl SolveResult {
    pub fn best_move(&self) -> Point {
        match *self {
            SolveResult::Win { best_move, .. }
            | SolveResult::Draw { best_move }
            | SolveResult::BestEffort { best_move, .. } => best_move,
        }
    }

    /// Whether the search completed.
    pub fn is_exact(&self) -> bool {
        !matches!(self, SolveResult::BestEffort { .. })
    }
}

/// Counters for the last `solve` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolveStats {
    /// Nodes expanded (cache hits and leaves not included).
    pub nodes: u64,
    pub tt_hits: u64,
    /// Alpha-beta cutoffs.
    pub cutoffs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    Or,
    And,
}

impl NodeKind {
    fn flip(self) -> Self {
        match self {
            NodeKind::Or => NodeKind::And,
            NodeKind::And => NodeKind::Or,
        }
    }

    /// Bound type of a finished node searched with window `(alpha0, beta0)`.
    ///
    /// A node that stopped on an immediate win skipped slower wins that could
    /// leave more empty points, so its value is one-sided whatever the window.
    fn bound(self, best: i64, alpha0: i64, beta0: i64, stopped_on_win: bool) -> Bound {
        if stopped_on_win {
            return match self {
                NodeKind::Or => Bound::Lower,
                NodeKind::And => Bound::Upper,
            };
        }
        if best <= alpha0 {
            Bound::Upper
        } else if best >= beta0 {
            Bound::Lower
        } else {
            Bound::Exact
        }
    }
}

impl Bound {
    fn flip(self) -> Self {
        match self {
            Bound::Exact => Bound::Exact,
            Bound::Lower => Bound::Upper,
            Bound::Upper => Bound::Lower,
        }
    }
}

/// A candidate move with its ordering information.
struct Candidate {
    point: Point,
    /// Playing here ends the game in the mover's favour.
    wins: bool,
}

pub struct AlphaBetaSolver {
    config: SolverConfig,
    tt: TranspositionTable,
    stats: SolveStats,
    mover: Color,
    start: Instant,
    budget: Duration,
    timed_out: bool,
}

impl Default for AlphaBetaSolver {
    fn default() -> Self {
        Self::new(SolverConfig::default())
    }
}

impl AlphaBetaSolver {
    pub fn new(config: SolverConfig) -> Self {
        Self {
            config,
            tt: TranspositionTable::new(),
            stats: SolveStats::default(),
            mover: Color::Black,
            start: Instant::now(),
            budget: Duration::ZERO,
            timed_out: false,
        }
    }

    /// Statistics of the most recent `solve`.
    pub fn stats(&self) -> SolveStats {
        self.stats
    }

    /// Cached entry for a position hash. Scores are for the side to move there.
    pub fn cached(&self, hash: u64) -> Option<TtEntry> {
        self.tt.get(hash).copied()
    }

    pub fn cache_len(&self) -> usize {
        self.tt.len()
    }

    pub fn clear_cache(&mut self) {
        self.tt.clear();
    }

    /// Solve `board` for the player to move within `time_limit`.
    ///
    /// The search stops a safety margin before the limit. The caller's board
    /// is not modified.
    pub fn solve(&mut self, board: &Board, time_limit: Duration) -> Result<SolveResult, SolveError> {
        if board.is_terminal().0 {
            return Err(SolveError::GameOver);
        }

        self.stats = SolveStats::default();
        self.mover = board.current_player();
        self.start = Instant::now();
        self.budget = self.config.budget(time_limit);
        self.timed_out = false;

        let mut work = board.clone();
        let (score, best) = self.search(&mut work, NodeKind::Or, -INF, INF);
        // A non-terminal position always has an empty point to fall back on.
        let best_move = best
            .or_else(|| board.get_empty_points().first().copied())
            .ok_or(SolveError::GameOver)?;

        let result = if self.timed_out {
            SolveResult::BestEffort { score, best_move }
        } else if score > 0 {
            SolveResult::Win { winner: Side::Mover, best_move }
        } else if score < 0 {
            SolveResult::Win { winner: Side::Opponent, best_move }
        } else {
            SolveResult::Draw { best_move }
        };

        let elapsed_ms = self.start.elapsed().as_millis() as u64;
        if self.timed_out {
            info!(elapsed_ms, nodes = self.stats.nodes, "solver timed out");
        }
        debug!(
            ?result,
            nodes = self.stats.nodes,
            tt_hits = self.stats.tt_hits,
            cutoffs = self.stats.cutoffs,
            cache = self.tt.len(),
            elapsed_ms,
            "solve finished"
        );
        Ok(result)
    }

    fn out_of_time(&mut self) -> bool {
        if !self.timed_out && self.start.elapsed() >= self.budget {
            self.timed_out = true;
        }
        self.timed_out
    }

    fn search(
        &mut self,
        board: &mut Board,
        kind: NodeKind,
        mut alpha: i64,
        mut beta: i64,
    ) -> (i64, Option<Point>) {
        let (terminal, winner) = board.is_terminal();
        if terminal {
            return (self.evaluate(board, winner), None);
        }

        let hash = board.hash();
        if let Some(hit) = self.probe(hash, kind, alpha, beta) {
            self.stats.tt_hits += 1;
            return hit;
        }
        if self.out_of_time() {
            return (Self::worst(kind), None);
        }
        self.stats.nodes += 1;

        let (alpha0, beta0) = (alpha, beta);
        let mut best = Self::worst(kind);
        let mut best_move = None;
        let mut stopped_on_win = false;

        for candidate in self.order_moves(board) {
            let color = board.current_player();
            board.play(candidate.point, color);
            let (value, _) = self.search(board, kind.flip(), alpha, beta);
            board.undo();

            if self.timed_out {
                break;
            }

            let improved = match kind {
                NodeKind::Or => value > best,
                NodeKind::And => value < best,
            };
            if improved || best_move.is_none() {
                best = value;
                best_move = Some(candidate.point);
            }
            match kind {
                NodeKind::Or => alpha = alpha.max(best),
                NodeKind::And => beta = beta.min(best),
            }
            if alpha >= beta {
                self.stats.cutoffs += 1;
                break;
            }
            if candidate.wins {
                stopped_on_win = true;
                break;
            }
        }

        if !self.timed_out {
            let bound = kind.bound(best, alpha0, beta0, stopped_on_win);
            self.store(hash, kind, best, best_move, bound);
        }
        (best, best_move)
    }

    fn worst(kind: NodeKind) -> i64 {
        match kind {
            NodeKind::Or => -INF,
            NodeKind::And => INF,
        }
    }

    /// Score of a terminal position for the root mover.
    fn evaluate(&self, board: &Board, winner: Option<Color>) -> i64 {
        let empties = board.empty_count() as i64;
        match winner {
            Some(c) if c == self.mover => WIN_SCORE + empties,
            Some(_) => -(WIN_SCORE + empties),
            None => 0,
        }
    }

    /// Table lookup, converting from side-to-move perspective at AND nodes.
    fn probe(&self, hash: u64, kind: NodeKind, alpha: i64, beta: i64) -> Option<(i64, Option<Point>)> {
        match kind {
            NodeKind::Or => self.tt.probe(hash, alpha, beta),
            NodeKind::And => self
                .tt
                .probe(hash, -beta, -alpha)
                .map(|(score, mv)| (-score, mv)),
        }
    }

    fn store(&mut self, hash: u64, kind: NodeKind, score: i64, best_move: Option<Point>, bound: Bound) {
        match kind {
            NodeKind::Or => self.tt.store(hash, score, best_move, bound),
            NodeKind::And => self.tt.store(hash, -score, best_move, bound.flip()),
        }
    }

    /// Moves in search order: immediate wins (fastest first), then points
    /// where the opponent would win immediately, then the rest by heuristic.
    fn order_moves(&self, board: &mut Board) -> Vec<Candidate> {
        let color = board.current_player();
        let opp = color.opponent();

        let mut wins = Vec::new();
        let mut blocks = Vec::new();
        let mut rest = Vec::new();

        for point in board.get_empty_points() {
            if let Some(empties) = Self::winning_empties(board, point, color) {
                wins.push((point, empties));
            } else if Self::winning_empties(board, point, opp).is_some() {
                blocks.push(point);
            } else {
                rest.push((point, board.heuristic_evaluate(point, color)));
            }
        }

        wins.sort_by_key(|&(_, empties)| Reverse(empties));
        rest.sort_by(|a, b| b.1.total_cmp(&a.1));

        wins.into_iter()
            .map(|(point, _)| Candidate { point, wins: true })
            .chain(
                blocks
                    .into_iter()
                    .chain(rest.into_iter().map(|(p, _)| p))
                    .map(|point| Candidate { point, wins: false }),
            )
            .collect()
    }

    /// Empty points left if `color` playing `point` wins on the spot.
    fn winning_empties(board: &mut Board, point: Point, color: Color) -> Option<usize> {
        board.play(point, color);
        let result = match board.is_terminal() {
            (true, Some(winner)) if winner == color => Some(board.empty_count()),
            _ => None,
        };
        board.undo();
        result
    }
}
