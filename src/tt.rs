//! Transposition table for the exact solver.
//!
//! Stores solved scores keyed by Zobrist hash. Every solver search runs to the
//! end of the game, so there is no depth field. What varies is the alpha-beta
//! window a score was computed under, recorded as the entry's [`Bound`].
//!
//! Entries are trusted by hash alone: two different positions that collide on
//! 64 bits would share an entry. That risk is accepted.

use std::collections::HashMap;

use crate::board::Point;

/// How a stored score relates to the true value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// The search completed inside its window.
    Exact,
    /// The true value is at least the score (failed high).
    Lower,
    /// The true value is at most the score (failed low).
    Upper,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TtEntry {
    /// Score from the perspective of the side to move in the stored position.
    pub score: i64,
    pub best_move: Option<Point>,
    pub bound: Bound,
}

#[derive(Debug, Default)]
pub struct TranspositionTable {
    entries: HashMap<u64, TtEntry>,
}

impl TranspositionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Score usable for the window `(alpha, beta)`, if any.
    ///
    /// Exact entries always apply. A lower bound applies when it already
    /// reaches `beta`, an upper bound when it is already at or below `alpha`.
    pub fn probe(&self, hash: u64, alpha: i64, beta: i64) -> Option<(i64, Option<Point>)> {
        let entry = self.entries.get(&hash)?;
        let usable = match entry.bound {
            Bound::Exact => true,
            Bound::Lower => entry.score >= beta,
            Bound::Upper => entry.score <= alpha,
        };
        usable.then_some((entry.score, entry.best_move))
    }

    /// Store an entry, replacing any previous one for `hash`.
    pub fn store(&mut self, hash: u64, score: i64, best_move: Option<Point>, bound: Bound) {
        self.entries.insert(
            hash,
            TtEntry {
                score,
                best_move,
                bound,
            },
        );
    }

    pub fn get(&self, hash: u64) -> Option<&TtEntry> {
        self.entries.get(&hash)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
