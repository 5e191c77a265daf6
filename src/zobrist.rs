//! Zobrist hashing for position identification.
//!
//! Every (point, color) pair gets a fixed random key; a position hash is the XOR of
//! the keys of all stones on the board, plus a side-to-move key and one key per
//! color for its capture count. XOR is its own inverse, so placing and removing
//! a stone are the same update and `Board::undo` can restore a hash exactly.
//!
//! The table is built once per process from a fixed seed and never mutated, so
//! identical positions hash identically regardless of the path that reached them.
//! Distinct positions may still collide; the solver accepts that risk.

use std::sync::OnceLock;

use crate::board::Color;
use crate::constants::MAX_ARRAY_LEN;

/// Seed for the key generator. Same seed = same table = reproducible hashes.
const ZOBRIST_SEED: u64 = 0x1234_5678_9ABC_DEF0;

/// Distinct capture counts (in pairs) that get their own key. Larger counts share
/// the last key; the game is over long before that matters.
const CAPTURE_KEYS: usize = 16;

static TABLE: OnceLock<ZobristTable> = OnceLock::new();

/// Precomputed random keys for every padded array index and color.
pub struct ZobristTable {
    stones: [Vec<u64>; 2],
    black_to_move: u64,
    captures: [[u64; CAPTURE_KEYS]; 2],
}

/// Shared table, built on first use.
#[inline]
pub fn table() -> &'static ZobristTable {
    TABLE.get_or_init(ZobristTable::new)
}

impl ZobristTable {
    fn new() -> Self {
        let mut rng = fastrand::Rng::with_seed(ZOBRIST_SEED);

        let black = (0..MAX_ARRAY_LEN).map(|_| rng.u64(..)).collect();
        let white = (0..MAX_ARRAY_LEN).map(|_| rng.u64(..)).collect();

        let mut captures = [[0u64; CAPTURE_KEYS]; 2];
        for row in &mut captures {
            for key in row.iter_mut() {
                *key = rng.u64(..);
            }
        }

        Self {
            stones: [black, white],
            black_to_move: rng.u64(..),
            captures,
        }
    }

    /// Key for a stone of `color` at padded index `point`.
    #[inline]
    pub fn stone(&self, point: usize, color: Color) -> u64 {
        self.stones[color.index()][point]
    }

    /// Key XORed in while Black is to move.
    #[inline]
    pub fn black_to_move(&self) -> u64 {
        self.black_to_move
    }

    /// Key for `color` having captured `stones` stones.
    #[inline]
    pub fn captures(&self, color: Color, stones: u32) -> u64 {
        let pairs = (stones / 2) as usize;
        self.captures[color.index()][pairs.min(CAPTURE_KEYS - 1)]
    }
}
