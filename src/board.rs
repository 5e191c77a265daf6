//! Board state for Ninuki: stone placement, pair captures, undo and game end.
//!
//! The board is a 1D array with three layers of `Border` cells around the grid,
//! so every neighbor probe used by the rules (up to three points away along any
//! of the 8 directions) stays inside the array without bounds checks.
//!
//! Every move pushes a [`MoveRecord`] onto a history stack. [`Board::undo`] pops
//! it and restores the grid, both capture counters, the side to move, the last
//! move pointers and the Zobrist hash exactly.

use std::fmt;

use thiserror::Error;

use crate::constants::{
    AXES, CAPTURE_WIN, MAX_SIZE, MIN_SIZE, NO_POINT, PADDING, PASS, WIN_LENGTH,
};
use crate::zobrist;

/// A point on the board, represented as an index into the padded 1D array.
pub type Point = usize;

/// Stone colors.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    White,
}

impl Color {
    /// Get opponent color.
    #[inline]
    pub fn opponent(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        match self {
            Color::Black => 0,
            Color::White => 1,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Black => write!(f, "black"),
            Color::White => write!(f, "white"),
        }
    }
}

/// Contents of one array cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Black,
    White,
    /// Padding outside the playable grid.
    Border,
}

impl From<Color> for Cell {
    fn from(color: Color) -> Self {
        match color {
            Color::Black => Cell::Black,
            Color::White => Cell::White,
        }
    }
}

/// Errors raised when constructing a board.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("board size {0} is outside {min}..={max}", min = MIN_SIZE, max = MAX_SIZE)]
    InvalidSize(usize),
}

/// Everything needed to take one move back.
#[derive(Debug, Clone)]
struct MoveRecord {
    point: Point,
    color: Color,
    /// Opponent stones removed by this move, in removal order.
    captured: Vec<Point>,
    prev_player: Color,
    prev_last: Point,
    prev_last2: Point,
}

/// A Ninuki position with full move history.
///
/// `Clone` is a deep copy: grid, counters and history stacks are all duplicated,
/// so a search can mutate its copy freely.
#[derive(Debug, Clone)]
pub struct Board {
    size: usize,
    /// Row stride of the padded array (size + PADDING).
    stride: usize,
    cells: Vec<Cell>,
    current_player: Color,
    /// Stones captured by Black and White, always even.
    captures: [u32; 2],
    last_move: Point,
    last2_move: Point,
    history: Vec<MoveRecord>,
    hash: u64,
}

impl Board {
    /// Create an empty board of the given side length.
    pub fn new(size: usize) -> Result<Self, BoardError> {
        let mut board = Board {
            size: 0,
            stride: 0,
            cells: Vec::new(),
            current_player: Color::Black,
            captures: [0, 0],
            last_move: NO_POINT,
            last2_move: NO_POINT,
            history: Vec::new(),
            hash: 0,
        };
        board.reset(size)?;
        Ok(board)
    }

    /// Reset to an empty board of the given side length.
    ///
    /// On error the board is left unchanged.
    pub fn reset(&mut self, size: usize) -> Result<(), BoardError> {
        if !(MIN_SIZE..=MAX_SIZE).contains(&size) {
            return Err(BoardError::InvalidSize(size));
        }
        let stride = size + PADDING;
        let len = (size + 2 * PADDING + 1) * stride;

        self.size = size;
        self.stride = stride;
        self.cells = vec![Cell::Border; len];
        for row in 0..size {
            let start = (row + PADDING) * stride + PADDING;
            self.cells[start..start + size].fill(Cell::Empty);
        }
        self.current_player = Color::Black;
        self.captures = [0, 0];
        self.last_move = NO_POINT;
        self.last2_move = NO_POINT;
        self.history.clear();
        self.hash = self.compute_hash();
        Ok(())
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Padded index of the 0-based `(row, col)` point.
    #[inline]
    pub fn point(&self, row: usize, col: usize) -> Point {
        debug_assert!(row < self.size && col < self.size);
        (row + PADDING) * self.stride + col + PADDING
    }

    /// 0-based `(row, col)` of a playable point.
    #[inline]
    pub fn row_col(&self, point: Point) -> (usize, usize) {
        (point / self.stride - PADDING, point % self.stride - PADDING)
    }

    /// Cell at `point`. Indices past the array read as `Border`.
    #[inline]
    pub fn cell(&self, point: Point) -> Cell {
        self.cells.get(point).copied().unwrap_or(Cell::Border)
    }

    #[inline]
    pub fn current_player(&self) -> Color {
        self.current_player
    }

    #[inline]
    pub fn last_move(&self) -> Point {
        self.last_move
    }

    #[inline]
    pub fn last2_move(&self) -> Point {
        self.last2_move
    }

    /// Number of moves (passes included) on the history stack.
    #[inline]
    pub fn ply(&self) -> usize {
        self.history.len()
    }

    /// Incrementally maintained Zobrist hash of the position.
    #[inline]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// Stones captured so far by `color`.
    #[inline]
    pub fn captures(&self, color: Color) -> u32 {
        self.captures[color.index()]
    }

    /// Step between neighbouring array cells along an axis direction.
    #[inline]
    pub(crate) fn offset(&self, (dr, dc): (isize, isize)) -> isize {
        dr * self.stride as isize + dc
    }

    /// Point `steps` cells away from `point` along `offset`.
    ///
    /// Only valid within the padding, i.e. at most `PADDING` steps outside the grid.
    #[inline]
    pub(crate) fn step(point: Point, offset: isize, steps: isize) -> Point {
        (point as isize + offset * steps) as usize
    }

    /// Whether `color` may play at `point`. Passing is always legal.
    #[inline]
    pub fn is_legal(&self, point: Point, _color: Color) -> bool {
        point == PASS || self.cell(point) == Cell::Empty
    }

    /// All empty points, in ascending index order.
    pub fn get_empty_points(&self) -> Vec<Point> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| **c == Cell::Empty)
            .map(|(p, _)| p)
            .collect()
    }

    /// Number of empty points.
    pub fn empty_count(&self) -> usize {
        self.cells.iter().filter(|c| **c == Cell::Empty).count()
    }

    /// Opponent stones that `color` would capture by playing at `point`.
    ///
    /// Checks all 8 directions for the pattern placed-opp-opp-own. The board is
    /// not modified; `point` itself is not inspected.
    pub fn would_capture(&self, point: Point, color: Color) -> Vec<Point> {
        let own = Cell::from(color);
        let opp = Cell::from(color.opponent());
        let mut captured = Vec::new();

        for axis in AXES {
            let base = self.offset(axis);
            for offset in [base, -base] {
                let p1 = Self::step(point, offset, 1);
                let p2 = Self::step(point, offset, 2);
                let p3 = Self::step(point, offset, 3);
                if self.cell(p1) == opp && self.cell(p2) == opp && self.cell(p3) == own {
                    captured.push(p1);
                    captured.push(p2);
                }
            }
        }
        captured
    }

    /// Play a move for `color`.
    ///
    /// Returns `false` without touching the board if `point` is not empty.
    /// Otherwise places the stone, removes every flanked opponent pair, credits
    /// the captures, hands the turn to the opponent and pushes a history frame.
    pub fn play(&mut self, point: Point, color: Color) -> bool {
        if point == PASS {
            self.push_move(PASS, color, Vec::new());
            return true;
        }
        if self.cell(point) != Cell::Empty {
            return false;
        }

        let zt = zobrist::table();
        self.cells[point] = Cell::from(color);
        self.hash ^= zt.stone(point, color);

        let captured = self.would_capture(point, color);
        if !captured.is_empty() {
            let opp = color.opponent();
            for &p in &captured {
                self.cells[p] = Cell::Empty;
                self.hash ^= zt.stone(p, opp);
            }
            self.set_captures(color, self.captures(color) + captured.len() as u32);
        }

        self.push_move(point, color, captured);
        true
    }

    fn push_move(&mut self, point: Point, color: Color, captured: Vec<Point>) {
        self.history.push(MoveRecord {
            point,
            color,
            captured,
            prev_player: self.current_player,
            prev_last: self.last_move,
            prev_last2: self.last2_move,
        });
        self.set_player(color.opponent());
        self.last2_move = self.last_move;
        self.last_move = point;
    }

    /// Take back the most recent move.
    ///
    /// # Panics
    /// Panics if there is no move to undo.
    pub fn undo(&mut self) {
        let Some(record) = self.history.pop() else {
            panic!("undo called with empty move history");
        };

        let zt = zobrist::table();
        if record.point != PASS {
            self.cells[record.point] = Cell::Empty;
            self.hash ^= zt.stone(record.point, record.color);
        }
        if !record.captured.is_empty() {
            let opp = record.color.opponent();
            for &p in &record.captured {
                self.cells[p] = Cell::from(opp);
                self.hash ^= zt.stone(p, opp);
            }
            let restored = record.captured.len() as u32;
            self.set_captures(record.color, self.captures(record.color) - restored);
        }

        self.set_player(record.prev_player);
        self.last_move = record.prev_last;
        self.last2_move = record.prev_last2;
    }

    fn set_captures(&mut self, color: Color, stones: u32) {
        let zt = zobrist::table();
        let old = self.captures[color.index()];
        self.hash ^= zt.captures(color, old) ^ zt.captures(color, stones);
        self.captures[color.index()] = stones;
    }

    fn set_player(&mut self, color: Color) {
        if (self.current_player == Color::Black) != (color == Color::Black) {
            self.hash ^= zobrist::table().black_to_move();
        }
        self.current_player = color;
    }

    /// Recompute the Zobrist hash from scratch. Always equals [`Board::hash`].
    pub fn compute_hash(&self) -> u64 {
        let zt = zobrist::table();
        let mut h = 0u64;
        for (p, cell) in self.cells.iter().enumerate() {
            match cell {
                Cell::Black => h ^= zt.stone(p, Color::Black),
                Cell::White => h ^= zt.stone(p, Color::White),
                _ => {}
            }
        }
        if self.current_player == Color::Black {
            h ^= zt.black_to_move();
        }
        h ^= zt.captures(Color::Black, self.captures[0]);
        h ^= zt.captures(Color::White, self.captures[1]);
        h
    }

    /// Color with five or more in a row through the last played point.
    ///
    /// A line of five can only first appear at the most recent stone, so the
    /// scan is limited to the four axes through that point.
    pub fn detect_five_in_row(&self) -> Option<Color> {
        if self.last_move == NO_POINT || self.last_move == PASS {
            return None;
        }
        let color = match self.cell(self.last_move) {
            Cell::Black => Color::Black,
            Cell::White => Color::White,
            _ => return None,
        };
        let own = Cell::from(color);

        for axis in AXES {
            let offset = self.offset(axis);
            let mut count = 1;
            for dir in [offset, -offset] {
                let mut p = Self::step(self.last_move, dir, 1);
                while self.cell(p) == own {
                    count += 1;
                    p = Self::step(p, dir, 1);
                }
            }
            if count >= WIN_LENGTH {
                return Some(color);
            }
        }
        None
    }

    /// Whether the game is over, and who won.
    ///
    /// Five in a row or 10 captured stones win. A full board or two
    /// consecutive passes end the game without a winner.
    pub fn is_terminal(&self) -> (bool, Option<Color>) {
        if let Some(winner) = self.detect_five_in_row() {
            return (true, Some(winner));
        }
        if self.captures(Color::Black) >= CAPTURE_WIN {
            return (true, Some(Color::Black));
        }
        if self.captures(Color::White) >= CAPTURE_WIN {
            return (true, Some(Color::White));
        }
        if self.empty_count() == 0 || (self.last_move == PASS && self.last2_move == PASS) {
            return (true, None);
        }
        (false, None)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.size {
            for col in 0..self.size {
                let ch = match self.cell(self.point(row, col)) {
                    Cell::Black => 'X',
                    Cell::White => 'O',
                    _ => '.',
                };
                write!(f, "{ch} ")?;
            }
            writeln!(f)?;
        }
        writeln!(
            f,
            "captures: black {} white {}",
            self.captures(Color::Black),
            self.captures(Color::White)
        )
    }
}
