//! Static move scoring used to bias MCTS selection and order solver moves.
//!
//! A candidate placement is scored as if `color` played it: a line-pattern term
//! rewards the runs of `color` the stone would join, and a capture-threat term
//! rewards pairs it would take, escalating as the capture count nears the win.
//!
//! MCTS selection uses [`Board::selection_heuristic`], which also scores the
//! point for the opponent so that blocking a threat is rewarded.

use crate::board::{Board, Cell, Color, Point};
use crate::constants::{
    AXES, BLOCK_WEIGHT, CAPTURE_WIN, GAP_DISCOUNT, HEURISTIC_WIN, OWN_WEIGHT, RUN_BASE, WIN_LENGTH,
};

/// One axis through the candidate point.
struct Run {
    /// Stones of the color in line, the candidate included.
    count: usize,
    /// Ends of the run blocked by a stone or the border (0, 1 or 2).
    closed: u32,
    /// 1.0, or `GAP_DISCOUNT` if the run was extended across a gap.
    discount: f64,
}

impl Run {
    fn bonus(&self) -> f64 {
        if self.count <= 1 {
            0.0
        } else if self.count >= WIN_LENGTH {
            HEURISTIC_WIN
        } else if self.closed == 0 {
            RUN_BASE.powi(self.count as i32) * self.discount
        } else if self.closed == 1 && self.count != 2 {
            RUN_BASE.powi(self.count as i32 - 1) * self.discount
        } else {
            0.0
        }
    }
}

impl Board {
    /// Score a placement of `color` at `point`. Higher is better for `color`.
    ///
    /// The point is treated as holding a `color` stone; its current content is
    /// not inspected.
    pub fn heuristic_evaluate(&self, point: Point, color: Color) -> f64 {
        self.line_score(point, color) + self.capture_score(point, color)
    }

    /// Heuristic cached on an MCTS child for `mover` playing `point`.
    pub fn selection_heuristic(&self, point: Point, mover: Color) -> f64 {
        BLOCK_WEIGHT * self.heuristic_evaluate(point, mover.opponent())
            + OWN_WEIGHT * self.heuristic_evaluate(point, mover)
    }

    fn line_score(&self, point: Point, color: Color) -> f64 {
        AXES.iter()
            .map(|&axis| self.scan_axis(point, color, self.offset(axis)).bonus())
            .sum()
    }

    fn scan_axis(&self, point: Point, color: Color, offset: isize) -> Run {
        let own = Cell::from(color);
        let mut run = Run {
            count: 1,
            closed: 0,
            discount: 1.0,
        };

        for dir in [offset, -offset] {
            let mut p = Board::step(point, dir, 1);
            while self.cell(p) == own && run.count < WIN_LENGTH {
                run.count += 1;
                p = Board::step(p, dir, 1);
            }
            if run.count >= WIN_LENGTH {
                continue;
            }
            if self.cell(p) != Cell::Empty {
                run.closed += 1;
                continue;
            }
            if run.count >= WIN_LENGTH - 1 {
                continue;
            }

            // One-point gap: count the stones beyond it, but never as a full line.
            let mut q = Board::step(p, dir, 1);
            if self.cell(q) != own {
                continue;
            }
            run.discount = GAP_DISCOUNT;
            while self.cell(q) == own {
                run.count += 1;
                q = Board::step(q, dir, 1);
                if run.count >= WIN_LENGTH {
                    run.count = WIN_LENGTH - 1;
                    break;
                }
            }
            if self.cell(q) != Cell::Empty {
                run.closed += 1;
            }
        }
        run
    }

    fn capture_score(&self, point: Point, color: Color) -> f64 {
        let new = self.would_capture(point, color).len() as u32;
        if new == 0 {
            return 0.0;
        }
        let total = self.captures(color) + new;
        if total >= CAPTURE_WIN {
            HEURISTIC_WIN
        } else {
            RUN_BASE.powf(f64::from(total) / 2.0)
        }
    }
}
