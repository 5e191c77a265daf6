//! Monte Carlo playouts (random game simulation).
//!
//! A playout plays uniformly random empty points, alternating colors from the
//! side to move, until the game ends, then reports the winner. Passing is never
//! chosen; a full board ends the game on its own.

use crate::board::{Board, Color};

/// Play random moves on `board` until it is terminal and return the winner.
///
/// The board is left in the final position. `None` means a drawn game.
pub fn rollout(board: &mut Board, rng: &mut fastrand::Rng) -> Option<Color> {
    let mut empties = board.get_empty_points();
    loop {
        let (terminal, winner) = board.is_terminal();
        if terminal {
            return winner;
        }

        // Captures reopen points, so refresh the candidate list after them.
        let i = rng.usize(..empties.len());
        let pt = empties.swap_remove(i);
        let before = board.captures(board.current_player());
        board.play(pt, board.current_player());
        if board.captures(board.current_player().opponent()) != before {
            empties = board.get_empty_points();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rollout_reaches_terminal() {
        let mut rng = fastrand::Rng::with_seed(7);
        for _ in 0..20 {
            let mut b = Board::new(7).unwrap();
            let winner = rollout(&mut b, &mut rng);
            assert_eq!(b.is_terminal(), (true, winner));
        }
    }

    #[test]
    fn test_rollout_on_terminal_board() {
        let mut b = Board::new(7).unwrap();
        for col in 0..5 {
            b.play(b.point(0, col), Color::White);
        }
        let ply = b.ply();
        let mut rng = fastrand::Rng::with_seed(1);
        assert_eq!(rollout(&mut b, &mut rng), Some(Color::White));
        assert_eq!(b.ply(), ply);
    }

    #[test]
    fn test_rollout_tiny_board_draws() {
        // No line of five and no capture fits on 3x3.
        let mut rng = fastrand::Rng::with_seed(3);
        let mut b = Board::new(3).unwrap();
        assert_eq!(rollout(&mut b, &mut rng), None);
        assert!(b.get_empty_points().is_empty());
    }
}
