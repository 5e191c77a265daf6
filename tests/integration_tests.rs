//! Integration tests for the ninuki engine.
//!
//! These exercise the public API end to end: board rules through play and
//! undo, MCTS convergence, and the exact solver with its cache.

use std::time::Duration;

use ninuki::board::{Board, Cell, Color, Point};
use ninuki::config::MctsConfig;
use ninuki::constants::{PASS, WIN_SCORE};
use ninuki::mcts::MctsEngine;
use ninuki::playout::rollout;
use ninuki::solver::{AlphaBetaSolver, Side, SolveResult};
use ninuki::tt::Bound;

// =============================================================================
// Helper functions for setting up test positions
// =============================================================================

/// Play `(row, col)` moves alternating colors, starting with Black.
fn setup_position(size: usize, moves: &[(usize, usize)]) -> Board {
    let mut board = Board::new(size).unwrap();
    for &(row, col) in moves {
        let pt = board.point(row, col);
        assert!(board.play(pt, board.current_player()), "occupied: {row},{col}");
    }
    board
}

/// Place black and white stones by interleaving them, padding with passes.
fn setpos(size: usize, black: &[(usize, usize)], white: &[(usize, usize)]) -> Board {
    let mut board = Board::new(size).unwrap();
    for i in 0..black.len().max(white.len()) {
        for (stones, color) in [(black, Color::Black), (white, Color::White)] {
            let pt = stones.get(i).map_or(PASS, |&(r, c)| board.point(r, c));
            assert!(board.play(pt, color));
        }
    }
    board
}

/// Snapshot of everything `undo` must restore.
fn snapshot(board: &Board) -> (Vec<Cell>, u32, u32, Point, Point, Color, u64) {
    let size = board.size();
    let cells = (0..size)
        .flat_map(|r| (0..size).map(move |c| (r, c)))
        .map(|(r, c)| board.cell(board.point(r, c)))
        .collect();
    (
        cells,
        board.captures(Color::Black),
        board.captures(Color::White),
        board.last_move(),
        board.last2_move(),
        board.current_player(),
        board.hash(),
    )
}

// =============================================================================
// Play / undo
// =============================================================================

#[test]
fn test_play_undo_restores_every_position() {
    let mut rng = fastrand::Rng::with_seed(11);
    for _ in 0..30 {
        let mut board = Board::new(7).unwrap();
        let mut snapshots = Vec::new();
        loop {
            if board.is_terminal().0 {
                break;
            }
            let empties = board.get_empty_points();
            let pt = empties[rng.usize(..empties.len())];
            snapshots.push(snapshot(&board));
            assert!(board.play(pt, board.current_player()));
            assert_eq!(board.hash(), board.compute_hash());
        }
        while let Some(expected) = snapshots.pop() {
            board.undo();
            assert_eq!(snapshot(&board), expected);
        }
        assert_eq!(board.ply(), 0);
    }
}

#[test]
fn test_capture_counters_even_and_consistent() {
    let mut rng = fastrand::Rng::with_seed(12);
    for _ in 0..30 {
        let mut board = Board::new(6).unwrap();
        let winner = rollout(&mut board, &mut rng);
        for color in [Color::Black, Color::White] {
            assert_eq!(board.captures(color) % 2, 0);
        }
        let stones = board.size() * board.size() - board.empty_count();
        let captured = (board.captures(Color::Black) + board.captures(Color::White)) as usize;
        assert_eq!(stones + captured, board.ply());
        assert_eq!(board.is_terminal(), (true, winner));
    }
}

#[test]
fn test_capture_removes_exactly_the_pair() {
    // X O O . with White elsewhere; Black closes the pattern.
    let mut board = setpos(7, &[(2, 0), (6, 6)], &[(2, 1), (2, 2)]);
    let before = board.get_empty_points().len();
    assert!(board.play(board.point(2, 3), Color::Black));
    assert_eq!(board.cell(board.point(2, 0)), Cell::Black);
    assert_eq!(board.cell(board.point(2, 1)), Cell::Empty);
    assert_eq!(board.cell(board.point(2, 2)), Cell::Empty);
    assert_eq!(board.cell(board.point(2, 3)), Cell::Black);
    assert_eq!(board.captures(Color::Black), 2);
    assert_eq!(board.get_empty_points().len(), before + 1);
}

#[test]
fn test_vertical_and_diagonal_captures() {
    let mut board = Board::new(9).unwrap();
    // Vertical pair above (4,4) and a diagonal pair to its lower right.
    for (r, c, color) in [
        (1, 4, Color::Black),
        (2, 4, Color::White),
        (3, 4, Color::White),
        (7, 7, Color::Black),
        (5, 5, Color::White),
        (6, 6, Color::White),
    ] {
        board.play(board.point(r, c), color);
    }
    board.play(board.point(4, 4), Color::Black);
    assert_eq!(board.captures(Color::Black), 4);
    for (r, c) in [(2, 4), (3, 4), (5, 5), (6, 6)] {
        assert_eq!(board.cell(board.point(r, c)), Cell::Empty);
    }
}

#[test]
fn test_capture_win_at_ten() {
    let mut board = Board::new(9).unwrap();
    // Five separate X O O X captures along rows 0, 2, 4, 6 and 8.
    for (i, row) in [0, 2, 4, 6, 8].into_iter().enumerate() {
        board.play(board.point(row, 0), Color::Black);
        board.play(board.point(row, 1), Color::White);
        board.play(board.point(row, 2), Color::White);
        board.play(board.point(row, 3), Color::Black);
        assert_eq!(board.captures(Color::Black), 2 * (i as u32 + 1));
        if i < 4 {
            assert_eq!(board.is_terminal(), (false, None));
        }
    }
    assert_eq!(board.detect_five_in_row(), None);
    assert_eq!(board.is_terminal(), (true, Some(Color::Black)));

    board.undo();
    assert_eq!(board.captures(Color::Black), 8);
    assert_eq!(board.is_terminal(), (false, None));
}

#[test]
fn test_open_four_is_not_five() {
    let board = setpos(7, &[(3, 1), (3, 2), (3, 3)], &[(6, 0), (6, 6), (0, 6)]);
    let mut four = board.clone();
    four.play(four.point(3, 4), Color::Black);
    assert_eq!(four.detect_five_in_row(), None);
    assert_eq!(four.is_terminal(), (false, None));

    let open_four = board.heuristic_evaluate(board.point(3, 4), Color::Black);
    let closed = setpos(7, &[(3, 1), (3, 2)], &[(3, 0), (6, 6)]);
    let closed_three = closed.heuristic_evaluate(closed.point(3, 3), Color::Black);
    assert!(open_four > 10.0 * closed_three);
}

#[test]
fn test_six_in_row_also_wins() {
    let mut board = setpos(9, &[(4, 0), (4, 1), (4, 3), (4, 4), (4, 5)], &[]);
    assert_eq!(board.is_terminal(), (false, None));
    board.play(board.point(4, 2), Color::Black);
    assert_eq!(board.detect_five_in_row(), Some(Color::Black));
}

#[test]
fn test_move_order_does_not_change_hash() {
    let a = setup_position(5, &[(0, 0), (1, 1), (2, 2), (3, 3)]);
    let b = setup_position(5, &[(2, 2), (3, 3), (0, 0), (1, 1)]);
    assert_eq!(a.hash(), b.hash());
    assert_eq!(a.hash(), a.compute_hash());

    let c = setup_position(5, &[(0, 0), (1, 1), (3, 3), (2, 2)]);
    assert_ne!(a.hash(), c.hash());
}

// =============================================================================
// MCTS
// =============================================================================

#[test]
fn test_mcts_converges_on_dominant_move() {
    // Black has four on the top edge; (0, 4) wins on the spot.
    let board = setpos(
        7,
        &[(0, 0), (0, 1), (0, 2), (0, 3)],
        &[(6, 0), (6, 2), (4, 4), (2, 6)],
    );
    let config = MctsConfig::default()
        .with_exploration(0.0)
        .with_heuristic_weight(0.0);
    let mut engine = MctsEngine::with_seed(42);
    let best = engine.run_iterations(&board, Color::Black, 3000, &config);
    assert_eq!(best, board.point(0, 4));
}

#[test]
fn test_mcts_blocks_opponent_four() {
    let board = setpos(7, &[(6, 0), (6, 6), (0, 6)], &[(3, 0), (3, 1), (3, 2), (3, 3)]);
    assert_eq!(board.current_player(), Color::Black);
    let mut engine = MctsEngine::with_seed(43);
    let best = engine.run_iterations(&board, Color::Black, 3000, &MctsConfig::default());
    assert_eq!(best, board.point(3, 4));
}

#[test]
fn test_mcts_time_bounded_search() {
    let board = Board::new(7).unwrap();
    let config = MctsConfig::default().with_time_limit(Duration::from_millis(100));
    let mut engine = MctsEngine::with_seed(44);
    let start = std::time::Instant::now();
    let mv = engine.get_move(&board, Color::Black, &config);
    assert!(start.elapsed() < Duration::from_millis(500));
    assert!(board.is_legal(mv, Color::Black));
    assert_ne!(mv, PASS);
}

#[test]
fn test_mcts_tree_reuse_over_a_game() {
    let mut board = Board::new(5).unwrap();
    let config = MctsConfig::default();
    let mut engine = MctsEngine::with_seed(45);
    for _ in 0..6 {
        let color = board.current_player();
        let mv = engine.run_iterations(&board, color, 200, &config);
        let visits = engine
            .root_children()
            .into_iter()
            .find(|&(m, _, _)| m == mv)
            .map_or(0, |(_, v, _)| v);
        assert!(board.play(mv, color));
        engine.update_with_move(mv);
        assert_eq!(engine.to_play(), board.current_player());
        assert_eq!(engine.root_visits(), visits.saturating_sub(1));
    }
}

// =============================================================================
// Solver
// =============================================================================

#[test]
fn test_solver_finds_win_and_caches_it() {
    let board = setpos(
        7,
        &[(0, 0), (0, 1), (0, 2), (0, 3)],
        &[(6, 0), (6, 2), (4, 4), (2, 6)],
    );
    let mut solver = AlphaBetaSolver::default();
    let result = solver.solve(&board, Duration::from_secs(10)).unwrap();
    assert_eq!(
        result,
        SolveResult::Win {
            winner: Side::Mover,
            best_move: board.point(0, 4)
        }
    );

    let entry = solver.cached(board.hash()).unwrap();
    assert!(entry.score > WIN_SCORE);
    assert_eq!(entry.best_move, Some(board.point(0, 4)));
}

#[test]
fn test_solver_transposition_served_from_cache() {
    let first = setup_position(3, &[(0, 0), (1, 1), (2, 2)]);
    let second = setup_position(3, &[(2, 2), (1, 1), (0, 0)]);
    assert_eq!(first.hash(), second.hash());

    let mut solver = AlphaBetaSolver::default();
    let a = solver.solve(&first, Duration::from_secs(10)).unwrap();
    assert!(matches!(a, SolveResult::Draw { .. }));
    assert!(solver.stats().nodes > 0);
    assert_eq!(solver.cached(first.hash()).map(|e| e.bound), Some(Bound::Exact));

    let b = solver.solve(&second, Duration::from_secs(10)).unwrap();
    assert_eq!(a, b);
    assert_eq!(solver.stats().nodes, 0);
    assert_eq!(solver.stats().tt_hits, 1);

    solver.clear_cache();
    solver.solve(&second, Duration::from_secs(10)).unwrap();
    assert!(solver.stats().nodes > 0);
}

#[test]
fn test_solver_proves_loss_for_mover() {
    let board = setpos(7, &[(6, 0), (6, 6), (0, 6)], &[(3, 1), (3, 2), (3, 3), (3, 4)]);
    let mut solver = AlphaBetaSolver::default();
    let result = solver.solve(&board, Duration::from_secs(10)).unwrap();
    assert!(matches!(
        result,
        SolveResult::Win {
            winner: Side::Opponent,
            ..
        }
    ));
}

#[test]
fn test_solver_leaves_board_untouched() {
    let board = setup_position(3, &[(1, 1)]);
    let before = snapshot(&board);
    let mut solver = AlphaBetaSolver::default();
    let result = solver.solve(&board, Duration::from_secs(10)).unwrap();
    assert!(board.is_legal(result.best_move(), board.current_player()));
    assert_eq!(snapshot(&board), before);
}
