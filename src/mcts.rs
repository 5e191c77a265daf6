//! Monte Carlo Tree Search with a heuristic-augmented UCT rule.
//!
//! This module implements MCTS with:
//! - Forced exploration: an unvisited child is always selected first
//! - UCT plus a decaying heuristic bonus for the remaining selections
//! - Full expansion (one child per empty point) of every reached leaf
//! - Uniformly random playouts for value estimation
//! - Robust-child (most visits) final move choice
//!
//! The engine keeps its tree between moves. After a real move is played,
//! [`MctsEngine::update_with_move`] descends into the matching child so its
//! statistics carry over to the next search.

use std::time::Instant;

use tracing::{debug, trace, warn};

use crate::board::{Board, Color, Point};
use crate::config::MctsConfig;
use crate::constants::PASS;
use crate::playout::rollout;
use crate::tree::{NodeId, Tree};

/// A persistent MCTS search rooted at the current game position.
pub struct MctsEngine {
    tree: Tree,
    /// Color to move at the root.
    to_play: Color,
    rng: fastrand::Rng,
}

impl Default for MctsEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MctsEngine {
    /// Create an engine expecting Black to move, seeded from entropy.
    pub fn new() -> Self {
        Self::with_rng(fastrand::Rng::new())
    }

    /// Create an engine with a fixed seed for reproducible searches.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(fastrand::Rng::with_seed(seed))
    }

    fn with_rng(rng: fastrand::Rng) -> Self {
        Self {
            tree: Tree::new(Color::Black),
            to_play: Color::Black,
            rng,
        }
    }

    /// Color the current tree expects to move at its root.
    #[inline]
    pub fn to_play(&self) -> Color {
        self.to_play
    }

    /// Discard the tree and start a fresh root for `color`.
    pub fn reset(&mut self, color: Color) {
        self.to_play = color;
        self.tree = Tree::new(color);
    }

    /// Nodes currently held in the tree.
    pub fn tree_size(&self) -> usize {
        self.tree.len()
    }

    /// Total rollouts credited below the root.
    pub fn root_visits(&self) -> u32 {
        self.tree.child_visits(self.tree.root())
    }

    /// Root children as `(move, visits, wins)`, in enumeration order.
    pub fn root_children(&self) -> Vec<(Point, u32, f64)> {
        self.tree
            .get(self.tree.root())
            .children
            .iter()
            .map(|&(mv, id)| {
                let node = self.tree.get(id);
                (mv, node.visits, node.wins)
            })
            .collect()
    }

    /// Most visited root child, or `PASS` if the root has no children.
    pub fn best_move(&self) -> Point {
        self.tree.best_action().map_or(PASS, |(mv, _)| mv)
    }

    /// Search `board` with `color` to move until the time budget runs out.
    ///
    /// If the tree was built for the other color it is thrown away first.
    /// The caller's board is never modified.
    pub fn get_move(&mut self, board: &Board, color: Color, config: &MctsConfig) -> Point {
        let start = Instant::now();
        let budget = config.budget();
        self.prepare(board, color);

        let mut iterations = 0u64;
        while start.elapsed() < budget && !self.root_is_terminal() {
            self.search(board, config);
            iterations += 1;
        }

        let best = self.best_move();
        debug!(
            iterations,
            tree_size = self.tree.len(),
            root_visits = self.root_visits(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            best,
            "mcts search finished"
        );
        best
    }

    /// Run exactly `iterations` search iterations and return the best move.
    pub fn run_iterations(
        &mut self,
        board: &Board,
        color: Color,
        iterations: usize,
        config: &MctsConfig,
    ) -> Point {
        self.prepare(board, color);
        for _ in 0..iterations {
            if self.root_is_terminal() {
                break;
            }
            self.search(board, config);
        }
        self.best_move()
    }

    /// Inform the engine of a move played on the real board.
    ///
    /// The matching root child becomes the new root; otherwise the tree starts
    /// over. Either way the expected color flips.
    pub fn update_with_move(&mut self, point: Point) {
        let root = self.tree.root();
        match self.tree.child(root, point) {
            Some(child) => {
                self.tree.reroot(child);
                trace!(point, tree_size = self.tree.len(), "reusing subtree");
            }
            None => {
                self.tree = Tree::new(self.to_play.opponent());
                trace!(point, "move not in tree, starting fresh");
            }
        }
        self.to_play = self.to_play.opponent();
    }

    fn prepare(&mut self, board: &Board, color: Color) {
        if self.to_play != color {
            warn!(
                expected = %self.to_play,
                got = %color,
                "tree is for the wrong color to play, discarding"
            );
            self.reset(color);
        }
        let root = self.tree.root();
        if !self.tree.get(root).expanded {
            self.expand(root, board);
        }
    }

    fn root_is_terminal(&self) -> bool {
        let root = self.tree.get(self.tree.root());
        root.expanded && root.is_leaf()
    }

    /// One selection, expansion, rollout and backpropagation pass.
    fn search(&mut self, board: &Board, config: &MctsConfig) {
        let mut board = board.clone();
        let mut node = self.tree.root();

        while !self.tree.get(node).is_leaf() {
            let color = self.tree.get(node).color;
            let child = self.select(node, &board, config);
            board.play(self.tree.get(child).mv, color);
            node = child;
        }
        if !self.tree.get(node).expanded {
            self.expand(node, &board);
        }

        let winner = rollout(&mut board, &mut self.rng);
        self.tree.backpropagate(node, winner);
    }

    /// Add one child per empty point. A terminal position gets none.
    fn expand(&mut self, id: NodeId, board: &Board) {
        let node = self.tree.get(id);
        let child_color = node.color.opponent();
        if !board.is_terminal().0 {
            for mv in board.get_empty_points() {
                self.tree.add_child(id, mv, child_color);
            }
        }
        self.tree.get_mut(id).expanded = true;
    }

    /// Pick the child to descend into from an expanded, non-leaf node.
    ///
    /// `board` is the position at `id`; the heuristic of each child's move is
    /// evaluated there once and cached on the child.
    fn select(&mut self, id: NodeId, board: &Board, config: &MctsConfig) -> NodeId {
        let mover = self.tree.get(id).color;
        let n_children = self.tree.get(id).children.len();
        let ln_parent = f64::from(self.parent_visits(id)).ln();

        let mut best = self.tree.get(id).children[0].1;
        let mut best_value = f64::NEG_INFINITY;

        for i in 0..n_children {
            let (mv, child) = self.tree.get(id).children[i];
            if self.tree.get(child).visits == 0 {
                return child;
            }

            let h = if config.heuristic_weight == 0.0 {
                0.0
            } else {
                self.cached_heuristic(child, mv, mover, board)
            };

            let node = self.tree.get(child);
            let visits = f64::from(node.visits);
            let value = node.wins / visits
                + config.exploration * (ln_parent / visits).sqrt()
                + (config.heuristic_weight / (visits + 1.0)) * h;
            if value > best_value {
                best_value = value;
                best = child;
            }
        }
        best
    }

    /// Visit count of `id` as a UCT parent.
    ///
    /// The root is never credited by backpropagation, so its children's total
    /// stands in for it. Every other node counts its own leaf rollout too.
    fn parent_visits(&self, id: NodeId) -> u32 {
        if id == self.tree.root() {
            self.tree.child_visits(id)
        } else {
            self.tree.get(id).visits
        }
    }

    fn cached_heuristic(&mut self, child: NodeId, mv: Point, mover: Color, board: &Board) -> f64 {
        let node = self.tree.get_mut(child);
        *node
            .heuristic
            .get_or_insert_with(|| board.selection_heuristic(mv, mover))
    }
}
