//! MCTS tree with arena allocation.
//!
//! Nodes are stored in a contiguous `Vec` and referenced by `NodeId` indices,
//! so parent links are plain indices and there are no ownership cycles.

use crate::board::{Color, Point};
use crate::constants::NO_POINT;

/// Index of a node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Sentinel for "no node" (the root's parent).
    pub const NONE: NodeId = NodeId(u32::MAX);

    #[inline]
    pub fn is_some(self) -> bool {
        self != Self::NONE
    }

    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// One node of the search tree.
#[derive(Debug, Clone)]
pub struct TreeNode {
    /// Move that led here (`NO_POINT` for a fresh root).
    pub mv: Point,
    /// Color to move at this node.
    pub color: Color,
    pub visits: u32,
    /// Score credited to the player who moved into this node.
    pub wins: f64,
    /// Heuristic of `mv`, filled in on first use and never recomputed.
    pub heuristic: Option<f64>,
    /// Children in enumeration order.
    pub children: Vec<(Point, NodeId)>,
    pub parent: NodeId,
    pub expanded: bool,
}

impl TreeNode {
    fn new(mv: Point, color: Color, parent: NodeId) -> Self {
        Self {
            mv,
            color,
            visits: 0,
            wins: 0.0,
            heuristic: None,
            children: Vec::new(),
            parent,
            expanded: false,
        }
    }

    /// A node is a leaf until it has children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Record one rollout result.
    ///
    /// A node is credited when the winner is not the color to move here, since
    /// that means the move into this node was good for the player who made it.
    /// A draw nets half a point.
    pub fn update(&mut self, winner: Option<Color>) {
        self.visits += 1;
        match winner {
            Some(w) if w == self.color => {}
            Some(_) => self.wins += 1.0,
            None => self.wins += 0.5,
        }
    }
}

/// Arena-backed search tree.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<TreeNode>,
    root: NodeId,
}

impl Tree {
    /// Create a tree with a single unexpanded root for `color` to move.
    pub fn new(color: Color) -> Self {
        Self {
            nodes: vec![TreeNode::new(NO_POINT, color, NodeId::NONE)],
            root: NodeId(0),
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut TreeNode {
        &mut self.nodes[id.index()]
    }

    /// Total number of nodes in the arena.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Append a child for `mv` under `parent`, tagged with `color` to move.
    pub fn add_child(&mut self, parent: NodeId, mv: Point, color: Color) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(TreeNode::new(mv, color, parent));
        self.get_mut(parent).children.push((mv, id));
        id
    }

    /// Child of `parent` reached by `mv`, if any.
    pub fn child(&self, parent: NodeId, mv: Point) -> Option<NodeId> {
        self.get(parent)
            .children
            .iter()
            .find(|(m, _)| *m == mv)
            .map(|(_, id)| *id)
    }

    /// Sum of visits over the children of `id`.
    pub fn child_visits(&self, id: NodeId) -> u32 {
        self.get(id)
            .children
            .iter()
            .map(|(_, c)| self.get(*c).visits)
            .sum()
    }

    /// Walk from `leaf` up to, but not including, the root, updating each node.
    pub fn backpropagate(&mut self, leaf: NodeId, winner: Option<Color>) {
        let mut current = leaf;
        while current.is_some() && current != self.root {
            let node = self.get_mut(current);
            node.update(winner);
            current = node.parent;
        }
    }

    /// Most visited root child as `(move, visits)`. Ties go to the earliest child.
    pub fn best_action(&self) -> Option<(Point, u32)> {
        let mut best: Option<(Point, u32)> = None;
        for &(mv, id) in &self.get(self.root).children {
            let visits = self.get(id).visits;
            if best.is_none_or(|(_, v)| visits > v) {
                best = Some((mv, visits));
            }
        }
        best
    }

    /// Make `new_root` the root, dropping every node outside its subtree.
    ///
    /// The subtree is copied breadth-first into a fresh arena, so ids change.
    pub fn reroot(&mut self, new_root: NodeId) {
        let mut nodes = Vec::with_capacity(self.subtree_size(new_root));
        let mut root = self.get(new_root).clone();
        root.parent = NodeId::NONE;
        nodes.push(root);

        let mut head = 0;
        while head < nodes.len() {
            let parent_id = NodeId(head as u32);
            let old_children = std::mem::take(&mut nodes[head].children);
            let mut children = Vec::with_capacity(old_children.len());
            for (mv, old_id) in old_children {
                let new_id = NodeId(nodes.len() as u32);
                let mut child = self.get(old_id).clone();
                child.parent = parent_id;
                nodes.push(child);
                children.push((mv, new_id));
            }
            nodes[head].children = children;
            head += 1;
        }

        self.nodes = nodes;
        self.root = NodeId(0);
    }

    /// Number of nodes reachable from `id`, `id` included.
    pub fn subtree_size(&self, id: NodeId) -> usize {
        let mut stack = vec![id];
        let mut count = 0;
        while let Some(n) = stack.pop() {
            count += 1;
            stack.extend(self.get(n).children.iter().map(|(_, c)| *c));
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tree() {
        let tree = Tree::new(Color::Black);
        let root = tree.get(tree.root());
        assert_eq!(tree.len(), 1);
        assert_eq!(root.parent, NodeId::NONE);
        assert_eq!(root.mv, NO_POINT);
        assert!(root.is_leaf());
        assert!(!root.expanded);
        assert_eq!(tree.best_action(), None);
    }

    #[test]
    fn test_update_scoring() {
        let mut node = TreeNode::new(10, Color::White, NodeId(0));
        node.update(Some(Color::Black));
        node.update(Some(Color::White));
        node.update(None);
        assert_eq!(node.visits, 3);
        assert_eq!(node.wins, 1.5);
    }

    #[test]
    fn test_backpropagate_skips_root() {
        let mut tree = Tree::new(Color::Black);
        let root = tree.root();
        let a = tree.add_child(root, 10, Color::White);
        let b = tree.add_child(a, 11, Color::Black);

        tree.backpropagate(b, Some(Color::Black));
        assert_eq!(tree.get(root).visits, 0);
        assert_eq!(tree.get(a).visits, 1);
        assert_eq!(tree.get(a).wins, 1.0);
        assert_eq!(tree.get(b).visits, 1);
        assert_eq!(tree.get(b).wins, 0.0);
        assert_eq!(tree.child_visits(root), 1);
    }

    #[test]
    fn test_best_action_prefers_first_on_tie() {
        let mut tree = Tree::new(Color::Black);
        let root = tree.root();
        let a = tree.add_child(root, 10, Color::White);
        let b = tree.add_child(root, 11, Color::White);
        let c = tree.add_child(root, 12, Color::White);
        tree.get_mut(a).visits = 3;
        tree.get_mut(b).visits = 5;
        tree.get_mut(c).visits = 5;
        assert_eq!(tree.best_action(), Some((11, 5)));
    }

    #[test]
    fn test_reroot_keeps_subtree_only() {
        let mut tree = Tree::new(Color::Black);
        let root = tree.root();
        let a = tree.add_child(root, 10, Color::White);
        let b = tree.add_child(root, 11, Color::White);
        tree.add_child(b, 12, Color::Black);
        let a1 = tree.add_child(a, 13, Color::Black);
        tree.add_child(a1, 14, Color::White);
        tree.get_mut(a).visits = 7;

        assert_eq!(tree.subtree_size(a), 3);
        tree.reroot(a);

        assert_eq!(tree.len(), 3);
        let new_root = tree.get(tree.root());
        assert_eq!(new_root.mv, 10);
        assert_eq!(new_root.visits, 7);
        assert_eq!(new_root.parent, NodeId::NONE);

        let child = tree.child(tree.root(), 13).unwrap();
        assert_eq!(tree.get(child).parent, tree.root());
        let grandchild = tree.child(child, 14).unwrap();
        assert_eq!(tree.get(grandchild).parent, child);
        assert_eq!(tree.child(tree.root(), 12), None);
    }
}
