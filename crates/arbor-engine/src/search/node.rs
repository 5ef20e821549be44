//! Game-tree nodes.
//!
//! Each [`SearchNode`] exclusively owns its children. The best child is
//! tracked by index, so the tree has no back-references and no cycles.

use arbor_core::{Color, Move};

use crate::eval::score::Score;

/// Colour whose point of view every score in the tree is expressed in.
pub const REFERENCE: Color = Color::White;

/// Whether a node picks the highest or the lowest child score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// The reference colour is to move: higher scores are better.
    Max,
    /// The opponent is to move: lower scores are better.
    Min,
}

impl Side {
    /// Side of a node where `to_move` is about to play.
    pub fn to_move(to_move: Color) -> Self {
        if to_move == REFERENCE {
            Side::Max
        } else {
            Side::Min
        }
    }

    /// The other side.
    pub fn flip(self) -> Self {
        match self {
            Side::Max => Side::Min,
            Side::Min => Side::Max,
        }
    }
}

/// One ply of the game tree.
#[derive(Debug, Clone)]
pub struct SearchNode {
    pub(crate) mv: Option<Move>,
    pub(crate) side: Side,
    pub(crate) score: Score,
    pub(crate) fingerprint: u64,
    pub(crate) children: Vec<SearchNode>,
    pub(crate) best: Option<usize>,
}

impl SearchNode {
    /// Root node for a position where `to_move` is about to play.
    pub fn root(to_move: Color) -> Self {
        Self::new(None, Side::to_move(to_move))
    }

    pub(crate) fn child(mv: Move, side: Side) -> Self {
        Self::new(Some(mv), side)
    }

    fn new(mv: Option<Move>, side: Side) -> Self {
        Self {
            mv,
            side,
            score: Score::ZERO,
            fingerprint: 0,
            children: Vec::new(),
            best: None,
        }
    }

    /// Detach this node from the move that led to it so it can serve as a
    /// search root.
    pub(crate) fn into_root(mut self) -> Self {
        self.mv = None;
        self
    }

    /// The move that reached this node; `None` at the root.
    pub fn mv(&self) -> Option<&Move> {
        self.mv.as_ref()
    }

    /// Whether this node maximizes or minimizes.
    pub fn side(&self) -> Side {
        self.side
    }

    /// Score from the [`REFERENCE`] colour's point of view.
    pub fn score(&self) -> Score {
        self.score
    }

    /// Fingerprint of the position at this node (0 before first expansion).
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    /// Children in ranked order once the node has been expanded.
    pub fn children(&self) -> &[SearchNode] {
        &self.children
    }

    /// The best-ranked child, if any.
    pub fn best_child(&self) -> Option<&SearchNode> {
        self.best.and_then(|i| self.children.get(i))
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn subtree_size(&self) -> usize {
        1 + self.children.iter().map(SearchNode::subtree_size).sum::<usize>()
    }

    /// Moves along the chain of best children, starting below this node.
    pub fn principal_variation(&self) -> Vec<Move> {
        let mut line = Vec::new();
        let mut node = self;
        while let Some(child) = node.best_child() {
            match &child.mv {
                Some(mv) => line.push(mv.clone()),
                None => break,
            }
            node = child;
        }
        line
    }

    /// Remove and return the child whose position has `fingerprint`.
    pub(crate) fn take_child(&mut self, fingerprint: u64) -> Option<SearchNode> {
        let index = self
            .children
            .iter()
            .position(|child| child.fingerprint == fingerprint)?;
        self.best = None;
        Some(self.children.swap_remove(index))
    }

    /// Drop the subtree below this node.
    pub(crate) fn clear_children(&mut self) {
        self.children.clear();
        self.best = None;
    }

    /// Hand the children over to the caller, leaving this node a leaf.
    pub(crate) fn take_children(&mut self) -> Vec<SearchNode> {
        self.best = None;
        std::mem::take(&mut self.children)
    }
}
