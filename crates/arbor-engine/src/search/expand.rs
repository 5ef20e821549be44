//! Recursive tree expansion.
//!
//! [`Expander::expand`] grows a node's subtree to the requested depth and
//! pulls the best child's score up into the node. The shared [`Game`] is
//! entered through a [`MoveGuard`](arbor_core::MoveGuard), so every level
//! undoes its own move before returning to its parent.

use arbor_core::Game;

use crate::eval::evaluate;
use crate::search::node::{REFERENCE, SearchNode};
use crate::search::rank::rank;

/// Counters collected during one expansion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpandStats {
    /// Nodes entered, including the root.
    pub nodes: u64,
    /// Static evaluations performed (leaves and terminals).
    pub evaluations: u64,
    /// Nodes whose children came from an earlier search.
    pub reused: u64,
}

/// Depth-first expander.
#[derive(Debug)]
pub struct Expander {
    reuse_cap: usize,
    stats: ExpandStats,
}

impl Expander {
    /// Create an expander that re-searches at most `reuse_cap` of a node's
    /// previously ranked children.
    pub fn new(reuse_cap: usize) -> Self {
        Self {
            reuse_cap: reuse_cap.max(1),
            stats: ExpandStats::default(),
        }
    }

    /// Counters accumulated so far.
    pub fn stats(&self) -> ExpandStats {
        self.stats
    }

    /// Expand `node` to `depth` plies below it, keeping at most `width`
    /// children per node.
    ///
    /// `game` must be in the position of `node`'s parent (the node's own
    /// position for a root). It is returned to that exact state.
    pub fn expand(
        &mut self,
        node: &mut SearchNode,
        game: &mut Game,
        depth: u8,
        width: Option<usize>,
    ) {
        let mut game = game.enter(node.mv.as_ref());
        self.stats.nodes += 1;
        node.fingerprint = game.fingerprint();

        // A repetition or an unclaimed fifty-move draw still has moves to
        // choose from at the root; only mate or stalemate ends it there.
        let is_leaf = if node.mv.is_none() {
            game.legal_moves().is_empty()
        } else {
            game.is_terminal()
        };

        if depth == 0 || is_leaf {
            node.clear_children();
            node.score = evaluate(&game, REFERENCE);
            self.stats.evaluations += 1;
            return;
        }

        if node.children.is_empty() {
            let side = node.side.flip();
            node.children = game
                .legal_moves()
                .into_iter()
                .map(|mv| SearchNode::child(mv, side))
                .collect();
        } else {
            // Cached children are already ranked; re-search only the top ones.
            node.children.truncate(self.reuse_cap);
            self.stats.reused += 1;
        }

        for child in &mut node.children {
            self.expand(child, &mut game, depth - 1, width);
        }

        node.best = rank(node.side, &mut node.children, width);
        if let Some(score) = node.best_child().map(SearchNode::score) {
            node.score = score;
        }
    }
}

#[cfg(test)]
mod tests {
    use arbor_core::Game;

    use super::*;
    use crate::eval::score::Score;
    use crate::search::node::Side;
    use crate::search::rank::is_ranked;

    const SCHOLARS_MATE_FEN: &str =
        "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4";

    fn search(game: &mut Game, depth: u8, width: Option<usize>) -> (SearchNode, ExpandStats) {
        let mut root = SearchNode::root(game.turn());
        let mut expander = Expander::new(20);
        expander.expand(&mut root, game, depth, width);
        (root, expander.stats())
    }

    fn assert_tree_invariants(node: &SearchNode) {
        if let Some(best) = node.best_child() {
            assert_eq!(node.score(), best.score(), "node score must equal best child score");
            assert!(is_ranked(node.side(), node.children()));
            for child in node.children() {
                assert_eq!(child.side(), node.side().flip());
                assert_tree_invariants(child);
            }
        } else {
            assert!(node.children().is_empty());
        }
    }

    #[test]
    fn depth_zero_is_single_evaluation() {
        let mut game = Game::startpos();
        let (root, stats) = search(&mut game, 0, None);
        assert!(root.children().is_empty());
        assert!(root.best_child().is_none());
        assert_eq!(stats.nodes, 1);
        assert_eq!(stats.evaluations, 1);
        assert_eq!(root.score(), Score::ZERO);
    }

    #[test]
    fn depth_one_enumerates_all_moves() {
        let mut game = Game::startpos();
        let (root, stats) = search(&mut game, 1, None);
        assert_eq!(root.children().len(), 20);
        assert_eq!(stats.nodes, 21);
        let best = root.best_child().unwrap();
        for child in root.children() {
            assert!(best.score().value() >= child.score().value());
        }
        assert_tree_invariants(&root);
    }

    #[test]
    fn fingerprint_round_trips_at_every_depth() {
        for depth in 0..=3 {
            let mut game = Game::from_fen(SCHOLARS_MATE_FEN).unwrap();
            let before = game.fingerprint();
            let ply = game.ply();
            search(&mut game, depth, Some(6));
            assert_eq!(game.fingerprint(), before, "depth {depth} left residue");
            assert_eq!(game.ply(), ply);
        }
    }

    #[test]
    fn tree_invariants_hold_after_depth_three() {
        let mut game = Game::from_fen(SCHOLARS_MATE_FEN).unwrap();
        let (root, _) = search(&mut game, 3, Some(8));
        assert_tree_invariants(&root);
    }

    #[test]
    fn width_cap_keeps_top_children() {
        let mut full_game = Game::startpos();
        let (full, _) = search(&mut full_game, 1, None);
        let mut capped_game = Game::startpos();
        let (capped, _) = search(&mut capped_game, 1, Some(5));

        assert_eq!(capped.children().len(), 5);
        let top: Vec<f64> = full.children()[..5].iter().map(|c| c.score().value()).collect();
        let kept: Vec<f64> = capped.children().iter().map(|c| c.score().value()).collect();
        assert_eq!(top, kept);
    }

    #[test]
    fn width_cap_above_move_count_keeps_all() {
        let mut game = Game::startpos();
        let (root, _) = search(&mut game, 1, Some(50));
        assert_eq!(root.children().len(), 20);
    }

    #[test]
    fn finds_mate_in_one() {
        let mut game = Game::from_fen(SCHOLARS_MATE_FEN).unwrap();
        let (root, _) = search(&mut game, 1, None);
        let best = root.best_child().unwrap();
        assert_eq!(arbor_core::uci(best.mv().unwrap()), "h5f7");
        assert_eq!(best.score(), Score::WIN);
        assert_eq!(root.score(), Score::WIN);
        for child in &root.children()[1..] {
            assert!(!child.score().is_mate());
        }
    }

    #[test]
    fn black_finds_mate_in_one() {
        // 1.f3 e5 2.g4, Black mates with Qh4#.
        let mut game =
            Game::from_fen("rnbqkbnr/pppp1ppp/8/4p3/6P1/5P2/PPPPP2P/RNBQKBNR b KQkq - 0 2")
                .unwrap();
        let (root, _) = search(&mut game, 1, None);
        assert_eq!(root.side(), Side::Min);
        let best = root.best_child().unwrap();
        assert_eq!(arbor_core::uci(best.mv().unwrap()), "d8h4");
        assert_eq!(best.score(), Score::LOSS);
    }

    #[test]
    fn checkmated_root_has_no_children() {
        let mut game = Game::from_fen("7k/6Q1/5K2/8/8/8/8/8 b - - 0 1").unwrap();
        let (root, stats) = search(&mut game, 3, None);
        assert!(root.best_child().is_none());
        assert_eq!(root.score(), Score::WIN);
        assert_eq!(stats.nodes, 1);
    }

    #[test]
    fn stalemated_root_scores_zero() {
        let mut game = Game::from_fen("k7/2K5/1Q6/8/8/8/8/8 b - - 0 1").unwrap();
        let (root, _) = search(&mut game, 2, None);
        assert!(root.best_child().is_none());
        assert_eq!(root.score(), Score::ZERO);
    }

    #[test]
    fn avoids_stalemating_when_winning() {
        // Qb6 would stalemate; any other safe queen move keeps the win.
        let mut game = Game::from_fen("k7/2K5/8/8/8/8/8/1Q6 w - - 0 1").unwrap();
        let (root, _) = search(&mut game, 1, None);
        let best = root.best_child().unwrap();
        assert_ne!(arbor_core::uci(best.mv().unwrap()), "b1b6");
        assert!(root.score().value() > 0.0);
    }

    fn play_all(game: &mut Game, moves: &[&str]) {
        for text in moves {
            let mv = game.parse_uci_move(text).unwrap();
            game.play(&mv);
        }
    }

    #[test]
    fn repeated_root_is_still_expanded() {
        let mut game = Game::from_fen("4k3/8/8/8/8/8/8/QQQ1K3 w - - 0 1").unwrap();
        play_all(&mut game, &["e1d2", "e8d7", "d2e1", "d7e8"]);
        assert!(game.is_draw());

        let legal = game.legal_moves().len();
        let (root, _) = search(&mut game, 1, None);
        assert_eq!(root.children().len(), legal);
        assert!(root.best_child().is_some());
        assert_tree_invariants(&root);
    }

    #[test]
    fn fifty_move_root_is_still_expanded() {
        let mut game = Game::from_fen("4k3/8/8/8/8/8/8/QQ2K3 w - - 100 80").unwrap();
        assert!(game.is_draw());

        let (root, _) = search(&mut game, 2, Some(6));
        assert!(root.best_child().is_some());
        assert_tree_invariants(&root);
    }

    #[test]
    fn repetition_below_root_scores_zero() {
        // Black to move can only save the game by repeating with Ke8.
        let mut game = Game::from_fen("4k3/8/8/8/8/8/8/QQQ1K3 w - - 0 1").unwrap();
        play_all(&mut game, &["e1d2", "e8d7", "d2e1"]);

        let (root, _) = search(&mut game, 1, None);
        let best = root.best_child().unwrap();
        assert_eq!(arbor_core::uci(best.mv().unwrap()), "d7e8");
        assert_eq!(best.score(), Score::ZERO);
        assert!(root.children()[1..].iter().all(|c| c.score().value() > 0.0));
    }

    #[test]
    fn reexpansion_reuses_ranked_children() {
        let mut game = Game::startpos();
        let mut root = SearchNode::root(game.turn());
        let mut expander = Expander::new(4);
        expander.expand(&mut root, &mut game, 1, None);
        assert_eq!(root.children().len(), 20);

        let mut again = Expander::new(4);
        again.expand(&mut root, &mut game, 2, None);
        assert_eq!(root.children().len(), 4);
        assert_eq!(again.stats().reused, 1);
        assert_tree_invariants(&root);
    }
}
