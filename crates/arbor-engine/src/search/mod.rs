//! Tree search, ranking, and the cross-turn subtree cache.

pub mod cache;
pub mod expand;
pub mod node;
pub mod rank;

use std::time::Duration;

use arbor_core::{Game, Move, uci};
use tracing::{debug, info, warn};

use crate::error::EngineError;
use crate::eval::score::Score;
use crate::fallback::random_move;
use crate::time::{SearchPlan, TimeBudgetPlanner};

use cache::TranspositionCache;
use expand::{ExpandStats, Expander};
use node::SearchNode;

/// Default number of cached children re-searched per node.
pub const DEFAULT_REUSE_CAP: usize = 20;

/// Tunable search settings.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Top-ranked cached children re-searched when a node is reused.
    pub reuse_cap: usize,
    /// Remaining-time to depth/width policy.
    pub planner: TimeBudgetPlanner,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            reuse_cap: DEFAULT_REUSE_CAP,
            planner: TimeBudgetPlanner::new(),
        }
    }
}

/// Result of a completed search.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Move leading to the best-ranked root child; `None` if the root has no
    /// children.
    pub best_move: Option<Move>,
    /// Chain of best moves from the root.
    pub pv: Vec<Move>,
    /// Root score from White's point of view.
    pub score: Score,
    /// Depth searched.
    pub depth: u8,
    /// Width cap applied.
    pub width: Option<usize>,
    /// Expansion counters.
    pub stats: ExpandStats,
    /// Whether the root subtree came from the cache.
    pub reused: bool,
}

/// How the returned move was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOrigin {
    /// Best root child of a completed search.
    Search,
    /// Random legal move; the search produced no best child.
    Fallback,
}

/// A move chosen for the host, with the search that led to it.
#[derive(Debug, Clone)]
pub struct MoveChoice {
    /// The move to play.
    pub mv: Move,
    /// Whether the move came from search or from the random fallback.
    pub origin: MoveOrigin,
    /// The search that was run.
    pub result: SearchResult,
}

/// Tree searcher holding the subtree cache for one game.
#[derive(Debug, Default)]
pub struct Searcher {
    cache: TranspositionCache,
    config: SearchConfig,
}

impl Searcher {
    /// Searcher with default settings and an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Searcher with custom settings.
    pub fn with_config(config: SearchConfig) -> Self {
        Self {
            cache: TranspositionCache::new(),
            config,
        }
    }

    /// Current settings.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Mutable settings; changes apply from the next search.
    pub fn config_mut(&mut self) -> &mut SearchConfig {
        &mut self.config
    }

    /// The subtree cache.
    pub fn cache(&self) -> &TranspositionCache {
        &self.cache
    }

    /// Forget all cached subtrees (new game).
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Choose a move for the side to move with `remaining` clock time.
    ///
    /// Falls back to a random legal move (seeded from the remaining
    /// milliseconds) if the search yields no best child.
    pub fn choose_move(
        &mut self,
        game: &mut Game,
        remaining: Duration,
    ) -> Result<MoveChoice, EngineError> {
        let plan = self.config.planner.plan(remaining);
        let seed = u64::try_from(remaining.as_millis()).unwrap_or(u64::MAX);
        self.choose_with_plan(game, plan, seed)
    }

    /// Choose a move with an explicit plan; `seed` drives the fallback.
    pub fn choose_with_plan(
        &mut self,
        game: &mut Game,
        plan: SearchPlan,
        seed: u64,
    ) -> Result<MoveChoice, EngineError> {
        let result = self.search(game, plan);

        if let Some(mv) = result.best_move.clone() {
            info!(
                mv = %uci(&mv),
                score = %result.score,
                depth = result.depth,
                nodes = result.stats.nodes,
                "move chosen by search"
            );
            return Ok(MoveChoice {
                mv,
                origin: MoveOrigin::Search,
                result,
            });
        }

        match random_move(game, seed) {
            Some(mv) => {
                warn!(
                    mv = %uci(&mv),
                    depth = result.depth,
                    "search found no best move; playing a random legal move"
                );
                Ok(MoveChoice {
                    mv,
                    origin: MoveOrigin::Fallback,
                    result,
                })
            }
            None => Err(EngineError::NoLegalMoves),
        }
    }

    /// Search the current position according to `plan`.
    ///
    /// Starts from a cached subtree when one exists for this position. After
    /// the search, cache entries for this ply and earlier are evicted and the
    /// root's children are stored for the next ply.
    pub fn search(&mut self, game: &mut Game, plan: SearchPlan) -> SearchResult {
        let ply = game.ply();
        let cached = self.take_cached_root(game);
        let reused = cached.is_some();
        let mut root = match cached {
            Some(node) => node.into_root(),
            None => SearchNode::root(game.turn()),
        };
        debug_assert_eq!(root.side(), node::Side::to_move(game.turn()));

        let mut expander = Expander::new(self.config.reuse_cap);
        expander.expand(&mut root, game, plan.depth, plan.width);
        let stats = expander.stats();

        let result = SearchResult {
            best_move: root.best_child().and_then(|child| child.mv().cloned()),
            pv: root.principal_variation(),
            score: root.score(),
            depth: plan.depth,
            width: plan.width,
            stats,
            reused,
        };

        let tree_size = root.subtree_size();
        let evicted = self.cache.evict(ply);
        for child in root.take_children() {
            self.cache.store(ply + 1, child.fingerprint(), child);
        }

        debug!(
            ply,
            depth = plan.depth,
            width = ?plan.width,
            nodes = stats.nodes,
            evaluations = stats.evaluations,
            reused,
            tree_size,
            evicted,
            cached = self.cache.len(),
            score = %result.score,
            "search finished"
        );

        result
    }

    /// Take the subtree for the current position out of the cache.
    ///
    /// Tries the current `(ply, fingerprint)` first, then the previous
    /// position's entry, pulling out the child that matches this position.
    fn take_cached_root(&mut self, game: &Game) -> Option<SearchNode> {
        let ply = game.ply();
        let fingerprint = game.fingerprint();
        if let Some(node) = self.cache.lookup(ply, fingerprint) {
            return Some(node);
        }

        let previous = game.previous_fingerprint()?;
        let mut parent = self.cache.lookup(ply.checked_sub(1)?, previous)?;
        parent.take_child(fingerprint)
    }
}
