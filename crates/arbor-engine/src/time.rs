//! Time management: turn the remaining clock into a search depth and width.
//!
//! The planner walks a tier table from the most generous budget down and
//! picks the first tier whose threshold the remaining time meets. The last
//! tier always has a zero threshold, so even a nearly flagged clock gets a
//! shallow search.

use std::time::Duration;

use crate::error::EngineError;

/// Depth and per-node width for one search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchPlan {
    /// Plies to expand below the root.
    pub depth: u8,
    /// Children kept per node after ranking; `None` keeps all.
    pub width: Option<usize>,
}

impl SearchPlan {
    /// Fixed depth with no width cap (UCI `go depth N`).
    pub fn fixed_depth(depth: u8) -> Self {
        Self { depth, width: None }
    }
}

/// One row of the planner table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tier {
    /// Smallest remaining time that selects this tier.
    pub min_remaining: Duration,
    /// Search depth for this tier.
    pub depth: u8,
    /// Width cap for this tier.
    pub width: usize,
}

impl Tier {
    const fn new(min_remaining_ms: u64, depth: u8, width: usize) -> Self {
        Self {
            min_remaining: Duration::from_millis(min_remaining_ms),
            depth,
            width,
        }
    }
}

/// Default tiers, most generous first.
///
/// | remaining | depth | width |
/// |-----------|-------|-------|
/// | >= 60 s   | 4     | 24    |
/// | >= 15 s   | 3     | 16    |
/// | >= 3 s    | 2     | 12    |
/// | otherwise | 1     | 8     |
const DEFAULT_TIERS: [Tier; 4] = [
    Tier::new(60_000, 4, 24),
    Tier::new(15_000, 3, 16),
    Tier::new(3_000, 2, 12),
    Tier::new(0, 1, 8),
];

/// Converts remaining clock time into a [`SearchPlan`].
///
/// Monotonic: less remaining time never yields a larger depth or width.
#[derive(Debug, Clone)]
pub struct TimeBudgetPlanner {
    tiers: Vec<Tier>,
    max_depth: Option<u8>,
}

impl TimeBudgetPlanner {
    /// Planner with the default tier table.
    pub fn new() -> Self {
        Self {
            tiers: DEFAULT_TIERS.to_vec(),
            max_depth: None,
        }
    }

    /// Planner with a custom tier table.
    ///
    /// Tiers may be given in any order. The table must contain a tier with a
    /// zero threshold, every tier needs depth and width of at least 1, and
    /// depth and width must not grow as the threshold shrinks.
    pub fn with_tiers(mut tiers: Vec<Tier>) -> Result<Self, EngineError> {
        tiers.sort_by(|a, b| b.min_remaining.cmp(&a.min_remaining));

        let floor = tiers.last().ok_or_else(|| EngineError::InvalidPlan {
            reason: "no tiers".to_string(),
        })?;
        if floor.min_remaining != Duration::ZERO {
            return Err(EngineError::InvalidPlan {
                reason: "no tier covers zero remaining time".to_string(),
            });
        }
        if let Some(tier) = tiers.iter().find(|t| t.depth == 0 || t.width == 0) {
            return Err(EngineError::InvalidPlan {
                reason: format!(
                    "tier at {:?} has zero depth or width",
                    tier.min_remaining
                ),
            });
        }
        for pair in tiers.windows(2) {
            let (richer, poorer) = (pair[0], pair[1]);
            if richer.min_remaining == poorer.min_remaining {
                return Err(EngineError::InvalidPlan {
                    reason: format!("duplicate threshold {:?}", richer.min_remaining),
                });
            }
            if poorer.depth > richer.depth || poorer.width > richer.width {
                return Err(EngineError::InvalidPlan {
                    reason: format!(
                        "tier at {:?} searches more than tier at {:?}",
                        poorer.min_remaining, richer.min_remaining
                    ),
                });
            }
        }

        Ok(Self {
            tiers,
            max_depth: None,
        })
    }

    /// Clamp every planned depth to at most `depth` (at least 1).
    pub fn with_max_depth(mut self, depth: u8) -> Self {
        self.max_depth = Some(depth.max(1));
        self
    }

    /// Set or clear the depth ceiling in place.
    pub fn set_max_depth(&mut self, depth: Option<u8>) {
        self.max_depth = depth.map(|d| d.max(1));
    }

    /// Deepest depth any plan can have: the ceiling if set, else the top tier's.
    pub fn max_depth(&self) -> u8 {
        let top = self.tiers.first().map_or(1, |t| t.depth);
        match self.max_depth {
            Some(max) => top.min(max),
            None => top,
        }
    }

    /// The tier table, most generous first.
    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    /// Plan a search for `remaining` clock time.
    pub fn plan(&self, remaining: Duration) -> SearchPlan {
        let tier = self
            .tiers
            .iter()
            .find(|t| remaining >= t.min_remaining)
            .or(self.tiers.last())
            .copied()
            .unwrap_or(DEFAULT_TIERS[DEFAULT_TIERS.len() - 1]);

        let depth = match self.max_depth {
            Some(max) => tier.depth.min(max),
            None => tier.depth,
        };

        SearchPlan {
            depth: depth.max(1),
            width: Some(tier.width.max(1)),
        }
    }
}

impl Default for TimeBudgetPlanner {
    fn default() -> Self {
        Self::new()
    }
}
