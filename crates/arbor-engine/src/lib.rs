//! Search and evaluation for arbor.

pub mod error;
pub mod eval;
pub mod fallback;
pub mod search;
pub mod time;

pub use error::EngineError;
pub use eval::evaluate;
pub use eval::score::Score;
pub use search::cache::TranspositionCache;
pub use search::expand::{ExpandStats, Expander};
pub use search::node::{REFERENCE, SearchNode, Side};
pub use search::{MoveChoice, MoveOrigin, SearchConfig, SearchResult, Searcher};
pub use time::{SearchPlan, Tier, TimeBudgetPlanner};
