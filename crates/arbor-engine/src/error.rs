//! Engine errors.

/// Errors surfaced by the search layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// The position has no legal moves (checkmate or stalemate), so no move
    /// can be returned, not even a random one.
    #[error("no legal moves in the current position")]
    NoLegalMoves,

    /// A time-budget tier table is empty, lacks a zero-time floor, or is not
    /// monotonic.
    #[error("invalid time plan: {reason}")]
    InvalidPlan {
        /// What is wrong with the tier table.
        reason: String,
    },
}
