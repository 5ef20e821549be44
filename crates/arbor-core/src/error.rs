//! Errors raised when building or advancing a [`Game`](crate::Game).

/// Errors from FEN parsing, position setup, and move parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// The FEN text could not be parsed.
    #[error("invalid FEN: {fen}")]
    InvalidFen {
        /// The FEN string that failed to parse.
        fen: String,
    },

    /// The FEN parsed but does not describe a legal chess position.
    #[error("illegal position: {reason}")]
    IllegalPosition {
        /// Description reported by the rules engine.
        reason: String,
    },

    /// A UCI move string does not match any legal move in the position.
    #[error("invalid move: {uci_move}")]
    InvalidMove {
        /// The UCI move string that failed to match.
        uci_move: String,
    },
}
