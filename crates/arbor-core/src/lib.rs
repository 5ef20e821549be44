//! Rules layer for arbor: a mutable chess game with scoped apply/undo.
//!
//! Move generation, legality, and hashing come from `shakmaty`; this crate
//! adds the undo stack, fingerprint history, and draw rules the search needs.

mod error;
mod game;

pub use error::GameError;
pub use game::{Game, MoveGuard, uci};
pub use shakmaty::{Bitboard, Color, Move, MoveList, Piece, Role, Square};
