//! The shared, mutable game position the search works on.
//!
//! [`Game`] wraps a `shakmaty` position with an undo stack and a history of
//! fingerprints. Moves are applied in place with [`Game::push`] and taken
//! back with [`Game::pop`]; [`Game::enter`] pairs the two in a guard so a
//! subtree's mutation is always unwound before control returns to its parent.

use std::ops::{Deref, DerefMut};

use shakmaty::fen::Fen;
use shakmaty::zobrist::{Zobrist64, ZobristHash};
use shakmaty::{
    Bitboard, CastlingMode, Chess, Color, EnPassantMode, Move, MoveList, Piece, Position, Role,
    Square,
};
use tracing::warn;

use crate::error::GameError;

/// Halfmove clock value at which the fifty-move rule ends the game.
const FIFTY_MOVE_HALFMOVES: u32 = 100;

/// A chess game: current position, undo stack, and fingerprint history.
#[derive(Debug, Clone)]
pub struct Game {
    pos: Chess,
    /// Positions before each applied move, newest last.
    undo: Vec<Chess>,
    /// Fingerprint of every position reached, the current one last.
    keys: Vec<u64>,
}

impl Game {
    /// Standard starting position.
    pub fn startpos() -> Self {
        Self::from_position(Chess::default())
    }

    /// Build a game from a FEN string.
    pub fn from_fen(fen: &str) -> Result<Self, GameError> {
        let parsed: Fen = fen.trim().parse().map_err(|_| GameError::InvalidFen {
            fen: fen.to_string(),
        })?;
        let pos: Chess = parsed
            .into_position(CastlingMode::Standard)
            .map_err(|err| GameError::IllegalPosition {
                reason: err.to_string(),
            })?;
        Ok(Self::from_position(pos))
    }

    fn from_position(pos: Chess) -> Self {
        let key = hash(&pos);
        Self {
            pos,
            undo: Vec::new(),
            keys: vec![key],
        }
    }

    /// All legal moves in the current position, in generation order.
    pub fn legal_moves(&self) -> MoveList {
        self.pos.legal_moves()
    }

    /// Apply a move the game has actually played.
    ///
    /// Identical to [`push`](Self::push); the name marks host-side moves
    /// that are never taken back by the search.
    pub fn play(&mut self, mv: &Move) {
        self.push(mv);
    }

    /// Apply `mv` in place. The move must be legal in the current position.
    pub fn push(&mut self, mv: &Move) {
        self.undo.push(self.pos.clone());
        self.pos.play_unchecked(mv);
        self.keys.push(hash(&self.pos));
    }

    /// Take back the most recently applied move.
    ///
    /// Returns `false` (and leaves the position untouched) when there is
    /// nothing to undo.
    pub fn pop(&mut self) -> bool {
        match self.undo.pop() {
            Some(previous) => {
                self.pos = previous;
                self.keys.pop();
                true
            }
            None => {
                warn!("pop called with an empty undo stack");
                false
            }
        }
    }

    /// Apply `mv` (if any) for the lifetime of the returned guard.
    ///
    /// The move is undone when the guard drops, on every exit path. Passing
    /// `None` yields a guard that leaves the position unchanged.
    pub fn enter(&mut self, mv: Option<&Move>) -> MoveGuard<'_> {
        let applied = match mv {
            Some(mv) => {
                self.push(mv);
                true
            }
            None => false,
        };
        MoveGuard {
            game: self,
            applied,
        }
    }

    /// Side to move.
    pub fn turn(&self) -> Color {
        self.pos.turn()
    }

    /// Plies played since the start of the game (0 = White's first move).
    ///
    /// Derived from the fullmove number, so it is meaningful for positions
    /// loaded from FEN as well.
    pub fn ply(&self) -> u32 {
        let fullmoves = self.pos.fullmoves().get();
        fullmoves
            .saturating_sub(1)
            .saturating_mul(2)
            .saturating_add(u32::from(self.pos.turn() == Color::Black))
    }

    /// Transposition-stable fingerprint of the current position.
    pub fn fingerprint(&self) -> u64 {
        self.keys.last().copied().unwrap_or_else(|| hash(&self.pos))
    }

    /// Fingerprint of the position before the last applied move, if known.
    pub fn previous_fingerprint(&self) -> Option<u64> {
        self.keys.len().checked_sub(2).map(|i| self.keys[i])
    }

    /// The side to move is checkmated.
    pub fn is_checkmate(&self) -> bool {
        self.pos.is_checkmate()
    }

    /// The game is drawn: stalemate, insufficient material, the fifty-move
    /// rule, or a repeated position since the last irreversible move.
    pub fn is_draw(&self) -> bool {
        self.pos.is_stalemate()
            || self.pos.is_insufficient_material()
            || self.pos.halfmoves() >= FIFTY_MOVE_HALFMOVES
            || self.is_repetition()
    }

    /// Checkmate or draw.
    pub fn is_terminal(&self) -> bool {
        self.is_checkmate() || self.is_draw()
    }

    /// The current position already occurred since the last capture or
    /// pawn move.
    pub fn is_repetition(&self) -> bool {
        let Some((current, earlier)) = self.keys.split_last() else {
            return false;
        };
        let window = self.pos.halfmoves() as usize;
        earlier.iter().rev().take(window).any(|key| key == current)
    }

    /// Piece on `sq`, if any.
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.pos.board().piece_at(sq)
    }

    /// Squares occupied by `color`'s pieces of kind `role`.
    pub fn pieces(&self, color: Color, role: Role) -> Bitboard {
        let board = self.pos.board();
        board.by_color(color) & board.by_role(role)
    }

    /// Squares occupied by any of `color`'s pieces.
    pub fn by_color(&self, color: Color) -> Bitboard {
        self.pos.board().by_color(color)
    }

    /// Squares attacked by the piece standing on `sq` (empty if none).
    pub fn attacks_from(&self, sq: Square) -> Bitboard {
        self.pos.board().attacks_from(sq)
    }

    /// Find the legal move written as `text` in UCI notation.
    pub fn parse_uci_move(&self, text: &str) -> Result<Move, GameError> {
        self.legal_moves()
            .into_iter()
            .find(|mv| uci(mv) == text)
            .ok_or_else(|| GameError::InvalidMove {
                uci_move: text.to_string(),
            })
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::startpos()
    }
}

/// UCI notation for `mv` (`e2e4`, `e7e8q`, castling as king move).
pub fn uci(mv: &Move) -> String {
    mv.to_uci(CastlingMode::Standard).to_string()
}

fn hash(pos: &Chess) -> u64 {
    let key: Zobrist64 = pos.zobrist_hash(EnPassantMode::Legal);
    key.0
}

/// Scoped move application returned by [`Game::enter`].
///
/// Dereferences to the [`Game`] so nested scopes can enter further moves.
#[derive(Debug)]
pub struct MoveGuard<'a> {
    game: &'a mut Game,
    applied: bool,
}

impl Deref for MoveGuard<'_> {
    type Target = Game;

    fn deref(&self) -> &Game {
        self.game
    }
}

impl DerefMut for MoveGuard<'_> {
    fn deref_mut(&mut self) -> &mut Game {
        self.game
    }
}

impl Drop for MoveGuard<'_> {
    fn drop(&mut self) {
        if self.applied {
            self.game.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHOLARS_MATE_FEN: &str =
        "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4";

    fn play_all(game: &mut Game, moves: &[&str]) {
        for text in moves {
            let mv = game.parse_uci_move(text).unwrap();
            game.play(&mv);
        }
    }

    #[test]
    fn startpos_has_twenty_moves() {
        let game = Game::startpos();
        assert_eq!(game.legal_moves().len(), 20);
        assert_eq!(game.turn(), Color::White);
        assert_eq!(game.ply(), 0);
    }

    #[test]
    fn ply_counts_half_moves() {
        let mut game = Game::startpos();
        play_all(&mut game, &["e2e4", "e7e5", "g1f3"]);
        assert_eq!(game.ply(), 3);
        assert_eq!(game.turn(), Color::Black);
    }

    #[test]
    fn ply_from_fen_uses_fullmove_number() {
        let game = Game::from_fen(SCHOLARS_MATE_FEN).unwrap();
        assert_eq!(game.ply(), 6);
    }

    #[test]
    fn ply_saturates_on_huge_fullmove_number() {
        let game = Game::from_fen("4k3/8/8/8/8/8/8/4K3 b - - 0 3000000000").unwrap();
        assert_eq!(game.ply(), u32::MAX);
    }

    #[test]
    fn push_pop_restores_fingerprint() {
        let mut game = Game::startpos();
        let before = game.fingerprint();
        let mv = game.parse_uci_move("e2e4").unwrap();
        game.push(&mv);
        assert_ne!(game.fingerprint(), before);
        assert_eq!(game.previous_fingerprint(), Some(before));
        assert!(game.pop());
        assert_eq!(game.fingerprint(), before);
        assert_eq!(game.legal_moves().len(), 20);
    }

    #[test]
    fn pop_on_empty_stack_is_noop() {
        let mut game = Game::startpos();
        let before = game.fingerprint();
        assert!(!game.pop());
        assert_eq!(game.fingerprint(), before);
    }

    #[test]
    fn guard_undoes_on_drop() {
        let mut game = Game::startpos();
        let before = game.fingerprint();
        let e4 = game.parse_uci_move("e2e4").unwrap();
        {
            let mut guard = game.enter(Some(&e4));
            assert_eq!(guard.turn(), Color::Black);
            let e5 = guard.parse_uci_move("e7e5").unwrap();
            let inner = guard.enter(Some(&e5));
            assert_eq!(inner.turn(), Color::White);
        }
        assert_eq!(game.fingerprint(), before);
        assert_eq!(game.turn(), Color::White);
    }

    #[test]
    fn guard_without_move_changes_nothing() {
        let mut game = Game::startpos();
        let before = game.fingerprint();
        {
            let guard = game.enter(None);
            assert_eq!(guard.fingerprint(), before);
        }
        assert_eq!(game.fingerprint(), before);
    }

    #[test]
    fn transposition_gives_same_fingerprint() {
        let mut a = Game::startpos();
        play_all(&mut a, &["g1f3", "g8f6", "b1c3"]);
        let mut b = Game::startpos();
        play_all(&mut b, &["b1c3", "g8f6", "g1f3"]);
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn detects_checkmate() {
        let game = Game::from_fen("7k/6Q1/5K2/8/8/8/8/8 b - - 0 1").unwrap();
        assert!(game.is_checkmate());
        assert!(!game.is_draw());
        assert!(game.is_terminal());
    }

    #[test]
    fn detects_stalemate() {
        let game = Game::from_fen("k7/2K5/1Q6/8/8/8/8/8 b - - 0 1").unwrap();
        assert!(!game.is_checkmate());
        assert!(game.is_draw());
    }

    #[test]
    fn detects_insufficient_material() {
        let game = Game::from_fen("8/8/4k3/8/8/3K4/8/8 w - - 0 1").unwrap();
        assert!(game.is_draw());
    }

    #[test]
    fn detects_fifty_move_rule() {
        let game = Game::from_fen("8/8/4k3/8/8/3K4/3R4/8 w - - 100 80").unwrap();
        assert!(game.is_draw());
    }

    #[test]
    fn detects_repetition() {
        let mut game = Game::startpos();
        play_all(&mut game, &["g1f3", "g8f6", "f3g1"]);
        assert!(!game.is_repetition());
        play_all(&mut game, &["f6g8"]);
        assert!(game.is_repetition());
        assert!(game.is_draw());
    }

    #[test]
    fn repetition_after_capture() {
        let mut game = Game::from_fen("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1").unwrap();
        play_all(&mut game, &["e4d5", "e8d7", "e1d2", "d7e8"]);
        assert!(!game.is_repetition());
        play_all(&mut game, &["d2e1"]);
        assert!(game.is_repetition());
    }

    #[test]
    fn piece_queries() {
        let game = Game::startpos();
        let knight = game.piece_at(Square::G1).unwrap();
        assert_eq!(knight.role, Role::Knight);
        assert_eq!(knight.color, Color::White);
        assert_eq!(game.pieces(Color::White, Role::Pawn).count(), 8);
        assert_eq!(game.by_color(Color::Black).count(), 16);
        // Knight on g1 attacks e2 (own pawn), f3 and h3.
        assert_eq!(game.attacks_from(Square::G1).count(), 3);
        assert!(game.attacks_from(Square::E4).is_empty());
    }

    #[test]
    fn uci_round_trip() {
        let game = Game::startpos();
        for mv in game.legal_moves() {
            let text = uci(&mv);
            assert_eq!(game.parse_uci_move(&text).unwrap(), mv);
        }
    }

    #[test]
    fn castling_uses_king_destination() {
        let game =
            Game::from_fen("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1").unwrap();
        assert!(game.parse_uci_move("e1g1").is_ok());
        assert!(game.parse_uci_move("e1c1").is_ok());
    }

    #[test]
    fn rejects_illegal_move_text() {
        let game = Game::startpos();
        let err = game.parse_uci_move("e2e5").unwrap_err();
        assert!(matches!(err, GameError::InvalidMove { .. }));
    }

    #[test]
    fn rejects_bad_fen() {
        assert!(matches!(
            Game::from_fen("not a fen"),
            Err(GameError::InvalidFen { .. })
        ));
        // Missing black king.
        assert!(matches!(
            Game::from_fen("8/8/8/8/8/8/8/4K3 w - - 0 1"),
            Err(GameError::IllegalPosition { .. })
        ));
    }
}
