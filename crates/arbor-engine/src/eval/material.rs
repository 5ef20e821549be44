//! Material balance evaluation.
//!
//! Counts weighted piece material for each side. Scores are returned from
//! the requested perspective (positive = that side ahead).

use arbor_core::{Color, Game, Role};

use crate::eval::score::Score;

/// Piece weights in centipawns.
///
/// | Piece  | value |
/// |--------|-------|
/// | Pawn   | 100   |
/// | Knight | 320   |
/// | Bishop | 330   |
/// | Rook   | 500   |
/// | Queen  | 900   |
/// | King   |   0   |
pub const fn piece_value(role: Role) -> f64 {
    match role {
        Role::Pawn => 100.0,
        Role::Knight => 320.0,
        Role::Bishop => 330.0,
        Role::Rook => 500.0,
        Role::Queen => 900.0,
        Role::King => 0.0,
    }
}

const ROLES: [Role; 6] = [
    Role::Pawn,
    Role::Knight,
    Role::Bishop,
    Role::Rook,
    Role::Queen,
    Role::King,
];

/// Total material of one side.
pub fn side_material(game: &Game, color: Color) -> f64 {
    ROLES
        .iter()
        .map(|&role| piece_value(role) * game.pieces(color, role).count() as f64)
        .sum()
}

/// Material balance from `perspective`'s point of view.
pub fn material(game: &Game, perspective: Color) -> Score {
    Score::new(side_material(game, perspective) - side_material(game, !perspective))
}
