//! Static evaluation: terminal rules first, then material plus activity.

pub mod activity;
pub mod material;
pub mod score;

use arbor_core::{Color, Game};

use score::Score;

/// Evaluate `game` from `perspective`'s point of view.
///
/// Checkmate scores as an infinity against the side to move; any draw
/// scores exactly zero whatever the material. Otherwise the score is the
/// material balance plus the threat-activity balance.
pub fn evaluate(game: &Game, perspective: Color) -> Score {
    if game.is_checkmate() {
        return Score::mate(game.turn(), perspective);
    }
    if game.is_draw() {
        return Score::ZERO;
    }

    material::material(game, perspective) + activity::activity(game, perspective)
}
