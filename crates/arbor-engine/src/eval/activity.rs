//! Threat activity: a small bonus for every enemy piece under attack.
//!
//! Each attacker earns [`THREAT_FRACTION`] of the weight of the piece it
//! attacks. The attack set is generated from the attacker's square; the
//! bonus is looked up on the threatened piece's square. Kings weigh zero, so
//! giving check earns nothing here.

use arbor_core::{Color, Game};

use crate::eval::material::piece_value;
use crate::eval::score::Score;

/// Share of the threatened piece's weight awarded per attack.
pub const THREAT_FRACTION: f64 = 0.01;

/// Threat bonus earned by `color`'s pieces.
pub fn side_activity(game: &Game, color: Color) -> f64 {
    let enemies = game.by_color(!color);
    let mut bonus = 0.0;

    for from in game.by_color(color) {
        for target in game.attacks_from(from) & enemies {
            if let Some(piece) = game.piece_at(target) {
                bonus += piece_value(piece.role) * THREAT_FRACTION;
            }
        }
    }

    bonus
}

/// Activity balance from `perspective`'s point of view.
pub fn activity(game: &Game, perspective: Color) -> Score {
    Score::new(side_activity(game, perspective) - side_activity(game, !perspective))
}
