//! Uniformly random legal move, used when the search yields nothing.

use arbor_core::{Game, Move};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Pick a legal move uniformly at random.
///
/// The generator is seeded from `seed`, so the same position and seed always
/// give the same move. Returns `None` when there are no legal moves.
pub fn random_move(game: &Game, seed: u64) -> Option<Move> {
    let moves = game.legal_moves();
    let mut rng = StdRng::seed_from_u64(seed);
    moves.as_slice().choose(&mut rng).cloned()
}

#[cfg(test)]
mod tests {
    use arbor_core::Game;

    use super::random_move;

    #[test]
    fn returns_a_legal_move() {
        let game = Game::startpos();
        let legal = game.legal_moves();
        for seed in 0..32 {
            let mv = random_move(&game, seed).unwrap();
            assert!(legal.contains(&mv));
        }
    }

    #[test]
    fn same_seed_same_move() {
        let game = Game::startpos();
        assert_eq!(random_move(&game, 1234), random_move(&game, 1234));
    }

    #[test]
    fn spreads_over_moves() {
        let game = Game::startpos();
        let distinct: std::collections::HashSet<_> =
            (0..200).filter_map(|seed| random_move(&game, seed)).collect();
        assert!(distinct.len() > 5, "only {} distinct moves", distinct.len());
    }

    #[test]
    fn none_without_legal_moves() {
        let game = Game::from_fen("7k/6Q1/5K2/8/8/8/8/8 b - - 0 1").unwrap();
        assert!(random_move(&game, 7).is_none());
    }
}
