//! Evaluation score: a real number with signed infinities for mate.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Neg};

use arbor_core::Color;

/// Centipawn value printed for a forced mate when an integer is required.
pub const MATE_CENTIPAWNS: i32 = 32_000;

/// A position score in centipawns from a fixed perspective.
///
/// Finite values come from the heuristic; `+inf`/`-inf` mark a forced mate
/// for or against the perspective side. Never NaN.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Score(f64);

impl Score {
    /// Draw, and the balanced material score.
    pub const ZERO: Score = Score(0.0);
    /// Mate delivered by the perspective side.
    pub const WIN: Score = Score(f64::INFINITY);
    /// Mate delivered against the perspective side.
    pub const LOSS: Score = Score(f64::NEG_INFINITY);

    /// Wrap a finite centipawn value.
    pub const fn new(centipawns: f64) -> Self {
        Score(centipawns)
    }

    /// Score for a position where `mated` has been checkmated, seen from
    /// `perspective`.
    pub fn mate(mated: Color, perspective: Color) -> Self {
        if mated == perspective {
            Score::LOSS
        } else {
            Score::WIN
        }
    }

    /// Raw value.
    pub const fn value(self) -> f64 {
        self.0
    }

    /// Whether this score is a forced mate in either direction.
    pub fn is_mate(self) -> bool {
        self.0.is_infinite()
    }

    /// Integer centipawns, mate clamped to [`MATE_CENTIPAWNS`].
    pub fn centipawns(self) -> i32 {
        let clamped = self
            .0
            .clamp(-f64::from(MATE_CENTIPAWNS), f64::from(MATE_CENTIPAWNS));
        clamped.round() as i32
    }

    /// Total order over scores; `-inf` sorts first.
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Add for Score {
    type Output = Score;

    fn add(self, rhs: Score) -> Score {
        Score(self.0 + rhs.0)
    }
}

impl Neg for Score {
    type Output = Score;

    fn neg(self) -> Score {
        Score(-self.0)
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == f64::INFINITY {
            write!(f, "+mate")
        } else if self.0 == f64::NEG_INFINITY {
            write!(f, "-mate")
        } else {
            write!(f, "{:.2}", self.0)
        }
    }
}
