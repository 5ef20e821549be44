//! Best-first ordering of sibling nodes.
//!
//! Children are ranked in one pass after every child of the round has its
//! final score; nothing here is called on a partially scored set.

use std::cmp::Ordering;

use crate::eval::score::Score;
use crate::search::node::{SearchNode, Side};

/// Compare two child scores for a parent on `side`.
///
/// `Less` means `a` ranks ahead of `b`. Equal scores compare `Equal`.
pub fn compare(side: Side, a: Score, b: Score) -> Ordering {
    match side {
        Side::Max => b.total_cmp(&a),
        Side::Min => a.total_cmp(&b),
    }
}

/// Sort `children` best-first for `side`, then keep at most `width` of them.
///
/// The sort is stable, so ties stay in their current order. Returns the
/// index of the best child, or `None` when there are no children.
pub fn rank(side: Side, children: &mut Vec<SearchNode>, width: Option<usize>) -> Option<usize> {
    children.sort_by(|a, b| compare(side, a.score, b.score));
    if let Some(width) = width {
        children.truncate(width.max(1));
    }
    if children.is_empty() { None } else { Some(0) }
}

/// Whether `children` is in best-first order for `side`.
#[cfg(test)]
pub(crate) fn is_ranked(side: Side, children: &[SearchNode]) -> bool {
    children
        .windows(2)
        .all(|pair| compare(side, pair[0].score, pair[1].score) != Ordering::Greater)
}
