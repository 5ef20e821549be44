//! Cross-turn subtree cache keyed by `(ply, fingerprint)`.
//!
//! After each turn the root's surviving children are stored one ply ahead.
//! The next turn takes its starting subtree from here instead of growing
//! one from scratch. Entries are single-use: a lookup removes the entry, and
//! [`TranspositionCache::evict`] drops everything at or before a ply once
//! that ply has been played.

use std::collections::HashMap;

use crate::search::node::SearchNode;

/// Owned subtrees from earlier turns of the current game.
#[derive(Debug, Default)]
pub struct TranspositionCache {
    entries: HashMap<(u32, u64), SearchNode>,
}

impl TranspositionCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return the subtree stored for `(ply, fingerprint)`.
    pub fn lookup(&mut self, ply: u32, fingerprint: u64) -> Option<SearchNode> {
        self.entries.remove(&(ply, fingerprint))
    }

    /// Store `subtree` for `(ply, fingerprint)`, replacing any previous entry.
    pub fn store(&mut self, ply: u32, fingerprint: u64, subtree: SearchNode) {
        self.entries.insert((ply, fingerprint), subtree);
    }

    /// Drop every entry for `ply` and all earlier plies.
    ///
    /// Returns the number of entries removed.
    pub fn evict(&mut self, ply: u32) -> usize {
        let before = self.entries.len();
        self.entries.retain(|&(entry_ply, _), _| entry_ply > ply);
        before - self.entries.len()
    }

    /// Whether any entry is stored for `ply`.
    pub fn has_ply(&self, ply: u32) -> bool {
        self.entries.keys().any(|&(entry_ply, _)| entry_ply == ply)
    }

    /// Number of stored subtrees.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop everything (new game).
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
