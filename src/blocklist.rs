//! Block relation between participants
//!
//! Stored directed (blocker -> blocked), queried symmetrically.
//! Blocks are permanent for the process lifetime.

use std::collections::{HashMap, HashSet};

use crate::types::ClientId;

#[derive(Debug, Default)]
pub struct BlockList {
    blocked: HashMap<ClientId, HashSet<ClientId>>,
}

impl BlockList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `blocker` blocked `blocked`
    ///
    /// Returns false if the block already existed.
    pub fn block(&mut self, blocker: ClientId, blocked: ClientId) -> bool {
        self.blocked.entry(blocker).or_default().insert(blocked)
    }

    /// Whether `blocker` has blocked `blocked` (one direction only)
    pub fn has_blocked(&self, blocker: ClientId, blocked: ClientId) -> bool {
        self.blocked
            .get(&blocker)
            .is_some_and(|set| set.contains(&blocked))
    }

    /// True if either participant has blocked the other
    pub fn is_mutually_excluded(&self, a: ClientId, b: ClientId) -> bool {
        self.has_blocked(a, b) || self.has_blocked(b, a)
    }

    /// Total number of block edges
    pub fn len(&self) -> usize {
        self.blocked.values().map(HashSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_is_symmetric_for_exclusion() {
        let mut blocks = BlockList::new();
        let a = ClientId::new();
        let b = ClientId::new();

        assert!(!blocks.is_mutually_excluded(a, b));

        blocks.block(a, b);

        assert!(blocks.has_blocked(a, b));
        assert!(!blocks.has_blocked(b, a));
        assert!(blocks.is_mutually_excluded(a, b));
        assert!(blocks.is_mutually_excluded(b, a));
    }

    #[test]
    fn test_block_idempotent() {
        let mut blocks = BlockList::new();
        let a = ClientId::new();
        let b = ClientId::new();

        assert!(blocks.block(a, b));
        assert!(!blocks.block(a, b));
        assert_eq!(blocks.len(), 1);
    }

    #[test]
    fn test_unrelated_pairs_not_excluded() {
        let mut blocks = BlockList::new();
        let a = ClientId::new();
        let b = ClientId::new();
        let c = ClientId::new();

        blocks.block(a, b);

        assert!(!blocks.is_mutually_excluded(a, c));
        assert!(!blocks.is_mutually_excluded(b, c));
    }
}
