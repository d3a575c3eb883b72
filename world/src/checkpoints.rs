//! Bounded stack of point-in-time undo checkpoints.

use std::collections::VecDeque;

use geocoin_core::Coin;

use crate::caches::CacheStore;

/// Number of checkpoints retained before the oldest is evicted.
pub(crate) const CHECKPOINT_CAP: usize = 64;

/// Deep copy of the undoable session state at one moment.
///
/// Cloning the store copies every coin list, so a checkpoint never aliases
/// live state.
#[derive(Clone, Debug)]
pub(crate) struct Checkpoint {
    pub(crate) caches: CacheStore,
    pub(crate) inventory: Vec<Coin>,
}

/// LIFO stack of checkpoints with a bounded memory footprint.
#[derive(Debug)]
pub(crate) struct CheckpointStack {
    entries: VecDeque<Checkpoint>,
}

impl CheckpointStack {
    /// Creates an empty stack.
    pub(crate) fn new() -> Self {
        Self {
            entries: VecDeque::new(),
        }
    }

    /// Pushes a checkpoint, evicting the oldest entry when at capacity.
    /// Returns the resulting depth.
    pub(crate) fn push(&mut self, checkpoint: Checkpoint) -> usize {
        if self.entries.len() == CHECKPOINT_CAP {
            let _ = self.entries.pop_front();
        }
        self.entries.push_back(checkpoint);
        self.entries.len()
    }

    /// Pops the most recently captured checkpoint, if any.
    pub(crate) fn pop(&mut self) -> Option<Checkpoint> {
        self.entries.pop_back()
    }

    /// Number of checkpoints currently held.
    pub(crate) fn depth(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::{Checkpoint, CheckpointStack, CHECKPOINT_CAP};
    use crate::caches::CacheStore;
    use geocoin_core::{CellIndex, Coin};

    fn checkpoint_carrying(serial: u32) -> Checkpoint {
        Checkpoint {
            caches: CacheStore::new(),
            inventory: vec![Coin::new(CellIndex::new(0, 0), serial)],
        }
    }

    #[test]
    fn pop_returns_most_recent_first() {
        let mut stack = CheckpointStack::new();
        assert_eq!(stack.push(checkpoint_carrying(0)), 1);
        assert_eq!(stack.push(checkpoint_carrying(1)), 2);

        let top = stack.pop().expect("stack should hold two entries");
        assert_eq!(top.inventory[0].serial(), 1);
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn empty_stack_pops_nothing() {
        let mut stack = CheckpointStack::new();
        assert!(stack.pop().is_none());
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn capacity_evicts_the_oldest_checkpoint() {
        let mut stack = CheckpointStack::new();
        for serial in 0..(CHECKPOINT_CAP as u32 + 3) {
            let depth = stack.push(checkpoint_carrying(serial));
            assert!(depth <= CHECKPOINT_CAP);
        }
        assert_eq!(stack.depth(), CHECKPOINT_CAP);

        let mut serials = Vec::new();
        while let Some(checkpoint) = stack.pop() {
            serials.push(checkpoint.inventory[0].serial());
        }
        assert_eq!(serials.first().copied(), Some(CHECKPOINT_CAP as u32 + 2));
        assert_eq!(serials.last().copied(), Some(3));
    }
}
