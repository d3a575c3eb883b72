#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that decides when the session is worth persisting again.

use std::mem;

use geocoin_core::Event;

/// Latches a dirty flag whenever observed events change persisted state.
///
/// Only events that alter what a save payload would contain arm the latch.
/// Reveals merely memoize deterministic generation, checkpoint pushes stay
/// internal to the undo stack, and rejections leave the session untouched,
/// so none of those schedule a write.
#[derive(Debug, Default)]
pub struct Autosave {
    dirty: bool,
}

impl Autosave {
    /// Creates a new autosave system with a clean latch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes world events, arming the latch on persisted-state changes.
    pub fn observe(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::PlayerMoved { .. }
                | Event::CoinCollected { .. }
                | Event::CoinDeposited { .. }
                | Event::CheckpointRestored { .. }
                | Event::SessionRestored { .. } => self.dirty = true,
                Event::CacheRevealed { .. }
                | Event::CollectRejected { .. }
                | Event::DepositRejected { .. }
                | Event::CheckpointSaved { .. } => {}
            }
        }
    }

    /// Reports whether a write is currently due without clearing the latch.
    #[must_use]
    pub fn is_due(&self) -> bool {
        self.dirty
    }

    /// Clears the latch and reports whether a write was due.
    #[must_use]
    pub fn take_due(&mut self) -> bool {
        mem::take(&mut self.dirty)
    }
}
