//! Memoized extrinsic cache state owned by the world.

use std::collections::BTreeMap;

use geocoin_core::{CacheSnapshot, CellIndex, CellKind, Coin};
use geocoin_system_generation::Generator;

/// Extrinsic state of one materialized cell.
#[derive(Clone, Debug)]
pub(crate) struct CacheState {
    /// Behavior kind shared by every cache of this shape.
    pub(crate) kind: CellKind,
    /// Coins currently held, oldest first; the tail is the collect end.
    pub(crate) coins: Vec<Coin>,
}

/// Memoized mapping from cell index to extrinsic cache state.
///
/// An entry is created exactly once per cell for the lifetime of a session
/// and mutated in place thereafter; [`CacheStore::replace_all`] and plain
/// assignment during checkpoint restore are the only operations that abandon
/// existing entries.
#[derive(Clone, Debug)]
pub(crate) struct CacheStore {
    entries: BTreeMap<CellIndex, CacheState>,
}

impl CacheStore {
    /// Creates an empty store with nothing materialized.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Reports whether the cell has been materialized already.
    pub(crate) fn contains(&self, cell: CellIndex) -> bool {
        self.entries.contains_key(&cell)
    }

    /// Read-only access to a materialized entry.
    pub(crate) fn get(&self, cell: CellIndex) -> Option<&CacheState> {
        self.entries.get(&cell)
    }

    /// Returns the memoized entry for the cell, materializing it on first
    /// access.
    ///
    /// A spawn-positive cell is born with its generated coin list (serials
    /// counting up from zero, origin set to the cell); any other cell is
    /// recorded with an empty list so repeated calls stay stable either way.
    /// The generator is consulted at most once per cell per session.
    pub(crate) fn get_or_create(
        &mut self,
        cell: CellIndex,
        generator: &Generator,
    ) -> &mut CacheState {
        self.entries.entry(cell).or_insert_with(|| {
            let coins = if generator.should_spawn_cache(cell) {
                let count = generator.initial_coin_count(cell);
                (0..count).map(|serial| Coin::new(cell, serial)).collect()
            } else {
                Vec::new()
            };
            CacheState {
                kind: CellKind::Standard,
                coins,
            }
        })
    }

    /// Copies every entry into its persisted form, ordered by cell.
    pub(crate) fn to_snapshots(&self) -> Vec<CacheSnapshot> {
        self.entries
            .iter()
            .map(|(cell, state)| CacheSnapshot {
                cell: *cell,
                kind: state.kind,
                coins: state.coins.clone(),
            })
            .collect()
    }

    /// Wholesale-replaces the mapping with previously captured entries.
    pub(crate) fn replace_all(&mut self, snapshots: Vec<CacheSnapshot>) {
        self.entries = snapshots
            .into_iter()
            .map(|snapshot| {
                (
                    snapshot.cell,
                    CacheState {
                        kind: snapshot.kind,
                        coins: snapshot.coins,
                    },
                )
            })
            .collect();
    }
}
