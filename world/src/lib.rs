#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative session state management for Geocoin.
//!
//! The world owns the player, the movement trail, the coin inventory, the
//! memoized cache store and the undo checkpoint stack. All mutation flows
//! through [`apply`]; adapters and systems observe results through the
//! events it emits and the read-only [`query`] functions.

mod caches;
mod checkpoints;

use geocoin_core::{
    CellIndex, Coin, CollectError, Command, DepositError, Event, GeoPosition, Neighborhood,
    TileLayout, DEFAULT_ORIGIN, WELCOME_BANNER,
};
use geocoin_system_generation::{Config, Generator};

use crate::caches::CacheStore;
use crate::checkpoints::{Checkpoint, CheckpointStack};

const DEFAULT_TILE_SIZE_DEGREES: f64 = 1e-4;
const DEFAULT_VISIBILITY_RADIUS: u8 = 8;

/// Construction-time parameters that fix a session's world.
///
/// Generation parameters never change mid-session; holding them constant is
/// what keeps the memoized cache store coherent with the generator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldSettings {
    tile_size_degrees: f64,
    origin: GeoPosition,
    visibility_radius: u8,
    generation: Config,
}

impl WorldSettings {
    /// Creates settings from a tile size, start origin, reveal radius and
    /// generation configuration.
    #[must_use]
    pub const fn new(
        tile_size_degrees: f64,
        origin: GeoPosition,
        visibility_radius: u8,
        generation: Config,
    ) -> Self {
        Self {
            tile_size_degrees,
            origin,
            visibility_radius,
            generation,
        }
    }

    /// Edge length of a grid tile in decimal degrees.
    #[must_use]
    pub const fn tile_size_degrees(&self) -> f64 {
        self.tile_size_degrees
    }

    /// Player position used when a session starts fresh.
    #[must_use]
    pub const fn origin(&self) -> GeoPosition {
        self.origin
    }

    /// Neighborhood radius revealed around the player, in whole cells.
    #[must_use]
    pub const fn visibility_radius(&self) -> u8 {
        self.visibility_radius
    }

    /// Parameters handed to the deterministic generator.
    #[must_use]
    pub const fn generation(&self) -> Config {
        self.generation
    }
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self::new(
            DEFAULT_TILE_SIZE_DEGREES,
            DEFAULT_ORIGIN,
            DEFAULT_VISIBILITY_RADIUS,
            Config::default(),
        )
    }
}

/// Represents the authoritative Geocoin session state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    settings: WorldSettings,
    generator: Generator,
    player: GeoPosition,
    trail: Vec<GeoPosition>,
    inventory: Vec<Coin>,
    caches: CacheStore,
    checkpoints: CheckpointStack,
}

impl World {
    /// Creates a new world using the default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_settings(WorldSettings::default())
    }

    /// Creates a new world using the supplied settings.
    ///
    /// The neighborhood around the origin is materialized immediately so
    /// render collaborators can draw the first frame; the reveals are not
    /// announced because no observer exists before the first `apply` call,
    /// and an unsaved fresh session regenerates identically anyway.
    #[must_use]
    pub fn with_settings(settings: WorldSettings) -> Self {
        let origin = settings.origin();
        let mut world = Self {
            banner: WELCOME_BANNER,
            generator: Generator::new(settings.generation()),
            settings,
            player: origin,
            trail: vec![origin],
            inventory: Vec::new(),
            caches: CacheStore::new(),
            checkpoints: CheckpointStack::new(),
        };
        world.reveal_current_neighborhood(&mut Vec::new());
        world
    }

    fn layout(&self) -> TileLayout {
        TileLayout::new(self.settings.tile_size_degrees())
    }

    fn player_cell(&self) -> CellIndex {
        self.layout().cell_at(self.player)
    }

    fn current_neighborhood(&self) -> Neighborhood {
        Neighborhood::new(self.player_cell(), self.settings.visibility_radius())
    }

    fn reveal_current_neighborhood(&mut self, out_events: &mut Vec<Event>) {
        for cell in self.current_neighborhood().iter() {
            self.announce_if_new_cache(cell, out_events);
        }
    }

    fn announce_if_new_cache(&mut self, cell: CellIndex, out_events: &mut Vec<Event>) {
        if self.caches.contains(cell) || !self.generator.should_spawn_cache(cell) {
            return;
        }
        let state = self.caches.get_or_create(cell, &self.generator);
        out_events.push(Event::CacheRevealed {
            cell,
            coin_count: state.coins.len() as u32,
        });
    }
}

/// Executes one command against the world, appending the resulting events.
///
/// Every call runs to completion before returning; there is no partial
/// application and no concurrency.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::MoveTo { position } => {
            let from = world.player;
            world.player = position;
            world.trail.push(position);
            out_events.push(Event::PlayerMoved {
                from,
                to: position,
                cell: world.player_cell(),
            });
            world.reveal_current_neighborhood(out_events);
        }
        Command::Collect { cell } => {
            world.announce_if_new_cache(cell, out_events);
            let state = world.caches.get_or_create(cell, &world.generator);
            match state.coins.pop() {
                Some(coin) => {
                    world.inventory.push(coin);
                    out_events.push(Event::CoinCollected { cell, coin });
                }
                None => out_events.push(Event::CollectRejected {
                    cell,
                    reason: CollectError::EmptyCache,
                }),
            }
        }
        Command::Deposit { cell } => match world.inventory.pop() {
            Some(coin) => {
                world.announce_if_new_cache(cell, out_events);
                let state = world.caches.get_or_create(cell, &world.generator);
                state.coins.push(coin);
                out_events.push(Event::CoinDeposited { cell, coin });
            }
            None => out_events.push(Event::DepositRejected {
                cell,
                reason: DepositError::EmptyInventory,
            }),
        },
        Command::SaveCheckpoint => {
            let depth = world.checkpoints.push(Checkpoint {
                caches: world.caches.clone(),
                inventory: world.inventory.clone(),
            });
            out_events.push(Event::CheckpointSaved { depth });
        }
        Command::Undo => {
            // An empty stack makes undo a silent no-op.
            if let Some(checkpoint) = world.checkpoints.pop() {
                world.caches = checkpoint.caches;
                world.inventory = checkpoint.inventory;
                out_events.push(Event::CheckpointRestored {
                    remaining: world.checkpoints.depth(),
                });
                world.reveal_current_neighborhood(out_events);
            }
        }
        Command::RestoreSession { snapshot } => {
            let cache_count = snapshot.caches.len();
            world.player = snapshot.player;
            world.trail = snapshot.trail;
            world.inventory = snapshot.inventory;
            world.caches.replace_all(snapshot.caches);
            out_events.push(Event::SessionRestored { cache_count });
            world.reveal_current_neighborhood(out_events);
        }
    }
}

/// Read-only views over the world for adapters and systems.
pub mod query {
    use super::{World, WorldSettings};
    use geocoin_core::{
        CellIndex, CellKind, Coin, GeoPosition, Neighborhood, SessionSnapshot, TileLayout,
    };

    /// Banner adapters may display when the session begins.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Settings the world was constructed with.
    #[must_use]
    pub fn settings(world: &World) -> WorldSettings {
        world.settings
    }

    /// Coordinate mapper matching the world's tile size.
    #[must_use]
    pub fn tile_layout(world: &World) -> TileLayout {
        world.layout()
    }

    /// Current player position.
    #[must_use]
    pub fn player(world: &World) -> GeoPosition {
        world.player
    }

    /// Grid cell containing the player.
    #[must_use]
    pub fn player_cell(world: &World) -> CellIndex {
        world.player_cell()
    }

    /// Movement trail recorded so far, oldest position first.
    #[must_use]
    pub fn trail(world: &World) -> &[GeoPosition] {
        &world.trail
    }

    /// Coins carried by the player, oldest acquisition first.
    #[must_use]
    pub fn inventory(world: &World) -> &[Coin] {
        &world.inventory
    }

    /// Neighborhood currently revealed around the player.
    #[must_use]
    pub fn neighborhood(world: &World) -> Neighborhood {
        world.current_neighborhood()
    }

    /// Cells in the current neighborhood that host a cache.
    ///
    /// Derived from the generator alone, so the answer is stable whether or
    /// not the cells have been materialized yet.
    #[must_use]
    pub fn visible_caches(world: &World) -> Vec<CellIndex> {
        world
            .current_neighborhood()
            .iter()
            .filter(|cell| world.generator.should_spawn_cache(*cell))
            .collect()
    }

    /// Coins held by a materialized cell, oldest first.
    #[must_use]
    pub fn coins_at(world: &World, cell: CellIndex) -> Option<&[Coin]> {
        world.caches.get(cell).map(|state| state.coins.as_slice())
    }

    /// Captures a read-only overview of every materialized cache.
    #[must_use]
    pub fn cache_view(world: &World) -> CacheView {
        let overviews = world
            .caches
            .to_snapshots()
            .into_iter()
            .map(|snapshot| CacheOverview {
                cell: snapshot.cell,
                kind: snapshot.kind,
                coin_count: snapshot.coins.len(),
            })
            .collect();
        CacheView { overviews }
    }

    /// Number of undo checkpoints currently held.
    #[must_use]
    pub fn checkpoint_depth(world: &World) -> usize {
        world.checkpoints.depth()
    }

    /// Deep copy of the full persistable session state.
    #[must_use]
    pub fn session_snapshot(world: &World) -> SessionSnapshot {
        SessionSnapshot {
            player: world.player,
            trail: world.trail.clone(),
            inventory: world.inventory.clone(),
            caches: world.caches.to_snapshots(),
        }
    }

    /// Read-only overview of the materialized caches, ordered by cell.
    #[derive(Clone, Debug)]
    pub struct CacheView {
        overviews: Vec<CacheOverview>,
    }

    impl CacheView {
        /// Iterator over the captured overviews in deterministic order.
        pub fn iter(&self) -> impl Iterator<Item = &CacheOverview> {
            self.overviews.iter()
        }

        /// Consumes the view, yielding the underlying overviews.
        #[must_use]
        pub fn into_vec(self) -> Vec<CacheOverview> {
            self.overviews
        }
    }

    /// Immutable description of one materialized cache.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct CacheOverview {
        /// Cell hosting the cache.
        pub cell: CellIndex,
        /// Behavior kind of the cache.
        pub kind: CellKind,
        /// Number of coins the cache currently holds.
        pub coin_count: usize,
    }
}
