#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the geocoin engine.
//!
//! Adapters and pure systems talk to the authoritative world through the
//! message surface defined here: they submit [`Command`] values describing
//! requested mutations, the world runs them through its `apply` entry point
//! and answers with [`Event`] values describing what actually happened. The
//! crate also carries the coordinate mapper that turns continuous geographic
//! positions into discrete grid cells, and the coin data model every other
//! crate agrees on.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Banner shown to the player when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Geocoin.";

/// Role tag for the draw that decides whether a cell hosts a cache.
pub const RNG_STREAM_CACHE_SPAWN: &str = "cache-spawn";

/// Role tag for the draw that sizes a freshly spawned cache's coin list.
pub const RNG_STREAM_COIN_COUNT: &str = "coin-count";

/// Start position used for fresh sessions when no save exists.
pub const DEFAULT_ORIGIN: GeoPosition = GeoPosition::new(36.9895, -122.0628);

/// Continuous geographic position expressed in decimal degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPosition {
    lat: f64,
    lng: f64,
}

impl GeoPosition {
    /// Creates a new position from latitude and longitude degrees.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Latitude component in decimal degrees.
    #[must_use]
    pub const fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude component in decimal degrees.
    #[must_use]
    pub const fn lng(&self) -> f64 {
        self.lng
    }

    /// Returns the position displaced by the provided degree deltas.
    #[must_use]
    pub fn offset_by(self, dlat: f64, dlng: f64) -> Self {
        Self {
            lat: self.lat + dlat,
            lng: self.lng + dlng,
        }
    }
}

/// Discrete grid cell identified by signed latitude/longitude band indices.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct CellIndex {
    i: i32,
    j: i32,
}

impl CellIndex {
    /// Creates a new cell index from its latitude and longitude band indices.
    #[must_use]
    pub const fn new(i: i32, j: i32) -> Self {
        Self { i, j }
    }

    /// Latitude band index of the cell.
    #[must_use]
    pub const fn i(&self) -> i32 {
        self.i
    }

    /// Longitude band index of the cell.
    #[must_use]
    pub const fn j(&self) -> i32 {
        self.j
    }

    /// Returns the cell displaced by the provided index deltas.
    ///
    /// Displacements near the numeric bounds of the index space saturate
    /// rather than wrap so callers never observe a sign flip.
    #[must_use]
    pub const fn offset(self, di: i32, dj: i32) -> Self {
        Self {
            i: self.i.saturating_add(di),
            j: self.j.saturating_add(dj),
        }
    }
}

impl fmt::Display for CellIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.i, self.j)
    }
}

/// Geographic rectangle covered by a single grid cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellBounds {
    lat_min: f64,
    lng_min: f64,
    lat_max: f64,
    lng_max: f64,
}

impl CellBounds {
    /// Creates bounds from the south-west and north-east corner degrees.
    #[must_use]
    pub const fn new(lat_min: f64, lng_min: f64, lat_max: f64, lng_max: f64) -> Self {
        Self {
            lat_min,
            lng_min,
            lat_max,
            lng_max,
        }
    }

    /// Southern edge latitude in decimal degrees.
    #[must_use]
    pub const fn lat_min(&self) -> f64 {
        self.lat_min
    }

    /// Western edge longitude in decimal degrees.
    #[must_use]
    pub const fn lng_min(&self) -> f64 {
        self.lng_min
    }

    /// Northern edge latitude in decimal degrees.
    #[must_use]
    pub const fn lat_max(&self) -> f64 {
        self.lat_max
    }

    /// Eastern edge longitude in decimal degrees.
    #[must_use]
    pub const fn lng_max(&self) -> f64 {
        self.lng_max
    }

    /// Midpoint of the rectangle, where display collaborators anchor markers.
    #[must_use]
    pub fn center(&self) -> GeoPosition {
        GeoPosition::new(
            (self.lat_min + self.lat_max) / 2.0,
            (self.lng_min + self.lng_max) / 2.0,
        )
    }
}

/// Maps continuous geographic positions onto the discrete cell grid.
///
/// The mapping is many-to-one and stable: every position inside a cell's
/// rectangle yields the same [`CellIndex`], including positions with negative
/// coordinates, which floor toward negative infinity rather than truncating
/// toward zero.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileLayout {
    tile_size_degrees: f64,
}

impl TileLayout {
    /// Creates a layout with the provided tile edge length in degrees.
    #[must_use]
    pub const fn new(tile_size_degrees: f64) -> Self {
        Self { tile_size_degrees }
    }

    /// Edge length of a single square tile in decimal degrees.
    #[must_use]
    pub const fn tile_size_degrees(&self) -> f64 {
        self.tile_size_degrees
    }

    /// Returns the cell containing the provided position.
    #[must_use]
    pub fn cell_at(&self, position: GeoPosition) -> CellIndex {
        CellIndex::new(
            floor_index(position.lat(), self.tile_size_degrees),
            floor_index(position.lng(), self.tile_size_degrees),
        )
    }

    /// Returns the geographic rectangle covered by the provided cell.
    #[must_use]
    pub fn bounds(&self, cell: CellIndex) -> CellBounds {
        let size = self.tile_size_degrees;
        CellBounds::new(
            f64::from(cell.i()) * size,
            f64::from(cell.j()) * size,
            (f64::from(cell.i()) + 1.0) * size,
            (f64::from(cell.j()) + 1.0) * size,
        )
    }

    /// Returns the midpoint of the provided cell.
    #[must_use]
    pub fn center(&self, cell: CellIndex) -> GeoPosition {
        self.bounds(cell).center()
    }
}

fn floor_index(degrees: f64, tile_size: f64) -> i32 {
    (degrees / tile_size).floor() as i32
}

/// Square neighborhood of cells scanned around a center cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Neighborhood {
    center: CellIndex,
    radius: u8,
}

impl Neighborhood {
    /// Creates a neighborhood covering `|di| <= radius`, `|dj| <= radius`.
    #[must_use]
    pub const fn new(center: CellIndex, radius: u8) -> Self {
        Self { center, radius }
    }

    /// Cell at the middle of the neighborhood.
    #[must_use]
    pub const fn center(&self) -> CellIndex {
        self.center
    }

    /// Scan radius measured in whole cells.
    #[must_use]
    pub const fn radius(&self) -> u8 {
        self.radius
    }

    /// Reports whether the provided cell falls inside the neighborhood.
    #[must_use]
    pub fn contains(&self, cell: CellIndex) -> bool {
        let radius = i64::from(self.radius);
        let di = i64::from(cell.i()) - i64::from(self.center.i());
        let dj = i64::from(cell.j()) - i64::from(self.center.j());
        di.abs() <= radius && dj.abs() <= radius
    }

    /// Iterates every cell of the neighborhood in row-major order.
    #[must_use]
    pub fn iter(&self) -> NeighborhoodIter {
        NeighborhoodIter::new(*self)
    }
}

/// Row-major iterator over the cells of a [`Neighborhood`].
#[derive(Clone, Debug)]
pub struct NeighborhoodIter {
    neighborhood: Neighborhood,
    di: i32,
    dj: i32,
    exhausted: bool,
}

impl NeighborhoodIter {
    fn new(neighborhood: Neighborhood) -> Self {
        let radius = i32::from(neighborhood.radius());
        Self {
            neighborhood,
            di: -radius,
            dj: -radius,
            exhausted: false,
        }
    }
}

impl Iterator for NeighborhoodIter {
    type Item = CellIndex;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }

        let radius = i32::from(self.neighborhood.radius());
        let cell = self.neighborhood.center().offset(self.di, self.dj);

        if self.dj < radius {
            self.dj += 1;
        } else if self.di < radius {
            self.dj = -radius;
            self.di += 1;
        } else {
            self.exhausted = true;
        }

        Some(cell)
    }
}

/// Unit of collectible value minted by the cell that first generated it.
///
/// The `(origin, serial)` pair is the coin's identity for display and
/// equality; it never changes while the coin moves between caches and the
/// player's inventory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coin {
    origin: CellIndex,
    serial: u32,
}

impl Coin {
    /// Creates a coin minted by the provided origin cell.
    #[must_use]
    pub const fn new(origin: CellIndex, serial: u32) -> Self {
        Self { origin, serial }
    }

    /// Cell that generated the coin.
    #[must_use]
    pub const fn origin(&self) -> CellIndex {
        self.origin
    }

    /// Mint sequence number, unique among coins sharing an origin.
    #[must_use]
    pub const fn serial(&self) -> u32 {
        self.serial
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.origin, self.serial)
    }
}

/// Closed set of cache behaviors a cell can host.
///
/// A single kind exists today; modeling the set as an enum keeps the per-kind
/// lookup total, so no runtime path can request behavior for an unrecognized
/// kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    /// Ordinary roadside cache with no special behavior.
    Standard,
}

/// Shared presentation behavior for every cache of one kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KindProfile {
    display_name: &'static str,
    glyph: char,
}

impl KindProfile {
    /// Human-readable name shown next to caches of this kind.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        self.display_name
    }

    /// Single-character marker used by text renderers.
    #[must_use]
    pub const fn glyph(&self) -> char {
        self.glyph
    }
}

/// Reports the shared behavior profile associated with a cell kind.
#[must_use]
pub const fn kind_profile(kind: CellKind) -> KindProfile {
    match kind {
        CellKind::Standard => KindProfile {
            display_name: "cache",
            glyph: 'C',
        },
    }
}

/// Compass directions available to discrete player steps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Movement toward increasing latitude.
    North,
    /// Movement toward increasing longitude.
    East,
    /// Movement toward decreasing latitude.
    South,
    /// Movement toward decreasing longitude.
    West,
}

impl Direction {
    /// Degree deltas of a single step along the direction, scaled by tile size.
    #[must_use]
    pub fn step_deltas(self, tile_size_degrees: f64) -> (f64, f64) {
        match self {
            Self::North => (tile_size_degrees, 0.0),
            Self::East => (0.0, tile_size_degrees),
            Self::South => (-tile_size_degrees, 0.0),
            Self::West => (0.0, -tile_size_degrees),
        }
    }
}

/// Reasons a collect request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollectError {
    /// The targeted cache currently holds no coins.
    EmptyCache,
}

/// Reasons a deposit request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DepositError {
    /// The player's inventory currently holds no coins.
    EmptyInventory,
}

/// Requests for world mutations, one variant per permissible change.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Moves the player to the provided position, extending the trail and
    /// revealing the surrounding neighborhood.
    MoveTo {
        /// Destination position reported by an input collaborator.
        position: GeoPosition,
    },
    /// Requests that the top coin of the addressed cache move to the
    /// player's inventory.
    Collect {
        /// Cell whose cache the player is interacting with.
        cell: CellIndex,
    },
    /// Requests that the most recently collected coin move from the
    /// inventory into the addressed cache.
    Deposit {
        /// Cell whose cache should receive the coin.
        cell: CellIndex,
    },
    /// Captures an undo checkpoint of the current cache and inventory state.
    SaveCheckpoint,
    /// Restores the most recent checkpoint, if any.
    Undo,
    /// Replaces the entire session with a previously persisted snapshot.
    RestoreSession {
        /// Persisted state decoded by the persistence boundary.
        snapshot: SessionSnapshot,
    },
}

/// Facts the world announces after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that the player's position changed.
    PlayerMoved {
        /// Position the player occupied before the move.
        from: GeoPosition,
        /// Position the player occupies after the move.
        to: GeoPosition,
        /// Grid cell containing the new position.
        cell: CellIndex,
    },
    /// Announces the first materialization of a cache within view.
    CacheRevealed {
        /// Cell hosting the freshly materialized cache.
        cell: CellIndex,
        /// Number of coins the cache was generated with.
        coin_count: u32,
    },
    /// Confirms that a coin moved from a cache into the inventory.
    CoinCollected {
        /// Cell whose cache surrendered the coin.
        cell: CellIndex,
        /// Coin that changed hands.
        coin: Coin,
    },
    /// Reports that a collect request was rejected.
    CollectRejected {
        /// Cell named in the rejected request.
        cell: CellIndex,
        /// Specific reason the collect failed.
        reason: CollectError,
    },
    /// Confirms that a coin moved from the inventory into a cache.
    CoinDeposited {
        /// Cell whose cache received the coin.
        cell: CellIndex,
        /// Coin that changed hands.
        coin: Coin,
    },
    /// Reports that a deposit request was rejected.
    DepositRejected {
        /// Cell named in the rejected request.
        cell: CellIndex,
        /// Specific reason the deposit failed.
        reason: DepositError,
    },
    /// Confirms that an undo checkpoint was captured.
    CheckpointSaved {
        /// Number of checkpoints now held, including the new one.
        depth: usize,
    },
    /// Confirms that the most recent checkpoint was restored.
    CheckpointRestored {
        /// Number of checkpoints remaining after the restore.
        remaining: usize,
    },
    /// Confirms that a persisted session replaced the live state.
    SessionRestored {
        /// Number of cache entries carried by the restored snapshot.
        cache_count: usize,
    },
}

/// Persisted form of one materialized cache.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheSnapshot {
    /// Cell hosting the cache.
    pub cell: CellIndex,
    /// Behavior kind of the cache.
    pub kind: CellKind,
    /// Coins held by the cache, oldest first.
    pub coins: Vec<Coin>,
}

/// Complete persisted game state: player, trail, inventory and every
/// materialized cache.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Player position at capture time.
    pub player: GeoPosition,
    /// Ordered movement trail, oldest position first.
    pub trail: Vec<GeoPosition>,
    /// Coins carried by the player, oldest acquisition first.
    pub inventory: Vec<Coin>,
    /// Every cache materialized during the session, in cell order.
    pub caches: Vec<CacheSnapshot>,
}

impl SessionSnapshot {
    /// Builds the fresh-session default anchored at the provided origin.
    ///
    /// A missing save is a normal first-run condition, so this is the state
    /// the persistence boundary falls back to: the trail starts seeded with
    /// the origin and nothing has been generated yet.
    #[must_use]
    pub fn fresh(origin: GeoPosition) -> Self {
        Self {
            player: origin,
            trail: vec![origin],
            inventory: Vec::new(),
            caches: Vec::new(),
        }
    }

    /// Total number of coins across every cache list and the inventory.
    #[must_use]
    pub fn total_coins(&self) -> usize {
        let cached: usize = self.caches.iter().map(|cache| cache.coins.len()).sum();
        cached + self.inventory.len()
    }
}

#[cfg(test)]
mod tests {
    use super::{
        kind_profile, CacheSnapshot, CellIndex, CellKind, Coin, CollectError, DepositError,
        GeoPosition, Neighborhood, SessionSnapshot, TileLayout,
    };
    use serde::{de::DeserializeOwned, Serialize};

    const TILE: f64 = 1e-4;

    #[test]
    fn cell_mapping_floors_toward_negative_infinity() {
        let layout = TileLayout::new(TILE);

        let north_east = layout.cell_at(GeoPosition::new(0.00015, 0.00025));
        assert_eq!(north_east, CellIndex::new(1, 2));

        let south_west = layout.cell_at(GeoPosition::new(-0.00005, -0.00025));
        assert_eq!(south_west, CellIndex::new(-1, -3));

        let on_boundary = layout.cell_at(GeoPosition::new(0.0, -0.0001));
        assert_eq!(on_boundary, CellIndex::new(0, -1));
    }

    #[test]
    fn same_interval_always_maps_to_same_cell() {
        let layout = TileLayout::new(TILE);
        let cell = CellIndex::new(369_895, -1_220_628);
        let bounds = layout.bounds(cell);

        let nudged = GeoPosition::new(
            bounds.lat_min() + TILE * 0.25,
            bounds.lng_min() + TILE * 0.75,
        );
        assert_eq!(layout.cell_at(nudged), cell);
        assert_eq!(layout.cell_at(bounds.center()), cell);
    }

    #[test]
    fn bounds_invert_the_cell_mapping() {
        let layout = TileLayout::new(TILE);
        let cell = CellIndex::new(-4, 7);
        let bounds = layout.bounds(cell);

        assert!((bounds.lat_min() - (-4.0 * TILE)).abs() < f64::EPSILON);
        assert!((bounds.lat_max() - (-3.0 * TILE)).abs() < f64::EPSILON);
        assert!((bounds.lng_min() - (7.0 * TILE)).abs() < f64::EPSILON);
        assert!((bounds.lng_max() - (8.0 * TILE)).abs() < f64::EPSILON);
    }

    #[test]
    fn neighborhood_iterates_row_major_without_duplicates() {
        let neighborhood = Neighborhood::new(CellIndex::new(0, 0), 1);
        let cells: Vec<CellIndex> = neighborhood.iter().collect();

        assert_eq!(cells.len(), 9);
        assert_eq!(cells[0], CellIndex::new(-1, -1));
        assert_eq!(cells[4], CellIndex::new(0, 0));
        assert_eq!(cells[8], CellIndex::new(1, 1));

        let mut deduplicated = cells.clone();
        deduplicated.sort();
        deduplicated.dedup();
        assert_eq!(deduplicated.len(), cells.len());
    }

    #[test]
    fn neighborhood_contains_matches_iteration() {
        let neighborhood = Neighborhood::new(CellIndex::new(5, -5), 2);
        for cell in neighborhood.iter() {
            assert!(neighborhood.contains(cell));
        }
        assert!(!neighborhood.contains(CellIndex::new(8, -5)));
        assert!(!neighborhood.contains(CellIndex::new(5, -8)));
    }

    #[test]
    fn zero_radius_neighborhood_yields_only_the_center() {
        let center = CellIndex::new(3, 4);
        let cells: Vec<CellIndex> = Neighborhood::new(center, 0).iter().collect();
        assert_eq!(cells, vec![center]);
    }

    #[test]
    fn coin_display_matches_provenance_label() {
        let coin = Coin::new(CellIndex::new(-3, 12), 4);
        assert_eq!(coin.to_string(), "-3:12#4");
    }

    #[test]
    fn standard_kind_has_a_total_profile() {
        let profile = kind_profile(CellKind::Standard);
        assert_eq!(profile.display_name(), "cache");
        assert_eq!(profile.glyph(), 'C');
    }

    #[test]
    fn fresh_session_seeds_trail_with_origin() {
        let origin = GeoPosition::new(1.5, -2.5);
        let session = SessionSnapshot::fresh(origin);

        assert_eq!(session.player, origin);
        assert_eq!(session.trail, vec![origin]);
        assert!(session.inventory.is_empty());
        assert!(session.caches.is_empty());
        assert_eq!(session.total_coins(), 0);
    }

    #[test]
    fn total_coins_sums_caches_and_inventory() {
        let origin = CellIndex::new(0, 0);
        let session = SessionSnapshot {
            player: GeoPosition::new(0.0, 0.0),
            trail: vec![GeoPosition::new(0.0, 0.0)],
            inventory: vec![Coin::new(origin, 2)],
            caches: vec![CacheSnapshot {
                cell: origin,
                kind: CellKind::Standard,
                coins: vec![Coin::new(origin, 0), Coin::new(origin, 1)],
            }],
        };

        assert_eq!(session.total_coins(), 3);
    }

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn cell_index_round_trips_through_bincode() {
        assert_round_trip(&CellIndex::new(-42, 17));
    }

    #[test]
    fn coin_round_trips_through_bincode() {
        assert_round_trip(&Coin::new(CellIndex::new(3, -9), 11));
    }

    #[test]
    fn rejection_reasons_round_trip_through_bincode() {
        assert_round_trip(&CollectError::EmptyCache);
        assert_round_trip(&DepositError::EmptyInventory);
    }

    #[test]
    fn session_snapshot_round_trips_through_bincode() {
        let cell = CellIndex::new(1, 1);
        let session = SessionSnapshot {
            player: GeoPosition::new(0.5, -0.5),
            trail: vec![GeoPosition::new(0.0, 0.0), GeoPosition::new(0.5, -0.5)],
            inventory: vec![Coin::new(cell, 1)],
            caches: vec![CacheSnapshot {
                cell,
                kind: CellKind::Standard,
                coins: vec![Coin::new(cell, 0)],
            }],
        };
        assert_round_trip(&session);
    }
}
