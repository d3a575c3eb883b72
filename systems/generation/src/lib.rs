#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic cache generation keyed on grid cell identity.
//!
//! The generator answers exactly two questions about a cell: does it host a
//! cache, and how many coins is that cache born with. Both answers are pure
//! functions of the world seed and the cell index, so they replay identically
//! across calls, process restarts and save/load cycles. The generator itself
//! is never persisted; only its outputs, captured once in extrinsic cache
//! state, are.

use geocoin_core::{CellIndex, RNG_STREAM_CACHE_SPAWN, RNG_STREAM_COIN_COUNT};
use sha2::{Digest, Sha256};

/// World seed applied when no explicit seed is configured.
pub const DEFAULT_WORLD_SEED: u64 = 0x6a09_e667_f3bc_c908;

/// Fraction of cells that host a cache under the default configuration.
pub const DEFAULT_SPAWN_PROBABILITY: f64 = 0.1;

/// Exclusive upper bound on generated coin counts under the default
/// configuration.
pub const DEFAULT_MAX_COINS_PER_CACHE: u32 = 6;

/// Configuration parameters required to construct the generator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    world_seed: u64,
    spawn_probability: f64,
    max_coins_per_cache: u32,
}

impl Config {
    /// Creates a new configuration from a seed, spawn rate and coin cap.
    #[must_use]
    pub const fn new(world_seed: u64, spawn_probability: f64, max_coins_per_cache: u32) -> Self {
        Self {
            world_seed,
            spawn_probability,
            max_coins_per_cache,
        }
    }

    /// Seed that distinguishes one generated world from another.
    #[must_use]
    pub const fn world_seed(&self) -> u64 {
        self.world_seed
    }

    /// Probability in `[0, 1]` that a given cell hosts a cache.
    #[must_use]
    pub const fn spawn_probability(&self) -> f64 {
        self.spawn_probability
    }

    /// Exclusive upper bound on a cache's initial coin count.
    #[must_use]
    pub const fn max_coins_per_cache(&self) -> u32 {
        self.max_coins_per_cache
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(
            DEFAULT_WORLD_SEED,
            DEFAULT_SPAWN_PROBABILITY,
            DEFAULT_MAX_COINS_PER_CACHE,
        )
    }
}

/// Pure system that decides cache presence and initial coin counts.
#[derive(Clone, Copy, Debug, Default)]
pub struct Generator {
    config: Config,
}

impl Generator {
    /// Creates a new generator using the supplied configuration.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    /// Configuration the generator was constructed with.
    #[must_use]
    pub const fn config(&self) -> Config {
        self.config
    }

    /// Draws a reproducible value in `[0, 1)` for the cell under a role tag.
    ///
    /// Distinct role tags hash into independent streams, so the spawn
    /// decision and the coin-count draw for the same cell do not correlate.
    #[must_use]
    pub fn unit_draw(&self, cell: CellIndex, role: &str) -> f64 {
        let base = derive_cell_seed(self.config.world_seed, cell);
        let labeled = derive_labeled_seed(base, role);
        SplitMix64::new(labeled).next_unit()
    }

    /// Reports whether the provided cell hosts a cache.
    #[must_use]
    pub fn should_spawn_cache(&self, cell: CellIndex) -> bool {
        self.unit_draw(cell, RNG_STREAM_CACHE_SPAWN) < self.config.spawn_probability
    }

    /// Number of coins a cache at the provided cell is born with.
    ///
    /// The result lies in `0..max_coins_per_cache`; a spawn-positive cell may
    /// legitimately start empty.
    #[must_use]
    pub fn initial_coin_count(&self, cell: CellIndex) -> u32 {
        let scaled = self.unit_draw(cell, RNG_STREAM_COIN_COUNT)
            * f64::from(self.config.max_coins_per_cache);
        scaled.floor() as u32
    }
}

fn derive_cell_seed(world_seed: u64, cell: CellIndex) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(world_seed.to_le_bytes());
    hasher.update(cell.i().to_le_bytes());
    hasher.update(cell.j().to_le_bytes());
    finalize_seed(hasher)
}

fn derive_labeled_seed(base: u64, label: &str) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(base.to_le_bytes());
    hasher.update(label.as_bytes());
    finalize_seed(hasher)
}

fn finalize_seed(hasher: Sha256) -> u64 {
    let digest = hasher.finalize();
    let bytes: [u8; 8] = digest[0..8].try_into().expect("sha256 digest slice length");
    u64::from_le_bytes(bytes)
}

#[derive(Debug)]
struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    fn new(seed: u64) -> Self {
        let seed = if seed == 0 { 0x9e37_79b9_7f4a_7c15 } else { seed };
        Self { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^ (z >> 31)
    }

    fn next_unit(&mut self) -> f64 {
        const SCALE: f64 = 1.0 / ((1u64 << 53) as f64);
        let value = self.next_u64() >> 11;
        (value as f64) * SCALE
    }
}

#[cfg(test)]
mod tests {
    use super::{Config, Generator, DEFAULT_MAX_COINS_PER_CACHE, DEFAULT_SPAWN_PROBABILITY};
    use geocoin_core::{CellIndex, Neighborhood, RNG_STREAM_CACHE_SPAWN, RNG_STREAM_COIN_COUNT};

    fn sample_cells() -> Vec<CellIndex> {
        Neighborhood::new(CellIndex::new(0, 0), 8).iter().collect()
    }

    #[test]
    fn draws_replay_across_generator_instances() {
        let first = Generator::new(Config::default());
        let second = Generator::new(Config::default());

        for cell in sample_cells() {
            assert_eq!(
                first.unit_draw(cell, RNG_STREAM_CACHE_SPAWN).to_bits(),
                second.unit_draw(cell, RNG_STREAM_CACHE_SPAWN).to_bits(),
            );
            assert_eq!(
                first.initial_coin_count(cell),
                second.initial_coin_count(cell)
            );
            assert_eq!(first.should_spawn_cache(cell), second.should_spawn_cache(cell));
        }
    }

    #[test]
    fn draws_stay_in_the_unit_interval() {
        let generator = Generator::new(Config::default());
        for cell in sample_cells() {
            for role in [RNG_STREAM_CACHE_SPAWN, RNG_STREAM_COIN_COUNT] {
                let value = generator.unit_draw(cell, role);
                assert!((0.0..1.0).contains(&value), "draw out of range: {value}");
            }
        }
    }

    #[test]
    fn role_tags_decorrelate_the_streams() {
        let generator = Generator::new(Config::default());
        let differing = sample_cells()
            .into_iter()
            .filter(|cell| {
                generator.unit_draw(*cell, RNG_STREAM_CACHE_SPAWN)
                    != generator.unit_draw(*cell, RNG_STREAM_COIN_COUNT)
            })
            .count();
        assert!(differing > 200, "streams should disagree almost everywhere");
    }

    #[test]
    fn distinct_seeds_generate_distinct_worlds() {
        let base = Generator::new(Config::default());
        let shifted = Generator::new(Config::new(
            0xdead_beef_cafe_f00d,
            DEFAULT_SPAWN_PROBABILITY,
            DEFAULT_MAX_COINS_PER_CACHE,
        ));

        let disagreements = sample_cells()
            .into_iter()
            .filter(|cell| {
                base.unit_draw(*cell, RNG_STREAM_CACHE_SPAWN)
                    != shifted.unit_draw(*cell, RNG_STREAM_CACHE_SPAWN)
            })
            .count();
        assert!(disagreements > 200);
    }

    #[test]
    fn spawn_rate_tracks_the_configured_probability() {
        let generator = Generator::new(Config::default());
        let cells: Vec<CellIndex> = Neighborhood::new(CellIndex::new(0, 0), 50).iter().collect();

        let spawned = cells
            .iter()
            .filter(|cell| generator.should_spawn_cache(**cell))
            .count();
        let rate = spawned as f64 / cells.len() as f64;

        assert!(rate > 0.05, "rate {rate} collapsed below expectation");
        assert!(rate < 0.2, "rate {rate} ballooned above expectation");
    }

    #[test]
    fn zero_probability_spawns_nothing() {
        let generator = Generator::new(Config::new(1, 0.0, DEFAULT_MAX_COINS_PER_CACHE));
        assert!(sample_cells()
            .into_iter()
            .all(|cell| !generator.should_spawn_cache(cell)));
    }

    #[test]
    fn unit_probability_spawns_everywhere() {
        let generator = Generator::new(Config::new(1, 1.0, DEFAULT_MAX_COINS_PER_CACHE));
        assert!(sample_cells()
            .into_iter()
            .all(|cell| generator.should_spawn_cache(cell)));
    }

    #[test]
    fn coin_counts_respect_the_configured_cap() {
        let generator = Generator::new(Config::default());
        for cell in Neighborhood::new(CellIndex::new(0, 0), 30).iter() {
            assert!(generator.initial_coin_count(cell) < DEFAULT_MAX_COINS_PER_CACHE);
        }
    }

    #[test]
    fn coin_counts_use_the_full_range() {
        let generator = Generator::new(Config::default());
        let mut seen = [false; DEFAULT_MAX_COINS_PER_CACHE as usize];
        for cell in Neighborhood::new(CellIndex::new(0, 0), 30).iter() {
            seen[generator.initial_coin_count(cell) as usize] = true;
        }
        assert!(seen.iter().all(|observed| *observed));
    }

    #[test]
    fn negative_indices_draw_like_any_other_cell() {
        let generator = Generator::new(Config::default());
        let mirrored = [
            CellIndex::new(-1, -1),
            CellIndex::new(1, 1),
            CellIndex::new(-1, 1),
            CellIndex::new(1, -1),
        ];

        let draws: Vec<f64> = mirrored
            .iter()
            .map(|cell| generator.unit_draw(*cell, RNG_STREAM_CACHE_SPAWN))
            .collect();

        for value in &draws {
            assert!((0.0..1.0).contains(value));
        }
        let mut bits: Vec<u64> = draws.iter().map(|value| value.to_bits()).collect();
        bits.sort_unstable();
        bits.dedup();
        assert_eq!(bits.len(), draws.len(), "sign must participate in hashing");
    }
}
