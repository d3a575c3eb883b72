use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use geocoin_core::GeoPosition;
use geocoin_system_generation::Config;
use geocoin_world::WorldSettings;

/// Loads world settings from the optional configuration file.
///
/// A missing file is the normal case and yields the default settings; a file
/// that exists but fails to parse or validate is an error rather than a
/// silent fallback.
pub(crate) fn load(path: &Path) -> Result<WorldSettings> {
    if !path.exists() {
        return Ok(WorldSettings::default());
    }

    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read world config at {}", path.display()))?;
    parse(&contents).with_context(|| format!("invalid world config at {}", path.display()))
}

fn parse(contents: &str) -> Result<WorldSettings> {
    let file: ConfigFile =
        toml::from_str(contents).context("failed to parse world config toml contents")?;
    let defaults = WorldSettings::default();
    let generation = defaults.generation();

    let tile_size = file
        .world
        .tile_size_degrees
        .unwrap_or(defaults.tile_size_degrees());
    if !tile_size.is_finite() || tile_size <= 0.0 {
        bail!("tile_size_degrees must be a positive finite number, got {tile_size}");
    }

    let spawn_probability = file
        .generation
        .spawn_probability
        .unwrap_or(generation.spawn_probability());
    if !(0.0..=1.0).contains(&spawn_probability) {
        bail!("spawn_probability must lie within 0.0..=1.0, got {spawn_probability}");
    }

    Ok(WorldSettings::new(
        tile_size,
        GeoPosition::new(
            file.world.origin_lat.unwrap_or(defaults.origin().lat()),
            file.world.origin_lng.unwrap_or(defaults.origin().lng()),
        ),
        file.world
            .visibility_radius
            .unwrap_or(defaults.visibility_radius()),
        Config::new(
            file.generation.world_seed.unwrap_or(generation.world_seed()),
            spawn_probability,
            file.generation
                .max_coins_per_cache
                .unwrap_or(generation.max_coins_per_cache()),
        ),
    ))
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    world: WorldSection,
    generation: GenerationSection,
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
struct WorldSection {
    tile_size_degrees: Option<f64>,
    origin_lat: Option<f64>,
    origin_lng: Option<f64>,
    visibility_radius: Option<u8>,
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
struct GenerationSection {
    world_seed: Option<u64>,
    spawn_probability: Option<f64>,
    max_coins_per_cache: Option<u32>,
}
