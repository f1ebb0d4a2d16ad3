//! World generation configuration - serializable parameters for level generation
//!
//! The seed is NOT part of the config: same config + different seed = different
//! level. Configs round-trip through RON so presets can be kept as files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Complete world generation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldGenConfig {
    /// Display name for this configuration
    pub name: String,

    /// World extent and fixed landmarks
    pub world: WorldParams,

    /// Mud hardness bands
    pub terrain: TerrainParams,

    /// Lava pockets and point features
    pub features: FeatureParams,
}

/// World extent and fixed landmarks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldParams {
    /// Side length of a chunk in tiles (default: 32)
    pub chunk_size: u32,
    /// World width in chunks, centred on x = 0 (default: 4)
    pub width_chunks: u32,
    /// World depth in chunks (default: 8)
    pub height_chunks: u32,
    /// Rows below the spawn tile kept free of hazards (default: 6)
    pub spawn_clear_depth: u32,
    /// Distance of the door above the world floor (default: 2)
    pub door_depth_from_floor: u32,
}

/// Mud generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainParams {
    /// Noise used to pick hard mud bands
    pub hardness_noise: NoiseLayerConfig,
    /// Noise value above which mud becomes hard mud (default: 0.35)
    pub hard_mud_threshold: f32,
    /// Hit points of surface mud (default: 5)
    pub mud_hp_base: i32,
    /// Extra hit points per depth tier (default: 1)
    pub mud_hp_per_tier: i32,
    /// Rows per depth tier (default: 64)
    pub tier_depth: u32,
}

/// Hazards, loot and spawns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureParams {
    /// Noise used to carve lava pockets
    pub lava_noise: NoiseLayerConfig,
    /// Noise value above which a tile becomes lava (default: 0.6)
    pub lava_threshold: f32,
    /// No lava above this row (default: 24)
    pub lava_min_depth: u32,
    /// Per-tile chance of a rock (default: 0.03)
    pub rock_chance: f32,
    /// Per-tile chance of a chest (default: 0.004)
    pub chest_chance: f32,
    /// Per-tile chance of a geode (default: 0.006)
    pub geode_chance: f32,
    /// No geodes above this row (default: 16)
    pub geode_min_depth: u32,
    /// Per-chunk chance of a hazard spawn marker (default: 0.25)
    pub hazard_spawn_chance: f32,
}

/// Single noise layer configuration (maps onto a FastNoiseLite instance)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoiseLayerConfig {
    /// Offset added to world seed for this layer
    pub seed_offset: i32,
    /// Noise algorithm type
    pub noise_type: NoiseTypeConfig,
    /// Base frequency (lower = larger features)
    pub frequency: f32,
    /// Fractal combination type
    pub fractal_type: FractalTypeConfig,
    /// Number of fractal octaves (1-8)
    pub octaves: u8,
    /// Frequency multiplier per octave (default: 2.0)
    pub lacunarity: f32,
    /// Amplitude multiplier per octave / persistence (default: 0.5)
    pub gain: f32,
}

/// Noise algorithm types (maps to FastNoiseLite::NoiseType)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoiseTypeConfig {
    OpenSimplex2,
    OpenSimplex2S,
    Cellular,
    Perlin,
    ValueCubic,
    Value,
}

/// Fractal types (maps to FastNoiseLite::FractalType)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FractalTypeConfig {
    None,
    FBm,
    Ridged,
    PingPong,
}

impl Default for WorldGenConfig {
    fn default() -> Self {
        Self {
            name: "Default".to_string(),
            world: WorldParams::default(),
            terrain: TerrainParams::default(),
            features: FeatureParams::default(),
        }
    }
}

impl Default for WorldParams {
    fn default() -> Self {
        Self {
            chunk_size: 32,
            width_chunks: 4,
            height_chunks: 8,
            spawn_clear_depth: 6,
            door_depth_from_floor: 2,
        }
    }
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            hardness_noise: NoiseLayerConfig {
                seed_offset: 1,
                frequency: 0.04,
                ..NoiseLayerConfig::default()
            },
            hard_mud_threshold: 0.35,
            mud_hp_base: 5,
            mud_hp_per_tier: 1,
            tier_depth: 64,
        }
    }
}

impl Default for FeatureParams {
    fn default() -> Self {
        Self {
            lava_noise: NoiseLayerConfig {
                seed_offset: 2,
                noise_type: NoiseTypeConfig::Cellular,
                frequency: 0.06,
                fractal_type: FractalTypeConfig::None,
                octaves: 1,
                ..NoiseLayerConfig::default()
            },
            lava_threshold: 0.6,
            lava_min_depth: 24,
            rock_chance: 0.03,
            chest_chance: 0.004,
            geode_chance: 0.006,
            geode_min_depth: 16,
            hazard_spawn_chance: 0.25,
        }
    }
}

impl Default for NoiseLayerConfig {
    fn default() -> Self {
        Self {
            seed_offset: 0,
            noise_type: NoiseTypeConfig::OpenSimplex2,
            frequency: 0.05,
            fractal_type: FractalTypeConfig::FBm,
            octaves: 3,
            lacunarity: 2.0,
            gain: 0.5,
        }
    }
}

impl NoiseTypeConfig {
    /// Convert to fastnoise_lite::NoiseType
    pub fn to_fastnoise(&self) -> fastnoise_lite::NoiseType {
        match self {
            NoiseTypeConfig::OpenSimplex2 => fastnoise_lite::NoiseType::OpenSimplex2,
            NoiseTypeConfig::OpenSimplex2S => fastnoise_lite::NoiseType::OpenSimplex2S,
            NoiseTypeConfig::Cellular => fastnoise_lite::NoiseType::Cellular,
            NoiseTypeConfig::Perlin => fastnoise_lite::NoiseType::Perlin,
            NoiseTypeConfig::ValueCubic => fastnoise_lite::NoiseType::ValueCubic,
            NoiseTypeConfig::Value => fastnoise_lite::NoiseType::Value,
        }
    }
}

impl FractalTypeConfig {
    /// Convert to fastnoise_lite::FractalType
    pub fn to_fastnoise(&self) -> fastnoise_lite::FractalType {
        match self {
            FractalTypeConfig::None => fastnoise_lite::FractalType::None,
            FractalTypeConfig::FBm => fastnoise_lite::FractalType::FBm,
            FractalTypeConfig::Ridged => fastnoise_lite::FractalType::Ridged,
            FractalTypeConfig::PingPong => fastnoise_lite::FractalType::PingPong,
        }
    }
}

impl NoiseLayerConfig {
    /// Create a FastNoiseLite instance from this config
    pub fn to_fastnoise(&self, base_seed: u64) -> fastnoise_lite::FastNoiseLite {
        let mut noise = fastnoise_lite::FastNoiseLite::with_seed(
            (base_seed as i32).wrapping_add(self.seed_offset),
        );
        noise.set_noise_type(Some(self.noise_type.to_fastnoise()));
        noise.set_frequency(Some(self.frequency));
        noise.set_fractal_type(Some(self.fractal_type.to_fastnoise()));
        noise.set_fractal_octaves(Some(self.octaves as i32));
        noise.set_fractal_lacunarity(Some(self.lacunarity));
        noise.set_fractal_gain(Some(self.gain));
        noise
    }
}

impl WorldGenConfig {
    /// Serialize to a pretty-printed RON preset
    pub fn to_ron(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .context("Failed to serialize world generation config")
    }

    /// Parse a RON preset
    pub fn from_ron(source: &str) -> Result<Self> {
        ron::from_str(source).context("Failed to parse world generation config")
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let world = &self.world;
        if world.chunk_size == 0 {
            return Err(ConfigError::NotPositive {
                field: "world.chunk_size",
                value: 0.0,
            });
        }
        if world.width_chunks == 0 || world.height_chunks == 0 {
            return Err(ConfigError::EmptyWorld {
                width: world.width_chunks,
                height: world.height_chunks,
            });
        }
        let height_tiles = world.chunk_size * world.height_chunks;
        if world.door_depth_from_floor >= height_tiles {
            return Err(ConfigError::Invalid(format!(
                "door_depth_from_floor {} lies outside a world {} tiles deep",
                world.door_depth_from_floor, height_tiles
            )));
        }
        if self.terrain.mud_hp_base <= 0 {
            return Err(ConfigError::NotPositive {
                field: "terrain.mud_hp_base",
                value: self.terrain.mud_hp_base as f64,
            });
        }
        if self.terrain.tier_depth == 0 {
            return Err(ConfigError::NotPositive {
                field: "terrain.tier_depth",
                value: 0.0,
            });
        }

        let features = &self.features;
        for (field, value) in [
            ("features.rock_chance", features.rock_chance),
            ("features.chest_chance", features.chest_chance),
            ("features.geode_chance", features.geode_chance),
            ("features.hazard_spawn_chance", features.hazard_spawn_chance),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::ProbabilityOutOfRange { field, value });
            }
        }
        let total = features.rock_chance + features.chest_chance + features.geode_chance;
        if total > 1.0 {
            return Err(ConfigError::ProbabilityOutOfRange {
                field: "features.rock_chance + chest_chance + geode_chance",
                value: total,
            });
        }
        Ok(())
    }
}
