//! Procedural chunk generation
//!
//! Noise picks mud hardness bands and lava pockets; a per-chunk seeded RNG
//! places point features (rocks, chests, geodes, hazard spawns). Generation is
//! a pure function of (seed, config, chunk coordinate).

use burrow_blocks::{Block, BlockFactory};
use fastnoise_lite::FastNoiseLite;
use glam::IVec2;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;

use super::bounds::WorldBounds;
use super::chunk::{Chunk, SpawnKind, SpawnMarker};
use super::worldgen_config::WorldGenConfig;

/// Source of terrain chunks for the chunk cache
pub trait ChunkGenerator {
    /// World extent; chunks outside it are never requested
    fn bounds(&self) -> WorldBounds;

    fn generate_chunk(&self, chunk_x: i32, chunk_y: i32) -> Chunk;

    /// Switch to a new seed (next level or regeneration)
    fn reseed(&mut self, seed: u64);
}

/// Noise + RNG driven level generator
///
/// Can be created with default parameters via `new(seed)` or with a full
/// configuration via `from_config(seed, config)`.
pub struct WorldGenerator {
    pub seed: u64,
    config: WorldGenConfig,
    bounds: WorldBounds,
    hardness_noise: FastNoiseLite,
    lava_noise: FastNoiseLite,
    door: IVec2,
}

impl WorldGenerator {
    pub fn new(seed: u64) -> Self {
        Self::from_config(seed, WorldGenConfig::default())
    }

    pub fn from_config(seed: u64, config: WorldGenConfig) -> Self {
        let bounds = WorldBounds::new(
            config.world.chunk_size,
            config.world.width_chunks,
            config.world.height_chunks,
        );
        let hardness_noise = config.terrain.hardness_noise.to_fastnoise(seed);
        let lava_noise = config.features.lava_noise.to_fastnoise(seed);
        let door = Self::place_door(seed, &config, &bounds);

        log::debug!(
            "[GEN] Generator seed={} world {}x{} chunks, door at ({}, {})",
            seed,
            bounds.width_chunks(),
            bounds.height_chunks(),
            door.x,
            door.y
        );

        Self {
            seed,
            config,
            bounds,
            hardness_noise,
            lava_noise,
            door,
        }
    }

    pub fn config(&self) -> &WorldGenConfig {
        &self.config
    }

    /// The single door of this level
    pub fn door_position(&self) -> IVec2 {
        self.door
    }

    fn place_door(seed: u64, config: &WorldGenConfig, bounds: &WorldBounds) -> IVec2 {
        let mut rng = Xoshiro256StarStar::seed_from_u64(seed ^ 0xD00D_D00D_D00D_D00D);
        let min_x = bounds.min_tile_x() + 1;
        let max_x = (bounds.max_tile_x() - 1).max(min_x + 1);
        let x = rng.gen_range(min_x..max_x);
        let y = bounds.height_tiles() - 1 - config.world.door_depth_from_floor as i32;
        IVec2::new(x, y.max(0))
    }

    fn chunk_seed(&self, chunk_x: i32, chunk_y: i32) -> u64 {
        self.seed
            ^ (chunk_x as i64 as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
            ^ (chunk_y as i64 as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F)
    }

    /// Base mud for a tile, before features
    fn mud_at(&self, world_x: i32, world_y: i32) -> Block {
        let terrain = &self.config.terrain;
        let hardness = self
            .hardness_noise
            .get_noise_2d(world_x as f32, world_y as f32);
        if hardness > terrain.hard_mud_threshold {
            return BlockFactory::hard_mud();
        }
        let tier = world_y / terrain.tier_depth as i32;
        BlockFactory::mud(terrain.mud_hp_base + tier * terrain.mud_hp_per_tier)
    }

    fn block_at(&self, world_x: i32, world_y: i32, rng: &mut Xoshiro256StarStar) -> Block {
        // Always draw so the RNG stream does not depend on which branch is taken
        let roll: f32 = rng.gen_range(0.0..1.0);

        if IVec2::new(world_x, world_y) == self.door {
            return BlockFactory::door();
        }

        let spawn = self.bounds.spawn_tile();
        let in_spawn_column = world_x == spawn.x
            && world_y <= spawn.y + self.config.world.spawn_clear_depth as i32;
        if in_spawn_column {
            return BlockFactory::mud(self.config.terrain.mud_hp_base);
        }

        let features = &self.config.features;
        if world_y >= features.lava_min_depth as i32
            && self.lava_noise.get_noise_2d(world_x as f32, world_y as f32)
                > features.lava_threshold
        {
            return BlockFactory::lava();
        }

        if roll < features.rock_chance {
            return BlockFactory::rock();
        }
        let roll = roll - features.rock_chance;
        if roll < features.chest_chance {
            return BlockFactory::create(burrow_blocks::BlockKind::Chest);
        }
        let roll = roll - features.chest_chance;
        if roll < features.geode_chance && world_y >= features.geode_min_depth as i32 {
            return BlockFactory::geode();
        }

        self.mud_at(world_x, world_y)
    }

    fn darkness_at(&self, world_y: i32) -> f32 {
        world_y as f32 / self.bounds.height_tiles().max(1) as f32
    }
}

impl ChunkGenerator for WorldGenerator {
    fn bounds(&self) -> WorldBounds {
        self.bounds
    }

    fn generate_chunk(&self, chunk_x: i32, chunk_y: i32) -> Chunk {
        let size = self.bounds.chunk_size() as usize;
        let origin = IVec2::new(chunk_x, chunk_y) * self.bounds.chunk_size();
        let mut rng = Xoshiro256StarStar::seed_from_u64(self.chunk_seed(chunk_x, chunk_y));

        let mut chunk = Chunk::from_fn(chunk_x, chunk_y, size, |lx, ly| {
            let world_x = origin.x + lx as i32;
            let world_y = origin.y + ly as i32;
            let block = self.block_at(world_x, world_y, &mut rng);
            BlockFactory::shaded(block, self.darkness_at(world_y))
        });

        let spawn_chance = self.config.features.hazard_spawn_chance.clamp(0.0, 1.0);
        if rng.gen_bool(spawn_chance as f64) {
            let local = IVec2::new(
                rng.gen_range(0..size as i32),
                rng.gen_range(0..size as i32),
            );
            let world = origin + local;
            let near_spawn = (world - self.bounds.spawn_tile()).abs().max_element()
                <= self.config.world.spawn_clear_depth as i32;
            if !near_spawn {
                let kind = if rng.gen_bool(0.5) {
                    SpawnKind::Crawler
                } else {
                    SpawnKind::Bat
                };
                chunk.add_spawn_marker(SpawnMarker { kind, local });
            }
        }

        log::debug!(
            "[GEN] Chunk ({}, {}) generated - {} spawn markers",
            chunk_x,
            chunk_y,
            chunk.spawn_markers().len()
        );
        chunk
    }

    fn reseed(&mut self, seed: u64) {
        *self = Self::from_config(seed, self.config.clone());
    }
}
