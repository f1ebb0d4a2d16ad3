//! Terrain store - world tile coordinates over the chunk cache
//!
//! Reads above the surface return empty air, reads outside the world columns
//! or below the floor return a solid boundary block. Writes outside the world
//! are silently dropped.

use std::sync::LazyLock;

use ahash::AHashSet;
use burrow_blocks::{Block, BlockFactory};
use glam::IVec2;

use super::bounds::WorldBounds;
use super::chunk::{Chunk, EMPTY_BLOCK, SpawnMarker};
use super::chunk_cache::ChunkCache;
use super::generation::ChunkGenerator;

static BOUNDARY_BLOCK: LazyLock<Block> = LazyLock::new(BlockFactory::boundary);

/// Receives spawn markers of freshly streamed chunks
pub trait SpawnConsumer {
    fn activate(&mut self, position: IVec2, marker: &SpawnMarker);
}

/// Where a world coordinate resolves to
enum TileRef {
    Boundary,
    Air,
    Cell { chunk: IVec2, local_x: usize, local_y: usize },
}

/// World-facing façade over the chunk cache
pub struct TerrainStore {
    cache: ChunkCache,
    bounds: WorldBounds,
    pending_spawns: Vec<(IVec2, SpawnMarker)>,
    activated_spawns: AHashSet<IVec2>,
}

impl TerrainStore {
    /// Largest streaming radius honoured (5x5 chunks)
    pub const MAX_STREAM_RADIUS: i32 = 2;

    pub fn new(generator: Box<dyn ChunkGenerator>, cache_limit: usize) -> Self {
        let cache = ChunkCache::new(generator, cache_limit);
        let bounds = cache.bounds();
        Self {
            cache,
            bounds,
            pending_spawns: Vec::new(),
            activated_spawns: AHashSet::new(),
        }
    }

    pub fn bounds(&self) -> WorldBounds {
        self.bounds
    }

    pub fn cache(&self) -> &ChunkCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut ChunkCache {
        &mut self.cache
    }

    fn resolve(&self, world_x: i32, world_y: i32) -> TileRef {
        if !self.bounds.contains_column(world_x) {
            TileRef::Boundary
        } else if world_y < 0 {
            TileRef::Air
        } else if world_y >= self.bounds.height_tiles() {
            TileRef::Boundary
        } else {
            let (chunk, local_x, local_y) = self.bounds.world_to_chunk_coords(world_x, world_y);
            TileRef::Cell {
                chunk,
                local_x,
                local_y,
            }
        }
    }

    /// Resident chunk, generating it on a miss and recording its spawn markers
    fn chunk_mut(&mut self, chunk: IVec2) -> Option<&mut Chunk> {
        self.cache.get_chunk(chunk.x, chunk.y)?;
        self.collect_fresh_markers();
        self.cache.peek_mut(chunk.x, chunk.y)
    }

    fn collect_fresh_markers(&mut self) {
        for pos in self.cache.take_fresh() {
            let Some(chunk) = self.cache.peek(pos.x, pos.y) else {
                continue;
            };
            for marker in chunk.spawn_markers() {
                let world = self.bounds.chunk_to_world(
                    pos,
                    marker.local.x.max(0) as usize,
                    marker.local.y.max(0) as usize,
                );
                self.pending_spawns.push((world, *marker));
            }
        }
    }

    /// Block at world coordinates, generating its chunk if needed
    pub fn get_block(&mut self, world_x: i32, world_y: i32) -> &Block {
        match self.resolve(world_x, world_y) {
            TileRef::Boundary => &*BOUNDARY_BLOCK,
            TileRef::Air => &*EMPTY_BLOCK,
            TileRef::Cell {
                chunk,
                local_x,
                local_y,
            } => match self.chunk_mut(chunk) {
                Some(chunk) => chunk.get_block(local_x, local_y),
                None => &*BOUNDARY_BLOCK,
            },
        }
    }

    /// Mutable block at world coordinates; `None` for sentinel tiles
    pub fn get_block_mut(&mut self, world_x: i32, world_y: i32) -> Option<&mut Block> {
        match self.resolve(world_x, world_y) {
            TileRef::Cell {
                chunk,
                local_x,
                local_y,
            } => self.chunk_mut(chunk)?.get_block_mut(local_x, local_y),
            _ => None,
        }
    }

    /// Replace a block, returns false when the write was discarded
    pub fn set_block(&mut self, world_x: i32, world_y: i32, block: Block) -> bool {
        match self.resolve(world_x, world_y) {
            TileRef::Cell {
                chunk,
                local_x,
                local_y,
            } => match self.chunk_mut(chunk) {
                Some(chunk) => chunk.set_block(local_x, local_y, block),
                None => false,
            },
            _ => {
                log::trace!(
                    "[TERRAIN] Discarded write outside world at ({}, {})",
                    world_x,
                    world_y
                );
                false
            }
        }
    }

    /// Move a block out of its cell, leaving empty behind
    pub fn take_block(&mut self, world_x: i32, world_y: i32) -> Option<Block> {
        match self.resolve(world_x, world_y) {
            TileRef::Cell {
                chunk,
                local_x,
                local_y,
            } => self.chunk_mut(chunk)?.take_block(local_x, local_y),
            _ => None,
        }
    }

    /// Read without generating; `None` when the tile's chunk is not resident
    pub fn peek_block(&self, world_x: i32, world_y: i32) -> Option<&Block> {
        match self.resolve(world_x, world_y) {
            TileRef::Boundary => Some(&*BOUNDARY_BLOCK),
            TileRef::Air => Some(&*EMPTY_BLOCK),
            TileRef::Cell {
                chunk,
                local_x,
                local_y,
            } => self
                .cache
                .peek(chunk.x, chunk.y)
                .map(|chunk| chunk.get_block(local_x, local_y)),
        }
    }

    /// Keep the chunks around `player_tile` resident and deliver new spawn markers
    ///
    /// `radius` is clamped to `[0, MAX_STREAM_RADIUS]`; the neighborhood is
    /// clamped to world chunk bounds. Returns the number of chunks generated.
    pub fn stream_around(
        &mut self,
        player_tile: IVec2,
        radius: i32,
        consumer: &mut dyn SpawnConsumer,
    ) -> usize {
        let radius = radius.clamp(0, Self::MAX_STREAM_RADIUS);
        let (center, _, _) = self
            .bounds
            .world_to_chunk_coords(player_tile.x, player_tile.y.max(0));
        let center = self.bounds.clamp_chunk(center);

        let min = self.bounds.clamp_chunk(center - IVec2::splat(radius));
        let max = self.bounds.clamp_chunk(center + IVec2::splat(radius));
        let generated_before = self.cache.generated_count();
        for cy in min.y..=max.y {
            for cx in min.x..=max.x {
                self.chunk_mut(IVec2::new(cx, cy));
            }
        }
        // Chunks generated by plain reads since the last stream
        self.collect_fresh_markers();

        for (world, marker) in self.pending_spawns.drain(..) {
            if self.activated_spawns.insert(world) {
                log::debug!(
                    "[TERRAIN] Activating {:?} spawn at ({}, {})",
                    marker.kind,
                    world.x,
                    world.y
                );
                consumer.activate(world, &marker);
            }
        }

        let generated = (self.cache.generated_count() - generated_before) as usize;
        if generated > 0 {
            log::trace!(
                "[TERRAIN] Streamed {} new chunks around ({}, {})",
                generated,
                center.x,
                center.y
            );
        }
        generated
    }

    /// Drop all terrain and spawn history and switch the generator seed
    pub fn regenerate(&mut self, seed: u64) {
        log::debug!("[TERRAIN] Regenerating with seed {}", seed);
        self.cache.reseed(seed);
        self.bounds = self.cache.bounds();
        self.pending_spawns.clear();
        self.activated_spawns.clear();
    }
}
