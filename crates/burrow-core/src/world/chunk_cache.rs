//! Chunk cache - generate-on-miss storage with least-recently-used eviction

use ahash::AHashMap;
use glam::IVec2;

use super::bounds::WorldBounds;
use super::chunk::Chunk;
use super::generation::ChunkGenerator;

struct CacheEntry {
    chunk: Chunk,
    last_access: u64,
}

/// Chunks keyed by chunk coordinate, backed by a generator
///
/// Holds at most `limit` chunks. Inserting past the limit evicts exactly one
/// entry, the one with the oldest access stamp.
pub struct ChunkCache {
    generator: Box<dyn ChunkGenerator>,
    bounds: WorldBounds,
    entries: AHashMap<IVec2, CacheEntry>,
    limit: usize,
    /// Logical clock, bumped on every access
    clock: u64,
    /// Chunks generated since the last `take_fresh`
    fresh: Vec<IVec2>,
    generated: u64,
    evicted: u64,
}

impl ChunkCache {
    pub fn new(generator: Box<dyn ChunkGenerator>, limit: usize) -> Self {
        let bounds = generator.bounds();
        Self {
            generator,
            bounds,
            entries: AHashMap::new(),
            limit: limit.max(1),
            clock: 0,
            fresh: Vec::new(),
            generated: 0,
            evicted: 0,
        }
    }

    pub fn bounds(&self) -> WorldBounds {
        self.bounds
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, chunk_x: i32, chunk_y: i32) -> bool {
        self.entries.contains_key(&IVec2::new(chunk_x, chunk_y))
    }

    /// Total chunks generated over the cache's lifetime
    pub fn generated_count(&self) -> u64 {
        self.generated
    }

    /// Total chunks evicted over the cache's lifetime
    pub fn evicted_count(&self) -> u64 {
        self.evicted
    }

    /// Get a chunk, generating it on a miss
    ///
    /// Returns `None` for coordinates outside the generator's bounds; those are
    /// never generated or cached.
    pub fn get_chunk(&mut self, chunk_x: i32, chunk_y: i32) -> Option<&mut Chunk> {
        if !self.bounds.contains_chunk(chunk_x, chunk_y) {
            return None;
        }
        self.clock += 1;
        let now = self.clock;
        let pos = IVec2::new(chunk_x, chunk_y);

        if !self.entries.contains_key(&pos) {
            let chunk = self.generator.generate_chunk(chunk_x, chunk_y);
            self.generated += 1;
            self.fresh.push(pos);
            self.entries.insert(
                pos,
                CacheEntry {
                    chunk,
                    last_access: now,
                },
            );
            log::debug!(
                "[CACHE] Generated chunk ({}, {}) - {} cached",
                chunk_x,
                chunk_y,
                self.entries.len()
            );
            if self.entries.len() > self.limit {
                self.evict_oldest();
            }
        }

        let entry = self.entries.get_mut(&pos)?;
        entry.last_access = now;
        Some(&mut entry.chunk)
    }

    /// Read a resident chunk without generating it or touching its access stamp
    pub fn peek(&self, chunk_x: i32, chunk_y: i32) -> Option<&Chunk> {
        self.entries
            .get(&IVec2::new(chunk_x, chunk_y))
            .map(|entry| &entry.chunk)
    }

    /// Mutate a resident chunk without generating it or touching its access stamp
    pub fn peek_mut(&mut self, chunk_x: i32, chunk_y: i32) -> Option<&mut Chunk> {
        self.entries
            .get_mut(&IVec2::new(chunk_x, chunk_y))
            .map(|entry| &mut entry.chunk)
    }

    /// Resident chunk coordinates, sorted row by row for deterministic scans
    pub fn positions(&self) -> Vec<IVec2> {
        let mut positions: Vec<IVec2> = self.entries.keys().copied().collect();
        positions.sort_by_key(|p| (p.y, p.x));
        positions
    }

    /// Coordinates of chunks generated since the last call
    pub fn take_fresh(&mut self) -> Vec<IVec2> {
        std::mem::take(&mut self.fresh)
    }

    /// Drop every cached chunk
    pub fn clear(&mut self) {
        log::debug!("[CACHE] Cleared {} chunks", self.entries.len());
        self.entries.clear();
        self.fresh.clear();
    }

    pub fn generator(&self) -> &dyn ChunkGenerator {
        self.generator.as_ref()
    }

    /// Reseed the generator and drop all chunks built from the old seed
    pub fn reseed(&mut self, seed: u64) {
        self.generator.reseed(seed);
        self.bounds = self.generator.bounds();
        self.clear();
    }

    fn evict_oldest(&mut self) {
        // O(n) scan; ties keep the first found
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_access)
            .map(|(pos, _)| *pos);
        if let Some(pos) = oldest {
            self.entries.remove(&pos);
            self.evicted += 1;
            log::debug!("[CACHE] Evicted chunk ({}, {})", pos.x, pos.y);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burrow_blocks::{BlockFactory, BlockKind};
    use std::cell::Cell;
    use std::rc::Rc;

    /// Empty chunks, counting how often each is generated
    struct CountingGenerator {
        bounds: WorldBounds,
        calls: Rc<Cell<u32>>,
    }

    impl ChunkGenerator for CountingGenerator {
        fn bounds(&self) -> WorldBounds {
            self.bounds
        }

        fn generate_chunk(&self, chunk_x: i32, chunk_y: i32) -> Chunk {
            self.calls.set(self.calls.get() + 1);
            Chunk::new(chunk_x, chunk_y, self.bounds.chunk_size() as usize)
        }

        fn reseed(&mut self, _seed: u64) {}
    }

    fn cache(limit: usize) -> (ChunkCache, Rc<Cell<u32>>) {
        let calls = Rc::new(Cell::new(0));
        let generator = CountingGenerator {
            bounds: WorldBounds::new(4, 8, 8),
            calls: calls.clone(),
        };
        (ChunkCache::new(Box::new(generator), limit), calls)
    }

    #[test]
    fn test_repeated_get_returns_same_chunk() {
        let (mut cache, calls) = cache(16);
        cache
            .get_chunk(1, 2)
            .expect("in bounds")
            .set_block(0, 0, BlockFactory::rock());

        for _ in 0..5 {
            let chunk = cache.get_chunk(1, 2).expect("in bounds");
            assert_eq!(chunk.get_block(0, 0).kind(), BlockKind::Rock);
        }
        assert_eq!(calls.get(), 1);
        assert_eq!(cache.generated_count(), 1);
    }

    #[test]
    fn test_out_of_bounds_never_cached() {
        let (mut cache, calls) = cache(16);
        assert!(cache.get_chunk(100, 0).is_none());
        assert!(cache.get_chunk(0, -1).is_none());
        assert!(cache.get_chunk(0, 8).is_none());
        assert!(cache.is_empty());
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_eviction_removes_least_recent() {
        let (mut cache, _) = cache(3);
        cache.get_chunk(0, 0);
        cache.get_chunk(1, 0);
        cache.get_chunk(2, 0);
        // Touch (0, 0) so (1, 0) becomes the oldest
        cache.get_chunk(0, 0);

        cache.get_chunk(3, 0);
        assert_eq!(cache.len(), 3);
        assert!(cache.contains(0, 0));
        assert!(!cache.contains(1, 0));
        assert!(cache.contains(2, 0));
        assert!(cache.contains(3, 0));
        assert_eq!(cache.evicted_count(), 1);
    }

    #[test]
    fn test_size_never_exceeds_limit() {
        let (mut cache, _) = cache(5);
        for cy in 0..8 {
            for cx in -4..4 {
                cache.get_chunk(cx, cy);
                assert!(cache.len() <= 5);
            }
        }
        assert_eq!(cache.evicted_count(), 64 - 5);
    }

    #[test]
    fn test_peek_does_not_generate_or_refresh() {
        let (mut cache, calls) = cache(2);
        assert!(cache.peek(0, 0).is_none());
        assert_eq!(calls.get(), 0);

        cache.get_chunk(0, 0);
        cache.get_chunk(1, 0);
        // Peeking (0, 0) must not save it from eviction
        assert!(cache.peek(0, 0).is_some());
        cache.get_chunk(2, 0);
        assert!(!cache.contains(0, 0));
    }

    #[test]
    fn test_take_fresh_and_clear() {
        let (mut cache, calls) = cache(8);
        cache.get_chunk(0, 0);
        cache.get_chunk(0, 0);
        cache.get_chunk(-1, 3);
        assert_eq!(
            cache.take_fresh(),
            vec![IVec2::new(0, 0), IVec2::new(-1, 3)]
        );
        assert!(cache.take_fresh().is_empty());

        cache.clear();
        assert!(cache.is_empty());
        cache.get_chunk(0, 0);
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_positions_sorted() {
        let (mut cache, _) = cache(8);
        cache.get_chunk(1, 1);
        cache.get_chunk(-2, 0);
        cache.get_chunk(0, 1);
        assert_eq!(
            cache.positions(),
            vec![IVec2::new(-2, 0), IVec2::new(0, 1), IVec2::new(1, 1)]
        );
    }
}
