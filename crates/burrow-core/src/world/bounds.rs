//! World extent in chunks and tiles, and world/chunk coordinate conversion

use glam::IVec2;

/// Extent of a generated world
///
/// Chunk columns are centred on x = 0: `[-width/2, width - width/2)`.
/// Chunk rows start at the surface: `[0, height)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorldBounds {
    chunk_size: i32,
    width_chunks: i32,
    height_chunks: i32,
}

impl WorldBounds {
    pub fn new(chunk_size: u32, width_chunks: u32, height_chunks: u32) -> Self {
        Self {
            chunk_size: chunk_size.max(1) as i32,
            width_chunks: width_chunks as i32,
            height_chunks: height_chunks as i32,
        }
    }

    pub fn chunk_size(&self) -> i32 {
        self.chunk_size
    }

    pub fn width_chunks(&self) -> i32 {
        self.width_chunks
    }

    pub fn height_chunks(&self) -> i32 {
        self.height_chunks
    }

    pub fn width_tiles(&self) -> i32 {
        self.width_chunks * self.chunk_size
    }

    pub fn height_tiles(&self) -> i32 {
        self.height_chunks * self.chunk_size
    }

    /// Leftmost chunk column (inclusive)
    pub fn min_chunk_x(&self) -> i32 {
        -(self.width_chunks / 2)
    }

    /// Rightmost chunk column (inclusive)
    pub fn max_chunk_x(&self) -> i32 {
        self.min_chunk_x() + self.width_chunks - 1
    }

    /// Leftmost tile column (inclusive)
    pub fn min_tile_x(&self) -> i32 {
        self.min_chunk_x() * self.chunk_size
    }

    /// Rightmost tile column (exclusive)
    pub fn max_tile_x(&self) -> i32 {
        self.min_tile_x() + self.width_tiles()
    }

    pub fn contains_chunk(&self, chunk_x: i32, chunk_y: i32) -> bool {
        (self.min_chunk_x()..=self.max_chunk_x()).contains(&chunk_x)
            && (0..self.height_chunks).contains(&chunk_y)
    }

    pub fn contains_column(&self, world_x: i32) -> bool {
        (self.min_tile_x()..self.max_tile_x()).contains(&world_x)
    }

    pub fn contains_tile(&self, world_x: i32, world_y: i32) -> bool {
        self.contains_column(world_x) && (0..self.height_tiles()).contains(&world_y)
    }

    /// Convert world coordinates to chunk coordinates + local offset
    pub fn world_to_chunk_coords(&self, world_x: i32, world_y: i32) -> (IVec2, usize, usize) {
        let chunk_x = world_x.div_euclid(self.chunk_size);
        let chunk_y = world_y.div_euclid(self.chunk_size);
        let local_x = world_x.rem_euclid(self.chunk_size) as usize;
        let local_y = world_y.rem_euclid(self.chunk_size) as usize;
        (IVec2::new(chunk_x, chunk_y), local_x, local_y)
    }

    pub fn chunk_to_world(&self, chunk: IVec2, local_x: usize, local_y: usize) -> IVec2 {
        IVec2::new(
            chunk.x * self.chunk_size + local_x as i32,
            chunk.y * self.chunk_size + local_y as i32,
        )
    }

    /// Clamp a chunk coordinate into the world
    pub fn clamp_chunk(&self, chunk: IVec2) -> IVec2 {
        IVec2::new(
            chunk.x.clamp(self.min_chunk_x(), self.max_chunk_x()),
            chunk.y.clamp(0, (self.height_chunks - 1).max(0)),
        )
    }

    /// Where the player starts: standing on the surface above column 0
    pub fn spawn_tile(&self) -> IVec2 {
        IVec2::new(0, -1)
    }
}
