//! Terrain chunk - a square grid of blocks plus spawn metadata

use std::sync::LazyLock;

use burrow_blocks::{Block, BlockFactory, BlockKind};
use glam::IVec2;
use serde::{Deserialize, Serialize};

/// Returned for any local coordinate outside the grid
pub(crate) static EMPTY_BLOCK: LazyLock<Block> = LazyLock::new(BlockFactory::empty);

/// Hazard NPCs that a chunk can ask the host to spawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpawnKind {
    Crawler,
    Bat,
}

/// Chunk-local spawn request, activated once when the chunk is first streamed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnMarker {
    pub kind: SpawnKind,
    /// Position inside the chunk
    pub local: IVec2,
}

/// Fixed-size square grid of blocks
///
/// Rows are stored separately so a damaged grid (short or missing row) is
/// detectable instead of silently aliasing cells.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub x: i32,
    pub y: i32,
    size: usize,
    rows: Vec<Vec<Block>>,
    spawns: Vec<SpawnMarker>,
    /// Set whenever a cell is written after generation
    pub dirty: bool,
}

impl Chunk {
    /// Create a chunk filled with empty blocks
    pub fn new(x: i32, y: i32, size: usize) -> Self {
        Self::from_fn(x, y, size, |_, _| BlockFactory::empty())
    }

    /// Create a chunk by calling `f(local_x, local_y)` for every cell, row by row
    pub fn from_fn(x: i32, y: i32, size: usize, mut f: impl FnMut(usize, usize) -> Block) -> Self {
        let rows = (0..size)
            .map(|ly| (0..size).map(|lx| f(lx, ly)).collect())
            .collect();
        Self::from_rows(x, y, size, rows)
    }

    /// Wrap pre-built rows without validating their shape
    pub fn from_rows(x: i32, y: i32, size: usize, rows: Vec<Vec<Block>>) -> Self {
        Self {
            x,
            y,
            size,
            rows,
            spawns: Vec::new(),
            dirty: false,
        }
    }

    pub fn position(&self) -> IVec2 {
        IVec2::new(self.x, self.y)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Every row present and exactly `size` cells wide
    pub fn is_well_formed(&self) -> bool {
        self.rows.len() == self.size && self.rows.iter().all(|row| row.len() == self.size)
    }

    /// Block at local coordinates, or the empty block when out of range
    pub fn get_block(&self, local_x: usize, local_y: usize) -> &Block {
        self.rows
            .get(local_y)
            .and_then(|row| row.get(local_x))
            .unwrap_or(&*EMPTY_BLOCK)
    }

    pub fn get_block_mut(&mut self, local_x: usize, local_y: usize) -> Option<&mut Block> {
        let block = self.rows.get_mut(local_y)?.get_mut(local_x)?;
        self.dirty = true;
        Some(block)
    }

    /// Replace the block in a cell, returns false when out of range
    pub fn set_block(&mut self, local_x: usize, local_y: usize, block: Block) -> bool {
        match self.rows.get_mut(local_y).and_then(|row| row.get_mut(local_x)) {
            Some(cell) => {
                *cell = block;
                self.dirty = true;
                true
            }
            None => false,
        }
    }

    /// Move a block out of its cell, leaving an empty block behind
    pub fn take_block(&mut self, local_x: usize, local_y: usize) -> Option<Block> {
        let cell = self.rows.get_mut(local_y)?.get_mut(local_x)?;
        self.dirty = true;
        Some(std::mem::replace(cell, BlockFactory::empty()))
    }

    pub fn row(&self, local_y: usize) -> Option<&[Block]> {
        self.rows.get(local_y).map(Vec::as_slice)
    }

    /// Iterate `(local_x, local_y, block)` over every present cell
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &Block)> {
        self.rows.iter().enumerate().flat_map(|(ly, row)| {
            row.iter()
                .enumerate()
                .map(move |(lx, block)| (lx, ly, block))
        })
    }

    pub fn count_kind(&self, kind: BlockKind) -> usize {
        self.iter().filter(|(_, _, b)| b.kind() == kind).count()
    }

    pub fn spawn_markers(&self) -> &[SpawnMarker] {
        &self.spawns
    }

    pub fn add_spawn_marker(&mut self, marker: SpawnMarker) {
        self.spawns.push(marker);
    }

    /// Drop a row, producing a malformed grid (used to exercise recovery paths)
    pub fn remove_row(&mut self, local_y: usize) -> Option<Vec<Block>> {
        (local_y < self.rows.len()).then(|| self.rows.remove(local_y))
    }
}
