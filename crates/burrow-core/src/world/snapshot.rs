//! Versioned chunk snapshots
//!
//! A snapshot captures each cell's kind and component list plus the chunk's
//! spawn markers. It is a debugging and tooling hook: nothing in the tick loop
//! saves or restores chunks.

use burrow_blocks::{BlockKind, Component};
use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::chunk::{Chunk, SpawnMarker};
use crate::error::SnapshotError;

/// Current snapshot layout version
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellSnapshot {
    pub kind: BlockKind,
    pub components: Vec<Component>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkSnapshot {
    pub version: u32,
    pub position: IVec2,
    pub size: u32,
    /// Row-major cells; a malformed chunk yields fewer than `size * size`
    pub cells: Vec<CellSnapshot>,
    pub spawns: Vec<SpawnMarker>,
}

impl ChunkSnapshot {
    pub fn encode(&self) -> Result<Vec<u8>, SnapshotError> {
        bincode_next::serde::encode_to_vec(self, bincode_next::config::standard())
            .map_err(|e| SnapshotError::Encode(format!("{:?}", e)))
    }

    /// Decode and check the version
    pub fn decode(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let (snapshot, _): (ChunkSnapshot, _) =
            bincode_next::serde::decode_from_slice(bytes, bincode_next::config::standard())
                .map_err(|e| SnapshotError::Decode(format!("{:?}", e)))?;
        if snapshot.version != SNAPSHOT_VERSION {
            log::warn!(
                "[SNAPSHOT] Chunk ({}, {}) has version {}, expected {}",
                snapshot.position.x,
                snapshot.position.y,
                snapshot.version,
                SNAPSHOT_VERSION
            );
            return Err(SnapshotError::UnsupportedVersion {
                found: snapshot.version,
                expected: SNAPSHOT_VERSION,
            });
        }
        Ok(snapshot)
    }

    pub fn cell(&self, local_x: usize, local_y: usize) -> Option<&CellSnapshot> {
        let size = self.size as usize;
        if local_x >= size {
            return None;
        }
        self.cells.get(local_y * size + local_x)
    }
}

impl Chunk {
    pub fn snapshot(&self) -> ChunkSnapshot {
        let cells = self
            .iter()
            .map(|(_, _, block)| CellSnapshot {
                kind: block.kind(),
                components: block.components().cloned().collect(),
            })
            .collect();
        ChunkSnapshot {
            version: SNAPSHOT_VERSION,
            position: self.position(),
            size: self.size() as u32,
            cells,
            spawns: self.spawn_markers().to_vec(),
        }
    }
}
