//! # Burrow - headless host for the digging game
//!
//! Loads layered configuration, drives a [`World`](burrow_core::world::World)
//! at a fixed tick rate from an input script and plays the part of the HUD,
//! overlay and restart collaborators.

pub mod config;
pub mod headless;

// Re-export core modules for convenience
pub use burrow_core::entity;
pub use burrow_core::events;
pub use burrow_core::world;

pub use config::{GameConfig, HostConfig};
pub use headless::{HeadlessRunner, InputScript, RunSummary, ScriptCommand};

/// Common imports for hosts and tools
pub mod prelude {
    pub use burrow_blocks::{Block, BlockFactory, BlockKind};
    pub use burrow_core::world::{GameRules, TerrainStore, World, WorldGenConfig};
    pub use burrow_core::{EventQueue, GameEvent};
    pub use glam::{IVec2, Vec2};
}
