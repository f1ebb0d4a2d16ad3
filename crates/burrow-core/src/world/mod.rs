//! World management - chunks, streaming, gravity and digging

mod bounds;
mod chunk;
mod chunk_cache;
mod digging_system;
pub mod generation;
mod gravity_system;
pub mod rules;
pub mod snapshot;
mod terrain;
#[allow(clippy::module_inception)]
mod world;
pub mod worldgen_config;

pub use bounds::WorldBounds;
pub use chunk::{Chunk, SpawnKind, SpawnMarker};
pub use chunk_cache::ChunkCache;
pub use digging_system::DiggingSystem;
pub use generation::{ChunkGenerator, WorldGenerator};
pub use gravity_system::{GravityReport, GravitySystem, PlayerFall};
pub use rules::GameRules;
pub use snapshot::{CellSnapshot, ChunkSnapshot, SNAPSHOT_VERSION};
pub use terrain::{SpawnConsumer, TerrainStore};
pub use world::World;
pub use worldgen_config::{
    FeatureParams, FractalTypeConfig, NoiseLayerConfig, NoiseTypeConfig, TerrainParams,
    WorldGenConfig, WorldParams,
};
