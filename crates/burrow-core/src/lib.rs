//! Chunked terrain, gravity and the digging state machine for Burrow
//!
//! Everything here is single-threaded and tick-driven: one [`World::update`]
//! call streams terrain, runs gravity, advances the player and applies effects,
//! in that order.

pub mod entity;
pub mod error;
pub mod events;
pub mod simulation;
pub mod world;

pub use error::{ConfigError, SnapshotError};
pub use events::{DeathCause, EventQueue, GameEvent};
pub use world::World;
