//! Error types for configuration and chunk snapshots
//!
//! Gameplay never fails with an error: out-of-bounds access resolves to
//! sentinel blocks and rejected transitions return `false`.

use thiserror::Error;

/// Invalid rule or world generation values
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be greater than zero (got {value})")]
    NotPositive { field: &'static str, value: f64 },

    #[error("{field} must be a probability in [0, 1] (got {value})")]
    ProbabilityOutOfRange { field: &'static str, value: f32 },

    #[error("world must be at least one chunk in each direction (got {width}x{height})")]
    EmptyWorld { width: u32, height: u32 },

    #[error("fall_speed_max ({speed}) must not exceed tile_size ({tile_size})")]
    FallTooFast { speed: f32, tile_size: f32 },

    #[error("chunk_cache_limit {limit} cannot hold the {needed} streamed chunks")]
    CacheTooSmall { limit: usize, needed: usize },

    #[error("stream_radius {radius} must be between 0 and {max}")]
    StreamRadiusOutOfRange { radius: i32, max: i32 },

    #[error("{0}")]
    Invalid(String),
}

/// Chunk snapshot encode/decode failures
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to encode chunk snapshot: {0}")]
    Encode(String),

    #[error("failed to decode chunk snapshot: {0}")]
    Decode(String),

    #[error("unsupported chunk snapshot version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
}
