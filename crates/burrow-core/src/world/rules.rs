//! Gameplay tuning constants

use serde::{Deserialize, Serialize};

use super::terrain::TerrainStore;
use crate::error::ConfigError;

/// Tick-level tuning for digging, movement, gravity and caching
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameRules {
    /// Tile edge in pixels
    pub tile_size: f32,
    /// Time between two dig hits
    pub dig_interval_ms: f32,
    /// Damage per dig hit
    pub dig_damage: i32,
    /// Duration of the step into a cleared tile
    pub move_duration_ms: f32,
    /// Initial (and maximum) countdown
    pub countdown_seconds: f32,
    /// Reset the countdown when entering a new level
    pub reset_timer_on_level: bool,
    /// Added to fall velocity every tick (pixels/tick²)
    pub gravity: f32,
    /// Terminal fall velocity (pixels/tick), at most one tile
    pub fall_speed_max: f32,
    /// Chunks kept in memory
    pub chunk_cache_limit: usize,
    /// Chunks streamed around the player in each direction, at most
    /// `TerrainStore::MAX_STREAM_RADIUS`
    pub stream_radius: i32,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            tile_size: 32.0,
            dig_interval_ms: 150.0,
            dig_damage: 1,
            move_duration_ms: 120.0,
            countdown_seconds: 60.0,
            reset_timer_on_level: false,
            gravity: 0.8,
            fall_speed_max: 12.0,
            chunk_cache_limit: 64,
            stream_radius: 1,
        }
    }
}

impl GameRules {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("tile_size", self.tile_size),
            ("dig_interval_ms", self.dig_interval_ms),
            ("move_duration_ms", self.move_duration_ms),
            ("countdown_seconds", self.countdown_seconds),
            ("gravity", self.gravity),
            ("fall_speed_max", self.fall_speed_max),
        ] {
            if !(value > 0.0) {
                return Err(ConfigError::NotPositive {
                    field,
                    value: value as f64,
                });
            }
        }
        if self.dig_damage <= 0 {
            return Err(ConfigError::NotPositive {
                field: "dig_damage",
                value: self.dig_damage as f64,
            });
        }
        if self.fall_speed_max > self.tile_size {
            return Err(ConfigError::FallTooFast {
                speed: self.fall_speed_max,
                tile_size: self.tile_size,
            });
        }
        if !(0..=TerrainStore::MAX_STREAM_RADIUS).contains(&self.stream_radius) {
            return Err(ConfigError::StreamRadiusOutOfRange {
                radius: self.stream_radius,
                max: TerrainStore::MAX_STREAM_RADIUS,
            });
        }
        let side = (2 * self.stream_radius + 1) as usize;
        if self.chunk_cache_limit < side * side {
            return Err(ConfigError::CacheTooSmall {
                limit: self.chunk_cache_limit,
                needed: side * side,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(GameRules::default().validate(), Ok(()));
    }

    #[test]
    fn test_rejects_non_positive_interval() {
        let rules = GameRules {
            dig_interval_ms: 0.0,
            ..GameRules::default()
        };
        assert_eq!(
            rules.validate(),
            Err(ConfigError::NotPositive {
                field: "dig_interval_ms",
                value: 0.0
            })
        );
    }

    #[test]
    fn test_rejects_fall_faster_than_a_tile() {
        let rules = GameRules {
            fall_speed_max: 40.0,
            ..GameRules::default()
        };
        assert!(matches!(
            rules.validate(),
            Err(ConfigError::FallTooFast { .. })
        ));
    }

    #[test]
    fn test_cache_must_hold_stream_neighborhood() {
        let rules = GameRules {
            chunk_cache_limit: 8,
            stream_radius: 1,
            ..GameRules::default()
        };
        assert_eq!(
            rules.validate(),
            Err(ConfigError::CacheTooSmall {
                limit: 8,
                needed: 9
            })
        );
    }

    #[test]
    fn test_stream_radius_outside_streamed_range() {
        for radius in [-1, TerrainStore::MAX_STREAM_RADIUS + 1, i32::MAX / 2 + 1] {
            let rules = GameRules {
                stream_radius: radius,
                chunk_cache_limit: usize::MAX,
                ..GameRules::default()
            };
            assert_eq!(
                rules.validate(),
                Err(ConfigError::StreamRadiusOutOfRange {
                    radius,
                    max: TerrainStore::MAX_STREAM_RADIUS
                })
            );
        }

        let rules = GameRules {
            stream_radius: TerrainStore::MAX_STREAM_RADIUS,
            chunk_cache_limit: 25,
            ..GameRules::default()
        };
        assert_eq!(rules.validate(), Ok(()));
    }

    #[test]
    fn test_nan_is_rejected() {
        let rules = GameRules {
            gravity: f32::NAN,
            ..GameRules::default()
        };
        assert!(rules.validate().is_err());
    }
}
