//! Game configuration with layered loading
//!
//! Configuration is loaded from multiple sources (lowest to highest priority):
//! 1. Compiled defaults
//! 2. `burrow.ron` file (if exists), or an explicit file path
//! 3. Environment variables prefixed with `BURROW_`
//!
//! Example environment variable: `BURROW_RULES__DIG_INTERVAL_MS=120`

use std::path::Path;

use anyhow::{Context, Result, bail};
use burrow_core::world::{GameRules, WorldGenConfig};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

/// Full configuration of a headless session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Base world seed
    #[serde(default = "default_seed")]
    pub seed: u64,

    #[serde(default)]
    pub rules: GameRules,

    #[serde(default)]
    pub worldgen: WorldGenConfig,

    #[serde(default)]
    pub host: HostConfig,
}

fn default_seed() -> u64 {
    42
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            rules: GameRules::default(),
            worldgen: WorldGenConfig::default(),
            host: HostConfig::default(),
        }
    }
}

/// Host loop settings, standing in for the HUD and overlay collaborators
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Fixed tick length in milliseconds
    pub tick_ms: f32,
    /// Delay between a death and the automatic restart
    pub restart_delay_ms: f32,
    /// Delay between entering a door and completing the transition
    pub transition_delay_ms: f32,
    /// Ticks to run when no count is given on the command line
    pub max_ticks: u64,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            tick_ms: 16.0,
            restart_delay_ms: 1500.0,
            transition_delay_ms: 1000.0,
            max_ticks: 3600,
        }
    }
}

impl GameConfig {
    /// Load configuration with layered priority:
    /// 1. Compiled defaults (lowest priority)
    /// 2. `burrow.ron` file (if exists)
    /// 3. Environment variables prefixed with `BURROW_` (highest priority)
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Like [`GameConfig::load`], but an explicit file must exist
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => File::from(path).format(FileFormat::Ron).required(true),
            None => File::with_name("burrow")
                .format(FileFormat::Ron)
                .required(false),
        };

        let builder = Config::builder()
            // Layer 1: Compiled defaults
            .set_default("seed", default_seed() as i64)?
            .set_default("host.tick_ms", 16.0)?
            .set_default("host.restart_delay_ms", 1500.0)?
            .set_default("host.transition_delay_ms", 1000.0)?
            .set_default("host.max_ticks", 3600_i64)?
            // Layer 2: Config file
            .add_source(file)
            // Layer 3: Environment variables (BURROW_SEED, BURROW_HOST__TICK_MS, etc.)
            .add_source(Environment::with_prefix("BURROW").separator("__"));

        let config: GameConfig = builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.rules.validate().context("Invalid game rules")?;
        self.worldgen
            .validate()
            .context("Invalid world generation config")?;
        if !(self.host.tick_ms > 0.0) {
            bail!("host.tick_ms must be positive (got {})", self.host.tick_ms);
        }
        if self.host.restart_delay_ms < 0.0 || self.host.transition_delay_ms < 0.0 {
            bail!("host delays must not be negative");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".ron")
            .tempfile()
            .expect("temp file");
        file.write_all(contents.as_bytes()).expect("write config");
        file
    }

    #[test]
    fn test_default_config() {
        let config = GameConfig::default();
        assert_eq!(config.seed, 42);
        assert_eq!(config.host.tick_ms, 16.0);
        assert_eq!(config.rules, GameRules::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_config_with_defaults() {
        // Should load defaults when no config file exists
        let config = GameConfig::load().expect("Failed to load config");
        assert_eq!(config.host.restart_delay_ms, 1500.0);
        assert_eq!(config.rules.dig_interval_ms, 150.0);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let file = write_config(
            r#"(
                seed: 7,
                rules: (dig_interval_ms: 200.0, countdown_seconds: 30.0),
                host: (tick_ms: 20.0),
            )"#,
        );
        let config = GameConfig::load_from(Some(file.path())).expect("load");
        assert_eq!(config.seed, 7);
        assert_eq!(config.rules.dig_interval_ms, 200.0);
        assert_eq!(config.rules.countdown_seconds, 30.0);
        // Untouched values keep their defaults
        assert_eq!(config.rules.tile_size, 32.0);
        assert_eq!(config.host.tick_ms, 20.0);
        assert_eq!(config.host.max_ticks, 3600);
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("missing.ron");
        assert!(GameConfig::load_from(Some(&path)).is_err());
    }

    #[test]
    fn test_invalid_rules_are_rejected() {
        let file = write_config("(rules: (fall_speed_max: 64.0))");
        let err = GameConfig::load_from(Some(file.path())).expect_err("too fast");
        assert!(format!("{:#}", err).contains("Invalid game rules"));
    }

    #[test]
    fn test_huge_stream_radius_is_rejected() {
        let file = write_config("(rules: (stream_radius: 1073741824))");
        let err = GameConfig::load_from(Some(file.path())).expect_err("radius too large");
        assert!(format!("{:#}", err).contains("stream_radius"));
    }
}
