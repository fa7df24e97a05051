//! # World Configuration
//!
//! Loaded once from TOML, validated, then frozen for the lifetime of the
//! world. Every field has a default, so an empty file is a valid config.
//!
//! ```toml
//! seed = 42
//! viewport_width = 800.0
//! viewport_height = 600.0
//! field_strategy = "hashed"
//! step_policy = "single"
//! ```

use std::fs;
use std::num::NonZeroU32;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sylvan_procedural::{FieldStrategy, Grid, LandscapeConfig, StepPolicy, Viewport, WorldSeed};
use sylvan_shared::{BLOCK_SIZE, FOREST_DENSITY_BOUND, MAX_FLIGHT_TICKS, TICK_RATE};

use crate::error::{ConfigError, ConfigResult};

/// Seconds between the last float input and collision re-arming.
pub const REARM_DELAY_SECS: f32 = 0.5;

/// Raw world configuration, as written in the file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// World seed.
    pub seed: i32,
    /// Viewport width in world units.
    pub viewport_width: f32,
    /// Viewport height in world units.
    pub viewport_height: f32,
    /// Block size in world units.
    pub block_size: f32,
    /// One-in-N bound for trees and crowns.
    pub forest_density_bound: u32,
    /// Ticks of flight before the avatar starts falling.
    pub max_flight_ticks: u32,
    /// Simulation ticks per second.
    pub tick_rate: u32,
    /// How deterministic-field draws are computed.
    pub field_strategy: FieldStrategy,
    /// How many chunk boundaries one tick may service.
    pub step_policy: StepPolicy,
    /// Capacity of the world event queue.
    pub event_capacity: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            viewport_width: 800.0,
            viewport_height: 600.0,
            block_size: BLOCK_SIZE,
            forest_density_bound: FOREST_DENSITY_BOUND,
            max_flight_ticks: MAX_FLIGHT_TICKS,
            tick_rate: TICK_RATE,
            field_strategy: FieldStrategy::default(),
            step_policy: StepPolicy::default(),
            event_capacity: 1024,
        }
    }
}

impl WorldConfig {
    /// Loads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be read and `Parse` if it is not a
    /// valid world config.
    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::info!(path = %path.display(), seed = config.seed, "config loaded");
        Ok(config)
    }

    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `Parse` on malformed TOML or mistyped fields.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Checks every value and freezes the result.
    ///
    /// # Errors
    ///
    /// Returns `Invalid` naming the first offending field.
    pub fn validate(&self) -> ConfigResult<ValidatedConfig> {
        let viewport = Viewport::new(self.viewport_width, self.viewport_height)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        if viewport.width < 2.0 {
            return Err(invalid("viewport_width must be at least 2"));
        }
        Grid::new(self.block_size).map_err(|e| ConfigError::Invalid(e.to_string()))?;

        let density = NonZeroU32::new(self.forest_density_bound)
            .ok_or_else(|| invalid("forest_density_bound must be at least 1"))?;
        let max_flight_ticks = NonZeroU32::new(self.max_flight_ticks)
            .ok_or_else(|| invalid("max_flight_ticks must be at least 1"))?;
        let tick_rate = NonZeroU32::new(self.tick_rate)
            .ok_or_else(|| invalid("tick_rate must be at least 1"))?;
        if self.event_capacity == 0 {
            return Err(invalid("event_capacity must be at least 1"));
        }

        Ok(ValidatedConfig {
            landscape: LandscapeConfig {
                seed: WorldSeed::new(self.seed),
                viewport,
                block_size: self.block_size,
                density,
                field_strategy: self.field_strategy,
                step_policy: self.step_policy,
            },
            max_flight_ticks,
            tick_rate,
            event_capacity: self.event_capacity,
        })
    }
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::Invalid(message.to_owned())
}

/// A configuration that passed validation.
#[derive(Clone, Copy, Debug)]
pub struct ValidatedConfig {
    /// Generator and streaming settings.
    pub landscape: LandscapeConfig,
    /// Flight budget in ticks.
    pub max_flight_ticks: NonZeroU32,
    /// Ticks per second.
    pub tick_rate: NonZeroU32,
    /// Event queue capacity.
    pub event_capacity: usize,
}

impl ValidatedConfig {
    /// Fixed timestep in seconds.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn dt(&self) -> f32 {
        1.0 / self.tick_rate.get() as f32
    }

    /// Collision re-arm delay in ticks, at least one.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub fn rearm_delay_ticks(&self) -> u64 {
        let ticks = (REARM_DELAY_SECS * self.tick_rate.get() as f32).round() as u64;
        ticks.max(1)
    }

    /// Block size in world units.
    #[inline]
    #[must_use]
    pub const fn block_size(&self) -> f32 {
        self.landscape.block_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_default() {
        let config = WorldConfig::from_toml_str("").unwrap();
        assert_eq!(config, WorldConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file() {
        let config = WorldConfig::from_toml_str(
            r#"
            seed = -17
            viewport_width = 1024.0
            field_strategy = "replay"
            step_policy = "catch_up"
            "#,
        )
        .unwrap();
        assert_eq!(config.seed, -17);
        assert_eq!(config.viewport_width, 1024.0);
        assert_eq!(config.viewport_height, 600.0);
        assert_eq!(config.field_strategy, FieldStrategy::Replay);
        assert_eq!(config.step_policy, StepPolicy::CatchUp);
    }

    #[test]
    fn test_parse_error() {
        let err = WorldConfig::from_toml_str("seed = \"forty-two\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_invalid_values() {
        let cases = [
            WorldConfig { viewport_width: 0.0, ..WorldConfig::default() },
            WorldConfig { viewport_height: -1.0, ..WorldConfig::default() },
            WorldConfig { block_size: 12.5, ..WorldConfig::default() },
            WorldConfig { forest_density_bound: 0, ..WorldConfig::default() },
            WorldConfig { max_flight_ticks: 0, ..WorldConfig::default() },
            WorldConfig { tick_rate: 0, ..WorldConfig::default() },
            WorldConfig { event_capacity: 0, ..WorldConfig::default() },
        ];
        for config in cases {
            let err = config.validate().unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "{config:?}");
        }
    }

    #[test]
    fn test_derived_timing() {
        let validated = WorldConfig::default().validate().unwrap();
        assert_eq!(validated.rearm_delay_ticks(), 30);
        assert!((validated.dt() - 1.0 / 60.0).abs() < 1e-6);

        let slow = WorldConfig { tick_rate: 1, ..WorldConfig::default() };
        assert_eq!(slow.validate().unwrap().rearm_delay_ticks(), 1);
    }

    #[test]
    fn test_missing_file() {
        let err = WorldConfig::load("/definitely/not/here/world.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
