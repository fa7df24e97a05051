//! # Error Types
//!
//! Configuration is validated once, at world start. After that the
//! simulation has no failure modes: every tick succeeds.

use std::path::PathBuf;

use sylvan_procedural::GenerationError;
use thiserror::Error;

/// Errors from loading or validating a world configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for a world config.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Errors from building a simulation.
#[derive(Error, Debug)]
pub enum SimulationError {
    /// Configuration problem.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Generator construction failed.
    #[error("world generation setup failed: {0}")]
    Generation(#[from] GenerationError),
}

/// Result type for configuration handling.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for simulation setup.
pub type SimulationResult<T> = Result<T, SimulationError>;
