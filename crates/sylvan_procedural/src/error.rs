//! # Generation Error Types
//!
//! Everything that can go wrong when building the generators. Once built,
//! every query is total.

use thiserror::Error;

/// Errors raised while constructing procedural generators.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    /// Block size is not a positive whole number of world units.
    #[error("invalid block size {0}: must be a whole number between 1 and 4096")]
    InvalidBlockSize(f32),

    /// Viewport dimensions are not positive and finite.
    #[error("invalid viewport {width}x{height}: dimensions must be positive")]
    InvalidViewport {
        /// Requested width.
        width: f32,
        /// Requested height.
        height: f32,
    },

    /// Viewport too narrow to split into chunks.
    #[error("viewport width {0} is too narrow to stream")]
    ViewportTooNarrow(f32),

    /// A deterministic field bound of zero.
    #[error("field bound must be at least 1")]
    ZeroBound,

    /// Noise parameters that cannot produce a smooth curve.
    #[error("invalid noise parameters: {0}")]
    InvalidNoise(String),
}

/// Result type for generator construction.
pub type GenerationResult<T> = Result<T, GenerationError>;
