//! # SYLVAN Shared
//!
//! Common types used by the simulation core and its collaborators
//! (renderer, input, headless driver).
//!
//! ## CRITICAL RULE
//!
//! This crate must NEVER depend on a windowing, image or GPU crate.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod constants;
pub mod math;

pub use constants::{
    AVATAR_SIZE, BLOCK_SIZE, FOREST_DENSITY_BOUND, GROUND_HEIGHT_RATIO, MAX_FLIGHT_TICKS,
    TERRAIN_DEPTH, TICK_RATE,
};
pub use math::{Rect, Rgb, Vec2};
