//! # World Constants
//!
//! Defaults for a freshly started world. Everything here can be overridden
//! through `WorldConfig` except the ratios that define the look of the world.

// =============================================================================
// GRID
// =============================================================================

/// Side length of one block, in world units.
pub const BLOCK_SIZE: f32 = 30.0;

/// Number of blocks stacked in one ground column.
pub const TERRAIN_DEPTH: u32 = 20;

/// Fraction of the viewport height where the ground line rests before noise.
pub const GROUND_HEIGHT_RATIO: f32 = 0.75;

// =============================================================================
// FOREST
// =============================================================================

/// One-in-N odds that a block-aligned x grows a tree.
///
/// The same bound gates leaf density, so trees and dense crowns correlate.
pub const FOREST_DENSITY_BOUND: u32 = 15;

// =============================================================================
// AVATAR
// =============================================================================

/// Avatar edge length.
pub const AVATAR_SIZE: f32 = 30.0;

/// Ticks of continuous flight before the avatar is forced to fall.
pub const MAX_FLIGHT_TICKS: u32 = 100;

/// Simulation ticks per second.
pub const TICK_RATE: u32 = 60;
