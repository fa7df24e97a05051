//! # SYLVAN Procedural Generation
//!
//! Deterministic, position-keyed generation for an endless side-scrolling
//! landscape.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: Same seed always produces the same world
//! 2. **Position-keyed**: Every decision is a function of `(x, seed)`, never
//!    of the order in which ranges are requested
//! 3. **Streamable**: Ranges are created ahead of the avatar and evicted
//!    behind it; regenerating an overlap never duplicates an entity
//!
//! ## Core Components
//!
//! - `Grid`: aligns coordinate ranges to the block grid
//! - `DeterministicField`: position-keyed coin flips and bounded ints
//! - `HeightField`: ground line with spike smoothing
//! - `ForestPlacer`: tree variants, trunks and crowns
//! - `ChunkStreamer`: serviced-chunk counter and retention window
//! - `StreamedWorld`: the live entities, driven by the streamer
//!
//! ## Example
//!
//! ```rust,ignore
//! use sylvan_procedural::{LandscapeConfig, StreamedWorld};
//!
//! let mut world = StreamedWorld::new(config)?;
//! world.populate_initial(420);
//!
//! // Avatar center moved to x = 801: the next chunk is generated.
//! let report = world.update(801);
//! assert_eq!(report.serviced_chunk, 2);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod error;
pub mod field;
pub mod grid;
pub mod height;
pub mod landscape;
pub mod noise;
pub mod streamer;
pub mod tree;

pub use error::{GenerationError, GenerationResult};
pub use field::{DeterministicField, FieldStrategy};
pub use grid::{AlignedRange, Grid};
pub use height::{HeightField, Viewport};
pub use landscape::{
    EntityKey, EntityKind, LandscapeConfig, LandscapeStats, ServiceReport, StreamedEntity,
    StreamedWorld, GROUND_COLOR,
};
pub use noise::{NoiseSource, SimplexNoise, TerrainNoise, WorldSeed};
pub use streamer::{ChunkRequest, ChunkStreamer, Direction, StepPolicy};
pub use tree::{ForestPlacer, LeafSlot, TreeShape, TreeSpec, TreeVariant};
