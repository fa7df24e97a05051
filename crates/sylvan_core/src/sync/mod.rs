//! # Cross-Thread Publication
//!
//! The simulation is single-threaded. Readers on other threads (a renderer,
//! a debug overlay) see only fully completed ticks through a snapshot.

mod snapshot;

pub use snapshot::{Published, SnapshotBuffer};
