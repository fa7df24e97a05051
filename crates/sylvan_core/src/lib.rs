//! # SYLVAN Core Engine
//!
//! The plumbing every simulation tick leans on:
//! - A generational entity store whose slots are recycled, so streaming
//!   terrain in and out does not grow memory without bound
//! - A timer queue for deferred one-shot actions
//! - A snapshot buffer that hands the last completed tick to readers
//!
//! ## Example
//!
//! ```rust,ignore
//! use sylvan_core::{World, TimerQueue};
//!
//! let mut world: World<&str> = World::with_capacity(1024);
//! let id = world.spawn("trunk");
//!
//! let mut timers = TimerQueue::new();
//! timers.schedule(id, 30, "re-arm");
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod ecs;
pub mod sync;
pub mod timer;

pub use ecs::{EntityId, World};
pub use sync::{Published, SnapshotBuffer};
pub use timer::{Timer, TimerQueue};
