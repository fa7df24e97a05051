//! # SYLVAN
//!
//! An endless side-scrolling world: a seeded landscape that streams in and
//! out around a walking, jumping, floating avatar.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                               SIMULATION                                │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────┐     ┌─────────────────┐     ┌─────────────────┐    │
//! │  │  InputSource    │────>│ AvatarController│────>│  Body (physics) │    │
//! │  └─────────────────┘     └─────────────────┘     └────────┬────────┘    │
//! │                                                           │ avatar x    │
//! │                          ┌─────────────────┐              ▼             │
//! │                          │  StreamedWorld  │<──── ChunkStreamer         │
//! │                          │ (ground, trees) │                            │
//! │                          └────────┬────────┘                            │
//! │                                   ▼                                     │
//! │                   RenderView snapshot + WorldEvent queue                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `config`: TOML world configuration and validation
//! - `input`: logical keys and bundled input sources
//! - `physics`: kinematic body and collision sweep
//! - `avatar`: flight/fall state machine
//! - `events`: bounded event queue for collaborators
//! - `simulation`: the fixed-order tick

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod avatar;
pub mod config;
pub mod error;
pub mod events;
pub mod input;
pub mod physics;
pub mod simulation;

// Re-export the lower layers
pub use sylvan_core as core;
pub use sylvan_procedural as procedural;
pub use sylvan_shared as shared;

// Re-export commonly used types
pub use avatar::{AvatarController, AvatarState, AvatarTimer, AVATAR};
pub use config::{ValidatedConfig, WorldConfig, REARM_DELAY_SECS};
pub use error::{ConfigError, ConfigResult, SimulationError, SimulationResult};
pub use events::{EventBus, EventReceiver, EventSender, WorldEvent};
pub use input::{InputSource, KeyState, LogicalKey, ScriptedInput};
pub use physics::{Axis, Body, Contact, FLOAT_FACTOR, GRAVITY, JUMP_VELOCITY, WALK_SPEED};
pub use simulation::{
    AvatarView, EntityView, RenderView, Simulation, TickStats, TickStatsAccumulator,
};
