//! # Entity Storage
//!
//! Entities are generational ids pointing into a slot array. A despawned
//! slot is reused by the next spawn with a bumped generation, so stale ids
//! never alias a newer entity.

mod entity;
mod world;

pub use entity::EntityId;
pub use world::World;
