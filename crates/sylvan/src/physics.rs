//! # SYLVAN Kinematics
//!
//! Kinematic body for the avatar, resolved against the streamed landscape.
//!
//! Features:
//! - Constant gravity
//! - Per-axis sweep against ground columns and trunks (leaves never block)
//! - Lips shallower than one step of travel are climbed
//! - Ground detection
//! - Upward collision that can be switched off while flying
//! - Ground-penetration correction against the height field
//!
//! Coordinates are y-down: positive `velocity.y` falls.

use sylvan_core::EntityId;
use sylvan_procedural::{EntityKind, NoiseSource, StreamedWorld};
use sylvan_shared::{Rect, Vec2};

/// Gravity acceleration (world units per second squared, downward).
pub const GRAVITY: f32 = 300.0;

/// Walking speed (world units per second).
pub const WALK_SPEED: f32 = 250.0;

/// Jump velocity (world units per second, negative is up).
pub const JUMP_VELOCITY: f32 = -400.0;

/// Fraction of the jump velocity applied each tick while flying.
pub const FLOAT_FACTOR: f32 = 0.45;

/// Overlap below this on the cross axis is treated as touching, not blocking.
const CONTACT_SLOP: f32 = 0.01;

/// Squared speed under which a body counts as at rest.
const REST_SPEED_SQ: f32 = 1e-4;

// ============================================================================
// CONTACTS
// ============================================================================

/// Axis a contact was resolved on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    /// Horizontal push-out.
    X,
    /// Vertical push-out.
    Y,
}

/// One resolved collision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Contact {
    /// Entity that was hit.
    pub id: EntityId,
    /// What it was.
    pub kind: EntityKind,
    /// Axis the body was pushed out along.
    pub axis: Axis,
}

/// Kinds that block the avatar.
#[inline]
const fn is_solid(kind: EntityKind) -> bool {
    matches!(kind, EntityKind::Ground | EntityKind::Trunk)
}

/// Overlap extents of two rectangles on each axis. Positive = overlap.
#[inline]
fn overlap(a: &Rect, b: &Rect) -> (f32, f32) {
    (
        a.right().min(b.right()) - a.left().max(b.left()),
        a.bottom().min(b.bottom()) - a.top().max(b.top()),
    )
}

// ============================================================================
// BODY
// ============================================================================

/// A kinematic box with velocity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Body {
    /// Bounds, top-left origin.
    pub rect: Rect,
    /// Velocity (world units per second).
    pub velocity: Vec2,
    /// Landed on something during the last integration.
    pub on_ground: bool,
    /// When false, moving up passes through solids.
    pub collision_armed: bool,
}

impl Body {
    /// Creates a body at rest.
    #[must_use]
    pub const fn new(top_left: Vec2, size: Vec2) -> Self {
        Self {
            rect: Rect::new(top_left, size),
            velocity: Vec2::ZERO,
            on_ground: false,
            collision_armed: true,
        }
    }

    /// Velocity approximately zero.
    #[inline]
    #[must_use]
    pub fn is_at_rest(&self) -> bool {
        self.velocity.length_squared() < REST_SPEED_SQ
    }

    /// Moves the body by `delta`.
    #[inline]
    pub fn translate(&mut self, delta: Vec2) {
        self.rect = self.rect.translate(delta);
    }

    /// Advances one step: gravity, then an X sweep, then a Y sweep.
    ///
    /// Returns every contact that pushed the body out.
    pub fn integrate<N: NoiseSource>(&mut self, dt: f32, world: &StreamedWorld<N>) -> Vec<Contact> {
        self.velocity.y += GRAVITY * dt;
        let mut contacts = Vec::new();

        // X axis
        let dx = self.velocity.x * dt;
        if dx.abs() > f32::EPSILON {
            let before = self.rect;
            self.translate(Vec2::new(dx, 0.0));
            if self.resolve_x(&before, dx, world, &mut contacts) {
                self.velocity.x = 0.0;
            }
        }

        // Y axis
        let dy = self.velocity.y * dt;
        let before = self.rect;
        self.translate(Vec2::new(0.0, dy));
        self.on_ground = false;
        self.resolve_y(&before, dy, world, &mut contacts);

        contacts
    }

    /// Solid entities overlapping the body, copied out of the store.
    fn solid_hits<N: NoiseSource>(&self, world: &StreamedWorld<N>) -> Vec<(EntityId, EntityKind, Rect)> {
        world
            .overlapping(&self.rect)
            .filter(|(_, entity)| is_solid(entity.kind()))
            .map(|(id, entity)| (id, entity.kind(), entity.rect))
            .collect()
    }

    /// Pushes out of anything entered from the side. Returns `true` if blocked.
    fn resolve_x<N: NoiseSource>(
        &mut self,
        before: &Rect,
        dx: f32,
        world: &StreamedWorld<N>,
        contacts: &mut Vec<Contact>,
    ) -> bool {
        let mut blocked = false;
        for (id, kind, rect) in self.solid_hits(world) {
            let (_, oy) = overlap(&self.rect, &rect);
            // Only things that were fully ahead before the move.
            let entered = if dx > 0.0 {
                before.right() <= rect.left() + CONTACT_SLOP
            } else {
                before.left() >= rect.right() - CONTACT_SLOP
            };
            if oy <= CONTACT_SLOP || !entered {
                continue;
            }

            // A lip shallower than this step's travel is climbed, not a wall.
            if oy <= dx.abs() + CONTACT_SLOP && rect.top() > self.rect.top() {
                self.rect.top_left.y = rect.top() - self.rect.size.y;
                contacts.push(Contact { id, kind, axis: Axis::Y });
                continue;
            }

            let left = if dx > 0.0 {
                rect.left() - self.rect.size.x
            } else {
                rect.right()
            };
            self.rect.top_left.x = left;
            blocked = true;
            contacts.push(Contact { id, kind, axis: Axis::X });
        }
        blocked
    }

    /// Lands on, or bumps into, anything entered vertically.
    fn resolve_y<N: NoiseSource>(
        &mut self,
        before: &Rect,
        dy: f32,
        world: &StreamedWorld<N>,
        contacts: &mut Vec<Contact>,
    ) {
        for (id, kind, rect) in self.solid_hits(world) {
            let (ox, _) = overlap(&self.rect, &rect);
            if ox <= CONTACT_SLOP {
                continue;
            }

            if dy > 0.0 {
                // Falling: land on tops that were not above our head.
                if rect.top() < before.top() {
                    continue;
                }
                self.rect.top_left.y = rect.top() - self.rect.size.y;
                self.velocity.y = 0.0;
                self.on_ground = true;
            } else if dy < 0.0 {
                if !self.collision_armed || rect.bottom() > before.bottom() {
                    continue;
                }
                self.rect.top_left.y = rect.bottom();
                self.velocity.y = 0.0;
            } else {
                continue;
            }
            contacts.push(Contact { id, kind, axis: Axis::Y });
        }
    }

    /// If the bottom edge sank below the ground one block to the right of
    /// the left edge, rest the bottom on the ground at the left edge.
    ///
    /// Returns `true` if the body was moved.
    pub fn correct_ground_penetration<N: NoiseSource>(
        &mut self,
        world: &StreamedWorld<N>,
        block: f32,
    ) -> bool {
        let left = self.rect.left();
        if self.rect.bottom() <= world.height_at(left + block) {
            return false;
        }
        self.rect.top_left.y = world.height_at(left) - self.rect.size.y;
        true
    }
}
