//! # Avatar Controller
//!
//! Turns held keys into velocity and runs the flight/fall state machine.
//!
//! Flight is bounded: every tick spent with flight intent burns one unit of
//! the flight budget, and an empty budget forces a fall until the avatar
//! lands again.

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};
use sylvan_core::{EntityId, TimerQueue};

use crate::input::{InputSource, LogicalKey};
use crate::physics::{Body, FLOAT_FACTOR, JUMP_VELOCITY, WALK_SPEED};

/// Timer target for actions scheduled on the avatar.
pub const AVATAR: EntityId = EntityId::new(0, 0);

/// Movement state, derived fresh every tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvatarState {
    /// On the ground, not moving.
    #[default]
    Standing,
    /// On the ground, moving horizontally.
    Walking,
    /// In the air.
    Flying,
    /// Flight budget ran out; dropping until landing.
    Falling,
}

/// Deferred avatar actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AvatarTimer {
    /// Restore upward collision after floating.
    RearmCollision,
}

/// Input interpretation and flight bookkeeping.
#[derive(Clone, Copy, Debug)]
pub struct AvatarController {
    flying_intent: bool,
    falling: bool,
    flight_ticks: u32,
    max_flight_ticks: NonZeroU32,
    rearm_delay: u64,
}

impl AvatarController {
    /// Creates a controller with a full flight budget.
    #[must_use]
    pub const fn new(max_flight_ticks: NonZeroU32, rearm_delay: u64) -> Self {
        Self {
            flying_intent: false,
            falling: false,
            flight_ticks: max_flight_ticks.get(),
            max_flight_ticks,
            rearm_delay,
        }
    }

    /// Float was requested since the last landing.
    #[inline]
    #[must_use]
    pub const fn is_flying(&self) -> bool {
        self.flying_intent
    }

    /// Flight budget is exhausted.
    #[inline]
    #[must_use]
    pub const fn is_falling(&self) -> bool {
        self.falling
    }

    /// Remaining flight ticks.
    #[inline]
    #[must_use]
    pub const fn flight_ticks(&self) -> u32 {
        self.flight_ticks
    }

    /// Remaining flight budget in `[0, 1]`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn flight_power(&self) -> f32 {
        self.flight_ticks as f32 / self.max_flight_ticks.get() as f32
    }

    /// Applies this tick's input to `body`.
    ///
    /// Floating disarms upward collision and (re)schedules the re-arm timer
    /// `rearm_delay` ticks after `now`.
    pub fn apply(
        &mut self,
        input: &dyn InputSource,
        body: &mut Body,
        timers: &mut TimerQueue<AvatarTimer>,
        now: u64,
    ) {
        let mut vx = 0.0;
        if input.is_key_down(LogicalKey::Left) {
            vx -= WALK_SPEED;
        }
        if input.is_key_down(LogicalKey::Right) {
            vx += WALK_SPEED;
        }
        body.velocity.x = vx;

        if input.is_key_down(LogicalKey::Float) && input.is_key_down(LogicalKey::Boost) {
            self.flying_intent = true;
            if !self.falling {
                body.velocity.y = FLOAT_FACTOR * JUMP_VELOCITY;
                body.collision_armed = false;
                timers.cancel(AVATAR);
                timers.schedule_after(AVATAR, now, self.rearm_delay, AvatarTimer::RearmCollision);
                return;
            }
        }

        if body.on_ground {
            self.flying_intent = false;
            self.falling = false;
            if input.is_key_down(LogicalKey::Jump) {
                body.velocity.y = JUMP_VELOCITY;
            }
        }
    }

    /// Runs a fired timer.
    pub fn on_timer(&mut self, timer: AvatarTimer, body: &mut Body) {
        match timer {
            AvatarTimer::RearmCollision => body.collision_armed = true,
        }
    }

    /// Burns or refills the flight budget.
    ///
    /// Returns `true` on the tick the budget runs out.
    pub fn step_flight_counter(&mut self) -> bool {
        if !self.flying_intent {
            self.flight_ticks = self.max_flight_ticks.get();
            return false;
        }
        if self.flight_ticks == 0 {
            return false;
        }
        self.flight_ticks -= 1;
        if self.flight_ticks == 0 && !self.falling {
            self.falling = true;
            return true;
        }
        false
    }

    /// Current movement state of `body`.
    #[must_use]
    pub fn state(&self, body: &Body) -> AvatarState {
        if self.falling {
            AvatarState::Falling
        } else if !body.on_ground {
            AvatarState::Flying
        } else if body.velocity.x.abs() > f32::EPSILON {
            AvatarState::Walking
        } else {
            AvatarState::Standing
        }
    }
}
