//! # SYLVAN Simulation
//!
//! One fixed-order tick:
//! ```text
//! Tick N:
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │ 1. TIMERS        fire due one-shot actions (collision re-arm)       │
//! │ 2. CONTROLLER    input -> velocity, flight intent                   │
//! │ 3. KINEMATICS    gravity, per-axis sweep, trunk nudge               │
//! │ 4. STREAMING     service chunk crossings, evict outside the window  │
//! │ 5. CORRECTION    lift the avatar out of the ground                  │
//! │ 6. FLIGHT        burn or refill the flight budget                   │
//! │ 7. PUBLISH       events + render snapshot                           │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The simulation is the only writer. Renderers read the [`RenderView`]
//! snapshot and drain [`WorldEvent`]s from any thread.

use std::time::{Duration, Instant};

use sylvan_core::{SnapshotBuffer, TimerQueue};
use sylvan_procedural::{
    EntityKind, NoiseSource, ServiceReport, StreamedWorld, TerrainNoise, TreeVariant,
};
use sylvan_shared::{Rect, Rgb, Vec2};

use crate::avatar::{AvatarController, AvatarState, AvatarTimer};
use crate::config::ValidatedConfig;
use crate::error::SimulationResult;
use crate::events::{EventBus, EventReceiver, EventSender, WorldEvent};
use crate::input::InputSource;
use crate::physics::{Body, Contact};

// ============================================================================
// RENDER VIEW
// ============================================================================

/// One live landscape entity, as the renderer sees it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EntityView {
    /// Ground, trunk or leaf.
    pub kind: EntityKind,
    /// World-space bounds.
    pub rect: Rect,
    /// Color tag.
    pub color: Rgb,
    /// Tree variant, for trunks and leaves.
    pub variant: Option<TreeVariant>,
}

/// The avatar, as the renderer and overlay see it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AvatarView {
    /// World-space bounds.
    pub rect: Rect,
    /// Derived movement state.
    pub state: AvatarState,
    /// Blocks travelled from the spawn point.
    pub location_blocks: i64,
    /// Remaining flight budget in `[0, 1]`.
    pub flight_power: f32,
}

/// Everything a renderer needs for one frame.
#[derive(Clone, Debug, Default)]
pub struct RenderView {
    /// The avatar.
    pub avatar: AvatarView,
    /// Every live landscape entity.
    pub entities: Vec<EntityView>,
}

// ============================================================================
// TICK STATS
// ============================================================================

/// Per-tick counters.
#[derive(Clone, Copy, Debug, Default)]
pub struct TickStats {
    /// Tick number.
    pub tick: u64,
    /// Wall time spent in the tick, microseconds.
    pub logic_us: u64,
    /// Chunk steps serviced.
    pub chunk_steps: usize,
    /// Entities created.
    pub spawned: usize,
    /// Entities evicted.
    pub evicted: usize,
    /// Live entities after the tick.
    pub live_entities: usize,
}

/// Accumulator for tick statistics.
#[derive(Clone, Debug)]
pub struct TickStatsAccumulator {
    /// Ticks recorded.
    pub ticks_recorded: u64,
    /// Sum of tick times.
    pub logic_us_sum: u64,
    /// Fastest tick.
    pub min_tick_us: u64,
    /// Slowest tick.
    pub max_tick_us: u64,
    /// Ticks slower than the budget.
    pub ticks_over_budget: u64,
    /// Entities created.
    pub spawned_sum: u64,
    /// Entities evicted.
    pub evicted_sum: u64,
    /// Chunk steps serviced.
    pub chunk_steps_sum: u64,
    budget_us: u64,
}

impl TickStatsAccumulator {
    /// Creates an accumulator for ticks of length `budget`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn new(budget: Duration) -> Self {
        Self {
            ticks_recorded: 0,
            logic_us_sum: 0,
            min_tick_us: u64::MAX,
            max_tick_us: 0,
            ticks_over_budget: 0,
            spawned_sum: 0,
            evicted_sum: 0,
            chunk_steps_sum: 0,
            budget_us: budget.as_micros() as u64,
        }
    }

    /// Records a tick.
    pub fn record(&mut self, stats: TickStats) {
        self.ticks_recorded += 1;
        self.logic_us_sum += stats.logic_us;
        self.min_tick_us = self.min_tick_us.min(stats.logic_us);
        self.max_tick_us = self.max_tick_us.max(stats.logic_us);
        self.spawned_sum += stats.spawned as u64;
        self.evicted_sum += stats.evicted as u64;
        self.chunk_steps_sum += stats.chunk_steps as u64;

        if stats.logic_us > self.budget_us {
            self.ticks_over_budget += 1;
        }
    }

    /// Average tick time in microseconds.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn avg_tick_us(&self) -> f64 {
        if self.ticks_recorded == 0 {
            return 0.0;
        }
        self.logic_us_sum as f64 / self.ticks_recorded as f64
    }

    /// Clears all counters, keeping the budget.
    pub fn reset(&mut self) {
        *self = Self {
            budget_us: self.budget_us,
            ..Self::new(Duration::ZERO)
        };
    }
}

// ============================================================================
// SIMULATION
// ============================================================================

/// The world: landscape, avatar and everything that moves them.
pub struct Simulation<N = TerrainNoise> {
    config: ValidatedConfig,
    landscape: StreamedWorld<N>,
    body: Body,
    controller: AvatarController,
    timers: TimerQueue<AvatarTimer>,
    tick: u64,
    spawn_x: f32,
    state: AvatarState,
    bus: EventBus,
    events: EventSender,
    snapshot: SnapshotBuffer<RenderView>,
    stats: TickStatsAccumulator,
}

impl Simulation<TerrainNoise> {
    /// Builds a world on the bundled terrain noise.
    ///
    /// # Errors
    ///
    /// Returns an error if the landscape cannot be built from `config`.
    pub fn new(config: ValidatedConfig) -> SimulationResult<Self> {
        let landscape = StreamedWorld::new(config.landscape)?;
        Ok(Self::with_landscape(config, landscape))
    }
}

impl<N: NoiseSource> Simulation<N> {
    /// Builds a world on a custom terrain noise.
    ///
    /// # Errors
    ///
    /// Returns an error if the landscape cannot be built from `config`.
    pub fn with_noise(config: ValidatedConfig, noise: N) -> SimulationResult<Self> {
        let landscape = StreamedWorld::with_noise(config.landscape, noise)?;
        Ok(Self::with_landscape(config, landscape))
    }

    /// Places the avatar at the first block-aligned x at or past the middle
    /// of the viewport, standing on the ground, and populates around it.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn with_landscape(config: ValidatedConfig, mut landscape: StreamedWorld<N>) -> Self {
        let grid = landscape.grid();
        let half = (config.landscape.viewport.width / 2.0).ceil() as i64;
        let spawn_left = grid.snap_up(half).max(grid.block());
        let spawn_x = spawn_left as f32;

        let size = config.block_size();
        let top = landscape.height_at(spawn_x) - size;
        let body = Body::new(Vec2::new(spawn_x, top), Vec2::new(size, size));
        landscape.populate_initial(spawn_left);

        let bus = EventBus::new(config.event_capacity);
        let events = bus.sender();
        let budget = Duration::from_secs_f32(config.dt());

        tracing::info!(
            seed = config.landscape.seed.value(),
            spawn_x,
            live = landscape.live_count(),
            "world started"
        );

        let mut simulation = Self {
            config,
            landscape,
            body,
            controller: AvatarController::new(config.max_flight_ticks, config.rearm_delay_ticks()),
            timers: TimerQueue::new(),
            tick: 0,
            spawn_x,
            state: AvatarState::Standing,
            bus,
            events,
            snapshot: SnapshotBuffer::default(),
            stats: TickStatsAccumulator::new(budget),
        };
        simulation.publish();
        simulation
    }

    /// Advances the world by one fixed step.
    pub fn tick(&mut self, input: &dyn InputSource) -> TickStats {
        let start = Instant::now();
        self.tick += 1;
        let now = self.tick;

        while let Some(timer) = self.timers.pop_due(now) {
            self.controller.on_timer(timer.action, &mut self.body);
        }

        self.controller.apply(input, &mut self.body, &mut self.timers, now);

        // Sampled before the sweep zeroes velocity on a blocked axis.
        let at_rest = self.body.is_at_rest();
        let contacts = self.body.integrate(self.config.dt(), &self.landscape);
        self.nudge_off_trunks(&contacts, at_rest);

        let report = self.landscape.update(streaming_x(&self.body));

        self.body
            .correct_ground_penetration(&self.landscape, self.config.block_size());

        if self.controller.step_flight_counter() {
            tracing::debug!(tick = now, "flight budget exhausted");
            self.events.send(WorldEvent::FlightExhausted { tick: now });
        }

        self.emit_streaming(report);
        self.emit_state_change();
        self.publish();

        #[allow(clippy::cast_possible_truncation)]
        let stats = TickStats {
            tick: now,
            logic_us: start.elapsed().as_micros() as u64,
            chunk_steps: report.steps,
            spawned: report.spawned,
            evicted: report.evicted,
            live_entities: self.landscape.live_count(),
        };
        self.stats.record(stats);
        stats
    }

    /// Moves the avatar to left edge `x`, standing on the ground, and
    /// rebuilds the landscape around it.
    pub fn teleport(&mut self, x: f32) {
        let from_x = self.body.rect.left();
        let size = self.body.rect.size.y;
        self.body.rect.top_left = Vec2::new(x, self.landscape.height_at(x) - size);
        self.body.velocity = Vec2::ZERO;

        let report = self.landscape.reset_around(streaming_x(&self.body));
        tracing::info!(from_x, to_x = x, chunk = report.serviced_chunk, "avatar teleported");
        self.events.send(WorldEvent::AvatarTeleported { from_x, to_x: x });
        self.publish();
    }

    // ------------------------------------------------------------------------
    // Tick stages
    // ------------------------------------------------------------------------

    /// Resting on a trunk shunts the avatar one block to the right.
    ///
    /// `at_rest` is the velocity test taken before integration: an avatar
    /// walking into a trunk is blocked, never shunted.
    fn nudge_off_trunks(&mut self, contacts: &[Contact], at_rest: bool) {
        let on_trunk = contacts.iter().any(|c| c.kind == EntityKind::Trunk);
        if on_trunk && at_rest {
            self.body.translate(Vec2::new(self.config.block_size(), 0.0));
        }
    }

    fn emit_streaming(&self, report: ServiceReport) {
        if report.steps > 0 {
            self.events.send(WorldEvent::ChunkServiced {
                chunk: report.serviced_chunk,
                spawned: report.spawned,
                evicted: report.evicted,
            });
        } else if report.evicted > 0 {
            self.events.send(WorldEvent::EntitiesEvicted {
                count: report.evicted,
            });
        }
    }

    fn emit_state_change(&mut self) {
        let state = self.controller.state(&self.body);
        if state != self.state {
            self.events.send(WorldEvent::AvatarStateChanged {
                from: self.state,
                to: state,
            });
            self.state = state;
        }
    }

    fn publish(&self) {
        let avatar = AvatarView {
            rect: self.body.rect,
            state: self.controller.state(&self.body),
            location_blocks: self.location_blocks(),
            flight_power: self.controller.flight_power(),
        };
        let landscape = &self.landscape;
        self.snapshot.update(self.tick, |view| {
            view.avatar = avatar;
            view.entities.clear();
            view.entities.extend(landscape.entities().map(|(_, e)| EntityView {
                kind: e.kind(),
                rect: e.rect,
                color: e.color,
                variant: e.variant,
            }));
        });
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// Ticks run so far.
    #[inline]
    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.tick
    }

    /// The avatar body.
    #[inline]
    #[must_use]
    pub const fn body(&self) -> &Body {
        &self.body
    }

    /// The avatar controller.
    #[inline]
    #[must_use]
    pub const fn controller(&self) -> &AvatarController {
        &self.controller
    }

    /// The live landscape.
    #[inline]
    #[must_use]
    pub const fn landscape(&self) -> &StreamedWorld<N> {
        &self.landscape
    }

    /// The frozen configuration.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &ValidatedConfig {
        &self.config
    }

    /// Avatar state as of the last tick.
    #[inline]
    #[must_use]
    pub const fn state(&self) -> AvatarState {
        self.state
    }

    /// Left edge of the avatar at world start.
    #[inline]
    #[must_use]
    pub const fn spawn_x(&self) -> f32 {
        self.spawn_x
    }

    /// Whole blocks between the avatar and its spawn point, truncated
    /// toward zero.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn location_blocks(&self) -> i64 {
        let s = self.config.block_size();
        ((self.body.rect.center_x() - self.spawn_x - 0.5 * s) / s) as i64
    }

    /// Remaining flight budget in `[0, 1]`.
    #[must_use]
    pub fn flight_power(&self) -> f32 {
        self.controller.flight_power()
    }

    /// Shared handle to the render snapshot.
    #[must_use]
    pub fn snapshot(&self) -> SnapshotBuffer<RenderView> {
        self.snapshot.clone()
    }

    /// A receiver for world events.
    #[must_use]
    pub fn events(&self) -> EventReceiver {
        self.bus.receiver()
    }

    /// Events dropped on a full queue.
    #[must_use]
    pub fn dropped_events(&self) -> u64 {
        self.bus.dropped()
    }

    /// Accumulated tick statistics.
    #[must_use]
    pub const fn stats(&self) -> &TickStatsAccumulator {
        &self.stats
    }

    /// Mutable statistics, for periodic resets.
    pub fn stats_mut(&mut self) -> &mut TickStatsAccumulator {
        &mut self.stats
    }
}

/// Integer x the streamer tracks: the avatar's center, floored.
#[allow(clippy::cast_possible_truncation)]
fn streaming_x(body: &Body) -> i64 {
    body.rect.center_x().floor() as i64
}
