//! # SYLVAN Headless
//!
//! Runs a world without a window: a scripted avatar walks, jumps and floats
//! to the right while the landscape streams around it.
//!
//! ```bash
//! # Default config, one minute of simulated time
//! sylvan-headless
//!
//! # Custom config, ten thousand ticks, chunk logs on
//! RUST_LOG=sylvan=debug sylvan-headless data/world.toml 10000
//! ```
//!
//! Ticks run back to back; the tick rate only sets the timestep.

use std::env;
use std::error::Error;

use sylvan::{LogicalKey, ScriptedInput, Simulation, WorldConfig, WorldEvent};
use tracing_subscriber::EnvFilter;

/// Ticks to run when none are given.
const DEFAULT_TICKS: u64 = 3_600;

fn main() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sylvan=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    let mut args = env::args().skip(1);
    let config = match args.next() {
        Some(path) => WorldConfig::load(path)?,
        None => WorldConfig::default(),
    };
    let ticks = match args.next() {
        Some(count) => count.parse::<u64>()?,
        None => DEFAULT_TICKS,
    };

    let validated = config.validate()?;
    let mut sim = Simulation::new(validated)?;
    let events = sim.events();
    let script = walk_and_fly();
    let report_every = u64::from(validated.tick_rate.get());

    tracing::info!(ticks, seed = config.seed, "headless run started");

    let mut chunks_serviced = 0_u64;
    let mut flights_exhausted = 0_u64;
    for tick in 0..ticks {
        sim.tick(&script.looped_at(tick));

        for event in events.drain() {
            match event {
                WorldEvent::ChunkServiced { .. } => chunks_serviced += 1,
                WorldEvent::FlightExhausted { .. } => flights_exhausted += 1,
                _ => {}
            }
        }

        if (tick + 1) % report_every == 0 {
            let stats = sim.stats();
            tracing::info!(
                tick = tick + 1,
                avg_us = format_args!("{:.1}", stats.avg_tick_us()),
                max_us = stats.max_tick_us,
                over_budget = stats.ticks_over_budget,
                spawned = stats.spawned_sum,
                evicted = stats.evicted_sum,
                live = sim.landscape().live_count(),
                location = sim.location_blocks(),
                state = ?sim.state(),
                flight_power = format_args!("{:.2}", sim.flight_power()),
                "second elapsed"
            );
            sim.stats_mut().reset();
        }
    }

    let totals = sim.landscape().stats();
    tracing::info!(
        ticks,
        chunks_serviced,
        flights_exhausted,
        spawned_total = totals.spawned_total,
        evicted_total = totals.evicted_total,
        duplicates_skipped = totals.duplicates_skipped,
        dropped_events = sim.dropped_events(),
        location = sim.location_blocks(),
        "headless run finished"
    );
    Ok(())
}

/// Eight seconds of walking, hopping and floating, biased to the right.
fn walk_and_fly() -> ScriptedInput {
    use LogicalKey::{Boost, Float, Jump, Right};

    ScriptedInput::new()
        .then(120, &[Right])
        .then(20, &[Right, Jump])
        .then(100, &[Right])
        .then(120, &[Right, Float, Boost])
        .then(60, &[Right])
        .then(20, &[Jump])
        .then(40, &[])
}
