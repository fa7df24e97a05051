//! # Flight and Streaming Integration Test
//!
//! Drives whole simulations through the public API: the flight budget, the
//! fall that follows it, streaming under a walking avatar, and determinism
//! of complete runs.

use std::thread;

use sylvan::procedural::EntityKey;
use sylvan::{
    AvatarState, KeyState, LogicalKey, ScriptedInput, Simulation, WorldConfig, WorldEvent,
};

type FlatSim = Simulation<fn(f64) -> f64>;

/// Flat ground at y = 450, no trees.
fn flat_world() -> FlatSim {
    let noise: fn(f64) -> f64 = |_| 0.0;
    let config = WorldConfig {
        forest_density_bound: u32::MAX,
        ..WorldConfig::default()
    };
    Simulation::with_noise(config.validate().unwrap(), noise).unwrap()
}

fn float_keys() -> KeyState {
    KeyState::with(&[LogicalKey::Float, LogicalKey::Boost])
}

#[test]
fn test_falling_starts_on_tick_100() {
    let mut sim = flat_world();
    let events = sim.events();
    let float = float_keys();

    for tick in 1..=99 {
        sim.tick(&float);
        assert!(!sim.controller().is_falling(), "fell early on tick {tick}");
        assert_eq!(sim.state(), AvatarState::Flying);
    }
    sim.tick(&float);
    assert!(sim.controller().is_falling());
    assert_eq!(sim.state(), AvatarState::Falling);
    assert_eq!(sim.flight_power(), 0.0);

    let exhausted: Vec<_> = events
        .drain()
        .into_iter()
        .filter(|e| matches!(e, WorldEvent::FlightExhausted { .. }))
        .collect();
    assert_eq!(exhausted, vec![WorldEvent::FlightExhausted { tick: 100 }]);
}

#[test]
fn test_fall_ends_on_landing() {
    let mut sim = flat_world();
    let float = float_keys();
    for _ in 0..100 {
        sim.tick(&float);
    }
    let peak = sim.body().rect.bottom();
    assert!(peak < 450.0 - 200.0, "peak {peak}");

    // Still holding float: gravity wins, no more lift.
    let vy = sim.body().velocity.y;
    sim.tick(&float);
    assert!(sim.body().velocity.y > vy);

    for _ in 0..300 {
        sim.tick(&KeyState::NONE);
    }
    assert!(sim.body().on_ground);
    assert!(!sim.controller().is_falling());
    assert!(!sim.controller().is_flying());
    assert_eq!(sim.state(), AvatarState::Standing);
    assert!((sim.flight_power() - 1.0).abs() < f32::EPSILON);
    assert!((sim.body().rect.bottom() - 450.0).abs() < 1e-3);
}

#[test]
fn test_holding_float_through_landing_restarts_flight() {
    let mut sim = flat_world();
    let events = sim.events();
    let float = float_keys();

    let mut landed_at = None;
    let mut refilled_at = None;
    for tick in 1..=1_000_u64 {
        sim.tick(&float);
        if landed_at.is_none() && sim.controller().is_falling() && sim.body().on_ground {
            landed_at = Some(tick);
        }
        if landed_at.is_some() && refilled_at.is_none() && !sim.controller().is_falling() {
            refilled_at = Some(tick);
            assert!((sim.flight_power() - 1.0).abs() < f32::EPSILON);
        }
    }
    let landed_at = landed_at.expect("never landed");
    let refilled_at = refilled_at.expect("fall never ended");
    assert!(landed_at > 100 && landed_at < 400, "landed on tick {landed_at}");
    assert_eq!(refilled_at, landed_at + 1);

    // Every landing starts a fresh hundred-tick flight.
    let exhausted: Vec<u64> = events
        .drain()
        .into_iter()
        .filter_map(|e| match e {
            WorldEvent::FlightExhausted { tick } => Some(tick),
            _ => None,
        })
        .collect();
    assert!(exhausted.len() >= 2, "{exhausted:?}");
    assert_eq!(exhausted[0], 100);
    assert!(exhausted[1] > landed_at + 100);
}

#[test]
fn test_walking_services_every_chunk() {
    let mut sim = flat_world();
    let events = sim.events();
    let right = KeyState::with(&[LogicalKey::Right]);
    let grid = sim.landscape().grid();

    let mut serviced = Vec::new();
    for _ in 0..2_000 {
        sim.tick(&right);
        for event in events.drain() {
            if let WorldEvent::ChunkServiced { chunk, spawned, .. } = event {
                assert!(spawned > 0);
                serviced.push(chunk);
            }
        }

        let left = sim.body().rect.left().floor() as i64;
        assert!(
            sim.landscape()
                .find(&EntityKey::Ground(grid.snap_down(left)))
                .is_some(),
            "no ground under x={left}"
        );
        assert!(sim.body().on_ground);
    }

    // Center goes from 435 to about 8768: chunks 2 through 21, in order.
    assert_eq!(serviced, (2..=21).collect::<Vec<i64>>());
    assert_eq!(sim.dropped_events(), 0);
    assert!(sim.location_blocks() > 270);
}

#[test]
fn test_walking_left_into_negative_coordinates() {
    let mut sim = flat_world();
    let left = KeyState::with(&[LogicalKey::Left]);
    for _ in 0..1_000 {
        sim.tick(&left);
    }
    assert!(sim.body().rect.left() < -3_000.0);
    assert!(sim.body().on_ground);
    assert!(sim.location_blocks() < -100);
    assert_eq!(
        sim.landscape().streamer().serviced_chunk(),
        sim.landscape()
            .streamer()
            .chunk_of(sim.body().rect.center_x().floor() as i64)
    );
}

#[test]
fn test_same_seed_same_run() {
    let script = ScriptedInput::new()
        .then(90, &[LogicalKey::Right])
        .then(30, &[LogicalKey::Right, LogicalKey::Jump])
        .then(120, &[LogicalKey::Right, LogicalKey::Float, LogicalKey::Boost])
        .then(60, &[]);

    let run = || {
        let config = WorldConfig {
            seed: 1234,
            ..WorldConfig::default()
        };
        let mut sim = Simulation::new(config.validate().unwrap()).unwrap();
        for tick in 0..1_200 {
            sim.tick(&script.looped_at(tick));
        }
        let view = sim.snapshot().latest();
        (view.value.avatar, view.value.entities)
    };

    let (avatar_a, entities_a) = run();
    let (avatar_b, entities_b) = run();
    assert_eq!(avatar_a, avatar_b);
    assert_eq!(entities_a, entities_b);
}

#[test]
fn test_snapshot_readable_from_another_thread() {
    let mut sim = flat_world();
    let snapshot = sim.snapshot();
    let right = KeyState::with(&[LogicalKey::Right]);

    thread::scope(|scope| {
        let reader = scope.spawn(|| {
            let mut last = 0;
            for _ in 0..1_000 {
                let tick = snapshot.tick();
                assert!(tick >= last, "snapshot went back in time");
                last = tick;
            }
        });
        for _ in 0..200 {
            sim.tick(&right);
        }
        reader.join().unwrap();
    });

    let view = sim.snapshot().latest();
    assert_eq!(view.tick, 200);
    assert_eq!(view.value.entities.len(), sim.landscape().live_count());
    assert_eq!(view.value.avatar.state, AvatarState::Walking);
}
