//! # Deferred One-Shot Timers
//!
//! Actions scheduled for a future tick against a target entity. The queue is
//! drained once per tick, before any system runs, in fire-tick order. Ties
//! are broken by scheduling order.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::ecs::EntityId;

/// A timer that came due.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Timer<A> {
    /// Entity the action applies to.
    pub target: EntityId,
    /// Tick the timer was scheduled for.
    pub fire_tick: u64,
    /// The deferred action.
    pub action: A,
}

/// Heap entry. Ordered by `(fire_tick, seq)` only; the action is payload.
#[derive(Debug)]
struct Scheduled<A> {
    fire_tick: u64,
    seq: u64,
    target: EntityId,
    action: A,
}

impl<A> PartialEq for Scheduled<A> {
    fn eq(&self, other: &Self) -> bool {
        self.fire_tick == other.fire_tick && self.seq == other.seq
    }
}

impl<A> Eq for Scheduled<A> {}

impl<A> PartialOrd for Scheduled<A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<A> Ord for Scheduled<A> {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.fire_tick, self.seq).cmp(&(other.fire_tick, other.seq))
    }
}

/// Min-heap of pending one-shot actions keyed by (fire tick, target).
#[derive(Debug)]
pub struct TimerQueue<A> {
    heap: BinaryHeap<Reverse<Scheduled<A>>>,
    next_seq: u64,
}

impl<A> TimerQueue<A> {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// Schedules `action` on `target` at `fire_tick`.
    pub fn schedule(&mut self, target: EntityId, fire_tick: u64, action: A) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(Scheduled {
            fire_tick,
            seq,
            target,
            action,
        }));
    }

    /// Schedules `action` on `target` `delay` ticks after `now`.
    pub fn schedule_after(&mut self, target: EntityId, now: u64, delay: u64, action: A) {
        self.schedule(target, now.saturating_add(delay), action);
    }

    /// Pops the earliest timer due at or before `now`.
    pub fn pop_due(&mut self, now: u64) -> Option<Timer<A>> {
        if self.heap.peek()?.0.fire_tick > now {
            return None;
        }
        self.heap.pop().map(|Reverse(s)| Timer {
            target: s.target,
            fire_tick: s.fire_tick,
            action: s.action,
        })
    }

    /// Drops every pending timer for `target`.
    ///
    /// # Returns
    ///
    /// Number of timers cancelled.
    pub fn cancel(&mut self, target: EntityId) -> usize {
        let before = self.heap.len();
        self.heap.retain(|Reverse(s)| s.target != target);
        before - self.heap.len()
    }

    /// Tick of the earliest pending timer.
    #[must_use]
    pub fn next_fire_tick(&self) -> Option<u64> {
        self.heap.peek().map(|Reverse(s)| s.fire_tick)
    }

    /// Number of pending timers.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Returns `true` if nothing is pending.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

impl<A> Default for TimerQueue<A> {
    fn default() -> Self {
        Self::new()
    }
}
