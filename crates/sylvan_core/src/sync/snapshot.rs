//! # Snapshot Buffer
//!
//! ```text
//!   simulation (one writer)          readers (any thread)
//!   ┌──────────────────────┐        ┌──────────────────────┐
//!   │ tick N: update(..)   │──┐  ┌──│ read() / latest()    │
//!   └──────────────────────┘  ▼  │  └──────────────────────┘
//!                 ┌──────────────────────┐
//!                 │ RwLock<Published<T>> │
//!                 └──────────────────────┘
//! ```
//!
//! The writer mutates the published value in place, so the vectors inside a
//! view keep their capacity from tick to tick.

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard};

/// A value stamped with the tick that produced it.
#[derive(Clone, Debug, Default)]
pub struct Published<T> {
    /// Tick number, 0 before the first publication.
    pub tick: u64,
    /// The published data.
    pub value: T,
}

/// Shared handle to the last completed tick's view.
///
/// Cloning the handle is cheap; all clones see the same value.
#[derive(Debug)]
pub struct SnapshotBuffer<T> {
    inner: Arc<RwLock<Published<T>>>,
}

impl<T> SnapshotBuffer<T> {
    /// Creates a buffer holding `initial` at tick 0.
    #[must_use]
    pub fn new(initial: T) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Published {
                tick: 0,
                value: initial,
            })),
        }
    }

    /// Rewrites the published value in place and stamps it with `tick`.
    pub fn update<F>(&self, tick: u64, write: F)
    where
        F: FnOnce(&mut T),
    {
        let mut guard = self.inner.write();
        write(&mut guard.value);
        guard.tick = tick;
    }

    /// Replaces the published value.
    pub fn publish(&self, tick: u64, value: T) {
        *self.inner.write() = Published { tick, value };
    }

    /// Borrows the current snapshot. Hold the guard briefly; it blocks the
    /// writer.
    #[must_use]
    pub fn read(&self) -> RwLockReadGuard<'_, Published<T>> {
        self.inner.read()
    }

    /// Tick of the current snapshot.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.inner.read().tick
    }
}

impl<T: Clone> SnapshotBuffer<T> {
    /// Clones out the current snapshot.
    #[must_use]
    pub fn latest(&self) -> Published<T> {
        self.inner.read().clone()
    }
}

impl<T> Clone for SnapshotBuffer<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Default> Default for SnapshotBuffer<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
