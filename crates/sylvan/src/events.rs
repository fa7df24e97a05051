//! # SYLVAN Event System
//!
//! Notifications from the simulation to its collaborators.
//!
//! ```text
//! ┌─────────────┐      ┌─────────────┐      ┌─────────────┐
//! │ Simulation  │─────>│   bounded   │─────>│  Renderer / │
//! │   (tick)    │      │   channel   │      │  overlay    │
//! └─────────────┘      └─────────────┘      └─────────────┘
//! ```
//!
//! The simulation never blocks on a slow consumer: a full queue drops the
//! event and bumps a shared counter.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

use crate::avatar::AvatarState;

/// Events emitted by the simulation.
#[derive(Clone, Debug, PartialEq)]
pub enum WorldEvent {
    // =========================================================================
    // Streaming
    // =========================================================================
    /// The avatar crossed a chunk boundary and the world was serviced.
    ChunkServiced {
        /// Serviced chunk after this tick.
        chunk: i64,
        /// Entities created.
        spawned: usize,
        /// Entities evicted in the same tick.
        evicted: usize,
    },

    /// Entities left the retention window without a chunk change.
    EntitiesEvicted {
        /// Number of entities removed.
        count: usize,
    },

    // =========================================================================
    // Avatar
    // =========================================================================
    /// The derived avatar state changed.
    AvatarStateChanged {
        /// Previous state.
        from: AvatarState,
        /// New state.
        to: AvatarState,
    },

    /// The flight budget ran out.
    FlightExhausted {
        /// Tick it happened on.
        tick: u64,
    },

    /// The avatar was moved by `Simulation::teleport`.
    AvatarTeleported {
        /// Left edge before.
        from_x: f32,
        /// Left edge after.
        to_x: f32,
    },
}

/// Bounded event channel.
pub struct EventBus {
    sender: Sender<WorldEvent>,
    receiver: Receiver<WorldEvent>,
    dropped: Arc<AtomicU64>,
}

impl EventBus {
    /// Creates a bus holding at most `capacity` undelivered events.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            dropped: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Creates a sender handle (clone for multiple producers).
    #[must_use]
    pub fn sender(&self) -> EventSender {
        EventSender {
            sender: self.sender.clone(),
            dropped: Arc::clone(&self.dropped),
        }
    }

    /// Creates a receiver handle (clone for multiple consumers).
    #[must_use]
    pub fn receiver(&self) -> EventReceiver {
        EventReceiver {
            receiver: self.receiver.clone(),
        }
    }

    /// Events dropped because the queue was full.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Handle for sending events.
#[derive(Clone)]
pub struct EventSender {
    sender: Sender<WorldEvent>,
    dropped: Arc<AtomicU64>,
}

impl EventSender {
    /// Sends an event without blocking.
    ///
    /// Returns `false` if it was dropped.
    #[inline]
    pub fn send(&self, event: WorldEvent) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                tracing::warn!(?event, dropped, "event queue full, dropping");
                false
            }
            // Nobody listening.
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

/// Handle for receiving events.
#[derive(Clone)]
pub struct EventReceiver {
    receiver: Receiver<WorldEvent>,
}

impl EventReceiver {
    /// Takes every pending event.
    #[inline]
    pub fn drain(&self) -> Vec<WorldEvent> {
        self.receiver.try_iter().collect()
    }

    /// Takes one event, if any.
    #[inline]
    pub fn try_recv(&self) -> Option<WorldEvent> {
        self.receiver.try_recv().ok()
    }

    /// Returns the number of pending events.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Checks if there are pending events.
    #[inline]
    #[must_use]
    pub fn has_events(&self) -> bool {
        !self.receiver.is_empty()
    }
}
