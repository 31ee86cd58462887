//! # Event Bus System
//!
//! Event-driven progress reporting over `tokio::sync::broadcast`. Resolution
//! and batching publish typed snapshots; rendering (spinner, log line, TUI)
//! is a subscriber and never reaches into the sync path.
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{EventBus, CoreEvent, SyncEvent};
//!
//! let event_bus = EventBus::new(100);
//! let mut stream = event_bus.subscribe();
//!
//! event_bus
//!     .emit(CoreEvent::Sync(SyncEvent::SearchProgress {
//!         playlist: "Morning Mix".to_string(),
//!         found: 3,
//!         failed: 1,
//!         total: 40,
//!     }))
//!     .ok();
//! ```
//!
//! ## Error Handling
//!
//! `tokio::sync::broadcast` can produce two receive errors:
//!
//! - `RecvError::Lagged(n)`: the subscriber missed `n` events. Non-fatal;
//!   progress snapshots are self-contained, the next one supersedes them all.
//! - `RecvError::Closed`: all senders dropped, treat as shutdown.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

// Re-export commonly used types
pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

/// Top-level event enum encompassing all event categories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Sync-related events
    Sync(SyncEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Sync(e) => e.description(),
        }
    }
}

/// Events published during a sync pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum SyncEvent {
    /// A sync pass started for a playlist.
    PassStarted {
        playlist: String,
        /// Number of descriptors in the playlist snapshot.
        total: usize,
    },
    /// Search progress snapshot, published once per visited descriptor.
    SearchProgress {
        playlist: String,
        /// Descriptors resolved or memory-matched so far.
        found: usize,
        /// Descriptors that exhausted the cascade so far.
        failed: usize,
        /// Total descriptors in the snapshot.
        total: usize,
    },
    /// One batch finished its barrier and was committed.
    BatchCompleted {
        playlist: String,
        /// Next untried descriptor index.
        offset: usize,
        /// Newly resolved this batch.
        resolved: usize,
        /// Memory matches this batch.
        memory_matches: usize,
        /// Failures this batch.
        failed: usize,
    },
    /// Residual failures are being escalated to the fallback catalog.
    FallbackStarted {
        playlist: String,
        /// Descriptors entering the fallback chain.
        descriptors: usize,
    },
    /// Reconciliation deleted stale local files from one storage area.
    Reconciled {
        playlist: String,
        /// Storage area that was reconciled (primary or fallback).
        area: String,
        deleted: usize,
    },
    /// The pass completed; remaining failures are final.
    PassCompleted {
        playlist: String,
        resolved: usize,
        /// Descriptors that failed both catalogs.
        unresolved: usize,
    },
    /// The pass aborted with an unrecoverable error.
    PassFailed { playlist: String, message: String },
}

impl SyncEvent {
    fn description(&self) -> &str {
        match self {
            SyncEvent::PassStarted { .. } => "Sync pass started",
            SyncEvent::SearchProgress { .. } => "Searching for tracks",
            SyncEvent::BatchCompleted { .. } => "Batch committed",
            SyncEvent::FallbackStarted { .. } => "Escalating to fallback catalog",
            SyncEvent::Reconciled { .. } => "Reconciled local files",
            SyncEvent::PassCompleted { .. } => "Sync pass completed",
            SyncEvent::PassFailed { .. } => "Sync pass failed",
        }
    }
}

/// Central event bus for publishing and subscribing to events.
///
/// Uses `tokio::sync::broadcast` internally. Cloning is cheap; all clones
/// share the same channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    ///
    /// When a subscriber falls behind by more than `capacity` events, it
    /// receives `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an
    /// error if there are no active subscribers. Publishers treat that error
    /// as "nobody is watching" and ignore it.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber to receive events.
    ///
    /// Each call creates an independent receiver; past events are not
    /// replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_emit_and_receive() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.emit(CoreEvent::Sync(SyncEvent::PassStarted {
            playlist: "Mix".to_string(),
            total: 3,
        }))
        .unwrap();

        let event = rx.recv().await.unwrap();
        assert!(matches!(
            event,
            CoreEvent::Sync(SyncEvent::PassStarted { total: 3, .. })
        ));
    }

    #[test]
    fn test_emit_without_subscribers_errors() {
        let bus = EventBus::new(16);
        let result = bus.emit(CoreEvent::Sync(SyncEvent::PassCompleted {
            playlist: "Mix".to_string(),
            resolved: 0,
            unresolved: 0,
        }));

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_multiple_subscribers_each_receive() {
        let bus = EventBus::new(16);
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();

        bus.emit(CoreEvent::Sync(SyncEvent::SearchProgress {
            playlist: "Mix".to_string(),
            found: 1,
            failed: 0,
            total: 2,
        }))
        .unwrap();

        assert!(a.recv().await.is_ok());
        assert!(b.recv().await.is_ok());
    }

    #[test]
    fn test_event_serialization_round_trip() {
        let event = CoreEvent::Sync(SyncEvent::Reconciled {
            playlist: "Mix".to_string(),
            area: "fallback".to_string(),
            deleted: 2,
        });

        let json = serde_json::to_string(&event).unwrap();
        let back: CoreEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, back);
    }
}
