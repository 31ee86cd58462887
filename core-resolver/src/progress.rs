//! Shared progress accounting and the per-pass not-found log
//!
//! Both structures are appended to concurrently by the resolution tasks of a
//! batch. They are monotonic, so concurrent write order never changes the
//! final content; the only ordering rule is that the not-found log is reset
//! exactly once per sync pass, never per batch or per task.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use core_runtime::events::{CoreEvent, EventBus, SyncEvent};

use crate::descriptor::UnresolvedTrack;

/// Live found/failed counters for one sync pass
///
/// Every visited descriptor bumps exactly one counter and triggers exactly
/// one snapshot emission, on every exit path, via [`ProgressGuard`].
pub struct SearchProgress {
    playlist: String,
    total: usize,
    found: AtomicUsize,
    failed: AtomicUsize,
    event_bus: EventBus,
}

impl SearchProgress {
    pub fn new(playlist: impl Into<String>, total: usize, event_bus: EventBus) -> Self {
        Self {
            playlist: playlist.into(),
            total,
            found: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
            event_bus,
        }
    }

    pub fn record_found(&self) {
        self.found.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn found(&self) -> usize {
        self.found.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::Relaxed)
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Publish the current snapshot to subscribers
    ///
    /// No-subscriber send errors are ignored: progress is advisory.
    pub fn emit(&self) {
        self.event_bus
            .emit(CoreEvent::Sync(SyncEvent::SearchProgress {
                playlist: self.playlist.clone(),
                found: self.found(),
                failed: self.failed(),
                total: self.total,
            }))
            .ok();
    }

    /// Guard whose drop emits one snapshot, on every exit path
    pub fn guard(self: &Arc<Self>) -> ProgressGuard {
        ProgressGuard {
            progress: Arc::clone(self),
        }
    }
}

/// Scoped progress-refresh guard
///
/// Created at the top of one descriptor's resolution; dropping it publishes
/// the snapshot whether the task returned a match, a miss, or an error.
pub struct ProgressGuard {
    progress: Arc<SearchProgress>,
}

impl Drop for ProgressGuard {
    fn drop(&mut self) {
        self.progress.emit();
    }
}

/// Per-pass accumulation of descriptors no strategy could resolve
///
/// Append-only during batches; drained once at the end of the pass when the
/// fallback chain takes over. `reset` is the coordinator's responsibility,
/// once per pass.
#[derive(Default)]
pub struct NotFoundLog {
    entries: Mutex<Vec<UnresolvedTrack>>,
}

impl NotFoundLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the log; called exactly once per sync pass, before any batch
    pub fn reset(&self) {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }

    pub fn append(&self, entry: UnresolvedTrack) {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Take all entries, leaving the log empty
    pub fn drain(&self) -> Vec<UnresolvedTrack> {
        std::mem::take(&mut *self.entries.lock().unwrap_or_else(|e| e.into_inner()))
    }
}
