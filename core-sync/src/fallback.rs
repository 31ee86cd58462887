//! Escalation of primary-catalog failures to the fallback catalog
//!
//! Failed descriptors are packaged into a synthetic playlist and driven
//! through an ordinary batch controller, with two differences: the resolver
//! is the fallback catalog's single free-text strategy, and the storage
//! area is the playlist's dedicated fallback subtree with its own memory
//! set. The isolation matters: the two catalogs' identifier spaces can
//! collide, and a shared set would let reconciliation of one area delete
//! files of the other.

use std::sync::Arc;

use tracing::{info, instrument};

use bridge_traits::source::FallbackCatalog;
use core_resolver::progress::{NotFoundLog, SearchProgress};
use core_resolver::resolver::FallbackTrackResolver;
use core_resolver::{TrackDescriptor, UnresolvedTrack};
use core_runtime::events::{CoreEvent, EventBus, SyncEvent};

use crate::batch::{BatchCursor, BatchSyncController};
use crate::commit::{AreaDirs, CommitPipeline, FallbackAcquirer};
use crate::error::Result;
use crate::memory::{ConfirmedSet, MemorySet};

pub struct FallbackChain {
    catalog: Arc<dyn FallbackCatalog>,
    catalog_name: String,
    event_bus: EventBus,
}

impl FallbackChain {
    pub fn new(
        catalog: Arc<dyn FallbackCatalog>,
        catalog_name: impl Into<String>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            catalog,
            catalog_name: catalog_name.into(),
            event_bus,
        }
    }

    /// Resolve and acquire what the primary catalog could not
    ///
    /// Returns the fallback area's confirmed set and the doubly-failed
    /// descriptors, which are final.
    #[instrument(skip_all, fields(playlist = %playlist, descriptors = failed.len()))]
    pub async fn escalate(
        &self,
        failed: Vec<UnresolvedTrack>,
        playlist: &str,
        memory: &MemorySet,
        pipeline: &CommitPipeline,
        area: &AreaDirs,
        batch_limit: usize,
    ) -> Result<(ConfirmedSet, Vec<UnresolvedTrack>)> {
        if failed.is_empty() {
            return Ok((ConfirmedSet::new(), Vec::new()));
        }

        self.event_bus
            .emit(CoreEvent::Sync(SyncEvent::FallbackStarted {
                playlist: playlist.to_string(),
                descriptors: failed.len(),
            }))
            .ok();

        self.catalog.login().await?;

        // Synthetic playlist: positions reindexed so batch ordering is
        // deterministic within the escalation
        let synthetic: Vec<TrackDescriptor> = failed
            .into_iter()
            .enumerate()
            .map(|(position, u)| TrackDescriptor {
                position,
                ..u.descriptor
            })
            .collect();

        let progress = Arc::new(SearchProgress::new(
            playlist,
            synthetic.len(),
            self.event_bus.clone(),
        ));
        let not_found = Arc::new(NotFoundLog::new());
        let resolver = FallbackTrackResolver::new(
            Arc::clone(&self.catalog),
            self.catalog_name.clone(),
            Arc::clone(&progress),
            Arc::clone(&not_found),
        );
        let controller = BatchSyncController::new(
            Arc::new(resolver),
            Arc::clone(&progress),
            Arc::clone(&not_found),
            false,
        );
        let acquirer = FallbackAcquirer::new(Arc::clone(&self.catalog));

        let mut confirmed = ConfirmedSet::new();
        let mut cursor = BatchCursor::new(batch_limit);

        loop {
            let outcome = controller.advance(&synthetic, memory, cursor).await?;
            for identifier in &outcome.memory_matches {
                confirmed.insert(identifier.clone());
            }
            pipeline
                .commit(&acquirer, &outcome.resolved, memory, &mut confirmed, area)
                .await?;

            cursor = outcome.cursor;
            if cursor.done {
                break;
            }
        }

        let mut doubly_failed = not_found.drain();
        doubly_failed.sort_by_key(|u| u.descriptor.position);

        info!(
            confirmed = confirmed.len(),
            doubly_failed = doubly_failed.len(),
            "fallback escalation complete"
        );
        Ok((confirmed, doubly_failed))
    }
}
