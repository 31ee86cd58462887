//! # Sync Coordinator
//!
//! Drives one full sync pass per configured playlist, strictly one playlist
//! at a time.
//!
//! ## Pass workflow
//!
//! 1. Bootstrap the playlist's directory tree and authenticate against the
//!    licensed catalog
//! 2. Scan each storage area into a memory set, once per playlist
//! 3. Per source URL: fetch the snapshot (run-scoped cache, keyed by URL),
//!    then batch loop: `advance` → commit (acquire, tag, convert, clean
//!    staging) until the cursor is done, then escalate residual failures
//!    through the fallback chain into the isolated fallback area
//! 4. Reconcile both areas against their confirmed sets, once per playlist
//! 5. Report doubly-failed tracks and publish the pass outcome
//!
//! Several sources can feed one playlist area, so confirmation accumulates
//! across all of a playlist's sources and reconciliation runs only after the
//! last one; otherwise a later source's pass would delete what an earlier
//! source acquired.
//!
//! A fatal error (authentication, configuration) aborts the pass for that
//! source; the playlist's remaining sources and the remaining playlists
//! still run, but a playlist with a failed source is not reconciled (the
//! failed source confirmed nothing, so deletion would be unsafe).
//! Recoverable failures never abort anything; they flow through escalation
//! into the final report.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{error, info, instrument};

use bridge_traits::catalog::TrackCatalog;
use bridge_traits::media::{AudioConverter, TagAccessor};
use bridge_traits::source::{FallbackCatalog, PlaylistSource, SourcePlaylist};
use core_resolver::progress::{NotFoundLog, SearchProgress};
use core_resolver::resolver::TrackResolver;
use core_resolver::{TrackDescriptor, UnresolvedTrack};
use core_runtime::config::SyncSettings;
use core_runtime::events::{CoreEvent, EventBus, SyncEvent};

use crate::batch::{BatchCursor, BatchSyncController};
use crate::commit::{AreaDirs, CatalogAcquirer, CommitPipeline};
use crate::error::Result;
use crate::fallback::FallbackChain;
use crate::memory::{ConfirmedSet, MemorySet};
use crate::reconciler::Reconciler;
use crate::report::NotFoundReport;
use crate::scanner::LibraryScanner;

/// Directory name of the primary-format copies inside a playlist tree
const PRIMARY_FORMAT_DIR: &str = "AIFF";
/// Directory name of the duplicate-format copies
const DUPLICATE_FORMAT_DIR: &str = "MP3";
/// Subtree holding fallback-catalog acquisitions, isolated from the primary
const FALLBACK_DIR: &str = "fallback";

/// Run-scoped source playlist cache, keyed by source URL
///
/// An explicit object handed down by the run loop; it dies with the run, so
/// two runs never see each other's snapshots.
#[derive(Default)]
pub struct PlaylistCache {
    entries: HashMap<String, SourcePlaylist>,
}

impl PlaylistCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_or_fetch(
        &mut self,
        source: &dyn PlaylistSource,
        url: &str,
    ) -> Result<SourcePlaylist> {
        if let Some(playlist) = self.entries.get(url) {
            return Ok(playlist.clone());
        }

        let playlist = source.fetch_playlist(url).await?;
        self.entries.insert(url.to_string(), playlist.clone());
        Ok(playlist)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Directory tree of one playlist: primary area plus fallback subtree
struct PlaylistLayout {
    primary: AreaDirs,
    fallback: AreaDirs,
}

impl PlaylistLayout {
    fn new(settings: &SyncSettings, playlist: &str) -> Self {
        let root = settings.playlist_dir(playlist);
        let fallback_root = root.join(FALLBACK_DIR);
        Self {
            primary: Self::area(&root, settings.mp3_copy),
            fallback: Self::area(&fallback_root, settings.mp3_copy),
        }
    }

    fn area(root: &std::path::Path, mp3_copy: bool) -> AreaDirs {
        AreaDirs {
            primary: root.join(PRIMARY_FORMAT_DIR),
            duplicate: mp3_copy.then(|| root.join(DUPLICATE_FORMAT_DIR)),
        }
    }

    async fn bootstrap(&self) -> Result<()> {
        for area in [&self.primary, &self.fallback] {
            tokio::fs::create_dir_all(&area.primary).await?;
            if let Some(dup) = &area.duplicate {
                tokio::fs::create_dir_all(dup).await?;
            }
        }
        Ok(())
    }
}

pub struct SyncCoordinator {
    settings: SyncSettings,
    source: Arc<dyn PlaylistSource>,
    catalog: Arc<dyn TrackCatalog>,
    catalog_name: String,
    fallback: FallbackChain,
    scanner: LibraryScanner,
    pipeline: CommitPipeline,
    reconciler: Reconciler,
    event_bus: EventBus,
}

impl SyncCoordinator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        settings: SyncSettings,
        source: Arc<dyn PlaylistSource>,
        catalog: Arc<dyn TrackCatalog>,
        catalog_name: impl Into<String>,
        fallback_catalog: Arc<dyn FallbackCatalog>,
        fallback_name: impl Into<String>,
        tags: Arc<dyn TagAccessor>,
        converter: Arc<dyn AudioConverter>,
        duplicate_converter: Option<Arc<dyn AudioConverter>>,
        event_bus: EventBus,
    ) -> Self {
        let staging: PathBuf = settings.staging_dir.clone();
        Self {
            fallback: FallbackChain::new(fallback_catalog, fallback_name, event_bus.clone()),
            scanner: LibraryScanner::new(Arc::clone(&tags)),
            pipeline: CommitPipeline::new(tags, converter, duplicate_converter, staging),
            reconciler: Reconciler,
            settings,
            source,
            catalog,
            catalog_name: catalog_name.into(),
            event_bus,
        }
    }

    /// Sync every configured playlist, one at a time
    ///
    /// A pass that fails fatally is reported via `PassFailed` and skipped;
    /// the remaining playlists still run.
    pub async fn run(&self) -> Result<()> {
        let mut cache = PlaylistCache::new();

        for (playlist, sources) in &self.settings.playlists {
            if let Err(e) = self.sync_playlist(playlist, sources, &mut cache).await {
                error!(playlist, error = %e, "sync pass failed");
                self.event_bus
                    .emit(CoreEvent::Sync(SyncEvent::PassFailed {
                        playlist: playlist.clone(),
                        message: e.to_string(),
                    }))
                    .ok();
            }
        }

        Ok(())
    }

    /// One full pass of one playlist across all of its source URLs
    ///
    /// Each storage area is scanned once and reconciled once; every source
    /// confirms into the same sets, so no source's pass can delete another
    /// source's files.
    #[instrument(skip_all, fields(playlist = %playlist))]
    pub async fn sync_playlist(
        &self,
        playlist: &str,
        sources: &BTreeMap<String, String>,
        cache: &mut PlaylistCache,
    ) -> Result<()> {
        let layout = PlaylistLayout::new(&self.settings, playlist);
        layout.bootstrap().await?;

        self.catalog.login().await?;

        let memory = self.scanner.scan(&layout.primary.primary).await?;
        let fallback_memory = self.scanner.scan(&layout.fallback.primary).await?;

        let mut confirmed = ConfirmedSet::new();
        let mut fallback_confirmed = ConfirmedSet::new();
        let mut doubly_failed = Vec::new();
        let mut total = 0usize;
        let mut failed_sources = 0usize;

        for url in sources.values() {
            match self
                .sync_source(
                    playlist,
                    url,
                    cache,
                    &layout,
                    &memory,
                    &fallback_memory,
                    &mut confirmed,
                    &mut fallback_confirmed,
                )
                .await
            {
                Ok((descriptors, mut unresolved)) => {
                    total += descriptors;
                    doubly_failed.append(&mut unresolved);
                }
                Err(e) => {
                    failed_sources += 1;
                    error!(playlist, url, error = %e, "source pass failed");
                    self.event_bus
                        .emit(CoreEvent::Sync(SyncEvent::PassFailed {
                            playlist: playlist.to_string(),
                            message: e.to_string(),
                        }))
                        .ok();
                }
            }
        }

        // A failed source confirmed nothing, so its files would all look
        // stale; deletion is only safe after a fully-confirmed pass
        if failed_sources > 0 {
            info!(playlist, failed_sources, "reconciliation skipped");
            return Ok(());
        }

        let deleted = self
            .reconciler
            .reconcile(&memory, &confirmed, layout.primary.duplicate.as_deref())
            .await?;
        self.event_bus
            .emit(CoreEvent::Sync(SyncEvent::Reconciled {
                playlist: playlist.to_string(),
                area: "primary".to_string(),
                deleted,
            }))
            .ok();

        let fallback_deleted = self
            .reconciler
            .reconcile(
                &fallback_memory,
                &fallback_confirmed,
                layout.fallback.duplicate.as_deref(),
            )
            .await?;
        self.event_bus
            .emit(CoreEvent::Sync(SyncEvent::Reconciled {
                playlist: playlist.to_string(),
                area: "fallback".to_string(),
                deleted: fallback_deleted,
            }))
            .ok();

        let report = NotFoundReport::new(doubly_failed);
        report.log(playlist);

        let resolved = total.saturating_sub(report.len());
        info!(
            playlist,
            resolved,
            unresolved = report.len(),
            deleted = deleted + fallback_deleted,
            "sync pass complete"
        );
        self.event_bus
            .emit(CoreEvent::Sync(SyncEvent::PassCompleted {
                playlist: playlist.to_string(),
                resolved,
                unresolved: report.len(),
            }))
            .ok();

        Ok(())
    }

    /// Resolve and commit one source URL's snapshot into the playlist areas
    ///
    /// Returns the snapshot's descriptor count and the descriptors both
    /// catalogs failed on.
    #[allow(clippy::too_many_arguments)]
    async fn sync_source(
        &self,
        playlist: &str,
        url: &str,
        cache: &mut PlaylistCache,
        layout: &PlaylistLayout,
        memory: &MemorySet,
        fallback_memory: &MemorySet,
        confirmed: &mut ConfirmedSet,
        fallback_confirmed: &mut ConfirmedSet,
    ) -> Result<(usize, Vec<UnresolvedTrack>)> {
        let snapshot = cache.get_or_fetch(self.source.as_ref(), url).await?;
        let descriptors: Vec<TrackDescriptor> =
            snapshot.tracks.into_iter().map(Into::into).collect();

        self.event_bus
            .emit(CoreEvent::Sync(SyncEvent::PassStarted {
                playlist: playlist.to_string(),
                total: descriptors.len(),
            }))
            .ok();

        let progress = Arc::new(SearchProgress::new(
            playlist,
            descriptors.len(),
            self.event_bus.clone(),
        ));
        let not_found = Arc::new(NotFoundLog::new());
        // Cleared exactly once per source pass, never per batch
        not_found.reset();

        let resolver = TrackResolver::new(
            Arc::clone(&self.catalog),
            self.catalog_name.clone(),
            Arc::clone(&progress),
            Arc::clone(&not_found),
        );
        let controller = BatchSyncController::new(
            Arc::new(resolver),
            Arc::clone(&progress),
            Arc::clone(&not_found),
            true,
        );
        let acquirer = CatalogAcquirer::new(Arc::clone(&self.catalog));

        let mut cursor = BatchCursor::new(self.settings.batch_limit);

        loop {
            let outcome = controller.advance(&descriptors, memory, cursor).await?;
            for identifier in &outcome.memory_matches {
                confirmed.insert(identifier.clone());
            }
            self.pipeline
                .commit(
                    &acquirer,
                    &outcome.resolved,
                    memory,
                    confirmed,
                    &layout.primary,
                )
                .await?;

            self.event_bus
                .emit(CoreEvent::Sync(SyncEvent::BatchCompleted {
                    playlist: playlist.to_string(),
                    offset: outcome.cursor.offset,
                    resolved: outcome.resolved.len(),
                    memory_matches: outcome.memory_matches.len(),
                    failed: outcome.failed.len(),
                }))
                .ok();

            cursor = outcome.cursor;
            if cursor.done {
                break;
            }
        }

        // Everything the primary catalog could not resolve, in source order
        let mut escalation = not_found.drain();
        escalation.sort_by_key(|u| u.descriptor.position);

        let (fallback_set, doubly_failed) = self
            .fallback
            .escalate(
                escalation,
                playlist,
                fallback_memory,
                &self.pipeline,
                &layout.fallback,
                self.settings.batch_limit,
            )
            .await?;
        fallback_confirmed.merge(fallback_set);

        Ok((descriptors.len(), doubly_failed))
    }
}
