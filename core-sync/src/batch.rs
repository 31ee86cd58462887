//! Batched, cursor-driven resolution of one playlist snapshot
//!
//! `advance` visits descriptors from the cursor's offset, skipping memory
//! matches and failing identifier-less descriptors without a network call,
//! until up to `limit` resolutions are in flight. The batch is joined with a
//! full barrier; nothing downstream starts until every task of the batch has
//! completed or failed. Repeated calls with the returned cursor walk the
//! whole playlist; the caller commits each batch before the next call, which
//! caps in-flight acquisitions to one batch and bounds loss on crash to one
//! uncommitted batch.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, instrument};

use core_resolver::progress::{NotFoundLog, SearchProgress};
use core_resolver::resolver::ResolveTrack;
use core_resolver::{Resolution, ResolvedTrack, TrackDescriptor, UnresolvedTrack};

use crate::error::Result;

/// Position of the next untried descriptor in a playlist snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchCursor {
    /// Index of the next descriptor not yet visited
    pub offset: usize,
    /// Maximum concurrent resolution requests per call
    pub limit: usize,
    /// True iff `offset` equals the playlist length
    pub done: bool,
}

impl BatchCursor {
    pub fn new(limit: usize) -> Self {
        Self {
            offset: 0,
            limit,
            done: false,
        }
    }
}

/// Everything one `advance` call produced
#[derive(Debug)]
pub struct BatchOutcome {
    /// Newly resolved descriptors, in source-playlist order
    pub resolved: Vec<ResolvedTrack>,
    /// Descriptors failed this call (identifier-less or cascade-exhausted),
    /// in source-playlist order
    pub failed: Vec<UnresolvedTrack>,
    /// Identifiers skipped because they were already in the memory set
    pub memory_matches: HashSet<String>,
    pub cursor: BatchCursor,
}

/// Drives resolution of one playlist in bounded concurrent batches
///
/// Generic over the [`ResolveTrack`] seam: the primary pass plugs in the
/// cascade resolver, the fallback chain its single-strategy resolver.
pub struct BatchSyncController {
    resolver: Arc<dyn ResolveTrack>,
    progress: Arc<SearchProgress>,
    /// The pass's not-found log; the resolver appends cascade misses, the
    /// controller appends failures that never reach the resolver
    not_found: Arc<NotFoundLog>,
    /// Whether a descriptor needs a standard identifier to be attempted at
    /// all. True for the licensed catalog (its cascade leans on it), false
    /// for the fallback catalog (free-text only).
    requires_identifier: bool,
}

impl BatchSyncController {
    pub fn new(
        resolver: Arc<dyn ResolveTrack>,
        progress: Arc<SearchProgress>,
        not_found: Arc<NotFoundLog>,
        requires_identifier: bool,
    ) -> Self {
        Self {
            resolver,
            progress,
            not_found,
            requires_identifier,
        }
    }

    /// Visit the next slice of the playlist
    ///
    /// The returned cursor's offset advances past every visited descriptor,
    /// memory matches and immediate failures included, not only successes.
    ///
    /// # Errors
    ///
    /// A fatal resolver error (authentication) aborts the whole batch; no
    /// partial result is returned. Recoverable per-descriptor errors are
    /// folded into `failed` with their reason.
    #[instrument(skip_all, fields(offset = cursor.offset, limit = cursor.limit))]
    pub async fn advance(
        &self,
        playlist: &[TrackDescriptor],
        memory: &crate::memory::MemorySet,
        cursor: BatchCursor,
    ) -> Result<BatchOutcome> {
        let mut memory_matches = HashSet::new();
        let mut failed = Vec::new();
        let mut pending: Vec<TrackDescriptor> = Vec::new();

        let mut next = cursor.offset;
        while pending.len() < cursor.limit && next < playlist.len() {
            let descriptor = &playlist[next];
            next += 1;

            match descriptor.isrc.as_deref() {
                Some(isrc) if memory.contains(isrc) => {
                    memory_matches.insert(isrc.to_string());
                    self.progress.record_found();
                    self.progress.emit();
                }
                None if self.requires_identifier => {
                    let unresolved = UnresolvedTrack {
                        descriptor: descriptor.clone(),
                        catalog: self.resolver.catalog_name().to_string(),
                        reason: "no standard identifier on source track".to_string(),
                    };
                    self.not_found.append(unresolved.clone());
                    failed.push(unresolved);
                    self.progress.record_failed();
                    self.progress.emit();
                }
                _ => pending.push(descriptor.clone()),
            }
        }

        // Full barrier: every task completes or fails before anything
        // downstream of this batch starts
        let results = join_all(
            pending
                .iter()
                .map(|d| self.resolver.resolve(d.clone())),
        )
        .await;

        let mut resolved = Vec::new();
        for (descriptor, result) in pending.into_iter().zip(results) {
            match result {
                Ok(Resolution::Resolved(track)) => resolved.push(track),
                Ok(Resolution::Unresolved(track)) => failed.push(track),
                Err(e) if e.is_fatal() => return Err(e.into()),
                Err(e) => {
                    self.progress.record_failed();
                    let unresolved = UnresolvedTrack {
                        descriptor,
                        catalog: self.resolver.catalog_name().to_string(),
                        reason: e.to_string(),
                    };
                    self.not_found.append(unresolved.clone());
                    failed.push(unresolved);
                }
            }
        }

        // Completion order of concurrent tasks is unspecified; the carried
        // source position restores a deterministic ordering
        resolved.sort_by_key(|t| t.descriptor.position);
        failed.sort_by_key(|t| t.descriptor.position);

        debug!(
            resolved = resolved.len(),
            failed = failed.len(),
            memory_matches = memory_matches.len(),
            "batch barrier complete"
        );

        Ok(BatchOutcome {
            resolved,
            failed,
            memory_matches,
            cursor: BatchCursor {
                offset: next,
                limit: cursor.limit,
                done: next == playlist.len(),
            },
        })
    }
}
