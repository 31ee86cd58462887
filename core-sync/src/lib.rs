//! # Playlist Sync Module
//!
//! Incremental, batched synchronization of a local audio library against
//! source-catalog playlists.
//!
//! ## Overview
//!
//! This module owns the sync state machine built on top of the resolution
//! cascade:
//! - Rebuilding local identity state from embedded tags (`scanner`)
//! - Cursor-driven batched resolution with a full per-batch barrier (`batch`)
//! - Per-batch commit: acquire, stamp identity, convert, clean staging
//!   (`commit`)
//! - Escalation of residual failures to the fallback catalog (`fallback`)
//! - Deletion of local files no longer backed by the source (`reconciler`)
//!
//! ## Components
//!
//! - **Memory model** (`memory`): `MemorySet` (what disk remembered),
//!   `ConfirmedSet` (what this pass re-established)
//! - **Scanner** (`scanner`): self-healing tag scan of one storage area
//! - **Batch Sync Controller** (`batch`): `advance` over a playlist snapshot
//! - **Commit Pipeline** (`commit`): the acquisition side of a batch
//! - **Fallback Chain** (`fallback`): synthetic-playlist escalation
//! - **Reconciler** (`reconciler`): memory-minus-confirmed deletion
//! - **Sync Coordinator** (`coordinator`): one playlist pass end to end

pub mod batch;
pub mod commit;
pub mod coordinator;
pub mod error;
pub mod fallback;
pub mod memory;
pub mod reconciler;
pub mod report;
pub mod scanner;

pub use batch::{BatchCursor, BatchOutcome, BatchSyncController};
pub use commit::{
    AcquireAudio, AreaDirs, CatalogAcquirer, CommitPipeline, FallbackAcquirer, IDENTITY_FIELD,
};
pub use coordinator::{PlaylistCache, SyncCoordinator};
pub use error::{Result, SyncError};
pub use fallback::FallbackChain;
pub use memory::{ConfirmedSet, LocalTrackRecord, MemorySet};
pub use reconciler::Reconciler;
pub use report::NotFoundReport;
pub use scanner::LibraryScanner;
