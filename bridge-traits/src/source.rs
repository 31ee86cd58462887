//! Source and Fallback Catalog Abstractions
//!
//! `PlaylistSource` is the catalog that defines playlist membership (the
//! source of truth for a sync pass). `FallbackCatalog` is the unstructured
//! catalog tried for descriptors the licensed catalog could not resolve; it
//! has no standard identifier space, so it is searched by title and artist
//! text only and downloaded from directly.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// One playlist entry as described by the source catalog
///
/// Immutable once extracted; `position` is the track's index in the source
/// playlist snapshot and is carried through resolution so concurrent results
/// can be reordered deterministically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceTrack {
    pub title: String,
    pub album: String,
    /// Ordered artist names, primary artist first
    pub artists: Vec<String>,
    /// Standard recording identifier (e.g. ISRC), if the source exposes one
    pub isrc: Option<String>,
    /// Zero-based index in the playlist snapshot
    pub position: usize,
}

/// A playlist snapshot fetched from the source catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePlaylist {
    pub name: String,
    pub tracks: Vec<SourceTrack>,
}

impl SourcePlaylist {
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

/// Source-of-truth playlist catalog
#[async_trait]
pub trait PlaylistSource: Send + Sync {
    /// Fetch the playlist behind a share URL as an immutable snapshot
    ///
    /// # Errors
    ///
    /// Authentication failure is fatal for the pass; a malformed or missing
    /// playlist is reported as `BridgeError::OperationFailed`.
    async fn fetch_playlist(&self, url: &str) -> Result<SourcePlaylist>;
}

/// A track on the fallback catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackTrack {
    /// Catalog-local identifier
    pub id: String,
    pub title: String,
    /// Public page URL the audio can be fetched through
    pub permalink_url: String,
}

/// Last-resort unstructured catalog
///
/// No identifier search exists here; resolution is free-text only, and
/// acquisition goes through the track's public URL rather than a catalog
/// download endpoint.
#[async_trait]
pub trait FallbackCatalog: Send + Sync {
    /// Authenticate (or obtain an anonymous client token)
    async fn login(&self) -> Result<()>;

    /// Resolve a public share URL to a catalog playlist identifier
    async fn resolve_url(&self, url: &str) -> Result<String>;

    /// Fetch a playlist's track list by catalog identifier
    async fn fetch_playlist(&self, playlist_id: &str) -> Result<Vec<FallbackTrack>>;

    /// Free-text track search, best results first
    async fn search_tracks(&self, query: &str, limit: usize) -> Result<Vec<FallbackTrack>>;

    /// Download a track's audio into `dest_dir`, returning the written path
    async fn download(&self, permalink_url: &str, dest_dir: &Path) -> Result<PathBuf>;
}
