//! Licensed Catalog Abstraction
//!
//! The acquisition-side catalog the resolver searches against. The trait is
//! deliberately shaped around the resolution cascade: typed searches for
//! tracks, albums, and artists, plus the two detail lookups (album track list
//! and artist discography) the deeper cascade steps need.
//!
//! Identifier spaces are catalog-local. The only cross-catalog key is the
//! optional standard recording identifier (ISRC) carried on tracks; searches
//! by ISRC are fuzzy on some catalogs, so callers must verify the returned
//! track's own `isrc` before trusting a hit.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// A track as reported by the licensed catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogTrack {
    /// Catalog-local track identifier
    pub id: String,
    /// Track title as the catalog reports it
    pub title: String,
    /// Standard recording identifier reported by the catalog, if any
    pub isrc: Option<String>,
    /// Display string naming the performers, if the catalog provides one
    pub performers: Option<String>,
}

impl CatalogTrack {
    /// Whether any of the given artist names appears in the performer list
    pub fn credits_any_of(&self, artists: &[String]) -> bool {
        match &self.performers {
            Some(performers) => artists.iter().any(|a| performers.contains(a.as_str())),
            None => false,
        }
    }
}

/// An album as reported by the licensed catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogAlbum {
    pub id: String,
    pub title: String,
}

/// An artist as reported by the licensed catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogArtist {
    pub id: String,
    pub name: String,
}

/// Licensed catalog trait
///
/// Search results are ordered by the catalog's own relevance ranking; the
/// resolver only ever inspects the best result of each search, so
/// implementations should pass `limit` through to the remote API rather than
/// truncating locally.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::catalog::TrackCatalog;
///
/// async fn first_hit(catalog: &dyn TrackCatalog, isrc: &str) -> Result<Option<String>> {
///     let tracks = catalog.search_tracks(isrc, 1).await?;
///     Ok(tracks.into_iter().next().map(|t| t.id))
/// }
/// ```
#[async_trait]
pub trait TrackCatalog: Send + Sync {
    /// Authenticate against the catalog
    ///
    /// Must be called once before any search or download. Failure is fatal
    /// for the sync pass using this catalog.
    async fn login(&self) -> Result<()>;

    /// Search tracks by free-text query (title, artists, or a raw ISRC)
    async fn search_tracks(&self, query: &str, limit: usize) -> Result<Vec<CatalogTrack>>;

    /// Search albums by free-text query
    async fn search_albums(&self, query: &str, limit: usize) -> Result<Vec<CatalogAlbum>>;

    /// Search artists by name
    async fn search_artists(&self, query: &str, limit: usize) -> Result<Vec<CatalogArtist>>;

    /// Fetch the full track list of an album
    async fn album_tracks(&self, album_id: &str) -> Result<Vec<CatalogTrack>>;

    /// Fetch an artist's discography, album-type releases only
    async fn artist_albums(&self, artist_id: &str) -> Result<Vec<CatalogAlbum>>;

    /// Download one track into `dest_dir`, returning the written file path
    async fn download_track(&self, track_id: &str, dest_dir: &Path) -> Result<PathBuf>;
}
