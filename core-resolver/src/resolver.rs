//! The strategy cascade over a licensed catalog handle
//!
//! `TrackResolver` runs the four ordered strategies against a
//! [`TrackCatalog`]; `FallbackTrackResolver` runs the single free-text
//! strategy a [`FallbackCatalog`] supports. Both implement [`ResolveTrack`]
//! so the batch controller stays generic over which catalog a pass is
//! resolving into.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument};

use bridge_traits::catalog::{CatalogTrack, TrackCatalog};
use bridge_traits::source::FallbackCatalog;

use crate::descriptor::{
    MatchStrategy, Resolution, ResolvedTrack, TrackDescriptor, UnresolvedTrack,
};
use crate::error::Result;
use crate::matching::{find_track_by_title, select_album};
use crate::progress::{NotFoundLog, SearchProgress};

/// Catalog searches only ever inspect the best result
const BEST_RESULT: usize = 1;

/// Resolution of one descriptor against one catalog
///
/// Implementations must be cheap to share behind `Arc` because a batch
/// spawns one concurrent call per descriptor.
#[async_trait]
pub trait ResolveTrack: Send + Sync {
    /// Name of the catalog this resolver searches, used in failure reasons
    fn catalog_name(&self) -> &str;

    /// Resolve one descriptor, first matching strategy wins
    ///
    /// `Ok(Resolution::Unresolved(..))` is a recoverable per-descriptor
    /// miss; `Err` is reserved for catalog-level failures.
    async fn resolve(&self, descriptor: TrackDescriptor) -> Result<Resolution>;
}

/// The four-strategy cascade against the licensed catalog
pub struct TrackResolver {
    catalog: Arc<dyn TrackCatalog>,
    catalog_name: String,
    progress: Arc<SearchProgress>,
    not_found: Arc<NotFoundLog>,
}

impl TrackResolver {
    pub fn new(
        catalog: Arc<dyn TrackCatalog>,
        catalog_name: impl Into<String>,
        progress: Arc<SearchProgress>,
        not_found: Arc<NotFoundLog>,
    ) -> Self {
        Self {
            catalog,
            catalog_name: catalog_name.into(),
            progress,
            not_found,
        }
    }

    /// Identifier the catalog reports for the matched track
    ///
    /// Falls back to the descriptor's own identifier when the catalog omits
    /// one, then to the catalog-local track id as a last resort.
    fn reported_id(track: &CatalogTrack, descriptor: &TrackDescriptor) -> String {
        track
            .isrc
            .clone()
            .or_else(|| descriptor.isrc.clone())
            .unwrap_or_else(|| track.id.clone())
    }

    fn resolved(
        descriptor: TrackDescriptor,
        track: &CatalogTrack,
        strategy: MatchStrategy,
    ) -> Resolution {
        let reported_id = Self::reported_id(track, &descriptor);
        Resolution::Resolved(ResolvedTrack {
            descriptor,
            catalog_id: track.id.clone(),
            reported_id,
            strategy,
            permalink: None,
        })
    }

    /// Strategy 1: identifier search, round-trip verified
    ///
    /// Catalog identifier search is fuzzy; a hit is trusted only when the
    /// best result reports the queried identifier back verbatim.
    async fn by_identifier(&self, descriptor: &TrackDescriptor) -> Result<Option<CatalogTrack>> {
        let Some(isrc) = descriptor.isrc.as_deref() else {
            return Ok(None);
        };

        let tracks = self.catalog.search_tracks(isrc, BEST_RESULT).await?;
        Ok(tracks
            .into_iter()
            .next()
            .filter(|t| t.isrc.as_deref() == Some(isrc)))
    }

    /// Strategy 2: title + artists search, exact title and performer overlap
    async fn by_title_artists(&self, descriptor: &TrackDescriptor) -> Result<Option<CatalogTrack>> {
        let tracks = self
            .catalog
            .search_tracks(&descriptor.title_query(), BEST_RESULT)
            .await?;
        Ok(tracks
            .into_iter()
            .next()
            .filter(|t| t.title == descriptor.title && t.credits_any_of(&descriptor.artists)))
    }

    /// Strategy 3: album + artists search, then track lookup in the album
    async fn by_album_artists(&self, descriptor: &TrackDescriptor) -> Result<Option<CatalogTrack>> {
        let albums = self
            .catalog
            .search_albums(&descriptor.album_query(), BEST_RESULT)
            .await?;
        let Some(album) = albums.into_iter().next().filter(|a| a.title == descriptor.album)
        else {
            return Ok(None);
        };

        self.track_in_album(&album.id, &descriptor.title).await
    }

    /// Strategy 4: artist search, discography walk, album select, track lookup
    async fn by_artist_discography(
        &self,
        descriptor: &TrackDescriptor,
    ) -> Result<Option<CatalogTrack>> {
        let Some(artist) = descriptor.primary_artist() else {
            return Ok(None);
        };

        let artists = self.catalog.search_artists(artist, BEST_RESULT).await?;
        let Some(artist) = artists.into_iter().next() else {
            return Ok(None);
        };

        let albums = self.catalog.artist_albums(&artist.id).await?;
        let Some(album) = select_album(&albums, &descriptor.album) else {
            return Ok(None);
        };

        self.track_in_album(&album.id, &descriptor.title).await
    }

    async fn track_in_album(&self, album_id: &str, title: &str) -> Result<Option<CatalogTrack>> {
        let tracks = self.catalog.album_tracks(album_id).await?;
        Ok(find_track_by_title(&tracks, title).cloned())
    }
}

#[async_trait]
impl ResolveTrack for TrackResolver {
    fn catalog_name(&self) -> &str {
        &self.catalog_name
    }

    #[instrument(skip(self, descriptor), fields(track = %descriptor.label()))]
    async fn resolve(&self, descriptor: TrackDescriptor) -> Result<Resolution> {
        // Emits one progress snapshot on every exit path, including `?`
        let _refresh = self.progress.guard();

        let strategies = [
            MatchStrategy::Identifier,
            MatchStrategy::TitleArtists,
            MatchStrategy::AlbumArtists,
            MatchStrategy::ArtistDiscography,
        ];

        for strategy in strategies {
            let hit = match strategy {
                MatchStrategy::Identifier => self.by_identifier(&descriptor).await?,
                MatchStrategy::TitleArtists => self.by_title_artists(&descriptor).await?,
                MatchStrategy::AlbumArtists => self.by_album_artists(&descriptor).await?,
                MatchStrategy::ArtistDiscography => self.by_artist_discography(&descriptor).await?,
                MatchStrategy::FallbackSearch => None,
            };

            if let Some(track) = hit {
                debug!(strategy = %strategy, track_id = %track.id, "resolved");
                self.progress.record_found();
                return Ok(Self::resolved(descriptor, &track, strategy));
            }
        }

        debug!("all strategies exhausted");
        self.progress.record_failed();
        let unresolved = UnresolvedTrack {
            descriptor,
            catalog: self.catalog_name.clone(),
            reason: "all strategies exhausted".to_string(),
        };
        self.not_found.append(unresolved.clone());
        Ok(Resolution::Unresolved(unresolved))
    }
}

/// Single-strategy resolver over the fallback catalog
///
/// The fallback catalog has no identifier space, so the only strategy is a
/// free-text title + artists search whose best result is taken as-is.
pub struct FallbackTrackResolver {
    catalog: Arc<dyn FallbackCatalog>,
    catalog_name: String,
    progress: Arc<SearchProgress>,
    not_found: Arc<NotFoundLog>,
}

impl FallbackTrackResolver {
    pub fn new(
        catalog: Arc<dyn FallbackCatalog>,
        catalog_name: impl Into<String>,
        progress: Arc<SearchProgress>,
        not_found: Arc<NotFoundLog>,
    ) -> Self {
        Self {
            catalog,
            catalog_name: catalog_name.into(),
            progress,
            not_found,
        }
    }
}

#[async_trait]
impl ResolveTrack for FallbackTrackResolver {
    fn catalog_name(&self) -> &str {
        &self.catalog_name
    }

    #[instrument(skip(self, descriptor), fields(track = %descriptor.label()))]
    async fn resolve(&self, descriptor: TrackDescriptor) -> Result<Resolution> {
        let _refresh = self.progress.guard();

        let tracks = self
            .catalog
            .search_tracks(&descriptor.title_query(), BEST_RESULT)
            .await?;

        if let Some(track) = tracks.into_iter().next() {
            debug!(track_id = %track.id, "resolved on fallback catalog");
            self.progress.record_found();
            return Ok(Resolution::Resolved(ResolvedTrack {
                descriptor,
                catalog_id: track.id.clone(),
                reported_id: track.id,
                strategy: MatchStrategy::FallbackSearch,
                permalink: Some(track.permalink_url),
            }));
        }

        debug!("no fallback result");
        self.progress.record_failed();
        let unresolved = UnresolvedTrack {
            descriptor,
            catalog: self.catalog_name.clone(),
            reason: "no search result".to_string(),
        };
        self.not_found.append(unresolved.clone());
        Ok(Resolution::Unresolved(unresolved))
    }
}
