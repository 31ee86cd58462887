//! Descriptor and resolution outcome types
//!
//! A `TrackDescriptor` is one playlist entry as extracted from the source
//! catalog snapshot, immutable for the lifetime of the pass. Resolution
//! produces a tagged outcome: either a `ResolvedTrack` naming the target
//! catalog's identifier and the strategy that matched, or an
//! `UnresolvedTrack` retaining the catalog it failed in and why.

use bridge_traits::source::SourceTrack;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One source playlist entry, prior to resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackDescriptor {
    pub title: String,
    pub album: String,
    /// Ordered artist names, primary artist first
    pub artists: Vec<String>,
    /// Standard cross-catalog identifier (e.g. ISRC), if the source has one
    pub isrc: Option<String>,
    /// Index in the source playlist snapshot
    pub position: usize,
}

impl TrackDescriptor {
    /// Free-text query combining title and all artist names
    pub fn title_query(&self) -> String {
        format!("{} {}", self.title, self.artists.join(" "))
    }

    /// Free-text query combining album and all artist names
    pub fn album_query(&self) -> String {
        format!("{} {}", self.album, self.artists.join(" "))
    }

    /// Display label used in failure reports
    pub fn label(&self) -> String {
        format!("'{}' - {}", self.title, self.artists.join(", "))
    }

    /// Primary artist name, if any artist is listed
    pub fn primary_artist(&self) -> Option<&str> {
        self.artists.first().map(String::as_str)
    }
}

impl From<SourceTrack> for TrackDescriptor {
    fn from(track: SourceTrack) -> Self {
        Self {
            title: track.title,
            album: track.album,
            artists: track.artists,
            isrc: track.isrc,
            position: track.position,
        }
    }
}

/// Which cascade strategy produced a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchStrategy {
    /// Strategy 1: search by standard identifier, verified round-trip
    Identifier,
    /// Strategy 2: title + artists search with exact title match
    TitleArtists,
    /// Strategy 3: album + artists search, track located in the album
    AlbumArtists,
    /// Strategy 4: artist-discography walk
    ArtistDiscography,
    /// Fallback catalog free-text search
    FallbackSearch,
}

impl fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MatchStrategy::Identifier => "identifier",
            MatchStrategy::TitleArtists => "title+artists",
            MatchStrategy::AlbumArtists => "album+artists",
            MatchStrategy::ArtistDiscography => "artist-discography",
            MatchStrategy::FallbackSearch => "fallback-search",
        };
        f.write_str(name)
    }
}

/// A successfully resolved descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTrack {
    pub descriptor: TrackDescriptor,
    /// Track identifier in the resolving catalog
    pub catalog_id: String,
    /// Identifier the resolving catalog reports for this track; may differ
    /// from the descriptor's own identifier
    pub reported_id: String,
    /// Strategy that produced the match
    pub strategy: MatchStrategy,
    /// Public URL acquisition goes through, for catalogs without a
    /// download-by-id endpoint
    pub permalink: Option<String>,
}

/// A descriptor that exhausted every strategy of one catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedTrack {
    pub descriptor: TrackDescriptor,
    /// Catalog the failure happened in
    pub catalog: String,
    pub reason: String,
}

impl UnresolvedTrack {
    /// Report line retained for operator visibility
    pub fn report_line(&self) -> String {
        format!("{} - {}", self.catalog.to_uppercase(), self.descriptor.label())
    }
}

/// Outcome of resolving one descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(ResolvedTrack),
    Unresolved(UnresolvedTrack),
}

impl Resolution {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved(_))
    }

    /// Source position of the underlying descriptor
    pub fn position(&self) -> usize {
        match self {
            Resolution::Resolved(r) => r.descriptor.position,
            Resolution::Unresolved(u) => u.descriptor.position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor() -> TrackDescriptor {
        TrackDescriptor {
            title: "Windowlicker".to_string(),
            album: "Windowlicker EP".to_string(),
            artists: vec!["Aphex Twin".to_string(), "AFX".to_string()],
            isrc: Some("GBAAA9900123".to_string()),
            position: 4,
        }
    }

    #[test]
    fn test_queries_join_all_artists() {
        let d = descriptor();
        assert_eq!(d.title_query(), "Windowlicker Aphex Twin AFX");
        assert_eq!(d.album_query(), "Windowlicker EP Aphex Twin AFX");
    }

    #[test]
    fn test_report_line_names_catalog() {
        let unresolved = UnresolvedTrack {
            descriptor: descriptor(),
            catalog: "qobuz".to_string(),
            reason: "all strategies exhausted".to_string(),
        };

        assert_eq!(
            unresolved.report_line(),
            "QOBUZ - 'Windowlicker' - Aphex Twin, AFX"
        );
    }

    #[test]
    fn test_resolution_position_carried() {
        let resolution = Resolution::Unresolved(UnresolvedTrack {
            descriptor: descriptor(),
            catalog: "qobuz".to_string(),
            reason: "x".to_string(),
        });

        assert_eq!(resolution.position(), 4);
        assert!(!resolution.is_resolved());
    }
}
