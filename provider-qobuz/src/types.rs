//! Qobuz API response types
//!
//! Only the fields the resolver consumes are modelled; everything else in
//! the responses is ignored. Track and artist identifiers are numeric on the
//! wire, album identifiers are strings.

use serde::Deserialize;

use bridge_traits::catalog::{CatalogAlbum, CatalogArtist, CatalogTrack};

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub user_auth_token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QobuzTrack {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub isrc: Option<String>,
    /// Credit string, e.g. `"Artist, MainArtist - Other, FeaturedArtist"`
    #[serde(default)]
    pub performers: Option<String>,
}

impl From<QobuzTrack> for CatalogTrack {
    fn from(track: QobuzTrack) -> Self {
        CatalogTrack {
            id: track.id.to_string(),
            title: track.title,
            isrc: track.isrc,
            performers: track.performers,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct QobuzAlbum {
    pub id: String,
    pub title: String,
}

impl From<QobuzAlbum> for CatalogAlbum {
    fn from(album: QobuzAlbum) -> Self {
        CatalogAlbum {
            id: album.id,
            title: album.title,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct QobuzArtist {
    pub id: u64,
    pub name: String,
}

impl From<QobuzArtist> for CatalogArtist {
    fn from(artist: QobuzArtist) -> Self {
        CatalogArtist {
            id: artist.id.to_string(),
            name: artist.name,
        }
    }
}

/// Paged item container used by every search endpoint
#[derive(Debug, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub struct TrackSearchResponse {
    pub tracks: Page<QobuzTrack>,
}

#[derive(Debug, Deserialize)]
pub struct AlbumSearchResponse {
    pub albums: Page<QobuzAlbum>,
}

#[derive(Debug, Deserialize)]
pub struct ArtistSearchResponse {
    pub artists: Page<QobuzArtist>,
}

/// `album/get` response, of which only the track list is consumed
#[derive(Debug, Deserialize)]
pub struct AlbumGetResponse {
    pub tracks: Page<QobuzTrack>,
}

/// One release group on an artist page (`type` is `"album"`, `"epSingle"`, …)
#[derive(Debug, Deserialize)]
pub struct ReleaseGroup {
    #[serde(rename = "type")]
    pub release_type: String,
    pub items: Vec<QobuzAlbum>,
}

#[derive(Debug, Deserialize)]
pub struct ArtistPageResponse {
    #[serde(default)]
    pub releases: Vec<ReleaseGroup>,
}

#[derive(Debug, Deserialize)]
pub struct FileUrlResponse {
    pub url: String,
    #[serde(default)]
    pub mime_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_track_search() {
        let json = r#"{
            "tracks": {
                "items": [
                    { "id": 52033401, "title": "Flim", "isrc": "GBAAA9700456", "performers": "Aphex Twin, MainArtist" }
                ]
            }
        }"#;

        let response: TrackSearchResponse = serde_json::from_str(json).unwrap();
        let track: CatalogTrack = response.tracks.items[0].clone().into();

        assert_eq!(track.id, "52033401");
        assert_eq!(track.isrc.as_deref(), Some("GBAAA9700456"));
    }

    #[test]
    fn test_deserialize_artist_page_releases() {
        let json = r#"{
            "releases": [
                { "type": "epSingle", "items": [] },
                { "type": "album", "items": [ { "id": "0825646121212", "title": "Syro" } ] }
            ]
        }"#;

        let response: ArtistPageResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.releases[1].release_type, "album");
        assert_eq!(response.releases[1].items[0].title, "Syro");
    }

    #[test]
    fn test_track_without_isrc_or_performers() {
        let json = r#"{ "id": 1, "title": "Song" }"#;
        let track: QobuzTrack = serde_json::from_str(json).unwrap();

        assert!(track.isrc.is_none());
        assert!(track.performers.is_none());
    }
}
