//! Spotify API response types
//!
//! Playlist entries can be null on the wire (local files, removed markets);
//! the connector skips those rather than failing the snapshot.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
}

#[derive(Debug, Deserialize)]
pub struct PlaylistResponse {
    pub name: String,
    pub tracks: PlaylistTracksPage,
}

/// One page of playlist entries; `next` is a full URL or null on the last page
#[derive(Debug, Deserialize)]
pub struct PlaylistTracksPage {
    pub items: Vec<PlaylistItem>,
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PlaylistItem {
    pub track: Option<PlaylistTrack>,
}

#[derive(Debug, Deserialize)]
pub struct PlaylistTrack {
    pub name: String,
    pub album: AlbumRef,
    pub artists: Vec<ArtistRef>,
    #[serde(default)]
    pub external_ids: Option<ExternalIds>,
}

impl PlaylistTrack {
    pub fn isrc(&self) -> Option<String> {
        self.external_ids.as_ref().and_then(|ids| ids.isrc.clone())
    }
}

#[derive(Debug, Deserialize)]
pub struct AlbumRef {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ArtistRef {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ExternalIds {
    #[serde(default)]
    pub isrc: Option<String>,
}
