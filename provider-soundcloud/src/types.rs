//! SoundCloud v2 API response types

use serde::Deserialize;

use bridge_traits::source::FallbackTrack;

/// Any resolvable resource; only the numeric id is consumed
#[derive(Debug, Deserialize)]
pub struct ResolvedResource {
    pub id: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScTrack {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    /// Absent on stub entries inside large playlists
    #[serde(default)]
    pub permalink_url: Option<String>,
}

impl ScTrack {
    /// Convert to the bridge representation, or `None` for stub entries
    pub fn into_fallback(self) -> Option<FallbackTrack> {
        let permalink_url = self.permalink_url?;
        Some(FallbackTrack {
            id: self.id.to_string(),
            title: self.title,
            permalink_url,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct PlaylistResponse {
    pub tracks: Vec<ScTrack>,
}

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub collection: Vec<ScTrack>,
}

#[derive(Debug, Deserialize)]
pub struct TrackDetails {
    pub id: u64,
    pub media: Media,
}

#[derive(Debug, Deserialize)]
pub struct Media {
    pub transcodings: Vec<Transcoding>,
}

#[derive(Debug, Deserialize)]
pub struct Transcoding {
    pub url: String,
    pub format: TranscodingFormat,
}

#[derive(Debug, Deserialize)]
pub struct TranscodingFormat {
    pub protocol: String,
}

/// Response of a transcoding endpoint: the short-lived stream URL
#[derive(Debug, Deserialize)]
pub struct StreamResponse {
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stub_track_has_no_fallback_form() {
        let json = r#"{ "id": 9 }"#;
        let track: ScTrack = serde_json::from_str(json).unwrap();
        assert!(track.into_fallback().is_none());
    }

    #[test]
    fn test_full_track_converts() {
        let json = r#"{
            "id": 9,
            "title": "Song",
            "permalink_url": "https://soundcloud.com/a/song"
        }"#;
        let track: ScTrack = serde_json::from_str(json).unwrap();
        let fallback = track.into_fallback().unwrap();

        assert_eq!(fallback.id, "9");
        assert_eq!(fallback.permalink_url, "https://soundcloud.com/a/song");
    }

    #[test]
    fn test_deserialize_transcodings() {
        let json = r#"{
            "id": 9,
            "media": {
                "transcodings": [
                    { "url": "https://api.example.com/hls", "format": { "protocol": "hls" } },
                    { "url": "https://api.example.com/prog", "format": { "protocol": "progressive" } }
                ]
            }
        }"#;

        let details: TrackDetails = serde_json::from_str(json).unwrap();
        assert_eq!(details.media.transcodings[1].format.protocol, "progressive");
    }
}
