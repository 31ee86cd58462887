//! Spotify playlist connector
//!
//! Implements [`PlaylistSource`] over the Spotify Web API using the
//! client-credentials grant, which is sufficient for reading public
//! playlists. The access token is requested lazily on the first fetch and
//! reused for the life of the connector.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use bridge_traits::error::Result as BridgeResult;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
use bridge_traits::source::{PlaylistSource, SourcePlaylist, SourceTrack};
use core_runtime::config::SourceCredentials;

use crate::error::{Result, SpotifyError};
use crate::types::{PlaylistResponse, PlaylistTracksPage, TokenResponse};

const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const API_BASE_URL: &str = "https://api.spotify.com/v1";

/// Spotify playlist connector
pub struct SpotifyConnector {
    http: Arc<dyn HttpClient>,
    credentials: SourceCredentials,
    access_token: RwLock<Option<String>>,
}

impl SpotifyConnector {
    pub fn new(http: Arc<dyn HttpClient>, credentials: SourceCredentials) -> Self {
        Self {
            http,
            credentials,
            access_token: RwLock::new(None),
        }
    }

    /// Extract the playlist id from a share URL
    ///
    /// Share URLs look like
    /// `https://open.spotify.com/playlist/<id>?si=...`; anything without a
    /// `playlist/` path segment is rejected.
    fn playlist_id(url: &str) -> Result<&str> {
        let rest = url
            .split_once("playlist/")
            .map(|(_, rest)| rest)
            .ok_or_else(|| SpotifyError::InvalidPlaylistUrl(url.to_string()))?;

        let id = rest
            .split(|c| c == '?' || c == '/')
            .next()
            .unwrap_or_default();
        if id.is_empty() {
            return Err(SpotifyError::InvalidPlaylistUrl(url.to_string()));
        }
        Ok(id)
    }

    async fn token(&self) -> Result<String> {
        {
            let guard = self.access_token.read().await;
            if let Some(token) = guard.as_ref() {
                return Ok(token.clone());
            }
        }

        let request = HttpRequest::new(HttpMethod::Post, TOKEN_URL).form(&[
            ("grant_type", "client_credentials"),
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
        ]);

        let response = self.http.execute(request).await?;
        if !response.is_success() {
            return Err(SpotifyError::AuthenticationFailed(format!(
                "token request rejected with status {}",
                response.status
            )));
        }

        let parsed: TokenResponse = response
            .json()
            .map_err(|e| SpotifyError::ParseError(e.to_string()))?;

        let mut guard = self.access_token.write().await;
        *guard = Some(parsed.access_token.clone());
        debug!("Spotify access token obtained");
        Ok(parsed.access_token)
    }

    async fn api_get(&self, url: &str, token: &str) -> Result<HttpResponse> {
        let request = HttpRequest::get(url).bearer_token(token);
        let response = self
            .http
            .execute_with_retry(request, RetryPolicy::default())
            .await?;

        if !response.is_success() {
            return Err(SpotifyError::ApiError {
                status_code: response.status,
                message: response.text().unwrap_or_default(),
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl PlaylistSource for SpotifyConnector {
    #[instrument(skip(self))]
    async fn fetch_playlist(&self, url: &str) -> BridgeResult<SourcePlaylist> {
        let playlist_id = Self::playlist_id(url)?;
        let token = self.token().await?;

        let response = self
            .api_get(&format!("{}/playlists/{}", API_BASE_URL, playlist_id), &token)
            .await?;
        let first: PlaylistResponse = response
            .json()
            .map_err(|e| SpotifyError::ParseError(e.to_string()))?;

        let mut tracks = Vec::new();
        let mut page = first.tracks;
        loop {
            for item in page.items {
                // Local files and region-removed tracks come through as null
                let Some(entry) = item.track else { continue };
                tracks.push(SourceTrack {
                    isrc: entry.isrc(),
                    title: entry.name,
                    album: entry.album.name,
                    artists: entry.artists.into_iter().map(|a| a.name).collect(),
                    position: tracks.len(),
                });
            }

            let Some(next) = page.next else { break };
            let response = self.api_get(&next, &token).await?;
            page = response
                .json::<PlaylistTracksPage>()
                .map_err(|e| SpotifyError::ParseError(e.to_string()))?;
        }

        debug!(playlist = %first.name, tracks = tracks.len(), "playlist snapshot fetched");
        Ok(SourcePlaylist {
            name: first.name,
            tracks,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::error::BridgeError;
    use bytes::Bytes;
    use mockall::mock;
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};

    mock! {
        Http {}

        #[async_trait]
        impl HttpClient for Http {
            async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
            async fn execute_with_retry(
                &self,
                request: HttpRequest,
                policy: RetryPolicy,
            ) -> BridgeResult<HttpResponse>;
            async fn download_to_file(
                &self,
                request: HttpRequest,
                dest: &Path,
            ) -> BridgeResult<PathBuf>;
        }
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: HashMap::new(),
            body: Bytes::from(body.to_string()),
        }
    }

    fn credentials() -> SourceCredentials {
        SourceCredentials {
            client_id: "cid".to_string(),
            client_secret: "secret".to_string(),
        }
    }

    fn expect_token(http: &mut MockHttp) {
        http.expect_execute()
            .withf(|request| {
                let body = request.body.as_ref().map(|b| b.to_vec()).unwrap_or_default();
                let text = String::from_utf8(body).unwrap_or_default();
                request.url == TOKEN_URL
                    && text.contains("grant_type=client_credentials")
                    && text.contains("client_id=cid")
            })
            .returning(|_| Ok(response(200, r#"{"access_token":"tok"}"#)));
    }

    #[test]
    fn test_playlist_id_extraction() {
        let id =
            SpotifyConnector::playlist_id("https://open.spotify.com/playlist/37i9dQ?si=abc")
                .unwrap();
        assert_eq!(id, "37i9dQ");

        assert!(SpotifyConnector::playlist_id("https://open.spotify.com/album/xyz").is_err());
        assert!(SpotifyConnector::playlist_id("https://open.spotify.com/playlist/").is_err());
    }

    #[tokio::test]
    async fn test_fetch_playlist_single_page() {
        let mut http = MockHttp::new();
        expect_token(&mut http);
        http.expect_execute_with_retry()
            .withf(|request, _| {
                request.url.ends_with("/playlists/p1")
                    && request.headers.get("Authorization") == Some(&"Bearer tok".to_string())
            })
            .returning(|_, _| {
                Ok(response(
                    200,
                    r#"{
                        "name": "Mix",
                        "tracks": {
                            "items": [
                                {
                                    "track": {
                                        "name": "Flim",
                                        "album": { "name": "Come to Daddy" },
                                        "artists": [ { "name": "Aphex Twin" } ],
                                        "external_ids": { "isrc": "GB1" }
                                    }
                                },
                                { "track": null }
                            ],
                            "next": null
                        }
                    }"#,
                ))
            });

        let connector = SpotifyConnector::new(Arc::new(http), credentials());
        let playlist = connector
            .fetch_playlist("https://open.spotify.com/playlist/p1")
            .await
            .unwrap();

        assert_eq!(playlist.name, "Mix");
        assert_eq!(playlist.tracks.len(), 1);
        assert_eq!(playlist.tracks[0].title, "Flim");
        assert_eq!(playlist.tracks[0].isrc.as_deref(), Some("GB1"));
        assert_eq!(playlist.tracks[0].position, 0);
    }

    #[tokio::test]
    async fn test_fetch_playlist_follows_pagination() {
        let mut http = MockHttp::new();
        expect_token(&mut http);
        http.expect_execute_with_retry()
            .withf(|request, _| request.url.ends_with("/playlists/p1"))
            .returning(|_, _| {
                Ok(response(
                    200,
                    r#"{
                        "name": "Mix",
                        "tracks": {
                            "items": [
                                {
                                    "track": {
                                        "name": "One",
                                        "album": { "name": "A" },
                                        "artists": [ { "name": "X" } ]
                                    }
                                }
                            ],
                            "next": "https://api.spotify.com/v1/playlists/p1/tracks?offset=1"
                        }
                    }"#,
                ))
            });
        http.expect_execute_with_retry()
            .withf(|request, _| request.url.contains("offset=1"))
            .returning(|_, _| {
                Ok(response(
                    200,
                    r#"{
                        "items": [
                            {
                                "track": {
                                    "name": "Two",
                                    "album": { "name": "B" },
                                    "artists": [ { "name": "Y" } ]
                                }
                            }
                        ],
                        "next": null
                    }"#,
                ))
            });

        let connector = SpotifyConnector::new(Arc::new(http), credentials());
        let playlist = connector
            .fetch_playlist("https://open.spotify.com/playlist/p1")
            .await
            .unwrap();

        assert_eq!(playlist.tracks.len(), 2);
        assert_eq!(playlist.tracks[1].title, "Two");
        assert_eq!(playlist.tracks[1].position, 1);
    }

    #[tokio::test]
    async fn test_token_rejection_is_auth_error() {
        let mut http = MockHttp::new();
        http.expect_execute()
            .returning(|_| Ok(response(400, r#"{"error":"invalid_client"}"#)));

        let connector = SpotifyConnector::new(Arc::new(http), credentials());
        let result = connector
            .fetch_playlist("https://open.spotify.com/playlist/p1")
            .await;

        assert!(matches!(
            result,
            Err(BridgeError::AuthenticationFailed { .. })
        ));
    }
}
