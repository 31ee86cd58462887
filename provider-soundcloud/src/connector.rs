//! SoundCloud catalog connector
//!
//! Implements [`FallbackCatalog`] over the public v2 API at
//! `api-v2.soundcloud.com`. The API wants a `client_id` on every request;
//! `login` obtains one anonymously by scraping the web player's bundled
//! scripts, unless a preset id was supplied at construction time.
//!
//! Audio acquisition is indirect: a track's permalink is resolved to its
//! transcodings, the progressive one is exchanged for a short-lived stream
//! URL, and that URL is streamed to disk.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use bridge_traits::error::Result as BridgeResult;
use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse, RetryPolicy};
use bridge_traits::source::{FallbackCatalog, FallbackTrack};

use crate::error::{Result, SoundCloudError};
use crate::types::{
    PlaylistResponse, ResolvedResource, ScTrack, SearchResponse, StreamResponse, TrackDetails,
};

const API_BASE_URL: &str = "https://api-v2.soundcloud.com";
const WEB_APP_URL: &str = "https://soundcloud.com/";

const PROGRESSIVE_PROTOCOL: &str = "progressive";

/// SoundCloud catalog connector
pub struct SoundCloudConnector {
    http: Arc<dyn HttpClient>,
    /// Fixed id supplied at construction, skipping the scrape
    preset_client_id: Option<String>,
    client_id: RwLock<Option<String>>,
}

impl SoundCloudConnector {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self {
            http,
            preset_client_id: None,
            client_id: RwLock::new(None),
        }
    }

    /// Build with a known client id instead of scraping one at login
    pub fn with_client_id(http: Arc<dyn HttpClient>, client_id: impl Into<String>) -> Self {
        Self {
            http,
            preset_client_id: Some(client_id.into()),
            client_id: RwLock::new(None),
        }
    }

    /// Pull a `client_id` out of web-player markup or script source
    fn extract_client_id(text: &str) -> Option<String> {
        for marker in ["client_id=", "\"clientId\":\"", "client_id:\""] {
            if let Some(start) = text.find(marker) {
                let rest = &text[start + marker.len()..];
                let id: String = rest
                    .chars()
                    .take_while(|c| c.is_ascii_alphanumeric())
                    .collect();
                if id.len() >= 16 {
                    return Some(id);
                }
            }
        }
        None
    }

    async fn scrape_client_id(&self) -> Result<String> {
        let page = self.http.execute(HttpRequest::get(WEB_APP_URL)).await?;
        let html = page.text()?;

        if let Some(id) = Self::extract_client_id(&html) {
            return Ok(id);
        }

        // Not in the page itself; look inside the bundled scripts
        for script_url in Self::script_urls(&html) {
            let script = self.http.execute(HttpRequest::get(script_url)).await?;
            if let Some(id) = Self::extract_client_id(&script.text()?) {
                return Ok(id);
            }
        }

        Err(SoundCloudError::ClientIdUnavailable(
            "no client id found in web app markup or scripts".to_string(),
        ))
    }

    /// Cross-domain `<script src=...>` URLs in document order
    fn script_urls(html: &str) -> Vec<String> {
        let mut urls = Vec::new();
        let mut rest = html;
        while let Some(start) = rest.find("<script crossorigin src=\"") {
            let after = &rest[start + "<script crossorigin src=\"".len()..];
            if let Some(end) = after.find('"') {
                urls.push(after[..end].to_string());
                rest = &after[end..];
            } else {
                break;
            }
        }
        urls
    }

    async fn client_id(&self) -> Result<String> {
        let guard = self.client_id.read().await;
        guard.clone().ok_or_else(|| {
            SoundCloudError::ClientIdUnavailable("login required before requests".to_string())
        })
    }

    async fn api_get(&self, path_and_query: &str) -> Result<HttpResponse> {
        let client_id = self.client_id().await?;
        let separator = if path_and_query.contains('?') { '&' } else { '?' };
        let url = format!(
            "{}{}{}client_id={}",
            API_BASE_URL, path_and_query, separator, client_id
        );

        let response = self
            .http
            .execute_with_retry(HttpRequest::get(url), RetryPolicy::default())
            .await?;

        if !response.is_success() {
            return Err(SoundCloudError::ApiError {
                status_code: response.status,
                message: response.text().unwrap_or_default(),
            });
        }
        Ok(response)
    }

    async fn track_details(&self, permalink_url: &str) -> Result<TrackDetails> {
        let response = self
            .api_get(&format!(
                "/resolve?url={}",
                urlencoding::encode(permalink_url)
            ))
            .await?;

        response
            .json::<TrackDetails>()
            .map_err(|e| SoundCloudError::ParseError(e.to_string()))
    }
}

#[async_trait]
impl FallbackCatalog for SoundCloudConnector {
    #[instrument(skip(self))]
    async fn login(&self) -> BridgeResult<()> {
        let id = match &self.preset_client_id {
            Some(id) => id.clone(),
            None => self.scrape_client_id().await?,
        };

        let mut guard = self.client_id.write().await;
        *guard = Some(id);
        debug!("SoundCloud client id ready");
        Ok(())
    }

    async fn resolve_url(&self, url: &str) -> BridgeResult<String> {
        let response = self
            .api_get(&format!("/resolve?url={}", urlencoding::encode(url)))
            .await?;

        let resource: ResolvedResource = response
            .json()
            .map_err(|e| SoundCloudError::ParseError(e.to_string()))?;
        Ok(resource.id.to_string())
    }

    async fn fetch_playlist(&self, playlist_id: &str) -> BridgeResult<Vec<FallbackTrack>> {
        let response = self.api_get(&format!("/playlists/{}", playlist_id)).await?;

        let playlist: PlaylistResponse = response
            .json()
            .map_err(|e| SoundCloudError::ParseError(e.to_string()))?;

        Ok(playlist
            .tracks
            .into_iter()
            .filter_map(ScTrack::into_fallback)
            .collect())
    }

    async fn search_tracks(&self, query: &str, limit: usize) -> BridgeResult<Vec<FallbackTrack>> {
        let response = self
            .api_get(&format!(
                "/search/tracks?q={}&limit={}",
                urlencoding::encode(query),
                limit
            ))
            .await?;

        let results: SearchResponse = response
            .json()
            .map_err(|e| SoundCloudError::ParseError(e.to_string()))?;

        Ok(results
            .collection
            .into_iter()
            .filter_map(ScTrack::into_fallback)
            .collect())
    }

    #[instrument(skip(self, dest_dir))]
    async fn download(&self, permalink_url: &str, dest_dir: &Path) -> BridgeResult<PathBuf> {
        let details = self.track_details(permalink_url).await?;

        let transcoding = details
            .media
            .transcodings
            .iter()
            .find(|t| t.format.protocol == PROGRESSIVE_PROTOCOL)
            .ok_or_else(|| SoundCloudError::NoProgressiveStream(permalink_url.to_string()))?;

        // Transcoding URLs are absolute but still want the client id
        let client_id = self.client_id().await?;
        let separator = if transcoding.url.contains('?') { '&' } else { '?' };
        let stream_request = HttpRequest::get(format!(
            "{}{}client_id={}",
            transcoding.url, separator, client_id
        ));

        let response = self
            .http
            .execute_with_retry(stream_request, RetryPolicy::default())
            .await?;
        if !response.is_success() {
            return Err(SoundCloudError::ApiError {
                status_code: response.status,
                message: response.text().unwrap_or_default(),
            }
            .into());
        }

        let stream: StreamResponse = response
            .json()
            .map_err(|e| SoundCloudError::ParseError(e.to_string()))?;

        let dest = dest_dir.join(format!("{}.mp3", details.id));
        debug!(track_id = details.id, path = %dest.display(), "downloading track");
        self.http
            .download_to_file(HttpRequest::get(stream.url), &dest)
            .await
    }
}
