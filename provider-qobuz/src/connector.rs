//! Qobuz catalog connector
//!
//! Implements [`TrackCatalog`] against the Qobuz web API. All search and
//! detail endpoints require a logged-in session; `login` exchanges the
//! configured credentials for a user auth token which is then sent on every
//! request alongside the application id.
//!
//! Downloads are two-step: `track/getFileUrl` returns a short-lived signed
//! media URL, which is then streamed to disk through the HTTP bridge.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use bridge_traits::catalog::{CatalogAlbum, CatalogArtist, CatalogTrack, TrackCatalog};
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse, RetryPolicy};
use core_runtime::config::CatalogCredentials;

use crate::error::{QobuzError, Result};
use crate::types::{
    AlbumGetResponse, AlbumSearchResponse, ArtistPageResponse, ArtistSearchResponse,
    FileUrlResponse, LoginResponse, TrackSearchResponse,
};

const API_BASE_URL: &str = "https://www.qobuz.com/api.json/0.2";

/// Application id registered for this client, sent as `X-App-Id`
const APP_ID: &str = "950096963";

/// Release group type on artist pages that counts as a proper album
const ALBUM_RELEASE_TYPE: &str = "album";

/// Qobuz catalog connector
pub struct QobuzConnector {
    http: Arc<dyn HttpClient>,
    credentials: CatalogCredentials,
    auth_token: RwLock<Option<String>>,
}

impl QobuzConnector {
    pub fn new(http: Arc<dyn HttpClient>, credentials: CatalogCredentials) -> Self {
        Self {
            http,
            credentials,
            auth_token: RwLock::new(None),
        }
    }

    fn api_url(path: &str, params: &[(&str, &str)]) -> String {
        let query: Vec<String> = params
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect();
        format!("{}/{}?{}", API_BASE_URL, path, query.join("&"))
    }

    /// Execute an authenticated API GET and fail on non-2xx statuses
    async fn api_get(&self, path: &str, params: &[(&str, &str)]) -> Result<HttpResponse> {
        let token = {
            let guard = self.auth_token.read().await;
            guard.clone().ok_or(QobuzError::NotLoggedIn)?
        };

        let request = HttpRequest::get(Self::api_url(path, params))
            .header("X-App-Id", APP_ID)
            .header("X-User-Auth-Token", token);

        let response = self
            .http
            .execute_with_retry(request, RetryPolicy::default())
            .await?;

        if !response.is_success() {
            return Err(QobuzError::ApiError {
                status_code: response.status,
                message: response.text().unwrap_or_default(),
            });
        }

        Ok(response)
    }

    async fn signed_media_url(&self, track_id: &str) -> Result<FileUrlResponse> {
        let quality = self.credentials.quality.to_string();
        let response = self
            .api_get(
                "track/getFileUrl",
                &[("track_id", track_id), ("format_id", quality.as_str())],
            )
            .await?;

        response
            .json::<FileUrlResponse>()
            .map_err(|e| QobuzError::ParseError(e.to_string()))
    }
}

#[async_trait]
impl TrackCatalog for QobuzConnector {
    #[instrument(skip(self))]
    async fn login(&self) -> BridgeResult<()> {
        let request = HttpRequest::get(Self::api_url(
            "user/login",
            &[
                ("email", self.credentials.email.as_str()),
                ("password", self.credentials.token.as_str()),
            ],
        ))
        .header("X-App-Id", APP_ID);

        let response = self.http.execute(request).await?;

        if !response.is_success() {
            return Err(QobuzError::AuthenticationFailed(format!(
                "login rejected with status {}",
                response.status
            ))
            .into());
        }

        let login: LoginResponse = response
            .json()
            .map_err(|e| QobuzError::ParseError(e.to_string()))?;

        let mut guard = self.auth_token.write().await;
        *guard = Some(login.user_auth_token);
        debug!("Qobuz session established");
        Ok(())
    }

    async fn search_tracks(&self, query: &str, limit: usize) -> BridgeResult<Vec<CatalogTrack>> {
        let limit = limit.to_string();
        let response = self
            .api_get("track/search", &[("query", query), ("limit", limit.as_str())])
            .await?;

        let parsed: TrackSearchResponse = response
            .json()
            .map_err(|e| QobuzError::ParseError(e.to_string()))?;

        Ok(parsed.tracks.items.into_iter().map(Into::into).collect())
    }

    async fn search_albums(&self, query: &str, limit: usize) -> BridgeResult<Vec<CatalogAlbum>> {
        let limit = limit.to_string();
        let response = self
            .api_get("album/search", &[("query", query), ("limit", limit.as_str())])
            .await?;

        let parsed: AlbumSearchResponse = response
            .json()
            .map_err(|e| QobuzError::ParseError(e.to_string()))?;

        Ok(parsed.albums.items.into_iter().map(Into::into).collect())
    }

    async fn search_artists(&self, query: &str, limit: usize) -> BridgeResult<Vec<CatalogArtist>> {
        let limit = limit.to_string();
        let response = self
            .api_get(
                "artist/search",
                &[("query", query), ("limit", limit.as_str())],
            )
            .await?;

        let parsed: ArtistSearchResponse = response
            .json()
            .map_err(|e| QobuzError::ParseError(e.to_string()))?;

        Ok(parsed.artists.items.into_iter().map(Into::into).collect())
    }

    async fn album_tracks(&self, album_id: &str) -> BridgeResult<Vec<CatalogTrack>> {
        let response = self.api_get("album/get", &[("album_id", album_id)]).await?;

        let parsed: AlbumGetResponse = response
            .json()
            .map_err(|e| QobuzError::ParseError(e.to_string()))?;

        Ok(parsed.tracks.items.into_iter().map(Into::into).collect())
    }

    async fn artist_albums(&self, artist_id: &str) -> BridgeResult<Vec<CatalogAlbum>> {
        let response = self
            .api_get("artist/page", &[("artist_id", artist_id)])
            .await?;

        let parsed: ArtistPageResponse = response
            .json()
            .map_err(|e| QobuzError::ParseError(e.to_string()))?;

        Ok(parsed
            .releases
            .into_iter()
            .filter(|group| group.release_type == ALBUM_RELEASE_TYPE)
            .flat_map(|group| group.items)
            .map(Into::into)
            .collect())
    }

    #[instrument(skip(self, dest_dir))]
    async fn download_track(&self, track_id: &str, dest_dir: &Path) -> BridgeResult<PathBuf> {
        let media = self.signed_media_url(track_id).await?;

        let extension = match media.mime_type.as_deref() {
            Some(mime) if mime.contains("mpeg") => "mp3",
            _ => "flac",
        };
        let dest = dest_dir.join(format!("{}.{}", track_id, extension));

        debug!(track_id, path = %dest.display(), "downloading track");
        self.http
            .download_to_file(HttpRequest::get(media.url), &dest)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::error::BridgeError;
    use bytes::Bytes;
    use mockall::mock;
    use mockall::predicate::function;
    use std::collections::HashMap;

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

    fn credentials() -> CatalogCredentials {
        CatalogCredentials {
            email: "user@example.com".to_string(),
            token: "secret".to_string(),
            quality: 6,
        }
    }

    async fn logged_in(mut http: MockHttp) -> QobuzConnector {
        http.expect_execute()
            .withf(|request| request.url.contains("user/login"))
            .returning(|_| Ok(response(200, r#"{"user_auth_token":"uat-1"}"#)));

        let connector = QobuzConnector::new(Arc::new(http), credentials());
        connector.login().await.unwrap();
        connector
    }

    #[tokio::test]
    async fn test_search_before_login_is_auth_error() {
        let connector = QobuzConnector::new(Arc::new(MockHttp::new()), credentials());

        let result = connector.search_tracks("flim", 1).await;
        assert!(matches!(
            result,
            Err(BridgeError::AuthenticationFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_login_failure_is_auth_error() {
        let mut http = MockHttp::new();
        http.expect_execute()
            .returning(|_| Ok(response(401, "{}")));

        let connector = QobuzConnector::new(Arc::new(http), credentials());
        let result = connector.login().await;

        assert!(matches!(
            result,
            Err(BridgeError::AuthenticationFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_search_tracks_sends_session_headers() {
        let mut http = MockHttp::new();
        http.expect_execute_with_retry()
            .with(
                function(|request: &HttpRequest| {
                    request.url.contains("track/search")
                        && request.url.contains("query=flim")
                        && request.url.contains("limit=1")
                        && request.headers.get("X-User-Auth-Token")
                            == Some(&"uat-1".to_string())
                }),
                function(|_: &RetryPolicy| true),
            )
            .returning(|_, _| {
                Ok(response(
                    200,
                    r#"{"tracks":{"items":[{"id":7,"title":"Flim","isrc":"GB1"}]}}"#,
                ))
            });

        let connector = logged_in(http).await;
        let tracks = connector.search_tracks("flim", 1).await.unwrap();

        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].id, "7");
        assert_eq!(tracks[0].isrc.as_deref(), Some("GB1"));
    }

    #[tokio::test]
    async fn test_artist_albums_skips_singles() {
        let mut http = MockHttp::new();
        http.expect_execute_with_retry()
            .withf(|request, _| request.url.contains("artist/page"))
            .returning(|_, _| {
                Ok(response(
                    200,
                    r#"{"releases":[
                        {"type":"epSingle","items":[{"id":"s1","title":"Single"}]},
                        {"type":"album","items":[{"id":"a1","title":"Album"}]}
                    ]}"#,
                ))
            });

        let connector = logged_in(http).await;
        let albums = connector.artist_albums("42").await.unwrap();

        assert_eq!(albums.len(), 1);
        assert_eq!(albums[0].id, "a1");
    }

    #[tokio::test]
    async fn test_api_error_status_is_catalog_status() {
        let mut http = MockHttp::new();
        http.expect_execute_with_retry()
            .returning(|_, _| Ok(response(404, "no such album")));

        let connector = logged_in(http).await;
        let result = connector.album_tracks("missing").await;

        assert!(matches!(
            result,
            Err(BridgeError::CatalogStatus { status: 404, .. })
        ));
    }

    #[tokio::test]
    async fn test_download_resolves_signed_url_then_streams() {
        let mut http = MockHttp::new();
        http.expect_execute_with_retry()
            .withf(|request, _| {
                request.url.contains("track/getFileUrl")
                    && request.url.contains("track_id=7")
                    && request.url.contains("format_id=6")
            })
            .returning(|_, _| {
                Ok(response(
                    200,
                    r#"{"url":"https://cdn.example.com/7.flac","mime_type":"audio/flac"}"#,
                ))
            });
        http.expect_download_to_file()
            .withf(|request, dest| {
                request.url == "https://cdn.example.com/7.flac"
                    && dest.file_name().map(|n| n == "7.flac").unwrap_or(false)
            })
            .returning(|_, dest| Ok(dest.to_path_buf()));

        let connector = logged_in(http).await;
        let path = connector.download_track("7", Path::new("/tmp/stage")).await.unwrap();

        assert_eq!(path, Path::new("/tmp/stage/7.flac"));
    }
}
