//! # Sync Configuration
//!
//! Typed settings for a sync run, deserialized from a JSON config file.
//! Validation is fail-fast: a missing required value aborts the run before
//! any network or filesystem activity, with an error naming the value.
//!
//! ## Shape
//!
//! ```json
//! {
//!     "playlists": { "Morning Mix": { "spotify": "https://..." } },
//!     "library_root": "/music/playlists",
//!     "staging_dir": "/tmp/crosstune",
//!     "batch_limit": 25,
//!     "mp3_copy": true,
//!     "catalog": { "email": "...", "token": "...", "quality": 6 },
//!     "source": { "client_id": "...", "client_secret": "..." }
//! }
//! ```
//!
//! The `playlists` map is the read-only lookup the coordinator iterates:
//! playlist name to `{source name -> source URL}`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Default number of concurrent resolution requests per batch
pub const DEFAULT_BATCH_LIMIT: usize = 25;

/// Credentials for the licensed acquisition catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogCredentials {
    /// Account email or user id
    pub email: String,
    /// Authentication token
    pub token: String,
    /// Requested audio quality tier
    #[serde(default = "default_quality")]
    pub quality: u8,
}

fn default_quality() -> u8 {
    6
}

/// Credentials for the source-of-truth playlist catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceCredentials {
    pub client_id: String,
    pub client_secret: String,
}

/// Settings for one sync run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Playlist name -> (source name -> source URL)
    #[serde(default)]
    pub playlists: BTreeMap<String, BTreeMap<String, String>>,

    /// Root directory of the local library; one subdirectory per playlist
    pub library_root: PathBuf,

    /// Staging directory downloads land in before conversion
    pub staging_dir: PathBuf,

    /// Maximum concurrent resolution requests per batch
    #[serde(default = "default_batch_limit")]
    pub batch_limit: usize,

    /// Whether to keep an MP3 duplicate of every acquired track
    #[serde(default)]
    pub mp3_copy: bool,

    /// Licensed catalog credentials
    pub catalog: Option<CatalogCredentials>,

    /// Source catalog credentials
    pub source: Option<SourceCredentials>,
}

fn default_batch_limit() -> usize {
    DEFAULT_BATCH_LIMIT
}

impl SyncSettings {
    /// Load settings from a JSON file
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the file cannot be read or parsed.
    pub async fn load(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read(path)
            .await
            .map_err(|e| Error::Config(format!("Cannot read {}: {}", path.display(), e)))?;

        serde_json::from_slice(&raw)
            .map_err(|e| Error::Config(format!("Cannot parse {}: {}", path.display(), e)))
    }

    /// Licensed catalog credentials, or a fatal missing-config error
    pub fn catalog_credentials(&self) -> Result<&CatalogCredentials> {
        self.catalog
            .as_ref()
            .ok_or_else(|| Error::MissingConfig("catalog".to_string()))
    }

    /// Source catalog credentials, or a fatal missing-config error
    pub fn source_credentials(&self) -> Result<&SourceCredentials> {
        self.source
            .as_ref()
            .ok_or_else(|| Error::MissingConfig("source".to_string()))
    }

    /// Directory holding one playlist's local files
    pub fn playlist_dir(&self, playlist: &str) -> PathBuf {
        // A slash in a playlist name must not escape the library root
        self.library_root.join(playlist.replace('/', " "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_json() -> &'static str {
        r#"{
            "playlists": { "Morning Mix": { "spotify": "https://open.example/p/1" } },
            "library_root": "/music/playlists",
            "staging_dir": "/tmp/staging",
            "catalog": { "email": "a@b.c", "token": "t", "quality": 6 },
            "source": { "client_id": "id", "client_secret": "secret" }
        }"#
    }

    #[test]
    fn test_parse_with_defaults() {
        let settings: SyncSettings = serde_json::from_str(settings_json()).unwrap();

        assert_eq!(settings.batch_limit, DEFAULT_BATCH_LIMIT);
        assert!(!settings.mp3_copy);
        assert_eq!(settings.playlists.len(), 1);
    }

    #[test]
    fn test_missing_credentials_is_fatal() {
        let settings: SyncSettings = serde_json::from_str(
            r#"{ "library_root": "/music", "staging_dir": "/tmp" }"#,
        )
        .unwrap();

        assert!(matches!(
            settings.catalog_credentials(),
            Err(Error::MissingConfig(_))
        ));
        assert!(matches!(
            settings.source_credentials(),
            Err(Error::MissingConfig(_))
        ));
    }

    #[test]
    fn test_playlist_dir_sanitizes_slashes() {
        let settings: SyncSettings = serde_json::from_str(settings_json()).unwrap();
        let dir = settings.playlist_dir("Drum/Bass");

        assert_eq!(dir, PathBuf::from("/music/playlists/Drum Bass"));
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        tokio::fs::write(&path, settings_json()).await.unwrap();

        let settings = SyncSettings::load(&path).await.unwrap();
        assert_eq!(settings.catalog_credentials().unwrap().email, "a@b.c");
    }

    #[tokio::test]
    async fn test_load_missing_file_is_config_error() {
        let result = SyncSettings::load(Path::new("/nonexistent/config.json")).await;
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
