//! Error types for the Spotify provider

use thiserror::Error;

use bridge_traits::error::BridgeError;

#[derive(Error, Debug)]
pub enum SpotifyError {
    /// Token request rejected
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// API request returned an error status
    #[error("Spotify API error (status {status_code}): {message}")]
    ApiError { status_code: u16, message: String },

    /// The given share URL does not name a playlist
    #[error("Not a playlist share URL: {0}")]
    InvalidPlaylistUrl(String),

    /// Failed to parse an API response
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

pub type Result<T> = std::result::Result<T, SpotifyError>;

impl From<SpotifyError> for BridgeError {
    fn from(error: SpotifyError) -> Self {
        match error {
            SpotifyError::AuthenticationFailed(message) => BridgeError::AuthenticationFailed {
                catalog: "spotify".to_string(),
                message,
            },
            SpotifyError::ApiError {
                status_code,
                message,
            } => BridgeError::CatalogStatus {
                catalog: "spotify".to_string(),
                status: status_code,
                message,
            },
            SpotifyError::InvalidPlaylistUrl(url) => {
                BridgeError::OperationFailed(format!("not a playlist share URL: {}", url))
            }
            SpotifyError::ParseError(message) => BridgeError::OperationFailed(message),
            SpotifyError::Bridge(e) => e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_failure_maps_to_fatal_bridge_variant() {
        let bridge: BridgeError =
            SpotifyError::AuthenticationFailed("bad secret".to_string()).into();
        assert!(matches!(bridge, BridgeError::AuthenticationFailed { .. }));
    }

    #[test]
    fn test_invalid_url_is_recoverable() {
        let bridge: BridgeError =
            SpotifyError::InvalidPlaylistUrl("https://example.com".to_string()).into();
        assert!(matches!(bridge, BridgeError::OperationFailed(_)));
    }
}
