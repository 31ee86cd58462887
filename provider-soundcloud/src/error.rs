//! Error types for the SoundCloud provider

use thiserror::Error;

use bridge_traits::error::BridgeError;

#[derive(Error, Debug)]
pub enum SoundCloudError {
    /// No anonymous client id could be obtained
    #[error("No client id available: {0}")]
    ClientIdUnavailable(String),

    /// API request returned an error status
    #[error("SoundCloud API error (status {status_code}): {message}")]
    ApiError { status_code: u16, message: String },

    /// The track exposes no progressive (directly downloadable) stream
    #[error("No progressive stream for track: {0}")]
    NoProgressiveStream(String),

    /// Failed to parse an API response
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

pub type Result<T> = std::result::Result<T, SoundCloudError>;

impl From<SoundCloudError> for BridgeError {
    fn from(error: SoundCloudError) -> Self {
        match error {
            SoundCloudError::ClientIdUnavailable(message) => BridgeError::AuthenticationFailed {
                catalog: "soundcloud".to_string(),
                message,
            },
            SoundCloudError::ApiError {
                status_code,
                message,
            } => BridgeError::CatalogStatus {
                catalog: "soundcloud".to_string(),
                status: status_code,
                message,
            },
            SoundCloudError::NoProgressiveStream(track) => {
                BridgeError::OperationFailed(format!("no progressive stream for track: {}", track))
            }
            SoundCloudError::ParseError(message) => BridgeError::OperationFailed(message),
            SoundCloudError::Bridge(e) => e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_client_id_maps_to_fatal_bridge_variant() {
        let bridge: BridgeError =
            SoundCloudError::ClientIdUnavailable("scrape failed".to_string()).into();
        assert!(matches!(bridge, BridgeError::AuthenticationFailed { .. }));
    }

    #[test]
    fn test_missing_stream_is_recoverable() {
        let bridge: BridgeError =
            SoundCloudError::NoProgressiveStream("t1".to_string()).into();
        assert!(matches!(bridge, BridgeError::OperationFailed(_)));
    }
}
