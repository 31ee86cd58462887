//! Error types for the Qobuz provider

use thiserror::Error;

use bridge_traits::error::BridgeError;

#[derive(Error, Debug)]
pub enum QobuzError {
    /// Login rejected or auth token invalid
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// API request returned an error status
    #[error("Qobuz API error (status {status_code}): {message}")]
    ApiError { status_code: u16, message: String },

    /// A search or download request must be preceded by `login`
    #[error("Not logged in")]
    NotLoggedIn,

    /// Failed to parse an API response
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

pub type Result<T> = std::result::Result<T, QobuzError>;

impl From<QobuzError> for BridgeError {
    fn from(error: QobuzError) -> Self {
        match error {
            QobuzError::AuthenticationFailed(message) => BridgeError::AuthenticationFailed {
                catalog: "qobuz".to_string(),
                message,
            },
            QobuzError::NotLoggedIn => BridgeError::AuthenticationFailed {
                catalog: "qobuz".to_string(),
                message: "login required before catalog requests".to_string(),
            },
            QobuzError::ApiError {
                status_code,
                message,
            } => BridgeError::CatalogStatus {
                catalog: "qobuz".to_string(),
                status: status_code,
                message,
            },
            QobuzError::ParseError(message) => BridgeError::OperationFailed(message),
            QobuzError::Bridge(e) => e,
        }
    }
}
