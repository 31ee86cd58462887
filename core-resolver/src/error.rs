use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolverError {
    #[error("Authentication failed against {catalog}: {message}")]
    Authentication { catalog: String, message: String },

    #[error("Catalog error: {0}")]
    Catalog(String),
}

impl From<bridge_traits::BridgeError> for ResolverError {
    fn from(err: bridge_traits::BridgeError) -> Self {
        match err {
            bridge_traits::BridgeError::AuthenticationFailed { catalog, message } => {
                ResolverError::Authentication { catalog, message }
            }
            other => ResolverError::Catalog(other.to_string()),
        }
    }
}

impl ResolverError {
    /// Whether this error must abort the whole batch rather than fail a
    /// single descriptor
    pub fn is_fatal(&self) -> bool {
        matches!(self, ResolverError::Authentication { .. })
    }
}

pub type Result<T> = std::result::Result<T, ResolverError>;
