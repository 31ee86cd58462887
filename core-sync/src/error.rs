use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error(transparent)]
    Resolver(#[from] core_resolver::ResolverError),

    #[error("Catalog error: {0}")]
    Bridge(#[from] bridge_traits::BridgeError),

    #[error("Commit failed: {0}")]
    Commit(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SyncError {
    /// Whether this error aborts the whole pass rather than one descriptor
    pub fn is_fatal(&self) -> bool {
        match self {
            SyncError::Resolver(e) => e.is_fatal(),
            SyncError::Bridge(e) => {
                matches!(e, bridge_traits::BridgeError::AuthenticationFailed { .. })
            }
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
