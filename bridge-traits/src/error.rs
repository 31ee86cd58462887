use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    #[error("Authentication failed against {catalog}: {message}")]
    AuthenticationFailed { catalog: String, message: String },

    #[error("Catalog {catalog} request failed with status {status}: {message}")]
    CatalogStatus {
        catalog: String,
        status: u16,
        message: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
