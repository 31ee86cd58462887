//! # Runtime Module
//!
//! Ambient infrastructure shared by every sync crate:
//!
//! - **Configuration** (`config`): typed settings loaded from a JSON file,
//!   with fail-fast validation of required values
//! - **Events** (`events`): broadcast event bus decoupling progress
//!   rendering from resolution and batching
//! - **Logging** (`logging`): tracing-subscriber setup with env filtering
//!   and sensitive-field redaction
//! - **Errors** (`error`): runtime error type

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use config::{CatalogCredentials, SourceCredentials, SyncSettings};
pub use error::{Error, Result};
pub use events::{CoreEvent, EventBus, SyncEvent};
pub use logging::{init_logging, LogFormat, LoggingConfig};
