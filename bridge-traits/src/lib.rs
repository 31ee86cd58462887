//! # Collaborator Bridge Traits
//!
//! Traits for every external collaborator the sync core talks to. The core
//! never constructs an HTTP client, tag reader, or converter directly; it
//! receives `Arc<dyn Trait>` handles so catalogs and media tooling can be
//! swapped per deployment and faked in tests.
//!
//! ## Traits
//!
//! ### Networking
//! - [`HttpClient`](http::HttpClient) - Async HTTP operations with retry
//!
//! ### Catalogs
//! - [`PlaylistSource`](source::PlaylistSource) - Source-of-truth playlist catalog
//! - [`TrackCatalog`](catalog::TrackCatalog) - Licensed catalog used for acquisition
//! - [`FallbackCatalog`](source::FallbackCatalog) - Last-resort unstructured catalog
//!
//! ### Media tooling
//! - [`TagAccessor`](media::TagAccessor) - Read/write embedded identity tags
//! - [`AudioConverter`](media::AudioConverter) - Batch format conversion
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type.
//! Implementations should convert their underlying errors to `BridgeError`
//! with actionable messages and never log credentials.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` bounds so implementations can be
//! shared across concurrently resolving batch tasks.

pub mod catalog;
pub mod error;
pub mod http;
pub mod media;
pub mod source;

pub use error::BridgeError;

// Re-export commonly used types
pub use catalog::{CatalogAlbum, CatalogArtist, CatalogTrack, TrackCatalog};
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
pub use media::{AudioConverter, TagAccessor};
pub use source::{FallbackCatalog, FallbackTrack, PlaylistSource, SourcePlaylist, SourceTrack};
