//! # Spotify Provider
//!
//! Implements the `PlaylistSource` trait over the Spotify Web API.
//!
//! ## Overview
//!
//! This module provides:
//! - Client-credentials authentication against the accounts service
//! - Share-URL to playlist-id extraction
//! - Paged playlist fetching flattened into an immutable snapshot

pub mod connector;
pub mod error;
pub mod types;

pub use connector::SpotifyConnector;
pub use error::{Result, SpotifyError};
