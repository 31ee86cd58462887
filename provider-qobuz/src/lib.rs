//! # Qobuz Provider
//!
//! Implements the `TrackCatalog` trait over the Qobuz public API.
//!
//! ## Overview
//!
//! This module provides:
//! - Token-based authentication (`user/login`)
//! - Typed track, album, and artist search
//! - Album track-list and artist-discography lookups for the deeper
//!   resolution strategies
//! - Quality-tier file URL requests and streaming downloads

pub mod connector;
pub mod error;
pub mod types;

pub use connector::QobuzConnector;
pub use error::{QobuzError, Result};
