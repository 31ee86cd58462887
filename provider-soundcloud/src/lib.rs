//! # SoundCloud Provider
//!
//! Implements the `FallbackCatalog` trait over the public SoundCloud v2 API.
//!
//! ## Overview
//!
//! This module provides:
//! - Anonymous client-id acquisition (scraped from the public web app)
//! - Share-URL resolution and playlist fetching
//! - Free-text track search
//! - Progressive-stream downloads through short-lived media URLs

pub mod connector;
pub mod error;
pub mod types;

pub use connector::SoundCloudConnector;
pub use error::{Result, SoundCloudError};
