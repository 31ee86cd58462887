//! # Desktop Bridge Adapters
//!
//! Concrete desktop implementations of the `bridge-traits` collaborator
//! seams:
//!
//! - [`ReqwestHttpClient`](http::ReqwestHttpClient) - HTTP with pooling and retry
//! - [`LoftyTagAccessor`](tags::LoftyTagAccessor) - embedded tag field access
//! - [`FfmpegConverter`](convert::FfmpegConverter) - batch conversion via ffmpeg

pub mod convert;
pub mod http;
pub mod tags;

pub use convert::FfmpegConverter;
pub use http::ReqwestHttpClient;
pub use tags::LoftyTagAccessor;
