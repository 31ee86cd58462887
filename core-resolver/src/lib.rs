//! # Track Resolution Module
//!
//! Maps one source-catalog track descriptor to a target-catalog track
//! identifier via an ordered, short-circuiting strategy cascade.
//!
//! ## Overview
//!
//! The catalogs share no identifier space; the only bridge is the optional
//! standard recording identifier carried on descriptors plus fuzzy text
//! search. The cascade tries, in order:
//!
//! 1. **Identifier search** - trusted only when the best result reports the
//!    identifier back verbatim
//! 2. **Title + artists search** - exact title match plus performer overlap
//! 3. **Album + artists search** - locate the album, then the track inside
//!    its track list (with a `(feat. …)` strip retry)
//! 4. **Artist-discography walk** - find the artist, walk album-type
//!    releases, select by exact then substring album title, then step 3's
//!    track lookup
//!
//! First success wins; no further strategy runs. A descriptor that exhausts
//! the cascade is recorded in the pass's not-found log for escalation to the
//! fallback catalog.
//!
//! ## Components
//!
//! - **Descriptor model** (`descriptor`): immutable descriptors and tagged
//!   resolution outcomes
//! - **Match predicates** (`matching`): pure title/album comparison helpers,
//!   independently unit-testable
//! - **Resolver** (`resolver`): the cascade over a `TrackCatalog` handle,
//!   plus the single-strategy fallback-catalog resolver
//! - **Progress** (`progress`): shared found/failed counters with
//!   exactly-once per-descriptor refresh, and the per-pass not-found log

pub mod descriptor;
pub mod error;
pub mod matching;
pub mod progress;
pub mod resolver;

pub use descriptor::{
    MatchStrategy, Resolution, ResolvedTrack, TrackDescriptor, UnresolvedTrack,
};
pub use error::{ResolverError, Result};
pub use progress::{NotFoundLog, ProgressGuard, SearchProgress};
pub use resolver::{FallbackTrackResolver, ResolveTrack, TrackResolver};
