//! Workspace placeholder crate.
//!
//! This crate exists to expose shared feature flags that map to the individual
//! workspace crates. Host applications can depend on `crosstune-workspace` and
//! enable the documented features without needing to wire each crate
//! individually. The sync engine itself lives in `core-sync`; the collaborator
//! seams it consumes are defined in `bridge-traits` with desktop adapters in
//! `bridge-desktop`.
