//! Local identity state for one storage area
//!
//! A `MemorySet` is what the scanner recovered from disk before the pass; a
//! `ConfirmedSet` is what the pass re-established. Reconciliation deletes
//! exactly the difference. Both are scoped to a single storage area: the
//! primary and fallback subtrees never share a set, so identifier collisions
//! across catalogs cannot cause cross-deletion.

use std::collections::hash_map::{self, HashMap};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// One local file whose identity tag was read successfully
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalTrackRecord {
    /// Upstream identifier recovered from the embedded tag
    pub identifier: String,
    pub path: PathBuf,
}

/// Identifiers present on disk before the pass, with their file paths
#[derive(Debug, Clone, Default)]
pub struct MemorySet {
    records: HashMap<String, PathBuf>,
}

impl MemorySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: LocalTrackRecord) {
        self.records.insert(record.identifier, record.path);
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.records.contains_key(identifier)
    }

    pub fn path_of(&self, identifier: &str) -> Option<&Path> {
        self.records.get(identifier).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate `(identifier, path)` pairs
    pub fn iter(&self) -> hash_map::Iter<'_, String, PathBuf> {
        self.records.iter()
    }
}

/// Identifiers re-established during the current pass
///
/// Fresh for every pass and every storage area; an identifier lands here by
/// memory match or by successful resolution, never by being on disk alone.
#[derive(Debug, Clone, Default)]
pub struct ConfirmedSet {
    identifiers: HashSet<String>,
}

impl ConfirmedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, identifier: impl Into<String>) {
        self.identifiers.insert(identifier.into());
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.identifiers.contains(identifier)
    }

    /// Absorb another set's identifiers
    ///
    /// Used when several source playlists confirm into the same storage
    /// area within one pass.
    pub fn merge(&mut self, other: ConfirmedSet) {
        self.identifiers.extend(other.identifiers);
    }

    pub fn len(&self) -> usize {
        self.identifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_set_lookup() {
        let mut memory = MemorySet::new();
        memory.insert(LocalTrackRecord {
            identifier: "GBAAA0000001".to_string(),
            path: PathBuf::from("/lib/P/AIFF/a.aiff"),
        });

        assert!(memory.contains("GBAAA0000001"));
        assert!(!memory.contains("GBAAA0000002"));
        assert_eq!(
            memory.path_of("GBAAA0000001"),
            Some(Path::new("/lib/P/AIFF/a.aiff"))
        );
    }

    #[test]
    fn test_confirmed_set_merge_unions() {
        let mut first = ConfirmedSet::new();
        first.insert("id-1");
        let mut second = ConfirmedSet::new();
        second.insert("id-1");
        second.insert("id-2");

        first.merge(second);
        assert_eq!(first.len(), 2);
        assert!(first.contains("id-2"));
    }

    #[test]
    fn test_confirmed_set_starts_empty() {
        let mut confirmed = ConfirmedSet::new();
        assert!(confirmed.is_empty());

        confirmed.insert("id-1");
        confirmed.insert("id-1");
        assert_eq!(confirmed.len(), 1);
    }
}
