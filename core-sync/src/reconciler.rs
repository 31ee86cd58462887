//! Deletion of local files no longer backed by the source playlist
//!
//! Runs once per storage area after all batches and the fallback chain have
//! completed. A file is deleted iff its identifier was remembered before the
//! pass and not re-established during it; the duplicate-format copy of the
//! same file goes with it. Files acquired this pass are always confirmed, so
//! reconciliation never touches them.

use std::path::Path;

use tracing::{debug, instrument, warn};

use crate::error::Result;
use crate::memory::{ConfirmedSet, MemorySet};

pub struct Reconciler;

impl Reconciler {
    /// Delete every remembered file whose identifier was not reconfirmed
    ///
    /// Returns the number of primary files deleted. A file that fails to
    /// delete is logged and skipped; it will be retried by the next pass's
    /// reconciliation.
    #[instrument(skip_all, fields(remembered = memory.len(), confirmed = confirmed.len()))]
    pub async fn reconcile(
        &self,
        memory: &MemorySet,
        confirmed: &ConfirmedSet,
        duplicate_dir: Option<&Path>,
    ) -> Result<usize> {
        let mut deleted = 0;

        for (identifier, path) in memory.iter() {
            if confirmed.contains(identifier) {
                continue;
            }

            match tokio::fs::remove_file(path).await {
                Ok(()) => {
                    debug!(file = %path.display(), id = %identifier, "deleted stale file");
                    deleted += 1;
                }
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "could not delete stale file");
                    continue;
                }
            }

            if let Some(dup) = duplicate_path(path, duplicate_dir) {
                match tokio::fs::remove_file(&dup).await {
                    Ok(()) => debug!(file = %dup.display(), "deleted duplicate copy"),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(e) => {
                        warn!(file = %dup.display(), error = %e, "could not delete duplicate copy")
                    }
                }
            }
        }

        Ok(deleted)
    }
}

/// The duplicate-format sibling of a primary file: same stem, `.mp3`, in the
/// duplicate directory
fn duplicate_path(primary: &Path, duplicate_dir: Option<&Path>) -> Option<std::path::PathBuf> {
    let dir = duplicate_dir?;
    let stem = primary.file_stem()?;
    let mut name = stem.to_os_string();
    name.push(".mp3");
    Some(dir.join(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::LocalTrackRecord;
    use std::path::PathBuf;

    fn remember(memory: &mut MemorySet, dir: &Path, name: &str, id: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, b"audio").unwrap();
        memory.insert(LocalTrackRecord {
            identifier: id.to_string(),
            path: path.clone(),
        });
        path
    }

    #[tokio::test]
    async fn test_unconfirmed_file_and_duplicate_deleted() {
        let root = tempfile::tempdir().unwrap();
        let primary = root.path().join("AIFF");
        let mp3 = root.path().join("MP3");
        std::fs::create_dir_all(&primary).unwrap();
        std::fs::create_dir_all(&mp3).unwrap();

        let mut memory = MemorySet::new();
        let stale = remember(&mut memory, &primary, "b.aiff", "id-2");
        let stale_dup = mp3.join("b.mp3");
        std::fs::write(&stale_dup, b"audio").unwrap();

        let kept = remember(&mut memory, &primary, "a.aiff", "id-1");
        let mut confirmed = ConfirmedSet::new();
        confirmed.insert("id-1");

        let deleted = Reconciler
            .reconcile(&memory, &confirmed, Some(&mp3))
            .await
            .unwrap();

        assert_eq!(deleted, 1);
        assert!(!stale.exists());
        assert!(!stale_dup.exists());
        assert!(kept.exists());
    }

    #[tokio::test]
    async fn test_nothing_deleted_when_all_confirmed() {
        let root = tempfile::tempdir().unwrap();
        let mut memory = MemorySet::new();
        let kept = remember(&mut memory, root.path(), "a.aiff", "id-1");

        let mut confirmed = ConfirmedSet::new();
        confirmed.insert("id-1");

        let deleted = Reconciler
            .reconcile(&memory, &confirmed, None)
            .await
            .unwrap();

        assert_eq!(deleted, 0);
        assert!(kept.exists());
    }

    #[tokio::test]
    async fn test_missing_duplicate_copy_is_not_an_error() {
        let root = tempfile::tempdir().unwrap();
        let mp3 = root.path().join("MP3");
        std::fs::create_dir_all(&mp3).unwrap();

        let mut memory = MemorySet::new();
        remember(&mut memory, root.path(), "a.aiff", "id-1");

        let deleted = Reconciler
            .reconcile(&memory, &ConfirmedSet::new(), Some(&mp3))
            .await
            .unwrap();

        assert_eq!(deleted, 1);
    }
}
