//! Local library scanner
//!
//! Rebuilds a [`MemorySet`] from the files of one storage area by reading
//! each file's embedded identity tag. The tag is the sole persistent link to
//! upstream playlist membership, so a file whose tag is missing or
//! unreadable is orphaned: it is deleted on the spot and excluded from the
//! set, and scanning continues with the remaining files.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, instrument, warn};

use bridge_traits::media::TagAccessor;

use crate::commit::IDENTITY_FIELD;
use crate::error::Result;
use crate::memory::{LocalTrackRecord, MemorySet};

pub struct LibraryScanner {
    tags: Arc<dyn TagAccessor>,
}

impl LibraryScanner {
    pub fn new(tags: Arc<dyn TagAccessor>) -> Self {
        Self { tags }
    }

    /// Scan one storage area into a memory set
    ///
    /// A missing folder is an empty area, not an error; the coordinator
    /// creates it lazily on first acquisition.
    #[instrument(skip(self), fields(folder = %folder.display()))]
    pub async fn scan(&self, folder: &Path) -> Result<MemorySet> {
        let mut memory = MemorySet::new();

        if !folder.is_dir() {
            return Ok(memory);
        }

        let mut entries = tokio::fs::read_dir(folder).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !entry.file_type().await?.is_file() {
                continue;
            }

            match self.tags.read_field(&path, IDENTITY_FIELD).await {
                Ok(Some(identifier)) => {
                    memory.insert(LocalTrackRecord { identifier, path });
                }
                Ok(None) => {
                    warn!(file = %path.display(), "identity tag missing, deleting orphan");
                    self.delete_orphan(&path).await;
                }
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "identity tag unreadable, deleting orphan");
                    self.delete_orphan(&path).await;
                }
            }
        }

        debug!(remembered = memory.len(), "scan complete");
        Ok(memory)
    }

    async fn delete_orphan(&self, path: &Path) {
        if let Err(e) = tokio::fs::remove_file(path).await {
            warn!(file = %path.display(), error = %e, "could not delete orphan");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use std::path::PathBuf;

    /// Tag accessor backed by the file's own content, for tests
    struct ContentTags;

    #[async_trait]
    impl TagAccessor for ContentTags {
        async fn read_field(&self, file: &Path, _name: &str) -> BridgeResult<Option<String>> {
            let content = std::fs::read_to_string(file)
                .map_err(|e| BridgeError::OperationFailed(e.to_string()))?;
            match content.as_str() {
                "" => Ok(None),
                "corrupt" => Err(BridgeError::OperationFailed("bad container".to_string())),
                id => Ok(Some(id.to_string())),
            }
        }

        async fn write_field(&self, _file: &Path, _name: &str, _value: &str) -> BridgeResult<()> {
            Ok(())
        }
    }

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[tokio::test]
    async fn test_scan_missing_folder_is_empty() {
        let scanner = LibraryScanner::new(Arc::new(ContentTags));
        let memory = scanner.scan(Path::new("/nonexistent/area")).await.unwrap();
        assert!(memory.is_empty());
    }

    #[tokio::test]
    async fn test_scan_recovers_identifiers() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.aiff", "id-1");
        write(dir.path(), "b.aiff", "id-2");

        let scanner = LibraryScanner::new(Arc::new(ContentTags));
        let memory = scanner.scan(dir.path()).await.unwrap();

        assert_eq!(memory.len(), 2);
        assert!(memory.contains("id-1"));
        assert!(memory.contains("id-2"));
    }

    #[tokio::test]
    async fn test_scan_deletes_orphans_and_continues() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "good.aiff", "id-1");
        let untagged = write(dir.path(), "untagged.aiff", "");
        let corrupt = write(dir.path(), "corrupt.aiff", "corrupt");

        let scanner = LibraryScanner::new(Arc::new(ContentTags));
        let memory = scanner.scan(dir.path()).await.unwrap();

        assert_eq!(memory.len(), 1);
        assert!(memory.contains("id-1"));
        assert!(!untagged.exists());
        assert!(!corrupt.exists());
    }
}
