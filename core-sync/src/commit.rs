//! Per-batch commit: acquire, stamp identity, convert, clean staging
//!
//! Runs strictly after a batch's resolution barrier and strictly before the
//! next `advance` call. Crash loss is therefore bounded to one uncommitted
//! batch.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use bridge_traits::catalog::TrackCatalog;
use bridge_traits::media::{AudioConverter, TagAccessor};
use bridge_traits::source::FallbackCatalog;
use core_resolver::ResolvedTrack;

use crate::error::{Result, SyncError};
use crate::memory::{ConfirmedSet, MemorySet};

/// Tag field carrying the upstream identifier on every local file
pub const IDENTITY_FIELD: &str = "comment";

/// Extensions acquisitions can arrive in before conversion
const STAGED_EXTENSIONS: &[&str] = &["flac", "wav", "mp3"];

/// How one resolved track's audio is fetched
///
/// The licensed catalog downloads by track id; the fallback catalog goes
/// through the track's public permalink.
#[async_trait]
pub trait AcquireAudio: Send + Sync {
    async fn acquire(&self, track: &ResolvedTrack, dest_dir: &Path) -> Result<PathBuf>;
}

pub struct CatalogAcquirer {
    catalog: Arc<dyn TrackCatalog>,
}

impl CatalogAcquirer {
    pub fn new(catalog: Arc<dyn TrackCatalog>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl AcquireAudio for CatalogAcquirer {
    async fn acquire(&self, track: &ResolvedTrack, dest_dir: &Path) -> Result<PathBuf> {
        Ok(self
            .catalog
            .download_track(&track.catalog_id, dest_dir)
            .await?)
    }
}

pub struct FallbackAcquirer {
    catalog: Arc<dyn FallbackCatalog>,
}

impl FallbackAcquirer {
    pub fn new(catalog: Arc<dyn FallbackCatalog>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl AcquireAudio for FallbackAcquirer {
    async fn acquire(&self, track: &ResolvedTrack, dest_dir: &Path) -> Result<PathBuf> {
        let permalink = track.permalink.as_deref().ok_or_else(|| {
            SyncError::Commit(format!(
                "no permalink on fallback track {}",
                track.catalog_id
            ))
        })?;
        Ok(self.catalog.download(permalink, dest_dir).await?)
    }
}

/// Destination directories of one storage area
#[derive(Debug, Clone)]
pub struct AreaDirs {
    /// Primary-format directory the converted files land in
    pub primary: PathBuf,
    /// Optional duplicate-format directory (the `mp3_copy` flag)
    pub duplicate: Option<PathBuf>,
}

/// The acquire → tag → convert → clean pipeline shared by both areas
pub struct CommitPipeline {
    tags: Arc<dyn TagAccessor>,
    converter: Arc<dyn AudioConverter>,
    duplicate_converter: Option<Arc<dyn AudioConverter>>,
    staging_dir: PathBuf,
}

impl CommitPipeline {
    pub fn new(
        tags: Arc<dyn TagAccessor>,
        converter: Arc<dyn AudioConverter>,
        duplicate_converter: Option<Arc<dyn AudioConverter>>,
        staging_dir: PathBuf,
    ) -> Self {
        Self {
            tags,
            converter,
            duplicate_converter,
            staging_dir,
        }
    }

    /// Commit one batch's resolved tracks into a storage area
    ///
    /// Tracks whose reported identifier is already in the memory set are
    /// confirmed without a download: the cascade may resolve a descriptor to
    /// an identifier a prior pass already acquired under. Returns the number
    /// of new acquisitions.
    ///
    /// The identity tag is stamped on the staged file *before* conversion,
    /// so the converted copies inherit it and a later scan recovers identity
    /// without any API call.
    #[instrument(skip_all, fields(tracks = resolved.len()))]
    pub async fn commit(
        &self,
        acquirer: &dyn AcquireAudio,
        resolved: &[ResolvedTrack],
        memory: &MemorySet,
        confirmed: &mut ConfirmedSet,
        area: &AreaDirs,
    ) -> Result<usize> {
        let mut downloads = 0;

        for track in resolved {
            if memory.contains(&track.reported_id) {
                confirmed.insert(track.reported_id.clone());
                continue;
            }

            if downloads == 0 {
                tokio::fs::create_dir_all(&self.staging_dir).await?;
            }

            let staged = acquirer.acquire(track, &self.staging_dir).await?;
            self.tags
                .write_field(&staged, IDENTITY_FIELD, &track.reported_id)
                .await?;
            confirmed.insert(track.reported_id.clone());
            downloads += 1;
            debug!(file = %staged.display(), id = %track.reported_id, "staged");
        }

        if downloads > 0 {
            self.converter
                .convert_batch(&self.staging_dir, STAGED_EXTENSIONS, &area.primary)
                .await?;
            if let (Some(converter), Some(dest)) =
                (&self.duplicate_converter, &area.duplicate)
            {
                converter
                    .convert_batch(&self.staging_dir, STAGED_EXTENSIONS, dest)
                    .await?;
            }

            self.clear_staging().await?;
            info!(downloads, "batch committed");
        }

        Ok(downloads)
    }

    /// Empty the staging directory after a committed batch
    async fn clear_staging(&self) -> Result<()> {
        let mut entries = tokio::fs::read_dir(&self.staging_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                tokio::fs::remove_file(entry.path()).await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::error::Result as BridgeResult;
    use core_resolver::{MatchStrategy, TrackDescriptor};
    use std::sync::Mutex;

    struct RecordingTags {
        written: Mutex<Vec<(PathBuf, String)>>,
    }

    #[async_trait]
    impl TagAccessor for RecordingTags {
        async fn read_field(&self, _file: &Path, _name: &str) -> BridgeResult<Option<String>> {
            Ok(None)
        }

        async fn write_field(&self, file: &Path, name: &str, value: &str) -> BridgeResult<()> {
            assert_eq!(name, IDENTITY_FIELD);
            self.written
                .lock()
                .unwrap()
                .push((file.to_path_buf(), value.to_string()));
            Ok(())
        }
    }

    struct CopyConverter;

    #[async_trait]
    impl AudioConverter for CopyConverter {
        async fn convert_batch(
            &self,
            folder: &Path,
            _source_exts: &[&str],
            dest_folder: &Path,
        ) -> BridgeResult<Vec<PathBuf>> {
            std::fs::create_dir_all(dest_folder).unwrap();
            let mut out = Vec::new();
            for entry in std::fs::read_dir(folder).unwrap() {
                let path = entry.unwrap().path();
                let dest = dest_folder.join(path.file_name().unwrap());
                std::fs::copy(&path, &dest).unwrap();
                out.push(dest);
            }
            Ok(out)
        }
    }

    struct FakeAcquirer;

    #[async_trait]
    impl AcquireAudio for FakeAcquirer {
        async fn acquire(&self, track: &ResolvedTrack, dest_dir: &Path) -> Result<PathBuf> {
            let path = dest_dir.join(format!("{}.flac", track.catalog_id));
            std::fs::write(&path, b"audio").unwrap();
            Ok(path)
        }
    }

    fn resolved(id: &str, reported: &str) -> ResolvedTrack {
        ResolvedTrack {
            descriptor: TrackDescriptor {
                title: id.to_string(),
                album: "A".to_string(),
                artists: vec!["X".to_string()],
                isrc: Some(reported.to_string()),
                position: 0,
            },
            catalog_id: id.to_string(),
            reported_id: reported.to_string(),
            strategy: MatchStrategy::Identifier,
            permalink: None,
        }
    }

    #[tokio::test]
    async fn test_commit_acquires_tags_converts_and_cleans() {
        let root = tempfile::tempdir().unwrap();
        let staging = root.path().join("staging");
        let area = AreaDirs {
            primary: root.path().join("P/AIFF"),
            duplicate: None,
        };

        let tags = Arc::new(RecordingTags {
            written: Mutex::new(Vec::new()),
        });
        let pipeline = CommitPipeline::new(
            Arc::clone(&tags) as Arc<dyn TagAccessor>,
            Arc::new(CopyConverter),
            None,
            staging.clone(),
        );

        let mut confirmed = ConfirmedSet::new();
        let downloads = pipeline
            .commit(
                &FakeAcquirer,
                &[resolved("t1", "id-1")],
                &MemorySet::new(),
                &mut confirmed,
                &area,
            )
            .await
            .unwrap();

        assert_eq!(downloads, 1);
        assert!(confirmed.contains("id-1"));
        assert!(area.primary.join("t1.flac").exists());
        // Tag stamped on the staged file before conversion
        assert_eq!(tags.written.lock().unwrap()[0].1, "id-1");
        // Staging emptied after conversion
        assert_eq!(std::fs::read_dir(&staging).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_commit_skips_download_for_remembered_identifier() {
        let root = tempfile::tempdir().unwrap();
        let area = AreaDirs {
            primary: root.path().join("P/AIFF"),
            duplicate: None,
        };

        let mut memory = MemorySet::new();
        memory.insert(crate::memory::LocalTrackRecord {
            identifier: "id-1".to_string(),
            path: root.path().join("P/AIFF/old.aiff"),
        });

        let pipeline = CommitPipeline::new(
            Arc::new(RecordingTags {
                written: Mutex::new(Vec::new()),
            }),
            Arc::new(CopyConverter),
            None,
            root.path().join("staging"),
        );

        let mut confirmed = ConfirmedSet::new();
        let downloads = pipeline
            .commit(
                &FakeAcquirer,
                &[resolved("t1", "id-1")],
                &memory,
                &mut confirmed,
                &area,
            )
            .await
            .unwrap();

        assert_eq!(downloads, 0);
        assert!(confirmed.contains("id-1"));
        assert!(!area.primary.exists());
    }

    #[tokio::test]
    async fn test_commit_writes_duplicate_copies() {
        let root = tempfile::tempdir().unwrap();
        let area = AreaDirs {
            primary: root.path().join("P/AIFF"),
            duplicate: Some(root.path().join("P/MP3")),
        };

        let pipeline = CommitPipeline::new(
            Arc::new(RecordingTags {
                written: Mutex::new(Vec::new()),
            }),
            Arc::new(CopyConverter),
            Some(Arc::new(CopyConverter)),
            root.path().join("staging"),
        );

        let mut confirmed = ConfirmedSet::new();
        pipeline
            .commit(
                &FakeAcquirer,
                &[resolved("t1", "id-1")],
                &MemorySet::new(),
                &mut confirmed,
                &area,
            )
            .await
            .unwrap();

        assert!(area.primary.join("t1.flac").exists());
        assert!(area.duplicate.unwrap().join("t1.flac").exists());
    }
}
