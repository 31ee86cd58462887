//! Embedded Tag Field Access using Lofty
//!
//! Reads and writes the identity comment field the sync core uses to link a
//! local file to its upstream catalog entry. Lofty handles the container
//! differences (Vorbis Comments on FLAC, ID3v2 on AIFF/MP3) behind one tag
//! model, so the same field name works across formats.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    media::TagAccessor,
};
use lofty::config::WriteOptions;
use lofty::file::TaggedFileExt;
use lofty::probe::Probe;
use lofty::tag::{ItemKey, Tag, TagExt};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Lofty-based tag field accessor
pub struct LoftyTagAccessor;

impl LoftyTagAccessor {
    pub fn new() -> Self {
        Self
    }

    /// Map a field name to lofty's tag item key
    fn item_key(name: &str) -> ItemKey {
        if name.eq_ignore_ascii_case("comment") {
            ItemKey::Comment
        } else {
            ItemKey::Unknown(name.to_uppercase())
        }
    }

    fn read_blocking(file: &Path, name: &str) -> Result<Option<String>> {
        let tagged = Probe::open(file)
            .map_err(|e| BridgeError::OperationFailed(format!("Cannot probe file: {}", e)))?
            .read()
            .map_err(|e| BridgeError::OperationFailed(format!("Cannot parse tags: {}", e)))?;

        let key = Self::item_key(name);
        let value = tagged
            .tags()
            .iter()
            .find_map(|tag| tag.get_string(&key))
            .map(|s| s.to_string());

        Ok(value)
    }

    fn write_blocking(file: &Path, name: &str, value: &str) -> Result<()> {
        let mut tagged = Probe::open(file)
            .map_err(|e| BridgeError::OperationFailed(format!("Cannot probe file: {}", e)))?
            .read()
            .map_err(|e| BridgeError::OperationFailed(format!("Cannot parse tags: {}", e)))?;

        if tagged.primary_tag().is_none() {
            let tag_type = tagged.primary_tag_type();
            tagged.insert_tag(Tag::new(tag_type));
        }

        let Some(tag) = tagged.primary_tag_mut() else {
            return Err(BridgeError::OperationFailed(
                "File accepts no tag container".to_string(),
            ));
        };

        tag.insert_text(Self::item_key(name), value.to_string());
        tag.save_to_path(file, WriteOptions::default())
            .map_err(|e| BridgeError::OperationFailed(format!("Cannot save tags: {}", e)))?;

        debug!(file = %file.display(), field = name, "Wrote tag field");
        Ok(())
    }
}

impl Default for LoftyTagAccessor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TagAccessor for LoftyTagAccessor {
    async fn read_field(&self, file: &Path, name: &str) -> Result<Option<String>> {
        let file: PathBuf = file.to_path_buf();
        let name = name.to_string();

        tokio::task::spawn_blocking(move || Self::read_blocking(&file, &name))
            .await
            .map_err(|e| BridgeError::OperationFailed(format!("Tag read task failed: {}", e)))?
    }

    async fn write_field(&self, file: &Path, name: &str, value: &str) -> Result<()> {
        let file: PathBuf = file.to_path_buf();
        let name = name.to_string();
        let value = value.to_string();

        tokio::task::spawn_blocking(move || Self::write_blocking(&file, &name, &value))
            .await
            .map_err(|e| BridgeError::OperationFailed(format!("Tag write task failed: {}", e)))?
    }
}
