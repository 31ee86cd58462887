//! Media Tooling Abstractions
//!
//! Tag field access and audio format conversion are external collaborators:
//! the sync core decides *what* to stamp and *when* to convert, the
//! implementations decide *how*.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Embedded tag field access
///
/// The sync core uses a single dedicated comment/extended field as the
/// persistent link between a local file and its upstream identity. A file
/// whose field cannot be read is treated as corrupt by the scanner.
#[async_trait]
pub trait TagAccessor: Send + Sync {
    /// Read a named tag field, `None` if the field is absent
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed at all (corrupt or
    /// unsupported container). Absence of the field is not an error.
    async fn read_field(&self, file: &Path, name: &str) -> Result<Option<String>>;

    /// Write a named tag field, creating the tag if the file has none
    async fn write_field(&self, file: &Path, name: &str, value: &str) -> Result<()>;
}

/// Batch audio format conversion
#[async_trait]
pub trait AudioConverter: Send + Sync {
    /// Convert every file in `folder` whose extension is in `source_exts`
    /// into `dest_folder`, returning the output paths
    ///
    /// Existing destination files of the same name are overwritten. The
    /// destination folder is created if missing. Source files are left in
    /// place; the caller owns staging cleanup.
    async fn convert_batch(
        &self,
        folder: &Path,
        source_exts: &[&str],
        dest_folder: &Path,
    ) -> Result<Vec<PathBuf>>;
}
