//! Batch Audio Conversion via ffmpeg
//!
//! Spawns one `ffmpeg` process per file. The destination directory is created
//! on demand and existing outputs of the same name are overwritten (`-y`), so
//! a re-run of an interrupted batch converges instead of failing.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    media::AudioConverter,
};
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, instrument, warn};

/// ffmpeg-backed batch converter
///
/// The output container is fixed per converter instance; build one converter
/// per target format (e.g. one for AIFF, one for the MP3 duplicate copies).
pub struct FfmpegConverter {
    /// Output extension including the dot, e.g. ".aiff"
    target_ext: String,
    /// ffmpeg binary to invoke
    binary: String,
}

impl FfmpegConverter {
    pub fn new(target_ext: impl Into<String>) -> Self {
        Self {
            target_ext: target_ext.into(),
            binary: "ffmpeg".to_string(),
        }
    }

    /// Override the ffmpeg binary path
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    async fn convert_one(&self, input: &Path, dest_folder: &Path) -> Result<PathBuf> {
        let stem = input
            .file_stem()
            .ok_or_else(|| {
                BridgeError::OperationFailed(format!("No file stem: {}", input.display()))
            })?
            .to_string_lossy()
            .to_string();
        let output = dest_folder.join(format!("{}{}", stem, self.target_ext));

        let status = Command::new(&self.binary)
            .arg("-y")
            .arg("-i")
            .arg(input)
            .arg("-write_id3v2")
            .arg("1")
            .arg(&output)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                BridgeError::OperationFailed(format!("Failed to spawn {}: {}", self.binary, e))
            })?;

        if !status.status.success() {
            let stderr = String::from_utf8_lossy(&status.stderr);
            return Err(BridgeError::OperationFailed(format!(
                "ffmpeg failed on {}: {}",
                input.display(),
                stderr.lines().last().unwrap_or("unknown error")
            )));
        }

        debug!(input = %input.display(), output = %output.display(), "Converted file");
        Ok(output)
    }
}

#[async_trait]
impl AudioConverter for FfmpegConverter {
    #[instrument(skip(self), fields(folder = %folder.display(), dest = %dest_folder.display()))]
    async fn convert_batch(
        &self,
        folder: &Path,
        source_exts: &[&str],
        dest_folder: &Path,
    ) -> Result<Vec<PathBuf>> {
        tokio::fs::create_dir_all(dest_folder).await?;

        let mut outputs = Vec::new();
        let mut entries = tokio::fs::read_dir(folder).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let matches = path
                .extension()
                .map(|ext| {
                    let dotted = format!(".{}", ext.to_string_lossy());
                    source_exts.iter().any(|s| s.eq_ignore_ascii_case(&dotted))
                })
                .unwrap_or(false);

            if !matches {
                continue;
            }

            match self.convert_one(&path, dest_folder).await {
                Ok(output) => outputs.push(output),
                Err(e) => {
                    // One bad file must not sink the batch
                    warn!(file = %path.display(), error = %e, "Conversion failed, skipping");
                }
            }
        }

        Ok(outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_extension_is_appended() {
        let converter = FfmpegConverter::new(".aiff");
        assert_eq!(converter.target_ext, ".aiff");
    }

    #[tokio::test]
    async fn test_convert_batch_empty_folder() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();

        let converter = FfmpegConverter::new(".aiff");
        let outputs = converter
            .convert_batch(src.path(), &[".flac"], dst.path())
            .await
            .unwrap();

        assert!(outputs.is_empty());
    }

    #[tokio::test]
    async fn test_convert_batch_skips_unmatched_extensions() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        std::fs::write(src.path().join("notes.txt"), b"hi").unwrap();

        let converter = FfmpegConverter::new(".aiff");
        let outputs = converter
            .convert_batch(src.path(), &[".flac", ".wav"], dst.path())
            .await
            .unwrap();

        assert!(outputs.is_empty());
    }
}
