//! Scoped temporary copies of uploaded audio
//!
//! The analyzer reads from a path, so each upload is written to a temporary
//! file that lives exactly as long as its [`TempAudioFile`]. The file is
//! removed when the guard drops, whichever way the request ends.

use std::io;
use std::path::Path;
use tempfile::NamedTempFile;

use crate::analyzer::AudioUpload;

const TEMP_PREFIX: &str = "mgc-upload-";

/// Temporary file holding one upload
#[derive(Debug)]
pub struct TempAudioFile {
    file: NamedTempFile,
}

impl TempAudioFile {
    /// Write `upload` to a new file in the system temp directory
    pub async fn write(upload: &AudioUpload) -> io::Result<Self> {
        Self::write_in(&std::env::temp_dir(), upload).await
    }

    /// Write `upload` to a new file in `dir`
    pub async fn write_in(dir: &Path, upload: &AudioUpload) -> io::Result<Self> {
        let suffix = format!(".{}", extension_for(upload));
        let file = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(&suffix)
            .tempfile_in(dir)?;

        tokio::fs::write(file.path(), &upload.bytes).await?;

        tracing::debug!(
            path = %file.path().display(),
            bytes = upload.bytes.len(),
            "Wrote upload to temporary file"
        );

        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

impl Drop for TempAudioFile {
    fn drop(&mut self) {
        tracing::debug!(path = %self.file.path().display(), "Removing temporary upload");
    }
}

/// Keep the client's extension when it looks sane, else use the media type's
fn extension_for(upload: &AudioUpload) -> String {
    upload
        .file_name
        .as_deref()
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_else(|| upload.media_type.extension().to_string())
}
