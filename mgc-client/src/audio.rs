//! Local audio files selected for classification

use mgc_common::media::format_file_size;
use mgc_common::AudioMediaType;
use std::path::Path;

use crate::error::ClientError;

/// Declared type for files that are not one of the accepted audio types
const UNKNOWN_MEDIA_TYPE: &str = "application/octet-stream";

/// A file picked by the user, read into memory
#[derive(Debug, Clone)]
pub struct AudioFile {
    pub file_name: String,
    /// `None` when the file is not a recognised audio type
    pub media_type: Option<AudioMediaType>,
    pub bytes: Vec<u8>,
}

impl AudioFile {
    pub fn new(file_name: impl Into<String>, media_type: Option<AudioMediaType>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            media_type,
            bytes,
        }
    }

    /// Read `path`, typing it by extension and falling back to its contents
    pub async fn from_path(path: &Path) -> Result<Self, ClientError> {
        let bytes = tokio::fs::read(path).await?;
        let media_type =
            AudioMediaType::from_extension(path).or_else(|| AudioMediaType::sniff(&bytes));
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        tracing::debug!(
            file_name = %file_name,
            media_type = ?media_type,
            bytes = bytes.len(),
            "Loaded audio file"
        );

        Ok(Self {
            file_name,
            media_type,
            bytes,
        })
    }

    /// Content type sent with the upload
    pub fn declared_type(&self) -> &'static str {
        self.media_type
            .map(|media| media.as_str())
            .unwrap_or(UNKNOWN_MEDIA_TYPE)
    }

    pub fn is_accepted_type(&self) -> bool {
        self.media_type.is_some()
    }

    pub fn size_label(&self) -> String {
        format_file_size(self.bytes.len() as u64)
    }
}
