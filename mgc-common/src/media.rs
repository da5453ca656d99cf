//! Accepted audio media types
//!
//! Uploads are accepted only as MP3, WAV, OGG or M4A, identified by their
//! declared media type.

use std::fmt;
use std::path::Path;

/// Upload size cap (10 MiB)
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Error text returned whenever a file is not one of the accepted audio types
pub const INVALID_FILE_TYPE_MESSAGE: &str =
    "Invalid file type. Please upload an audio file (MP3, WAV, OGG, M4A)";

/// Media type of an accepted audio upload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioMediaType {
    /// audio/mpeg (MP3)
    Mpeg,
    /// audio/wav
    Wav,
    /// audio/ogg
    Ogg,
    /// audio/mp4 (M4A)
    Mp4,
}

impl AudioMediaType {
    pub const ALL: [AudioMediaType; 4] = [
        AudioMediaType::Mpeg,
        AudioMediaType::Wav,
        AudioMediaType::Ogg,
        AudioMediaType::Mp4,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AudioMediaType::Mpeg => "audio/mpeg",
            AudioMediaType::Wav => "audio/wav",
            AudioMediaType::Ogg => "audio/ogg",
            AudioMediaType::Mp4 => "audio/mp4",
        }
    }

    /// File extension used for temporary copies handed to the analyzer
    pub fn extension(&self) -> &'static str {
        match self {
            AudioMediaType::Mpeg => "mp3",
            AudioMediaType::Wav => "wav",
            AudioMediaType::Ogg => "ogg",
            AudioMediaType::Mp4 => "m4a",
        }
    }

    /// Parse a declared `Content-Type`
    ///
    /// Parameters after `;` are ignored, comparison is case-insensitive.
    /// Anything outside the four accepted types yields `None`.
    pub fn parse(content_type: &str) -> Option<AudioMediaType> {
        let essence = content_type.split(';').next().unwrap_or("").trim();
        AudioMediaType::ALL
            .into_iter()
            .find(|media| media.as_str().eq_ignore_ascii_case(essence))
    }

    /// Guess from a file name's extension
    pub fn from_extension(path: &Path) -> Option<AudioMediaType> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "mp3" => Some(AudioMediaType::Mpeg),
            "wav" => Some(AudioMediaType::Wav),
            "ogg" | "oga" => Some(AudioMediaType::Ogg),
            "m4a" | "mp4" => Some(AudioMediaType::Mp4),
            _ => None,
        }
    }

    /// Guess from file contents
    pub fn sniff(bytes: &[u8]) -> Option<AudioMediaType> {
        let kind = infer::get(bytes)?;
        match kind.mime_type() {
            "audio/mpeg" => Some(AudioMediaType::Mpeg),
            "audio/x-wav" | "audio/wav" => Some(AudioMediaType::Wav),
            "audio/ogg" => Some(AudioMediaType::Ogg),
            "audio/m4a" | "audio/mp4" | "video/mp4" => Some(AudioMediaType::Mp4),
            _ => None,
        }
    }
}

impl fmt::Display for AudioMediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Format a byte count the way the upload form shows it
pub fn format_file_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} bytes", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_only_listed_types() {
        assert_eq!(AudioMediaType::parse("audio/mpeg"), Some(AudioMediaType::Mpeg));
        assert_eq!(AudioMediaType::parse("Audio/WAV"), Some(AudioMediaType::Wav));
        assert_eq!(
            AudioMediaType::parse("audio/ogg; codecs=vorbis"),
            Some(AudioMediaType::Ogg)
        );
        assert_eq!(AudioMediaType::parse("audio/mp4"), Some(AudioMediaType::Mp4));

        assert_eq!(AudioMediaType::parse("text/plain"), None);
        assert_eq!(AudioMediaType::parse("audio/flac"), None);
        assert_eq!(AudioMediaType::parse(""), None);
    }

    #[test]
    fn test_from_extension() {
        assert_eq!(
            AudioMediaType::from_extension(Path::new("song.MP3")),
            Some(AudioMediaType::Mpeg)
        );
        assert_eq!(
            AudioMediaType::from_extension(Path::new("/tmp/a.m4a")),
            Some(AudioMediaType::Mp4)
        );
        assert_eq!(AudioMediaType::from_extension(Path::new("notes.txt")), None);
        assert_eq!(AudioMediaType::from_extension(Path::new("no_extension")), None);
    }

    #[test]
    fn test_sniff_wav_header() {
        let mut header = Vec::new();
        header.extend_from_slice(b"RIFF");
        header.extend_from_slice(&36u32.to_le_bytes());
        header.extend_from_slice(b"WAVEfmt ");
        header.resize(64, 0);

        assert_eq!(AudioMediaType::sniff(&header), Some(AudioMediaType::Wav));
        assert_eq!(AudioMediaType::sniff(b"plain text"), None);
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(512), "512 bytes");
        assert_eq!(format_file_size(2048), "2.0 KB");
        assert_eq!(format_file_size(3 * 1024 * 1024 + 512 * 1024), "3.5 MB");
    }
}
