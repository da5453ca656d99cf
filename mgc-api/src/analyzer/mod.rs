//! Audio analysis capability
//!
//! The HTTP layer only sees the [`Analyzer`] trait. The production backend
//! is [`ProcessAnalyzer`], which runs an external program per upload; tests
//! substitute in-process stubs.

mod process;

pub use process::ProcessAnalyzer;

use async_trait::async_trait;
use mgc_common::api::ClassificationResult;
use mgc_common::AudioMediaType;
use std::time::Duration;
use thiserror::Error;

/// An accepted upload, held in memory
#[derive(Debug, Clone)]
pub struct AudioUpload {
    /// Client-supplied file name, if any
    pub file_name: Option<String>,
    pub media_type: AudioMediaType,
    pub bytes: Vec<u8>,
}

/// Analyzer failures
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The analyzer program could not be started
    #[error("Failed to start analyzer: {0}")]
    Spawn(#[source] std::io::Error),

    /// The analyzer exited unsuccessfully
    #[error("Analyzer failed with exit code {}: {diagnostic}", exit_code_label(.code))]
    ProcessFailed {
        /// Exit code, `None` when terminated by a signal
        code: Option<i32>,
        diagnostic: String,
    },

    /// Output was not a well-formed classification result
    #[error("Invalid analyzer output: {0}")]
    InvalidOutput(String),

    #[error("Analysis timed out after {}s", .0.as_secs())]
    TimedOut(Duration),

    /// Temporary file handling failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The analyzer is shutting down and accepts no more work
    #[error("Analyzer unavailable")]
    Unavailable,
}

fn exit_code_label(code: &Option<i32>) -> String {
    code.map_or_else(|| "none".to_string(), |c| c.to_string())
}

impl AnalysisError {
    /// Message returned to HTTP callers
    pub fn client_message(&self) -> String {
        match self {
            AnalysisError::ProcessFailed { .. } | AnalysisError::TimedOut(_) => self.to_string(),
            AnalysisError::InvalidOutput(_) => "Failed to parse analysis results".to_string(),
            AnalysisError::Spawn(_) | AnalysisError::Io(_) | AnalysisError::Unavailable => {
                "Error processing audio file".to_string()
            }
        }
    }
}

/// Turns one audio upload into a classification
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(&self, upload: &AudioUpload) -> Result<ClassificationResult, AnalysisError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_messages() {
        let failed = AnalysisError::ProcessFailed {
            code: Some(1),
            diagnostic: "model load failed".to_string(),
        };
        assert_eq!(
            failed.client_message(),
            "Analyzer failed with exit code 1: model load failed"
        );

        assert_eq!(
            AnalysisError::InvalidOutput("expected value".to_string()).client_message(),
            "Failed to parse analysis results"
        );
        assert_eq!(
            AnalysisError::TimedOut(Duration::from_secs(120)).client_message(),
            "Analysis timed out after 120s"
        );
        assert_eq!(
            AnalysisError::Unavailable.client_message(),
            "Error processing audio file"
        );
    }

    #[test]
    fn test_signal_exit_has_no_code() {
        let killed = AnalysisError::ProcessFailed {
            code: None,
            diagnostic: "no diagnostic output".to_string(),
        };
        assert_eq!(
            killed.to_string(),
            "Analyzer failed with exit code none: no diagnostic output"
        );
    }
}
