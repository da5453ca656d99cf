//! External-process analyzer
//!
//! Runs `program args... <audio-path>` once per upload. On success the
//! program prints one classification JSON document to stdout and exits 0;
//! anything else is a failure with diagnostics on stderr.

use async_trait::async_trait;
use mgc_common::api::ClassificationResult;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use tokio::sync::Semaphore;

use super::{AnalysisError, Analyzer, AudioUpload};
use crate::config::AnalyzerConfig;
use crate::upload::TempAudioFile;

const NO_DIAGNOSTIC: &str = "no diagnostic output";

/// Analyzer backed by an external program
pub struct ProcessAnalyzer {
    program: String,
    args: Vec<String>,
    timeout: Duration,
    /// Bounds how many analyzer processes run at once
    permits: Arc<Semaphore>,
}

impl ProcessAnalyzer {
    pub fn new(config: &AnalyzerConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
            timeout: config.timeout(),
            permits: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
        }
    }

    /// Invocations that could start right now without queueing
    pub fn available_slots(&self) -> usize {
        self.permits.available_permits()
    }
}

#[async_trait]
impl Analyzer for ProcessAnalyzer {
    async fn analyze(&self, upload: &AudioUpload) -> Result<ClassificationResult, AnalysisError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| AnalysisError::Unavailable)?;

        // Removed when this guard drops, on every return path below
        let audio = TempAudioFile::write(upload).await?;

        tracing::debug!(
            program = %self.program,
            audio_file = %audio.path().display(),
            "Running analyzer"
        );

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg(audio.path())
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, command.output()).await {
            Ok(result) => result.map_err(AnalysisError::Spawn)?,
            Err(_) => {
                tracing::warn!(
                    program = %self.program,
                    timeout_secs = self.timeout.as_secs(),
                    "Analyzer timed out, process killed"
                );
                return Err(AnalysisError::TimedOut(self.timeout));
            }
        };

        if !output.status.success() {
            let diagnostic = diagnostic_from(&output.stderr, &output.stdout);
            tracing::error!(
                exit_code = ?output.status.code(),
                diagnostic = %diagnostic,
                "Analyzer exited unsuccessfully"
            );
            return Err(AnalysisError::ProcessFailed {
                code: output.status.code(),
                diagnostic,
            });
        }

        let result = parse_output(&output.stdout)?;

        tracing::info!(
            genre = %result.genre,
            confidence = result.confidence,
            has_spectrogram = result.spectrogram.is_some(),
            "Analysis completed"
        );

        Ok(result)
    }
}

/// Parse and check analyzer stdout
fn parse_output(stdout: &[u8]) -> Result<ClassificationResult, AnalysisError> {
    let result: ClassificationResult = serde_json::from_slice(stdout).map_err(|e| {
        tracing::error!(error = %e, "Failed to parse analyzer output");
        AnalysisError::InvalidOutput(e.to_string())
    })?;

    result.validate().map_err(|e| {
        tracing::error!(error = %e, "Analyzer output failed validation");
        AnalysisError::InvalidOutput(e.to_string())
    })?;

    Ok(result)
}

/// Best available explanation for a failed run
///
/// Prefers stderr; failing that, an `{"error": ...}` document on stdout.
fn diagnostic_from(stderr: &[u8], stdout: &[u8]) -> String {
    let stderr = String::from_utf8_lossy(stderr).trim().to_string();
    if !stderr.is_empty() {
        return stderr;
    }

    serde_json::from_slice::<serde_json::Value>(stdout)
        .ok()
        .and_then(|value| value.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| NO_DIAGNOSTIC.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mgc_common::GenreLabel;

    #[test]
    fn test_diagnostic_prefers_stderr() {
        assert_eq!(
            diagnostic_from(b"  model load failed\n", br#"{"error":"ignored"}"#),
            "model load failed"
        );
    }

    #[test]
    fn test_diagnostic_from_stdout_error_document() {
        assert_eq!(
            diagnostic_from(b"", br#"{"error":"Error analyzing audio: bad header"}"#),
            "Error analyzing audio: bad header"
        );
        assert_eq!(diagnostic_from(b"", b"garbage"), NO_DIAGNOSTIC);
        assert_eq!(diagnostic_from(b"\n", b""), NO_DIAGNOSTIC);
    }

    #[test]
    fn test_parse_output_accepts_valid_document() {
        let result = parse_output(
            br#"{"genre":"jazz","confidence":0.5,"top_genres":["jazz","blues"],"top_confidences":[0.5,0.3],"spectrogram":null}"#,
        )
        .unwrap();
        assert_eq!(result.genre, GenreLabel::Jazz);
        assert_eq!(result.top_genres.len(), 2);
    }

    #[test]
    fn test_parse_output_rejects_bad_documents() {
        assert!(matches!(
            parse_output(b"not json"),
            Err(AnalysisError::InvalidOutput(_))
        ));

        // Unknown label
        assert!(matches!(
            parse_output(br#"{"genre":"polka","confidence":0.5,"top_genres":["polka"],"top_confidences":[0.5]}"#),
            Err(AnalysisError::InvalidOutput(_))
        ));

        // Confidences sum above 1
        assert!(matches!(
            parse_output(br#"{"genre":"pop","confidence":0.9,"top_genres":["pop","rock"],"top_confidences":[0.9,0.8]}"#),
            Err(AnalysisError::InvalidOutput(_))
        ));
    }

    #[test]
    fn test_semaphore_sized_from_config() {
        let config = AnalyzerConfig {
            max_concurrent: 2,
            ..AnalyzerConfig::default()
        };
        assert_eq!(ProcessAnalyzer::new(&config).available_slots(), 2);
    }
}
