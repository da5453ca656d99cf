//! Classification flow
//!
//! Drives one classification session: check the backend, accept a file,
//! classify it, show the result. States are
//! `Idle -> Analyzing -> ShowingResults | Error`, and `reset` returns to
//! `Idle`. When the backend is unavailable or fails, the simulated
//! classifier stands in and the result is tagged as simulated.

use async_trait::async_trait;
use mgc_common::api::ClassificationResult;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::audio::AudioFile;
use crate::client::ApiClient;
use crate::error::ClientError;
use crate::simulate::{simulate_classification, SIMULATED_NOTICE};

/// Shown when the health check fails
pub const API_UNAVAILABLE_MESSAGE: &str = "API connection failed. Using simulated classification.";

/// Shown when the chosen file is not an accepted audio type
pub const SELECT_AUDIO_MESSAGE: &str = "Please upload an audio file (MP3, WAV, OGG, M4A)";

/// Flow-level failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    #[error("Please upload an audio file (MP3, WAV, OGG, M4A)")]
    InvalidFileType,

    #[error("No file selected")]
    NoFileSelected,
}

/// Backend seen by the flow; implemented by [`ApiClient`]
#[async_trait]
pub trait ClassifierBackend: Send + Sync {
    /// Health check; returns the backend's status message
    async fn health(&self) -> Result<String, ClientError>;

    async fn classify(&self, file: &AudioFile) -> Result<ClassificationResult, ClientError>;
}

#[async_trait]
impl ClassifierBackend for ApiClient {
    async fn health(&self) -> Result<String, ClientError> {
        let health = self.check_health().await?;
        Ok(if health.message.is_empty() {
            "API connected".to_string()
        } else {
            health.message
        })
    }

    async fn classify(&self, file: &AudioFile) -> Result<ClassificationResult, ClientError> {
        self.analyze_audio(file).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiStatus {
    Connecting,
    Connected(String),
    Unavailable(String),
}

impl ApiStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, ApiStatus::Connected(_))
    }
}

impl fmt::Display for ApiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiStatus::Connecting => f.write_str("Checking API connection..."),
            ApiStatus::Connected(message) | ApiStatus::Unavailable(message) => {
                f.write_str(message)
            }
        }
    }
}

/// Where a classification came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationSource {
    Backend,
    Simulated,
}

/// A result ready to show
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub result: ClassificationResult,
    pub source: ClassificationSource,
    /// Set for simulated results
    pub notice: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FlowState {
    Idle,
    Analyzing,
    ShowingResults(Classification),
    Error(String),
}

pub struct ClassificationFlow<B: ClassifierBackend> {
    backend: B,
    api_status: ApiStatus,
    state: FlowState,
    file: Option<AudioFile>,
    rng: StdRng,
    simulated_delay: Duration,
}

impl<B: ClassifierBackend> ClassificationFlow<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            api_status: ApiStatus::Connecting,
            state: FlowState::Idle,
            file: None,
            rng: StdRng::from_entropy(),
            simulated_delay: Duration::ZERO,
        }
    }

    /// Pause before returning a simulated result
    pub fn with_simulated_delay(mut self, delay: Duration) -> Self {
        self.simulated_delay = delay;
        self
    }

    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn api_status(&self) -> &ApiStatus {
        &self.api_status
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    pub fn selected_file(&self) -> Option<&AudioFile> {
        self.file.as_ref()
    }

    /// Run the health check and record the outcome
    pub async fn connect(&mut self) -> &ApiStatus {
        self.api_status = ApiStatus::Connecting;
        self.api_status = match self.backend.health().await {
            Ok(message) => {
                tracing::info!(message = %message, "API connected");
                ApiStatus::Connected(message)
            }
            Err(e) => {
                tracing::warn!(error = %e, "API health check failed");
                ApiStatus::Unavailable(API_UNAVAILABLE_MESSAGE.to_string())
            }
        };
        &self.api_status
    }

    /// Choose the file to classify; non-audio files are refused
    pub fn select_file(&mut self, file: AudioFile) -> Result<(), FlowError> {
        if !file.is_accepted_type() {
            self.file = None;
            self.state = FlowState::Error(SELECT_AUDIO_MESSAGE.to_string());
            return Err(FlowError::InvalidFileType);
        }

        self.file = Some(file);
        self.state = FlowState::Idle;
        Ok(())
    }

    /// Classify the selected file
    ///
    /// Uses the backend when connected. A backend failure, or no connection,
    /// falls back to the simulated classifier.
    pub async fn analyze(&mut self) -> Result<Classification, FlowError> {
        let Some(file) = self.file.as_ref() else {
            return Err(FlowError::NoFileSelected);
        };
        self.state = FlowState::Analyzing;

        let backend_result = if self.api_status.is_connected() {
            match self.backend.classify(file).await {
                Ok(result) => Some(result),
                Err(e) => {
                    tracing::warn!(error = %e, "Backend analysis failed, using simulation");
                    None
                }
            }
        } else {
            None
        };

        let classification = match backend_result {
            Some(result) => Classification {
                result,
                source: ClassificationSource::Backend,
                notice: None,
            },
            None => {
                if !self.simulated_delay.is_zero() {
                    tokio::time::sleep(self.simulated_delay).await;
                }
                Classification {
                    result: simulate_classification(&file.file_name, &mut self.rng),
                    source: ClassificationSource::Simulated,
                    notice: Some(SIMULATED_NOTICE.to_string()),
                }
            }
        };

        self.state = FlowState::ShowingResults(classification.clone());
        Ok(classification)
    }

    /// Clear the file and result
    pub fn reset(&mut self) {
        self.file = None;
        self.state = FlowState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mgc_common::{AudioMediaType, GenreLabel};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct FakeBackend {
        healthy: bool,
        classify_fails: bool,
        classify_calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ClassifierBackend for FakeBackend {
        async fn health(&self) -> Result<String, ClientError> {
            if self.healthy {
                Ok("Music genre classifier API is running".to_string())
            } else {
                Err(ClientError::Api {
                    status: 503,
                    message: "API responded with status: 503".to_string(),
                })
            }
        }

        async fn classify(&self, _file: &AudioFile) -> Result<ClassificationResult, ClientError> {
            self.classify_calls.fetch_add(1, Ordering::SeqCst);
            if self.classify_fails {
                return Err(ClientError::Api {
                    status: 500,
                    message: "Analyzer failed with exit code 1: model load failed".to_string(),
                });
            }
            Ok(ClassificationResult {
                genre: GenreLabel::Metal,
                confidence: 0.8,
                top_genres: vec![GenreLabel::Metal, GenreLabel::Rock],
                top_confidences: vec![0.8, 0.2],
                spectrogram: Some("png".to_string()),
            })
        }
    }

    fn mp3(name: &str) -> AudioFile {
        AudioFile::new(name, Some(AudioMediaType::Mpeg), vec![1, 2, 3])
    }

    fn flow(backend: FakeBackend) -> ClassificationFlow<FakeBackend> {
        ClassificationFlow::new(backend).with_rng(StdRng::seed_from_u64(42))
    }

    #[tokio::test]
    async fn test_connected_flow_uses_backend() {
        let mut flow = flow(FakeBackend {
            healthy: true,
            ..Default::default()
        });

        assert_eq!(flow.api_status(), &ApiStatus::Connecting);
        assert!(flow.connect().await.is_connected());

        flow.select_file(mp3("song.mp3")).unwrap();
        let classification = flow.analyze().await.unwrap();

        assert_eq!(classification.source, ClassificationSource::Backend);
        assert_eq!(classification.result.genre, GenreLabel::Metal);
        assert!(classification.notice.is_none());
        assert_eq!(flow.state(), &FlowState::ShowingResults(classification));
    }

    #[tokio::test]
    async fn test_unavailable_api_simulates_without_calling_backend() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut flow = flow(FakeBackend {
            healthy: false,
            classify_calls: calls.clone(),
            ..Default::default()
        });

        assert_eq!(
            flow.connect().await,
            &ApiStatus::Unavailable(API_UNAVAILABLE_MESSAGE.to_string())
        );

        flow.select_file(mp3("jazz_standards.mp3")).unwrap();
        let classification = flow.analyze().await.unwrap();

        assert_eq!(classification.source, ClassificationSource::Simulated);
        assert_eq!(classification.notice.as_deref(), Some(SIMULATED_NOTICE));
        assert!(classification.result.spectrogram.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_backend_failure_falls_back_to_simulation() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut flow = flow(FakeBackend {
            healthy: true,
            classify_fails: true,
            classify_calls: calls.clone(),
        });
        flow.connect().await;
        flow.select_file(mp3("a.mp3")).unwrap();

        let classification = flow.analyze().await.unwrap();
        assert_eq!(classification.source, ClassificationSource::Simulated);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_rejects_non_audio_file() {
        let mut flow = flow(FakeBackend::default());
        let err = flow
            .select_file(AudioFile::new("notes.txt", None, b"hi".to_vec()))
            .unwrap_err();

        assert_eq!(err, FlowError::InvalidFileType);
        assert_eq!(flow.state(), &FlowState::Error(SELECT_AUDIO_MESSAGE.to_string()));
        assert!(flow.selected_file().is_none());
        assert_eq!(flow.analyze().await.unwrap_err(), FlowError::NoFileSelected);
    }

    #[tokio::test]
    async fn test_reset_returns_to_idle() {
        let mut flow = flow(FakeBackend::default());
        flow.select_file(mp3("x.mp3")).unwrap();
        flow.analyze().await.unwrap();

        flow.reset();
        assert_eq!(flow.state(), &FlowState::Idle);
        assert!(flow.selected_file().is_none());
    }
}
