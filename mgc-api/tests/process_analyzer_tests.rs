//! ProcessAnalyzer against fake analyzer scripts
//!
//! Each script is run through `sh`, receives the temporary audio path as
//! `$1`, and records it so the tests can check the file was cleaned up.
//! `$STATE` names the fake's own directory for any other bookkeeping.

#![cfg(unix)]

use mgc_api::analyzer::{AnalysisError, Analyzer, AudioUpload, ProcessAnalyzer};
use mgc_api::config::AnalyzerConfig;
use mgc_common::{AudioMediaType, GenreLabel};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

const VALID_OUTPUT: &str = r#"{"genre":"jazz","confidence":0.55,"top_genres":["jazz","blues","classical"],"top_confidences":[0.55,0.3,0.15],"spectrogram":"iVBORw0KGgo="}"#;

struct FakeAnalyzer {
    dir: TempDir,
}

impl FakeAnalyzer {
    /// Script body runs after `$1` has been recorded
    fn new(body: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let script = format!(
            "STATE=\"{}\"\necho \"$1\" > \"$STATE/seen_path\"\n{}\n",
            dir.path().display(),
            body
        );
        std::fs::write(dir.path().join("analyze.sh"), script).unwrap();
        Self { dir }
    }

    fn analyzer(&self, timeout_secs: u64, max_concurrent: usize) -> ProcessAnalyzer {
        ProcessAnalyzer::new(&AnalyzerConfig {
            program: "sh".to_string(),
            args: vec![self.dir.path().join("analyze.sh").display().to_string()],
            timeout_secs,
            max_concurrent,
        })
    }

    /// Lines appended to `$STATE/<name>`; empty when the file was never written
    fn lines(&self, name: &str) -> Vec<String> {
        std::fs::read_to_string(self.dir.path().join(name))
            .map(|content| content.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }

    fn seen_path(&self) -> PathBuf {
        let recorded = std::fs::read_to_string(self.dir.path().join("seen_path")).unwrap();
        PathBuf::from(recorded.trim())
    }
}

fn upload() -> AudioUpload {
    AudioUpload {
        file_name: Some("track01.mp3".to_string()),
        media_type: AudioMediaType::Mpeg,
        bytes: b"ID3\x03\x00\x00\x00\x00\x00\x00fake".to_vec(),
    }
}

fn assert_removed(path: &Path) {
    assert!(
        path.to_string_lossy().ends_with(".mp3"),
        "temporary file should keep the upload's extension: {}",
        path.display()
    );
    assert!(!path.exists(), "temporary file still present: {}", path.display());
}

#[tokio::test]
async fn test_successful_analysis() {
    let fake = FakeAnalyzer::new(&format!("cat <<'EOF'\n{}\nEOF", VALID_OUTPUT));
    let result = fake.analyzer(10, 2).analyze(&upload()).await.unwrap();

    assert_eq!(result.genre, GenreLabel::Jazz);
    assert_eq!(
        result.top_genres,
        vec![GenreLabel::Jazz, GenreLabel::Blues, GenreLabel::Classical]
    );
    assert_eq!(result.spectrogram.as_deref(), Some("iVBORw0KGgo="));
    assert_removed(&fake.seen_path());
}

#[tokio::test]
async fn test_analyzer_sees_uploaded_bytes() {
    let fake = FakeAnalyzer::new(&format!(
        "head -c 3 \"$1\" | grep -q ID3 || exit 3\ncat <<'EOF'\n{}\nEOF",
        VALID_OUTPUT
    ));
    assert!(fake.analyzer(10, 1).analyze(&upload()).await.is_ok());
}

#[tokio::test]
async fn test_nonzero_exit_carries_stderr() {
    let fake = FakeAnalyzer::new("echo 'model load failed' >&2\nexit 1");
    let err = fake.analyzer(10, 1).analyze(&upload()).await.unwrap_err();

    match &err {
        AnalysisError::ProcessFailed { code, diagnostic } => {
            assert_eq!(*code, Some(1));
            assert_eq!(diagnostic, "model load failed");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(err.client_message().contains("model load failed"));
    assert_removed(&fake.seen_path());
}

#[tokio::test]
async fn test_nonzero_exit_with_json_error_on_stdout() {
    let fake = FakeAnalyzer::new(
        "echo '{\"error\": \"Error analyzing audio: unsupported codec\"}'\nexit 1",
    );
    let err = fake.analyzer(10, 1).analyze(&upload()).await.unwrap_err();

    assert!(matches!(
        err,
        AnalysisError::ProcessFailed { ref diagnostic, .. }
            if diagnostic == "Error analyzing audio: unsupported codec"
    ));
}

#[tokio::test]
async fn test_malformed_output() {
    let fake = FakeAnalyzer::new("echo 'this is not json'");
    let err = fake.analyzer(10, 1).analyze(&upload()).await.unwrap_err();

    assert!(matches!(err, AnalysisError::InvalidOutput(_)));
    assert_eq!(err.client_message(), "Failed to parse analysis results");
    assert_removed(&fake.seen_path());
}

#[tokio::test]
async fn test_timeout_kills_analyzer() {
    let fake = FakeAnalyzer::new("sleep 30");
    let started = std::time::Instant::now();
    let err = fake.analyzer(1, 1).analyze(&upload()).await.unwrap_err();

    assert!(matches!(err, AnalysisError::TimedOut(_)));
    assert_eq!(err.client_message(), "Analysis timed out after 1s");
    assert!(started.elapsed() < std::time::Duration::from_secs(10));
    assert_removed(&fake.seen_path());
}

#[tokio::test]
async fn test_missing_program() {
    let analyzer = ProcessAnalyzer::new(&AnalyzerConfig {
        program: "/nonexistent/mgc-analyzer".to_string(),
        args: Vec::new(),
        timeout_secs: 5,
        max_concurrent: 1,
    });
    let err = analyzer.analyze(&upload()).await.unwrap_err();

    assert!(matches!(err, AnalysisError::Spawn(_)));
    assert_eq!(err.client_message(), "Error processing audio file");
}

/// Holds a `mkdir` lock while running; a run that finds the lock taken
/// logs the overlap and fails
fn exclusive_body(hold: &str) -> String {
    format!(
        "mkdir \"$STATE/running\" 2>/dev/null || {{ echo overlap >> \"$STATE/overlaps\"; exit 4; }}\n\
         echo run >> \"$STATE/runs\"\n\
         sleep {}\n\
         rmdir \"$STATE/running\"\n\
         cat <<'EOF'\n{}\nEOF",
        hold, VALID_OUTPUT
    )
}

async fn run_concurrently(analyzer: &Arc<ProcessAnalyzer>, count: usize) -> usize {
    let mut handles = Vec::new();
    for _ in 0..count {
        let analyzer = Arc::clone(analyzer);
        handles.push(tokio::spawn(async move { analyzer.analyze(&upload()).await }));
    }

    let mut succeeded = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            succeeded += 1;
        }
    }
    succeeded
}

#[tokio::test]
async fn test_concurrent_requests_queue_behind_limit() {
    let fake = FakeAnalyzer::new(&exclusive_body("0.3"));
    let analyzer = Arc::new(fake.analyzer(10, 1));

    assert_eq!(run_concurrently(&analyzer, 3).await, 3);

    assert_eq!(fake.lines("runs").len(), 3);
    assert!(fake.lines("overlaps").is_empty(), "runs overlapped with max_concurrent = 1");
    assert_eq!(analyzer.available_slots(), 1);
}

#[tokio::test]
async fn test_overlap_detected_without_limit() {
    // Same script with room for every request: the lock must catch the overlap
    let fake = FakeAnalyzer::new(&exclusive_body("1"));
    let analyzer = Arc::new(fake.analyzer(10, 3));

    let succeeded = run_concurrently(&analyzer, 3).await;

    assert!(succeeded < 3);
    assert!(!fake.lines("overlaps").is_empty());
    assert_eq!(analyzer.available_slots(), 3);
}
