//! Local queue of ratings the API could not accept yet
//!
//! Ratings that fail on network errors or 5xx responses are appended to a
//! JSON file. `flush` re-sends them in order; delivered (any 2xx) and
//! rejected (4xx) entries leave the queue, everything else stays for the
//! next attempt.

use chrono::{DateTime, Utc};
use mgc_common::api::SubmitRatingResponse;
use mgc_common::ratings::RatingSubmission;
use serde::{Deserialize, Serialize};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::client::ApiClient;
use crate::error::ClientError;
use crate::outcome::Degradable;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingRating {
    pub rating: RatingSubmission,
    pub queued_at: DateTime<Utc>,
}

/// Outcome of one flush
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    pub delivered: usize,
    /// Refused by the API with a 4xx; dropped from the queue
    pub rejected: usize,
    /// Still queued
    pub remaining: usize,
}

#[derive(Debug, Clone)]
pub struct PendingRatings {
    path: PathBuf,
}

impl PendingRatings {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Queued ratings, oldest first. A missing or blank file is an empty queue.
    pub fn load(&self) -> Result<Vec<PendingRating>, ClientError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&contents).map_err(|e| {
            ClientError::Storage(format!("{}: {}", self.path.display(), e))
        })
    }

    /// Append `rating` and return the queue length
    pub fn push(&self, rating: RatingSubmission) -> Result<usize, ClientError> {
        let mut queue = self.load()?;
        queue.push(PendingRating {
            rating,
            queued_at: Utc::now(),
        });
        self.save(&queue)?;

        tracing::info!(
            path = %self.path.display(),
            queued = queue.len(),
            "Rating queued for later submission"
        );
        Ok(queue.len())
    }

    /// Replace the queue contents atomically
    pub fn save(&self, queue: &[PendingRating]) -> Result<(), ClientError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        let mut body = serde_json::to_vec_pretty(queue)
            .map_err(|e| ClientError::Storage(e.to_string()))?;
        body.push(b'\n');

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&body)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| ClientError::Io(e.error))?;
        Ok(())
    }

    /// Re-send queued ratings in order
    ///
    /// Stops early when the API is unreachable; the rest stay queued as-is.
    pub async fn flush(&self, client: &ApiClient) -> Result<FlushReport, ClientError> {
        let queue = self.load()?;
        if queue.is_empty() {
            return Ok(FlushReport::default());
        }

        let mut report = FlushReport::default();
        let mut keep = Vec::new();
        let mut entries = queue.into_iter();

        for entry in entries.by_ref() {
            match client.try_submit_rating(&entry.rating).await {
                Ok(_) => report.delivered += 1,
                // 2xx with an unreadable body: the API already stored it
                Err(ClientError::InvalidResponse(e)) => {
                    tracing::warn!(
                        audio_id = %entry.rating.audio_id,
                        error = %e,
                        "Queued rating accepted with unreadable response"
                    );
                    report.delivered += 1;
                }
                Err(e) if e.is_rejection() => {
                    tracing::warn!(
                        audio_id = %entry.rating.audio_id,
                        error = %e,
                        "Queued rating rejected by API, dropping"
                    );
                    report.rejected += 1;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Flush interrupted, keeping remaining ratings");
                    keep.push(entry);
                    if matches!(e, ClientError::Network(_)) {
                        break;
                    }
                }
            }
        }
        keep.extend(entries);

        report.remaining = keep.len();
        self.save(&keep)?;

        tracing::info!(
            delivered = report.delivered,
            rejected = report.rejected,
            remaining = report.remaining,
            "Pending ratings flushed"
        );
        Ok(report)
    }
}

/// Submit `rating`, queueing it when the failure is worth retrying
///
/// Returns the submission outcome and, when queued, the new queue length.
pub async fn submit_or_queue(
    client: &ApiClient,
    pending: &PendingRatings,
    rating: &RatingSubmission,
) -> Result<(Degradable<SubmitRatingResponse>, Option<usize>), ClientError> {
    let outcome = client.submit_rating(rating).await;

    let queued = match outcome.cause() {
        Some(cause) if !cause.is_rejection() => Some(pending.push(rating.clone())?),
        _ => None,
    };
    Ok((outcome, queued))
}
