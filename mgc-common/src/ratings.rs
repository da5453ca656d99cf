//! User feedback ratings
//!
//! A [`RatingSubmission`] is what the rating form sends; a [`RatingRecord`]
//! is the same submission stamped with the time it was accepted. Records are
//! aggregated into [`RatingStats`] for the statistics endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::api::{GenreStats, RatingStats};
use crate::genre::GenreLabel;

/// Whether genre fields must name one of the ten known labels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenrePolicy {
    /// Reject unknown labels and store the canonical lowercase form
    Strict,
    /// Accept any non-empty string as given
    Lenient,
}

/// Reasons a rating submission is rejected
///
/// The `Display` text is the exact message returned to HTTP callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RatingValidationError {
    #[error("Invalid JSON body")]
    InvalidJson,

    #[error("Missing required fields")]
    MissingFields,

    #[error("Actual genre is required when prediction is incorrect")]
    MissingActualGenre,

    #[error("Invalid genre: {0}")]
    InvalidGenre(String),
}

/// Feedback on one classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSubmission {
    /// Client-chosen identifier for the rated audio (usually the file name)
    pub audio_id: String,
    pub predicted_genre: String,
    pub is_correct: bool,
    /// Present only when `is_correct` is false
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl RatingSubmission {
    /// Parse and validate a request body
    ///
    /// Checks run in order: JSON syntax, required fields, actual genre when
    /// incorrect, then genre labels (strict policy only). Absent, `null` and
    /// empty-string values all count as missing.
    pub fn from_json(body: &[u8], policy: GenrePolicy) -> Result<Self, RatingValidationError> {
        let value: Value =
            serde_json::from_slice(body).map_err(|_| RatingValidationError::InvalidJson)?;
        let fields = value.as_object().ok_or(RatingValidationError::MissingFields)?;

        let audio_id = string_field(fields, "audioId");
        let predicted_genre = string_field(fields, "predictedGenre");
        let is_correct = fields.get("isCorrect").and_then(Value::as_bool);

        let (Some(audio_id), Some(predicted_genre), Some(is_correct)) =
            (audio_id, predicted_genre, is_correct)
        else {
            return Err(RatingValidationError::MissingFields);
        };

        let submission = RatingSubmission {
            audio_id,
            predicted_genre,
            is_correct,
            actual_genre: string_field(fields, "actualGenre"),
            comment: string_field(fields, "comment"),
        };

        submission.validate(policy)
    }

    /// Apply the field rules to an already-typed submission
    ///
    /// Returns the normalised submission: trimmed strings, canonical genre
    /// labels under [`GenrePolicy::Strict`], `actual_genre` dropped when the
    /// prediction was correct, and a blank comment dropped.
    pub fn validate(self, policy: GenrePolicy) -> Result<Self, RatingValidationError> {
        let audio_id = non_blank(Some(self.audio_id)).ok_or(RatingValidationError::MissingFields)?;
        let predicted =
            non_blank(Some(self.predicted_genre)).ok_or(RatingValidationError::MissingFields)?;

        let actual = if self.is_correct {
            None
        } else {
            let actual = non_blank(self.actual_genre)
                .ok_or(RatingValidationError::MissingActualGenre)?;
            Some(check_genre(actual, policy)?)
        };

        Ok(RatingSubmission {
            audio_id,
            predicted_genre: check_genre(predicted, policy)?,
            is_correct: self.is_correct,
            actual_genre: actual,
            comment: non_blank(self.comment),
        })
    }
}

fn string_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields
        .get(key)
        .and_then(Value::as_str)
        .and_then(|s| non_blank(Some(s.to_string())))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn check_genre(value: String, policy: GenrePolicy) -> Result<String, RatingValidationError> {
    match policy {
        GenrePolicy::Lenient => Ok(value),
        GenrePolicy::Strict => GenreLabel::parse(&value)
            .map(|genre| genre.as_str().to_string())
            .ok_or(RatingValidationError::InvalidGenre(value)),
    }
}

/// An accepted submission, as persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingRecord {
    #[serde(flatten)]
    pub submission: RatingSubmission,
    /// UTC acceptance time, RFC 3339 on the wire
    pub timestamp: DateTime<Utc>,
}

impl RatingRecord {
    /// Stamp a validated submission with the current time
    pub fn new(submission: RatingSubmission) -> Self {
        Self::stamped(submission, Utc::now())
    }

    pub fn stamped(submission: RatingSubmission, timestamp: DateTime<Utc>) -> Self {
        Self {
            submission,
            timestamp,
        }
    }
}

// ========================================
// Statistics
// ========================================

impl RatingStats {
    /// All-zero statistics (no ratings yet, or service unreachable)
    pub fn zeroed() -> Self {
        Self::default()
    }

    /// Aggregate accuracy overall and per predicted genre
    pub fn from_records(records: &[RatingRecord]) -> Self {
        let mut genre_stats: BTreeMap<String, GenreStats> = BTreeMap::new();
        let mut correct_predictions = 0;

        for record in records {
            let entry = genre_stats
                .entry(record.submission.predicted_genre.clone())
                .or_default();
            entry.total += 1;
            if record.submission.is_correct {
                entry.correct += 1;
                correct_predictions += 1;
            }
        }

        for stats in genre_stats.values_mut() {
            stats.rate = ratio(stats.correct, stats.total);
        }

        RatingStats {
            total_ratings: records.len(),
            correct_predictions,
            accuracy_rate: ratio(correct_predictions, records.len()),
            genre_stats,
        }
    }
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}
