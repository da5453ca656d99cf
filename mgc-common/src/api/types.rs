//! Shared API request/response types
//!
//! Wire formats for the four endpoints:
//! - `GET /health` → [`HealthResponse`]
//! - `POST /analyze` → [`ClassificationResult`]
//! - `POST /submit-rating` → [`SubmitRatingResponse`]
//! - `GET /rating-stats` → [`RatingStats`]
//!
//! Any failure is returned as [`ErrorResponse`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::genre::GenreLabel;

/// Most alternatives a classification result may list
pub const MAX_TOP_GENRES: usize = 3;

/// Slack allowed when checking that confidences sum to at most 1
const CONFIDENCE_SUM_TOLERANCE: f64 = 1e-6;

// ========================================
// Classification
// ========================================

/// Analyzer output for one audio file
///
/// Field names are snake_case on the wire (`top_genres`, `top_confidences`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Best genre
    pub genre: GenreLabel,
    /// Confidence of the best genre (0.0-1.0)
    pub confidence: f64,
    /// Up to three genres, best first
    pub top_genres: Vec<GenreLabel>,
    /// Confidences parallel to `top_genres`
    pub top_confidences: Vec<f64>,
    /// Base64-encoded PNG mel spectrogram, if the analyzer produced one
    #[serde(default)]
    pub spectrogram: Option<String>,
}

/// Reason a classification result is not well formed
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidClassification {
    #[error("confidence {0} is outside [0, 1]")]
    ConfidenceOutOfRange(f64),

    #[error("top_genres has {genres} entries but top_confidences has {confidences}")]
    LengthMismatch { genres: usize, confidences: usize },

    #[error("{0} alternatives listed, at most 3 allowed")]
    TooManyAlternatives(usize),

    #[error("top confidences sum to {0}, which exceeds 1")]
    ConfidenceSumExceedsOne(f64),

    #[error("genre {genre} does not match first alternative {first}")]
    GenreMismatch { genre: GenreLabel, first: GenreLabel },
}

impl ClassificationResult {
    /// Check the structural guarantees every result handed to a client must meet
    pub fn validate(&self) -> Result<(), InvalidClassification> {
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(InvalidClassification::ConfidenceOutOfRange(self.confidence));
        }

        if self.top_genres.len() != self.top_confidences.len() {
            return Err(InvalidClassification::LengthMismatch {
                genres: self.top_genres.len(),
                confidences: self.top_confidences.len(),
            });
        }

        if self.top_genres.len() > MAX_TOP_GENRES {
            return Err(InvalidClassification::TooManyAlternatives(
                self.top_genres.len(),
            ));
        }

        if let Some(bad) = self
            .top_confidences
            .iter()
            .copied()
            .find(|c| !(0.0..=1.0).contains(c))
        {
            return Err(InvalidClassification::ConfidenceOutOfRange(bad));
        }

        let sum: f64 = self.top_confidences.iter().sum();
        if sum > 1.0 + CONFIDENCE_SUM_TOLERANCE {
            return Err(InvalidClassification::ConfidenceSumExceedsOne(sum));
        }

        if let Some(first) = self.top_genres.first() {
            if *first != self.genre {
                return Err(InvalidClassification::GenreMismatch {
                    genre: self.genre,
                    first: *first,
                });
            }
        }

        Ok(())
    }
}

// ========================================
// Health
// ========================================

/// GET /health response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status ("ok")
    pub status: String,
    /// Human-readable status line
    pub message: String,
    /// Module name
    #[serde(default)]
    pub module: String,
    /// Crate version
    #[serde(default)]
    pub version: String,
    /// Seconds since service started
    #[serde(default)]
    pub uptime_seconds: u64,
}

// ========================================
// Ratings
// ========================================

/// POST /submit-rating response
///
/// The client also builds one of these locally (`success: false`) when the
/// service cannot be reached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRatingResponse {
    pub success: bool,
    pub message: String,
    /// Store size after the append; absent on client-side fallbacks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_ratings: Option<usize>,
}

/// Per-genre accuracy, keyed by predicted genre in [`RatingStats`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenreStats {
    pub total: usize,
    pub correct: usize,
    /// `correct / total` (0.0 when `total` is 0)
    pub rate: f64,
}

/// GET /rating-stats response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingStats {
    pub total_ratings: usize,
    pub correct_predictions: usize,
    /// `correct_predictions / total_ratings` (0.0 when empty)
    pub accuracy_rate: f64,
    pub genre_stats: BTreeMap<String, GenreStats>,
}

// ========================================
// Errors
// ========================================

/// Error body returned with every 4xx/5xx status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
