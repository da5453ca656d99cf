//! Rating form state
//!
//! Collects the user's verdict on a classification and turns it into a
//! [`RatingSubmission`]. Submission is only possible once the form is
//! complete: an answer is given, and an actual genre is chosen when the
//! answer is "incorrect".

use mgc_common::ratings::RatingSubmission;
use mgc_common::GenreLabel;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("Please indicate whether the prediction was correct")]
    AnswerRequired,

    #[error("Please select the actual genre")]
    ActualGenreRequired,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingDraft {
    audio_id: String,
    predicted: GenreLabel,
    is_correct: Option<bool>,
    actual: Option<GenreLabel>,
    comment: String,
}

impl RatingDraft {
    pub fn new(audio_id: impl Into<String>, predicted: GenreLabel) -> Self {
        Self {
            audio_id: audio_id.into(),
            predicted,
            is_correct: None,
            actual: None,
            comment: String::new(),
        }
    }

    pub fn mark_correct(&mut self) -> &mut Self {
        self.is_correct = Some(true);
        self
    }

    pub fn mark_incorrect(&mut self, actual: Option<GenreLabel>) -> &mut Self {
        self.is_correct = Some(false);
        self.actual = actual;
        self
    }

    pub fn set_comment(&mut self, comment: impl Into<String>) -> &mut Self {
        self.comment = comment.into();
        self
    }

    pub fn can_submit(&self) -> bool {
        self.validate().is_ok()
    }

    fn validate(&self) -> Result<(), DraftError> {
        match self.is_correct {
            None => Err(DraftError::AnswerRequired),
            Some(false) if self.actual.is_none() => Err(DraftError::ActualGenreRequired),
            _ => Ok(()),
        }
    }

    /// Build the submission; the actual genre is only sent for wrong predictions
    pub fn to_submission(&self) -> Result<RatingSubmission, DraftError> {
        self.validate()?;
        let is_correct = self.is_correct == Some(true);
        let comment = self.comment.trim();

        Ok(RatingSubmission {
            audio_id: self.audio_id.clone(),
            predicted_genre: self.predicted.as_str().to_string(),
            is_correct,
            actual_genre: if is_correct {
                None
            } else {
                self.actual.map(|genre| genre.as_str().to_string())
            },
            comment: (!comment.is_empty()).then(|| comment.to_string()),
        })
    }
}
