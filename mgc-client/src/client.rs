//! Typed HTTP client for the classifier API
//!
//! Failure policy per call:
//! - [`ApiClient::check_health`] and [`ApiClient::analyze_audio`] return
//!   `Result` and leave the fallback decision to the caller.
//! - [`ApiClient::submit_rating`] and [`ApiClient::get_rating_stats`] never
//!   fail; on error they return [`Degradable::Degraded`] carrying a stand-in
//!   value and the cause.

use mgc_common::api::{
    ClassificationResult, ErrorResponse, HealthResponse, RatingStats, SubmitRatingResponse,
};
use mgc_common::ratings::RatingSubmission;
use reqwest::multipart::{Form, Part};
use reqwest::Response;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::audio::AudioFile;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::outcome::Degradable;

/// Message returned in place of a submission response when the API fails
pub const SUBMIT_FALLBACK_MESSAGE: &str = "Unable to submit rating. Your feedback has been saved locally and will be submitted when the API is available.";

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    analyze_timeout: Duration,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            analyze_timeout: config.analyze_timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET /health
    pub async fn check_health(&self) -> Result<HealthResponse, ClientError> {
        let response = self.http.get(self.url("/health")).send().await.map_err(|e| {
            tracing::warn!(error = %e, "API health check failed");
            ClientError::from(e)
        })?;
        decode(response).await
    }

    /// POST /analyze with the file as multipart field `file`
    ///
    /// Uses the analyze timeout instead of the general request timeout.
    pub async fn analyze_audio(&self, file: &AudioFile) -> Result<ClassificationResult, ClientError> {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(file.declared_type())?;
        let form = Form::new().part("file", part);

        let response = self
            .http
            .post(self.url("/analyze"))
            .timeout(self.analyze_timeout)
            .multipart(form)
            .send()
            .await?;

        let result: ClassificationResult = decode(response).await.map_err(|e| {
            tracing::warn!(error = %e, file_name = %file.file_name, "Audio analysis failed");
            e
        })?;

        result
            .validate()
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
        Ok(result)
    }

    /// POST /submit-rating, reporting failures as errors
    pub async fn try_submit_rating(
        &self,
        rating: &RatingSubmission,
    ) -> Result<SubmitRatingResponse, ClientError> {
        let response = self
            .http
            .post(self.url("/submit-rating"))
            .json(rating)
            .send()
            .await?;
        decode(response).await
    }

    /// POST /submit-rating, falling back to a local "will retry" response
    pub async fn submit_rating(&self, rating: &RatingSubmission) -> Degradable<SubmitRatingResponse> {
        let result = self.try_submit_rating(rating).await;
        if let Err(e) = &result {
            tracing::warn!(error = %e, audio_id = %rating.audio_id, "Rating submission failed");
        }

        Degradable::from_result(result, || SubmitRatingResponse {
            success: false,
            message: SUBMIT_FALLBACK_MESSAGE.to_string(),
            total_ratings: None,
        })
    }

    /// GET /rating-stats, reporting failures as errors
    pub async fn try_get_rating_stats(&self) -> Result<RatingStats, ClientError> {
        let response = self.http.get(self.url("/rating-stats")).send().await?;
        decode(response).await
    }

    /// GET /rating-stats, falling back to zeroed statistics
    pub async fn get_rating_stats(&self) -> Degradable<RatingStats> {
        let result = self.try_get_rating_stats().await;
        if let Err(e) = &result {
            tracing::warn!(error = %e, "Failed to fetch rating statistics");
        }
        Degradable::from_result(result, RatingStats::zeroed)
    }
}

/// Map a response to `T`, or to the server's `{"error": ...}` message
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();

    if !status.is_success() {
        let message = response
            .json::<ErrorResponse>()
            .await
            .ok()
            .map(|body| body.error)
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| format!("API responded with status: {}", status.as_u16()));

        return Err(ClientError::Api {
            status: status.as_u16(),
            message,
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|e| ClientError::InvalidResponse(e.to_string()))
}
