//! Rating submission and statistics endpoints

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    routing::{get, post},
    Json, Router,
};
use mgc_common::api::{RatingStats, SubmitRatingResponse};
use mgc_common::ratings::RatingSubmission;

use crate::error::{method_not_allowed, ApiError, ApiResult};
use crate::AppState;

/// POST /submit-rating
///
/// Validates the JSON body and appends it to the store, which stamps it. Rejected
/// submissions never reach the store.
pub async fn submit_rating(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<Json<SubmitRatingResponse>> {
    let body = body.map_err(|e| {
        tracing::error!(error = %e, "Failed to read rating body");
        ApiError::Internal("Error processing rating submission".to_string())
    })?;

    let submission = RatingSubmission::from_json(&body, state.genre_policy)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let audio_id = submission.audio_id.clone();

    let total = state.store.append(submission).await.map_err(|e| {
        tracing::error!(error = %e, audio_id = %audio_id, "Failed to save rating");
        ApiError::Internal("Failed to save rating".to_string())
    })?;

    tracing::info!(audio_id = %audio_id, total_ratings = total, "Rating accepted");

    Ok(Json(SubmitRatingResponse {
        success: true,
        message: "Rating submitted successfully".to_string(),
        total_ratings: Some(total),
    }))
}

/// GET /rating-stats
pub async fn rating_stats(State(state): State<AppState>) -> ApiResult<Json<RatingStats>> {
    let records = state.store.load().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to load ratings");
        ApiError::Internal("Error loading rating statistics".to_string())
    })?;

    Ok(Json(RatingStats::from_records(&records)))
}

/// Build rating routes
pub fn rating_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/submit-rating",
            post(submit_rating).fallback(method_not_allowed),
        )
        .route(
            "/rating-stats",
            get(rating_stats).fallback(method_not_allowed),
        )
}
