//! Health check endpoint

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use mgc_common::api::HealthResponse;

use crate::error::method_not_allowed;
use crate::AppState;

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let uptime = Utc::now().signed_duration_since(state.startup_time);

    Json(HealthResponse {
        status: "ok".to_string(),
        message: "Music genre classifier API is running".to_string(),
        module: "mgc-api".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: uptime.num_seconds().max(0) as u64,
    })
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check).fallback(method_not_allowed))
}
