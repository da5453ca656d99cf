//! mgc-api library interface
//!
//! The HTTP service for the music genre classifier. Exposes `AppState` and
//! `build_router` so integration tests and the client test-suite can run the
//! real router in-process.

pub mod analyzer;
pub mod api;
pub mod config;
pub mod error;
pub mod store;
pub mod upload;

pub use crate::error::{ApiError, ApiResult};

use axum::extract::DefaultBodyLimit;
use axum::http::Method;
use axum::Router;
use chrono::{DateTime, Utc};
use mgc_common::ratings::GenrePolicy;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::analyzer::Analyzer;
use crate::config::ServerConfig;
use crate::store::RatingStore;

/// Room for multipart boundaries and headers on top of the file itself
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<dyn Analyzer>,
    pub store: Arc<dyn RatingStore>,
    /// Genre checking applied to rating submissions
    pub genre_policy: GenrePolicy,
    /// Largest accepted audio upload in bytes
    pub max_upload_bytes: usize,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(analyzer: Arc<dyn Analyzer>, store: Arc<dyn RatingStore>) -> Self {
        Self {
            analyzer,
            store,
            genre_policy: GenrePolicy::Strict,
            max_upload_bytes: mgc_common::media::MAX_UPLOAD_BYTES,
            startup_time: Utc::now(),
        }
    }

    /// Apply the request-handling settings from `config`
    pub fn configured(mut self, config: &ServerConfig) -> Self {
        self.genre_policy = config.genre_policy();
        self.max_upload_bytes = config.server.max_upload_bytes;
        self
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .merge(api::health_routes())
        .merge(api::analyze_routes())
        .merge(api::rating_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
