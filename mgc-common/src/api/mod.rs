//! API request/response types shared by the service and the client

pub mod types;

pub use types::{
    ClassificationResult, ErrorResponse, GenreStats, HealthResponse, RatingStats,
    SubmitRatingResponse,
};
