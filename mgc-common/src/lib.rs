//! # MGC Common Library
//!
//! Shared code for the music genre classifier service and its client:
//! - Genre labels and accepted audio media types
//! - API request/response types (classification results, ratings, statistics)
//! - Rating submission validation and aggregation
//! - Configuration loading and tracing initialisation

pub mod api;
pub mod config;
pub mod error;
pub mod genre;
pub mod logging;
pub mod media;
pub mod ratings;

pub use error::{Error, Result};
pub use genre::GenreLabel;
pub use media::AudioMediaType;
