//! Rating persistence capability
//!
//! Ratings are append-only: a record is never edited or removed once
//! accepted, and the store preserves insertion order.

mod json_file;
mod memory;

pub use json_file::JsonFileRatingStore;
pub use memory::InMemoryRatingStore;

use async_trait::async_trait;
use mgc_common::ratings::{RatingRecord, RatingSubmission};
use std::path::PathBuf;
use thiserror::Error;

/// Rating store failures
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Existing file is not a JSON array of rating records
    #[error("Corrupt ratings file {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialise ratings: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Ordered, append-only collection of rating records
#[async_trait]
pub trait RatingStore: Send + Sync {
    /// Every record, oldest first
    async fn load(&self) -> Result<Vec<RatingRecord>, StoreError>;

    /// Stamp `submission` and append it; returns the store size afterwards
    ///
    /// The timestamp is taken while the store holds its write lock, so
    /// stored timestamps never decrease.
    async fn append(&self, submission: RatingSubmission) -> Result<usize, StoreError>;
}
