//! In-memory rating store (tests and `--ephemeral` runs)

use async_trait::async_trait;
use mgc_common::ratings::{RatingRecord, RatingSubmission};
use tokio::sync::RwLock;

use super::{RatingStore, StoreError};

#[derive(Debug, Default)]
pub struct InMemoryRatingStore {
    records: RwLock<Vec<RatingRecord>>,
}

impl InMemoryRatingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl RatingStore for InMemoryRatingStore {
    async fn load(&self) -> Result<Vec<RatingRecord>, StoreError> {
        Ok(self.records.read().await.clone())
    }

    async fn append(&self, submission: RatingSubmission) -> Result<usize, StoreError> {
        let mut records = self.records.write().await;
        records.push(RatingRecord::new(submission));
        Ok(records.len())
    }
}
