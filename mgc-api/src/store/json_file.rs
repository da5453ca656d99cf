//! Rating store persisted as a single JSON array
//!
//! Appends are read-modify-write under a single-writer lock. The new array
//! goes to a temporary file in the target directory, is fsynced, then
//! renamed over the old file, so readers see either the old or the new
//! document and never a partial one.

use async_trait::async_trait;
use mgc_common::ratings::{RatingRecord, RatingSubmission};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::sync::Mutex;

use super::{RatingStore, StoreError};

pub struct JsonFileRatingStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileRatingStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    async fn read_records(&self) -> Result<Vec<RatingRecord>, StoreError> {
        let content = match tokio::fs::read(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if content.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        serde_json::from_slice(&content).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }
}

#[async_trait]
impl RatingStore for JsonFileRatingStore {
    async fn load(&self) -> Result<Vec<RatingRecord>, StoreError> {
        self.read_records().await
    }

    async fn append(&self, submission: RatingSubmission) -> Result<usize, StoreError> {
        let _guard = self.write_lock.lock().await;

        let mut records = self.read_records().await?;
        records.push(RatingRecord::new(submission));
        let total = records.len();

        let mut document = serde_json::to_vec_pretty(&records)?;
        document.push(b'\n');

        let path = self.path.clone();
        tokio::task::spawn_blocking(move || replace_file(&path, &document))
            .await
            .map_err(|e| StoreError::Io {
                path: self.path.clone(),
                source: io::Error::new(io::ErrorKind::Other, e),
            })?
            .map_err(|source| StoreError::Io {
                path: self.path.clone(),
                source,
            })?;

        tracing::debug!(path = %self.path.display(), total, "Rating appended");
        Ok(total)
    }
}

/// Atomically replace `path` with `contents`
fn replace_file(path: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(contents)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn record(audio_id: &str, correct: bool) -> RatingSubmission {
        RatingSubmission {
            audio_id: audio_id.to_string(),
            predicted_genre: "rock".to_string(),
            is_correct: correct,
            actual_genre: (!correct).then(|| "metal".to_string()),
            comment: None,
        }
    }

    #[tokio::test]
    async fn test_missing_file_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileRatingStore::new(dir.path().join("ratings.json"));
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_append_creates_parent_and_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("ratings.json");
        let store = JsonFileRatingStore::new(&path);

        assert_eq!(store.append(record("a.mp3", true)).await.unwrap(), 1);
        assert_eq!(store.append(record("b.mp3", false)).await.unwrap(), 2);
        assert_eq!(store.append(record("c.mp3", true)).await.unwrap(), 3);

        let loaded = store.load().await.unwrap();
        let ids: Vec<&str> = loaded.iter().map(|r| r.submission.audio_id.as_str()).collect();
        assert_eq!(ids, ["a.mp3", "b.mp3", "c.mp3"]);
        assert!(loaded.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));

        // Pretty-printed array on disk, readable by a fresh store
        let on_disk = std::fs::read_to_string(&path).unwrap();
        assert!(on_disk.starts_with("[\n"));
        assert!(on_disk.contains("\"audioId\": \"b.mp3\""));
        assert_eq!(JsonFileRatingStore::new(&path).load().await.unwrap(), loaded);
    }

    #[tokio::test]
    async fn test_no_temporary_files_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileRatingStore::new(dir.path().join("ratings.json"));
        store.append(record("a.mp3", true)).await.unwrap();
        store.append(record("b.mp3", true)).await.unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("ratings.json")]);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error_and_left_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ratings.json");
        std::fs::write(&path, "{ not an array").unwrap();
        let store = JsonFileRatingStore::new(&path);

        assert!(matches!(store.load().await, Err(StoreError::Corrupt { .. })));
        assert!(matches!(
            store.append(record("a.mp3", true)).await,
            Err(StoreError::Corrupt { .. })
        ));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not an array");
    }

    #[tokio::test]
    async fn test_concurrent_appends_lose_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(JsonFileRatingStore::new(dir.path().join("ratings.json")));

        let mut handles = Vec::new();
        for i in 0..20 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.append(record(&format!("{}.mp3", i), true)).await
            }));
        }

        let mut totals = Vec::new();
        for handle in handles {
            totals.push(handle.await.unwrap().unwrap());
        }
        totals.sort_unstable();

        assert_eq!(totals, (1..=20).collect::<Vec<_>>());

        // Stamped under the write lock, so file order is timestamp order
        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.len(), 20);
        assert!(loaded.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }
}
