//! Client configuration

use std::path::PathBuf;
use std::time::Duration;

/// Backend used when `NEXT_PUBLIC_API_URL` is not set
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Must exceed the service's default analyzer timeout (120 s)
pub const DEFAULT_ANALYZE_TIMEOUT: Duration = Duration::from_secs(180);

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL, e.g. `http://localhost:5000`
    pub api_url: String,
    /// Timeout for health, rating and statistics requests
    pub timeout: Duration,
    /// Timeout for `POST /analyze`
    pub analyze_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(30),
            analyze_timeout: DEFAULT_ANALYZE_TIMEOUT,
        }
    }
}

impl ClientConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_analyze_timeout(mut self, timeout: Duration) -> Self {
        self.analyze_timeout = timeout;
        self
    }
}

/// Where undelivered ratings wait: `<data_local_dir>/mgc/pending_ratings.json`
pub fn default_pending_path() -> PathBuf {
    mgc_common::config::default_data_dir().join("pending_ratings.json")
}
