//! Bootstrap configuration for mgc-api
//!
//! # Settings Sources Priority
//!
//! 1. Command-line arguments (--port, --host, --ratings-file)
//! 2. Environment variables (MGC_API_PORT, MGC_API_HOST, MGC_RATINGS_FILE)
//! 3. TOML configuration file (--config, else ~/.config/mgc/mgc-api.toml)
//! 4. Built-in defaults
//!
//! Tiers 1 and 2 arrive together through clap and are applied with
//! [`ServerConfig::apply_overrides`].

use mgc_common::config::{load_toml, resolve_config_path, LoggingConfig};
use mgc_common::media::MAX_UPLOAD_BYTES;
use mgc_common::ratings::GenrePolicy;
use mgc_common::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Module name, also the config file stem
pub const MODULE_NAME: &str = "mgc-api";

/// Complete server configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// `[server]` table
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_host")]
    pub host: String,

    /// Default: 5000
    #[serde(default = "default_port")]
    pub port: u16,

    /// JSON array of accepted ratings
    #[serde(default = "default_ratings_file")]
    pub ratings_file: PathBuf,

    /// Largest accepted audio upload
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Reject rating genres outside the ten known labels
    #[serde(default = "default_true")]
    pub reject_unknown_genres: bool,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            ratings_file: default_ratings_file(),
            max_upload_bytes: default_max_upload_bytes(),
            reject_unknown_genres: true,
        }
    }
}

/// `[analyzer]` table
///
/// The analyzer is run as `program args... <audio-path>` and must print one
/// classification JSON document on stdout.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzerConfig {
    #[serde(default = "default_program")]
    pub program: String,

    #[serde(default = "default_args")]
    pub args: Vec<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Analyzer processes allowed to run at once; further requests wait
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: default_args(),
            timeout_secs: default_timeout_secs(),
            max_concurrent: default_max_concurrent(),
        }
    }
}

impl AnalyzerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_ratings_file() -> PathBuf {
    PathBuf::from("data/ratings.json")
}

fn default_max_upload_bytes() -> usize {
    MAX_UPLOAD_BYTES
}

fn default_true() -> bool {
    true
}

fn default_program() -> String {
    "python3".to_string()
}

fn default_args() -> Vec<String> {
    vec!["analyze_audio.py".to_string()]
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_max_concurrent() -> usize {
    4
}

/// Values from the command line or environment, applied over the file
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub ratings_file: Option<PathBuf>,
}

impl ServerConfig {
    /// Load from `explicit` or the per-user config file, else defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config = match resolve_config_path(explicit, MODULE_NAME)? {
            Some(path) => {
                tracing::info!(path = %path.display(), "Loading configuration");
                load_toml(&path)?
            }
            None => ServerConfig::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(host) = overrides.host {
            self.server.host = host;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(ratings_file) = overrides.ratings_file {
            self.server.ratings_file = ratings_file;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.analyzer.program.trim().is_empty() {
            return Err(Error::Config("analyzer.program must not be empty".to_string()));
        }
        if self.analyzer.max_concurrent == 0 {
            return Err(Error::Config(
                "analyzer.max_concurrent must be at least 1".to_string(),
            ));
        }
        if self.analyzer.timeout_secs == 0 {
            return Err(Error::Config(
                "analyzer.timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.server.max_upload_bytes == 0 {
            return Err(Error::Config(
                "server.max_upload_bytes must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn genre_policy(&self) -> GenrePolicy {
        if self.server.reject_unknown_genres {
            GenrePolicy::Strict
        } else {
            GenrePolicy::Lenient
        }
    }
}
