//! Configuration file discovery and loading
//!
//! Settings are resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Built-in default (fallback)
//!
//! Tiers 1 and 2 are handled by each binary's `clap` arguments; this module
//! locates and parses tier 3.

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Logging configuration (`[logging]` table)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Per-user config file location for a module: `~/.config/mgc/<module>.toml`
pub fn default_config_path(module_name: &str) -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("mgc").join(format!("{}.toml", module_name)))
}

/// Pick the config file to load, if any
///
/// An explicitly requested file must exist. Without one, the per-user
/// default is used when present; otherwise `None` (built-in defaults apply).
pub fn resolve_config_path(explicit: Option<&Path>, module_name: &str) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        return Ok(Some(path.to_path_buf()));
    }

    Ok(default_config_path(module_name).filter(|path| path.exists()))
}

/// Parse a TOML file into `T`
pub fn load_toml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)?;
    tracing::debug!(path = %path.display(), "Loading config file");
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Per-user data directory for a module's local state: `<data_local_dir>/mgc`
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("mgc"))
        .unwrap_or_else(|| PathBuf::from("./mgc_data"))
}
