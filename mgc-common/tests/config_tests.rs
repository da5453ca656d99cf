//! Config file discovery and parsing
//!
//! Tests that change XDG_CONFIG_HOME are marked #[serial] so they do not race.

use mgc_common::config::{default_config_path, load_toml, resolve_config_path, LoggingConfig};
use mgc_common::Error;
use serde::Deserialize;
use serial_test::serial;
use std::env;
use std::fs;

#[derive(Debug, Deserialize)]
struct SampleConfig {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    logging: LoggingConfig,
}

#[test]
fn test_logging_config_defaults_to_info() {
    assert_eq!(LoggingConfig::default().level, "info");

    let parsed: SampleConfig = toml::from_str("[logging]\n").unwrap();
    assert_eq!(parsed.logging.level, "info");
}

#[test]
fn test_load_toml_reads_tables() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sample.toml");
    fs::write(&path, "name = \"demo\"\n\n[logging]\nlevel = \"debug\"\n").unwrap();

    let config: SampleConfig = load_toml(&path).unwrap();
    assert_eq!(config.name.as_deref(), Some("demo"));
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_load_toml_reports_parse_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "name = \n").unwrap();

    let err = load_toml::<SampleConfig>(&path).unwrap_err();
    assert!(matches!(err, Error::Config(_)), "got {:?}", err);
}

#[test]
fn test_explicit_missing_config_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");

    let err = resolve_config_path(Some(&missing), "mgc-api").unwrap_err();
    assert!(err.to_string().contains("Config file not found"));
}

#[test]
fn test_explicit_existing_config_is_used() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("custom.toml");
    fs::write(&path, "").unwrap();

    assert_eq!(resolve_config_path(Some(&path), "mgc-api").unwrap(), Some(path));
}

#[cfg(target_os = "linux")]
#[test]
#[serial]
fn test_per_user_config_used_only_when_present() {
    let dir = tempfile::tempdir().unwrap();
    let previous = env::var_os("XDG_CONFIG_HOME");
    env::set_var("XDG_CONFIG_HOME", dir.path());

    let expected = dir.path().join("mgc").join("mgc-api.toml");
    assert_eq!(default_config_path("mgc-api"), Some(expected.clone()));
    assert_eq!(resolve_config_path(None, "mgc-api").unwrap(), None);

    fs::create_dir_all(expected.parent().unwrap()).unwrap();
    fs::write(&expected, "[logging]\nlevel = \"warn\"\n").unwrap();
    assert_eq!(resolve_config_path(None, "mgc-api").unwrap(), Some(expected));

    match previous {
        Some(value) => env::set_var("XDG_CONFIG_HOME", value),
        None => env::remove_var("XDG_CONFIG_HOME"),
    }
}
