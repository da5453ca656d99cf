//! Build identification for the startup banner
//!
//! Exposes `GIT_HASH`, `BUILD_TIMESTAMP` and `BUILD_PROFILE` to the crate
//! through `env!`.

use std::process::Command;

const UNKNOWN: &str = "unknown";

fn main() {
    let values = [
        ("GIT_HASH", git_short_hash()),
        ("BUILD_TIMESTAMP", Some(build_timestamp())),
        ("BUILD_PROFILE", std::env::var("PROFILE").ok()),
    ];

    for (key, value) in values {
        println!(
            "cargo:rustc-env={}={}",
            key,
            value.as_deref().unwrap_or(UNKNOWN)
        );
    }
}

/// `git rev-parse --short=8 HEAD`, or `None` outside a work tree
fn git_short_hash() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short=8", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }

    let hash = String::from_utf8(output.stdout).ok()?;
    let hash = hash.trim();
    (!hash.is_empty()).then(|| hash.to_string())
}

/// UTC, second precision
fn build_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}
