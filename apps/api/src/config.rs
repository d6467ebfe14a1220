use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every variable has a default, so the hub boots with an empty `.env`.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Path prefix the hub is mounted under, used for preset links.
    pub hub_base_path: String,
    /// Optional JSON file of extra presets, merged over the built-in table.
    pub presets_path: Option<PathBuf>,
    /// Optional JSON file of catalog records to filter.
    pub catalog_path: Option<PathBuf>,
    pub results_cache_capacity: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            hub_base_path: normalize_base_path(
                &std::env::var("HUB_BASE_PATH").unwrap_or_else(|_| "/career-hub".to_string()),
            ),
            presets_path: optional_env("PRESETS_PATH").map(PathBuf::from),
            catalog_path: optional_env("CATALOG_PATH").map(PathBuf::from),
            results_cache_capacity: std::env::var("RESULTS_CACHE_CAPACITY")
                .unwrap_or_else(|_| "256".to_string())
                .parse::<usize>()
                .context("RESULTS_CACHE_CAPACITY must be a non-negative integer")?,
        })
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Ensures a leading `/` and strips any trailing `/` or query.
pub fn normalize_base_path(raw: &str) -> String {
    let path = raw.split('?').next().unwrap_or_default().trim();
    let path = path.trim_end_matches('/');
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

/// Normalizes a caller-supplied base path, or `None` when it could leave the site.
///
/// Rejects protocol-relative (`//host`, `/\\host`) and scheme-bearing values, backslashes
/// and control characters, so the result is always safe in a `Location` header.
pub fn checked_base_path(raw: &str) -> Option<String> {
    if raw.chars().any(char::is_control) {
        return None;
    }
    let path = normalize_base_path(raw);
    let offsite = path.starts_with("//") || path.contains(':') || path.contains('\\');
    (!offsite).then_some(path)
}
