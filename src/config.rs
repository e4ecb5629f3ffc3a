//! Configuration management for the pipeline.
//!
//! Values come from environment variables, optionally seeded from a `.env`
//! file in the local data directory:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (where applicable)
//!
//! Only the access token is mandatory, and only for commands that call the
//! Spotify API.

use std::{env, path::PathBuf, str::FromStr, time::Duration};

use crate::fetch::RetryPolicy;

pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_BUCKET: &str = "music-ml-data";

/// Loads environment variables from `spotpipe/.env` in the local data directory.
///
/// The directory is created when missing so users know where to put the file.
/// A missing `.env` is not an error; a malformed one is.
///
/// Locations:
/// - Linux: `~/.local/share/spotpipe/.env`
/// - macOS: `~/Library/Application Support/spotpipe/.env`
/// - Windows: `%LOCALAPPDATA%/spotpipe/.env`
///
/// # Returns
///
/// Returns `Ok(())` if the environment file is loaded or absent, or an error
/// string if directory creation or file loading fails.
///
/// # Errors
///
/// This function will return an error if:
/// - The data directory cannot be created
/// - The `.env` file exists but cannot be parsed
pub async fn load_env() -> Result<(), String> {
    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| format!("{}: {}", path.display(), e))?;
    }
    Ok(())
}

/// `<local data dir>/spotpipe`.
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("spotpipe");
    path
}

/// Bearer token for the Spotify Web API, taken from `SPOTIFY_ACCESS_TOKEN`.
///
/// Surrounding whitespace is stripped.
///
/// # Errors
///
/// Returns an error if the variable is unset or blank.
pub fn spotify_access_token() -> Result<String, String> {
    match env::var("SPOTIFY_ACCESS_TOKEN") {
        Ok(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        _ => Err("SPOTIFY_ACCESS_TOKEN must be set".to_string()),
    }
}

/// Base URL of the Spotify Web API (`SPOTIFY_API_URL`).
///
/// # Returns
///
/// The configured URL without trailing slashes, or [`DEFAULT_API_URL`].
pub fn spotify_apiurl() -> String {
    env::var("SPOTIFY_API_URL")
        .map(|url| url.trim_end_matches('/').to_string())
        .unwrap_or_else(|_| DEFAULT_API_URL.to_string())
}

/// Directory holding one sub-directory per bucket (`STORAGE_ROOT`).
///
/// # Returns
///
/// The configured path, or `buckets` under [`data_dir`] when unset.
pub fn storage_root() -> PathBuf {
    env::var("STORAGE_ROOT")
        .map(PathBuf::from)
        .unwrap_or_else(|_| data_dir().join("buckets"))
}

/// Per-attempt timeout for outbound requests (`FETCH_TIMEOUT_SECS`, default 10).
///
/// # Errors
///
/// Returns an error if the value is not a whole number of seconds or is zero.
pub fn request_timeout() -> Result<Duration, String> {
    let secs: u64 = parse_var("FETCH_TIMEOUT_SECS", 10)?;
    if secs == 0 {
        return Err("FETCH_TIMEOUT_SECS must be greater than zero".to_string());
    }
    Ok(Duration::from_secs(secs))
}

/// Retry policy from `FETCH_MAX_RETRIES`, `FETCH_BASE_DELAY_MS` and `FETCH_MAX_DELAY_MS`.
///
/// Defaults to 3 attempts starting at one second with no delay ceiling.
///
/// # Returns
///
/// A policy that already passed [`RetryPolicy::validate`].
///
/// # Errors
///
/// This function will return an error if:
/// - A variable does not parse as an unsigned integer
/// - The attempt count or base delay is zero
/// - `FETCH_MAX_DELAY_MS` is below the base delay
pub fn retry_policy() -> Result<RetryPolicy, String> {
    let max_retries: u32 = parse_var("FETCH_MAX_RETRIES", 3)?;
    let base_delay_ms: u64 = parse_var("FETCH_BASE_DELAY_MS", 1000)?;
    let max_delay = match env::var("FETCH_MAX_DELAY_MS") {
        Ok(raw) => Some(Duration::from_millis(parse_value("FETCH_MAX_DELAY_MS", &raw)?)),
        Err(_) => None,
    };

    let policy = RetryPolicy::new(max_retries, Duration::from_millis(base_delay_ms))
        .with_max_delay(max_delay);
    policy.validate().map_err(|e| e.to_string())?;
    Ok(policy)
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, String> {
    match env::var(name) {
        Ok(raw) => parse_value(name, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T: FromStr>(name: &str, raw: &str) -> Result<T, String> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| format!("{} has an invalid value: {:?}", name, raw))
}
