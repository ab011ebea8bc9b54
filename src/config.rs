//! Configuration management for mixcli.
//!
//! This module handles loading and accessing configuration values from environment
//! variables and `.env` files. It provides a centralized way to manage the Spotify
//! API endpoint, the bearer credential location and request defaults.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (where applicable)

use std::{env, path::PathBuf};

/// Default base URL of the Spotify Web API.
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";

/// Directory name used under the platform's local data directory.
pub const APP_DIR: &str = "mixcli";

/// Returns the application's directory inside the local data directory.
///
/// - Linux: `~/.local/share/mixcli`
/// - macOS: `~/Library/Application Support/mixcli`
/// - Windows: `%LOCALAPPDATA%/mixcli`
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(APP_DIR);
    path
}

/// Loads environment variables from a `.env` file in the local data directory.
///
/// Creates the directory if it doesn't exist. A missing `.env` file is not an
/// error: every setting can also come from the process environment. Variables
/// that are already set are never overridden by the file.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or if the `.env` file
/// exists but cannot be parsed.
pub async fn load_env() -> Result<(), String> {
    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if !path.is_file() {
        return Ok(());
    }

    dotenv::from_path(&path).map_err(|e| format!("{}: {}", path.display(), e))
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Returns the Spotify Web API base URL (`SPOTIFY_API_URL`), falling back to
/// [`DEFAULT_API_URL`].
pub fn spotify_apiurl() -> String {
    non_empty_var("SPOTIFY_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string())
}

/// Returns a bearer token supplied directly through `SPOTIFY_ACCESS_TOKEN`.
pub fn spotify_access_token() -> Option<String> {
    non_empty_var("SPOTIFY_ACCESS_TOKEN")
}

/// Returns the location of the stored token file (`SPOTIFY_TOKEN_PATH`),
/// defaulting to `<data dir>/cache/token.json`.
pub fn spotify_token_path() -> PathBuf {
    match non_empty_var("SPOTIFY_TOKEN_PATH") {
        Some(path) => PathBuf::from(path),
        None => data_dir().join("cache/token.json"),
    }
}

/// Returns the Spotify user id (`SPOTIFY_USER_ID`) that owns created
/// playlists. When unset the id is resolved from the token.
pub fn spotify_user() -> Option<String> {
    non_empty_var("SPOTIFY_USER_ID")
}

/// Returns the market (`SPOTIFY_MARKET`, an ISO 3166-1 alpha-2 code) used to
/// filter track availability.
pub fn spotify_market() -> Option<String> {
    non_empty_var("SPOTIFY_MARKET")
}
