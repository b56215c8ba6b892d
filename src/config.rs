//! Configuration management for lastsync.
//!
//! This module handles loading and accessing configuration values from environment
//! variables and `.env` files: Spotify and Last.fm endpoints and credentials, the
//! per-period sync settings and the server address.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (where applicable)

use std::{env, path::PathBuf};

use async_trait::async_trait;

use crate::{
    error::ConfigError,
    sync::PeriodConfigSource,
    types::{Period, PeriodConfig},
};

/// Default number of tracks per playlist when a period does not configure one
pub const DEFAULT_MAX_TRACKS: u32 = 50;

/// Spotify accepts at most this many URIs per add-items call
pub const MAX_TRACKS_PER_BATCH: u32 = 100;

const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8000";
const DEFAULT_SPOTIFY_SCOPE: &str = "playlist-read-private playlist-modify-private";
const DEFAULT_SPOTIFY_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
const DEFAULT_SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const DEFAULT_SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";
const DEFAULT_LASTFM_API_URL: &str = "https://ws.audioscrobbler.com/2.0/";

/// Loads environment variables from a `.env` file in the local data directory.
///
/// The file lives under `lastsync/.env` in the platform data directory:
/// - Linux: `~/.local/share/lastsync/.env`
/// - macOS: `~/Library/Application Support/lastsync/.env`
/// - Windows: `%LOCALAPPDATA%/lastsync/.env`
///
/// A missing file is not an error, every value can also come from the real
/// environment. Variables that are already set are never overridden.
///
/// # Errors
///
/// Returns [`ConfigError::Env`] if the directory cannot be created or the
/// file exists but cannot be parsed.
pub async fn load_env() -> Result<(), ConfigError> {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("lastsync/.env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| ConfigError::Env(e.to_string()))?;
    }

    match dotenv::from_path(&path) {
        Ok(()) => Ok(()),
        Err(dotenv::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ConfigError::Env(format!("{}: {}", path.display(), e))),
    }
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    required_from(key, &env_lookup)
}

fn required_from(
    key: &'static str,
    lookup: &dyn Fn(&str) -> Option<String>,
) -> Result<String, ConfigError> {
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(key)),
    }
}

fn with_default(key: &str, default: &str) -> String {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => default.to_string(),
    }
}

fn env_lookup(key: &str) -> Option<String> {
    env::var(key).ok()
}

/// Address the local HTTP server binds to (`SERVER_ADDRESS`).
pub fn server_addr() -> String {
    with_default("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS)
}

/// Spotify application client id (`SPOTIFY_API_AUTH_CLIENT_ID`).
pub fn spotify_client_id() -> Result<String, ConfigError> {
    required("SPOTIFY_API_AUTH_CLIENT_ID")
}

/// OAuth redirect URI registered for the Spotify application
/// (`SPOTIFY_API_REDIRECT_URI`).
pub fn spotify_redirect_uri() -> Result<String, ConfigError> {
    required("SPOTIFY_API_REDIRECT_URI")
}

/// Scope requested during authorization (`SPOTIFY_API_AUTH_SCOPE`).
pub fn spotify_scope() -> String {
    with_default("SPOTIFY_API_AUTH_SCOPE", DEFAULT_SPOTIFY_SCOPE)
}

/// Spotify authorize endpoint (`SPOTIFY_API_AUTH_URL`).
pub fn spotify_apiauth_url() -> String {
    with_default("SPOTIFY_API_AUTH_URL", DEFAULT_SPOTIFY_AUTH_URL)
}

/// Spotify token endpoint (`SPOTIFY_API_TOKEN_URL`).
pub fn spotify_apitoken_url() -> String {
    with_default("SPOTIFY_API_TOKEN_URL", DEFAULT_SPOTIFY_TOKEN_URL)
}

/// Spotify Web API base URL (`SPOTIFY_API_URL`).
pub fn spotify_apiurl() -> String {
    with_default("SPOTIFY_API_URL", DEFAULT_SPOTIFY_API_URL)
}

/// Last.fm API key (`LASTFM_API_KEY`).
pub fn lastfm_api_key() -> Result<String, ConfigError> {
    required("LASTFM_API_KEY")
}

/// Last.fm API base URL (`LASTFM_API_URL`).
pub fn lastfm_apiurl() -> String {
    with_default("LASTFM_API_URL", DEFAULT_LASTFM_API_URL)
}

/// Resolves the sync settings of a period from the process environment.
pub fn period_config(period: Period) -> Result<PeriodConfig, ConfigError> {
    period_config_from(period, &env_lookup)
}

/// Resolves the sync settings of a period through `lookup`.
///
/// `LASTFM_USERNAME` is required. The per-period `SYNC_<PERIOD>_MAX_TRACKS`
/// defaults to [`DEFAULT_MAX_TRACKS`] and is clamped to
/// [`MAX_TRACKS_PER_BATCH`].
pub fn period_config_from(
    period: Period,
    lookup: &dyn Fn(&str) -> Option<String>,
) -> Result<PeriodConfig, ConfigError> {
    let source_username = required_from("LASTFM_USERNAME", lookup)?;

    let key = max_tracks_key(period);
    let max_tracks = match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => {
            let parsed = raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| ConfigError::Invalid {
                    key,
                    reason: format!("'{}' is not a positive integer", raw),
                })?;
            if parsed > MAX_TRACKS_PER_BATCH {
                tracing::warn!(
                    key,
                    requested = parsed,
                    max = MAX_TRACKS_PER_BATCH,
                    "Max tracks above the playlist batch limit, clamping"
                );
            }
            parsed.min(MAX_TRACKS_PER_BATCH)
        }
        _ => DEFAULT_MAX_TRACKS,
    };

    Ok(PeriodConfig {
        max_tracks,
        source_username,
    })
}

/// Periods whose `SYNC_<PERIOD>_ENABLED` flag is set in the environment.
pub fn enabled_periods() -> Vec<Period> {
    enabled_periods_from(&env_lookup)
}

pub fn enabled_periods_from(lookup: &dyn Fn(&str) -> Option<String>) -> Vec<Period> {
    Period::ALL
        .into_iter()
        .filter(|period| {
            lookup(enabled_key(*period))
                .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
                .unwrap_or(false)
        })
        .collect()
}

fn max_tracks_key(period: Period) -> &'static str {
    match period {
        Period::Weekly => "SYNC_WEEKLY_MAX_TRACKS",
        Period::Monthly => "SYNC_MONTHLY_MAX_TRACKS",
    }
}

fn enabled_key(period: Period) -> &'static str {
    match period {
        Period::Weekly => "SYNC_WEEKLY_ENABLED",
        Period::Monthly => "SYNC_MONTHLY_ENABLED",
    }
}

/// [`PeriodConfigSource`] backed by the process environment.
///
/// Values are read on every call so edits to the environment file take
/// effect on the next run after a reload.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvConfig;

#[async_trait]
impl PeriodConfigSource for EnvConfig {
    async fn period_config(&self, period: Period) -> Result<PeriodConfig, ConfigError> {
        period_config(period)
    }
}
