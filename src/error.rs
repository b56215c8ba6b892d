//! Error types of the sync engine, the scheduler and configuration lookups

use thiserror::Error;

use crate::{lastfm::LastfmError, spotify::SpotifyError};

/// Configuration could not be resolved
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required environment variable is not set or empty
    #[error("missing configuration value {0}")]
    Missing(&'static str),

    /// An environment variable holds a value that cannot be used
    #[error("invalid configuration value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },

    /// The `.env` file could not be prepared or read
    #[error("cannot load environment: {0}")]
    Env(String),
}

/// Why a sync run failed
///
/// Everything before [`SyncError::PlaylistCreate`] aborts the run without
/// creating anything on Spotify. [`SyncError::PlaylistPopulate`] leaves the
/// created playlist in place.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("configuration unavailable: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid period '{0}', expected 'weekly' or 'monthly'")]
    InvalidPeriod(String),

    #[error("failed to fetch top tracks from Last.fm: {0}")]
    SourceFetch(#[source] LastfmError),

    #[error("failed to fetch the Spotify user: {0}")]
    TargetFetch(#[source] SpotifyError),

    #[error("failed to create playlist '{name}': {source}")]
    PlaylistCreate {
        name: String,
        #[source]
        source: SpotifyError,
    },

    #[error("failed to add tracks to playlist {playlist_id}: {source}")]
    PlaylistPopulate {
        playlist_id: String,
        #[source]
        source: SpotifyError,
    },
}

impl SyncError {
    /// True for errors caused by the caller rather than a collaborator
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, SyncError::InvalidPeriod(_))
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("invalid job tag '{0}', expected 'weekly' or 'monthly'")]
    InvalidTag(String),

    #[error("scheduler is already set up")]
    AlreadyRunning,
}
