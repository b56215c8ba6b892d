//! # Sync Engine
//!
//! Turns one period of Last.fm listening into one new Spotify playlist.
//!
//! ```text
//! Syncer::sync(period)
//!     ├── PeriodConfigSource   max tracks + Last.fm username
//!     ├── TopTracksSource      ranked TrackSummary list
//!     ├── PlaylistService      current user
//!     ├── TrackResolver        one search per track, misses are skipped
//!     ├── naming               playlist name from period + local time
//!     └── PlaylistBuilder      create playlist, add all URIs in one batch
//! ```
//!
//! Tracks are resolved one at a time in rank order. A failed or empty search
//! becomes a [`SkipReason`] in the report and never fails the run. Anything
//! failing before the playlist is created aborts without side effects;
//! failures after that leave the playlist in place.
//!
//! The collaborators are traits so the engine can run against the real
//! clients ([`crate::lastfm::LastfmClient`], [`crate::spotify::SpotifyClient`],
//! [`crate::config::EnvConfig`]) or in-memory fakes.

mod builder;
pub mod naming;
mod orchestrator;
mod resolver;

use async_trait::async_trait;

use crate::{
    error::ConfigError,
    lastfm::LastfmError,
    spotify::SpotifyError,
    types::{Period, PeriodConfig, SpotifyUser, TopTracksReport},
};

pub use builder::PlaylistBuilder;
pub use orchestrator::{SyncReport, Syncer, TrackResolution};
pub use resolver::{SkipReason, TrackResolver, build_query, sanitize_query};

/// Where the top tracks come from (`GetTopTracks`).
#[async_trait]
pub trait TopTracksSource: Send + Sync {
    async fn top_tracks(
        &self,
        period: Period,
        limit: u32,
        username: &str,
    ) -> Result<TopTracksReport, LastfmError>;
}

/// Where playlists are created (`GetCurrentUser`, `SearchTrack`,
/// `CreatePlaylist`, `AddTracksToPlaylist`).
#[async_trait]
pub trait PlaylistService: Send + Sync {
    async fn current_user(&self) -> Result<SpotifyUser, SpotifyError>;

    /// Track ids of the first `limit` search hits.
    async fn search_track(&self, query: &str, limit: u32) -> Result<Vec<String>, SpotifyError>;

    /// Returns the id of the new playlist.
    async fn create_playlist(
        &self,
        user_id: &str,
        name: &str,
        description: &str,
    ) -> Result<String, SpotifyError>;

    async fn add_tracks(&self, playlist_id: &str, uris: &[String]) -> Result<(), SpotifyError>;
}

/// Per-period settings (`GetPeriodConfig`).
#[async_trait]
pub trait PeriodConfigSource: Send + Sync {
    async fn period_config(&self, period: Period) -> Result<PeriodConfig, ConfigError>;
}
