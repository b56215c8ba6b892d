//! # CLI Module
//!
//! Command handlers behind the `lastsync` binary.
//!
//! - [`auth`]: Spotify PKCE authorization, token saved to the local cache
//! - [`sync`]: one manual sync with a spinner and a summary of skipped tracks
//! - [`serve`]: scheduler plus admin HTTP API until Ctrl-C
//! - [`jobs`]: enabled tags and their next firing
//!
//! Handlers report to the console with the crate's colored macros and exit
//! through `error!` on failure.

mod auth;
mod jobs;
mod serve;
mod sync;

use std::sync::Arc;

use crate::{
    Res,
    clock::SystemClock,
    config::EnvConfig,
    lastfm::LastfmClient,
    spotify::SpotifyClient,
    sync::Syncer,
};

pub use auth::auth;
pub use jobs::jobs;
pub use serve::serve;
pub use sync::sync;

/// Wires the production collaborators into a [`Syncer`].
pub async fn syncer_from_env() -> Res<Syncer> {
    let lastfm = LastfmClient::from_env()?;
    let spotify = SpotifyClient::from_env().await?;

    Ok(Syncer::new(
        Arc::new(lastfm),
        Arc::new(spotify),
        Arc::new(EnvConfig),
        Arc::new(SystemClock),
    ))
}
