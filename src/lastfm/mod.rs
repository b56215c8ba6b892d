//! Last.fm API client
//!
//! Fetches a user's top tracks for a period. This is the source side of a
//! sync run; only the public `user.getTopTracks` method is needed, so an API
//! key is enough and no Last.fm session is involved.
//!
//! # Environment Variables
//!
//! - `LASTFM_API_KEY`: API key for Last.fm (required)
//! - `LASTFM_API_URL`: override of the API base URL

mod client;
mod error;
mod models;

pub use client::LastfmClient;
pub use error::{LastfmError, LastfmResult};
