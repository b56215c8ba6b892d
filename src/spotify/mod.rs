//! # Spotify Integration Module
//!
//! The target side of a sync run. It covers the few Web API operations the
//! sync engine needs and the OAuth flow that produces the tokens for them.
//!
//! ## Core Modules
//!
//! - [`auth`] - OAuth 2.0 PKCE flow: code verifier and challenge, local
//!   callback server, browser launch, token exchange and refresh
//! - `client` - [`SpotifyClient`], a thin reqwest wrapper over
//!   `GET /me`, `GET /search`, `POST /users/{id}/playlists` and
//!   `POST /playlists/{id}/tracks`
//!
//! ## Tokens
//!
//! The client never refreshes tokens itself. It asks a [`TokenSource`] for a
//! valid bearer token before each request; in production that is the
//! persisted [`crate::management::TokenManager`], which refreshes four
//! minutes before expiry.
//!
//! ## Error Handling
//!
//! All operations return [`SpotifyError`]. There is no retry layer: a failed
//! request fails the operation and the caller decides what that means (a
//! failed search skips one track, a failed playlist creation fails the run).

pub mod auth;
mod client;
mod error;

pub use client::{SpotifyClient, TokenSource};
pub use error::SpotifyError;

/// Spotify's URI for a track id, as expected by the add-items endpoint.
pub fn track_uri(track_id: &str) -> String {
    format!("spotify:track:{}", track_id)
}
