//! Spotify Web API error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpotifyError {
    /// Transport failure or undecodable body
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The bearer token was rejected
    #[error("Spotify rejected the access token, run `lastsync auth`")]
    Unauthorized,

    /// No usable token could be produced
    #[error("no valid Spotify token: {0}")]
    Token(String),

    /// Spotify answered with a non-success status
    #[error("Spotify API error {status}: {message}")]
    Api { status: u16, message: String },
}
