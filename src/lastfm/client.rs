//! Last.fm API client implementation

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument, warn};

use super::error::{LastfmError, LastfmResult};
use super::models::{ErrorResponse, TopTracksResponse};
use crate::config;
use crate::sync::TopTracksSource;
use crate::types::{Period, TopTracksReport};

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default connection timeout in seconds
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Last.fm API client
#[derive(Clone)]
pub struct LastfmClient {
    http_client: Client,
    base_url: String,
    api_key: String,
}

impl fmt::Debug for LastfmClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LastfmClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl LastfmClient {
    /// Create a new Last.fm client talking to `base_url`
    ///
    /// # Errors
    /// Returns `LastfmError::MissingApiKey` if the API key is empty
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> LastfmResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LastfmError::MissingApiKey);
        }

        let http_client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
            .user_agent(concat!("lastsync/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http_client,
            base_url: base_url.into(),
            api_key,
        })
    }

    /// Create a Last.fm client from `LASTFM_API_KEY` and `LASTFM_API_URL`
    pub fn from_env() -> LastfmResult<Self> {
        let api_key = config::lastfm_api_key().map_err(|_| LastfmError::MissingApiKey)?;
        Self::new(api_key, config::lastfm_apiurl())
    }

    /// Last.fm's name for the window a period covers
    pub fn period_param(period: Period) -> &'static str {
        match period {
            Period::Weekly => "7day",
            Period::Monthly => "1month",
        }
    }

    /// Make an API request and handle common error cases
    async fn make_request(&self, params: &[(&str, &str)]) -> LastfmResult<String> {
        let response = self
            .http_client
            .get(&self.base_url)
            .query(params)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LastfmError::Timeout
                } else {
                    LastfmError::Http(e)
                }
            })?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!("Last.fm API rate limited");
            return Err(LastfmError::RateLimited);
        }

        response.text().await.map_err(LastfmError::Http)
    }

    /// Get the top tracks of `username` for `period`
    ///
    /// Tracks are returned in Last.fm rank order.
    ///
    /// # Errors
    /// - `LastfmError::Api` - If Last.fm returns an error (unknown user, bad key, ...)
    /// - `LastfmError::Http` - If the HTTP request fails
    /// - `LastfmError::Parse` - If the body is neither a result nor an error
    #[instrument(skip(self))]
    pub async fn get_top_tracks(
        &self,
        period: Period,
        limit: u32,
        username: &str,
    ) -> LastfmResult<TopTracksReport> {
        let limit_str = limit.to_string();

        debug!(user = %username, %period, limit, "Fetching top tracks from Last.fm");

        let text = self
            .make_request(&[
                ("method", "user.gettoptracks"),
                ("user", username),
                ("period", Self::period_param(period)),
                ("limit", &limit_str),
                ("api_key", &self.api_key),
                ("format", "json"),
            ])
            .await?;

        if let Ok(error) = serde_json::from_str::<ErrorResponse>(&text) {
            return Err(LastfmError::Api {
                code: error.error,
                message: error.message,
            });
        }

        let response: TopTracksResponse = serde_json::from_str(&text)?;
        let mut report: TopTracksReport = response.into();
        if report.user.is_empty() {
            report.user = username.to_string();
        }

        debug!(
            user = %username,
            track_count = report.tracks.len(),
            "Fetched top tracks"
        );

        Ok(report)
    }
}

#[async_trait]
impl TopTracksSource for LastfmClient {
    async fn top_tracks(
        &self,
        period: Period,
        limit: u32,
        username: &str,
    ) -> LastfmResult<TopTracksReport> {
        self.get_top_tracks(period, limit, username).await
    }
}
