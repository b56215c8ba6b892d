use std::{fmt, sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use super::SpotifyError;
use crate::{
    config,
    management::SharedTokenManager,
    sync::PlaylistService,
    types::{
        AddTrackToPlaylistRequest, AddTrackToPlaylistResponse, CreatePlaylistRequest,
        CreatePlaylistResponse, SearchResponse, SearchTrackItem, SpotifyUser,
    },
};

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// HTTP client shared by every Spotify call, token endpoint included.
pub(crate) fn http_client() -> reqwest::Result<Client> {
    http_client_with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
}

pub(crate) fn http_client_with_timeout(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS).min(timeout))
        .user_agent(concat!("lastsync/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Hands out a bearer token that is valid right now.
///
/// The OAuth flow that produced the token is not this client's concern.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn access_token(&self) -> Result<String, SpotifyError>;
}

/// Client for the handful of Spotify Web API endpoints a sync needs.
#[derive(Clone)]
pub struct SpotifyClient {
    http_client: Client,
    base_url: String,
    tokens: Arc<dyn TokenSource>,
}

impl fmt::Debug for SpotifyClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpotifyClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl SpotifyClient {
    pub fn new(
        base_url: impl Into<String>,
        tokens: Arc<dyn TokenSource>,
    ) -> Result<Self, SpotifyError> {
        Ok(Self {
            http_client: http_client()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tokens,
        })
    }

    /// Builds a client against `SPOTIFY_API_URL` using the persisted token.
    ///
    /// # Errors
    ///
    /// Returns [`SpotifyError::Token`] when no token has been stored yet.
    pub async fn from_env() -> Result<Self, SpotifyError> {
        let tokens = SharedTokenManager::load().await?;
        Self::new(config::spotify_apiurl(), Arc::new(tokens))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, SpotifyError> {
        let token = self.tokens.access_token().await?;
        let response = request.bearer_auth(token).send().await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(SpotifyError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SpotifyError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        Ok(response.json::<T>().await?)
    }

    /// `GET /me`
    #[instrument(skip(self))]
    pub async fn get_current_user(&self) -> Result<SpotifyUser, SpotifyError> {
        self.send(self.http_client.get(self.url("/me"))).await
    }

    /// `GET /search` restricted to tracks
    #[instrument(skip(self))]
    pub async fn search_tracks(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<SearchTrackItem>, SpotifyError> {
        let limit = limit.to_string();
        let request = self.http_client.get(self.url("/search")).query(&[
            ("q", query),
            ("type", "track"),
            ("limit", limit.as_str()),
        ]);

        let response: SearchResponse = self.send(request).await?;
        debug!(result_count = response.tracks.items.len(), "Search finished");
        Ok(response.tracks.items)
    }

    /// `POST /users/{user_id}/playlists`, always private
    #[instrument(skip(self, description))]
    pub async fn create_playlist(
        &self,
        user_id: &str,
        name: &str,
        description: &str,
    ) -> Result<CreatePlaylistResponse, SpotifyError> {
        let body = CreatePlaylistRequest {
            name: name.to_string(),
            description: description.to_string(),
            public: false,
            collaborative: false,
        };
        let request = self
            .http_client
            .post(self.url(&format!("/users/{}/playlists", user_id)))
            .json(&body);

        self.send(request).await
    }

    /// `POST /playlists/{playlist_id}/tracks`
    ///
    /// Spotify rejects an empty batch, so an empty `uris` is acknowledged
    /// without a request and yields `None`.
    #[instrument(skip(self, uris), fields(track_count = uris.len()))]
    pub async fn add_tracks_to_playlist(
        &self,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<Option<String>, SpotifyError> {
        if uris.is_empty() {
            debug!("No tracks to add, skipping request");
            return Ok(None);
        }

        let body = AddTrackToPlaylistRequest {
            uris: uris.to_vec(),
        };
        let request = self
            .http_client
            .post(self.url(&format!("/playlists/{}/tracks", playlist_id)))
            .json(&body);

        let response: AddTrackToPlaylistResponse = self.send(request).await?;
        Ok(Some(response.snapshot_id))
    }
}

/// Pulls `error.message` out of a Spotify error body, falling back to the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| json["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

#[async_trait]
impl PlaylistService for SpotifyClient {
    async fn current_user(&self) -> Result<SpotifyUser, SpotifyError> {
        self.get_current_user().await
    }

    async fn search_track(&self, query: &str, limit: u32) -> Result<Vec<String>, SpotifyError> {
        let items = self.search_tracks(query, limit).await?;
        Ok(items.into_iter().map(|item| item.id).collect())
    }

    async fn create_playlist(
        &self,
        user_id: &str,
        name: &str,
        description: &str,
    ) -> Result<String, SpotifyError> {
        let playlist = SpotifyClient::create_playlist(self, user_id, name, description).await?;
        Ok(playlist.id)
    }

    async fn add_tracks(&self, playlist_id: &str, uris: &[String]) -> Result<(), SpotifyError> {
        self.add_tracks_to_playlist(playlist_id, uris).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_prefers_spotify_message() {
        let body = r#"{"error": {"status": 400, "message": "Invalid limit"}}"#;
        assert_eq!(error_message(body), "Invalid limit");
    }

    #[test]
    fn test_error_message_falls_back_to_body() {
        assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
        assert_eq!(error_message(""), "");
    }
}
