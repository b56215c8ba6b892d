use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use super::StateError;
use crate::{
    spotify::{self, SpotifyError, TokenSource},
    types::Token,
};

/// Seconds before expiry at which a token is already treated as expired
const EXPIRY_MARGIN_SECS: u64 = 240;

pub struct TokenManager {
    token: Token,
    path: PathBuf,
}

impl TokenManager {
    pub fn new(token: Token) -> Self {
        Self::with_path(token, Self::token_path())
    }

    pub fn with_path(token: Token, path: PathBuf) -> Self {
        TokenManager { token, path }
    }

    pub async fn load() -> Result<Self, StateError> {
        Self::load_from(Self::token_path()).await
    }

    pub async fn load_from(path: PathBuf) -> Result<Self, StateError> {
        let content = async_fs::read_to_string(&path).await?;
        let token: Token = serde_json::from_str(&content)?;
        Ok(Self { token, path })
    }

    pub async fn persist(&self) -> Result<(), StateError> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(&self.token)?;
        async_fs::write(&self.path, json).await?;
        Ok(())
    }

    /// Returns an access token, refreshing and persisting it first when it
    /// is about to expire.
    pub async fn get_valid_token(&mut self) -> Result<String, SpotifyError> {
        if self.is_expired() {
            tracing::debug!("Spotify token expired, refreshing");
            self.token = spotify::auth::refresh_token(&self.token.refresh_token).await?;
            if let Err(e) = self.persist().await {
                tracing::warn!(error = %e, "Failed to persist refreshed token");
            }
        }

        Ok(self.token.access_token.clone())
    }

    pub fn is_expired(&self) -> bool {
        let now = Utc::now().timestamp() as u64;
        now + EXPIRY_MARGIN_SECS >= self.token.obtained_at + self.token.expires_in
    }

    fn token_path() -> PathBuf {
        let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("lastsync/cache/token.json");
        path
    }

    pub fn current_token(&self) -> &Token {
        &self.token
    }
}

/// [`TokenManager`] behind a lock so concurrent requests share one refresh.
pub struct SharedTokenManager(Mutex<TokenManager>);

impl SharedTokenManager {
    pub fn new(manager: TokenManager) -> Self {
        Self(Mutex::new(manager))
    }

    pub async fn load() -> Result<Self, SpotifyError> {
        let manager = TokenManager::load().await.map_err(|e| {
            SpotifyError::Token(format!("failed to load token, run `lastsync auth`: {}", e))
        })?;
        Ok(Self::new(manager))
    }
}

#[async_trait]
impl TokenSource for SharedTokenManager {
    async fn access_token(&self) -> Result<String, SpotifyError> {
        self.0.lock().await.get_valid_token().await
    }
}
