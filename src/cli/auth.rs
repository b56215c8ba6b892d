use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{error, info, management::TokenManager, spotify, success, types::PkceToken};

pub async fn auth(shared_state: Arc<Mutex<Option<PkceToken>>>) {
    info!("Opening Spotify authorization in your browser...");

    let token = match spotify::auth::authorize(shared_state).await {
        Ok(token) => token,
        Err(e) => error!("Authorization failed. Err: {}", e),
    };

    let manager = TokenManager::new(token);
    match manager.persist().await {
        Ok(()) => success!("Authorization successful, token saved."),
        Err(e) => error!("Failed to save token. Err: {}", e),
    }
}
