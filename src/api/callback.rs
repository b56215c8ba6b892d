use std::{collections::HashMap, sync::Arc};

use axum::{Extension, extract::Query, response::Html};
use tokio::sync::Mutex;

use crate::{
    spotify::{SpotifyError, auth::exchange_code_pkce},
    types::{PkceToken, Token},
    warning,
};

/// Completes the PKCE flow started by `lastsync auth`.
///
/// Swaps the authorization code for a token and leaves it in the shared state
/// for the waiting command to pick up.
pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(shared_state): Extension<Arc<Mutex<Option<PkceToken>>>>,
) -> Html<&'static str> {
    if let Some(error) = params.get("error") {
        warning!("Spotify denied authorization: {}", error);
        return Html("<h4>Authorization denied.</h4>");
    }

    let Some(code) = params.get("code") else {
        return Html("<h4>Missing authorization code.</h4>");
    };

    store_token(&shared_state, |verifier| async move {
        exchange_code_pkce(code, &verifier).await
    })
    .await
}

/// Runs `exchange` with the stored verifier and keeps the resulting token.
///
/// The lock is only held to read the verifier and to store the token, never
/// across the exchange itself.
async fn store_token<F, Fut>(
    shared_state: &Mutex<Option<PkceToken>>,
    exchange: F,
) -> Html<&'static str>
where
    F: FnOnce(String) -> Fut,
    Fut: Future<Output = Result<Token, SpotifyError>>,
{
    let verifier = match shared_state.lock().await.as_ref() {
        Some(pkce_state) => pkce_state.code_verifier.clone(),
        None => return Html("<h4>Missing PKCE code verifier.</h4>"),
    };

    match exchange(verifier).await {
        Ok(token) => match shared_state.lock().await.as_mut() {
            Some(pkce_state) => {
                pkce_state.token = Some(token);
                Html("<h2>Authentication successful.</h2><p>You can close this window.</p>")
            }
            None => Html("<h4>Missing PKCE code verifier.</h4>"),
        },
        Err(e) => {
            warning!("Token exchange failed: {}", e);
            Html("<h4>Login failed.</h4>")
        }
    }
}
