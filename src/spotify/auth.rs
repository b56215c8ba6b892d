use std::{sync::Arc, time::Duration};

use chrono::Utc;
use reqwest::{Client, Url};
use serde::Deserialize;
use tokio::sync::Mutex;

use super::{SpotifyError, client::http_client};
use crate::{
    config,
    server::start_callback_server,
    types::{PkceToken, Token},
    utils,
};

/// Maximum time to wait for the user to finish authorizing in the browser
const AUTH_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    #[serde(default)]
    scope: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

/// Runs the complete OAuth 2.0 PKCE authorization flow with Spotify.
///
/// 1. Generates a code verifier and its SHA256 challenge
/// 2. Starts the local callback server
/// 3. Opens the authorization URL in the default browser (or asks the user
///    to open it when no browser can be launched)
/// 4. Waits up to 60 seconds for the callback to deposit a token in
///    `shared_state`
///
/// Persisting the token is left to the caller.
///
/// # Errors
///
/// - [`SpotifyError::Token`] if configuration is missing or the flow times out
pub async fn authorize(shared_state: Arc<Mutex<Option<PkceToken>>>) -> Result<Token, SpotifyError> {
    let code_verifier = utils::generate_code_verifier();
    let code_challenge = utils::generate_code_challenge(&code_verifier);

    let client_id = config::spotify_client_id().map_err(|e| SpotifyError::Token(e.to_string()))?;
    let redirect_uri =
        config::spotify_redirect_uri().map_err(|e| SpotifyError::Token(e.to_string()))?;

    let auth_url = Url::parse_with_params(
        &config::spotify_apiauth_url(),
        &[
            ("client_id", client_id.as_str()),
            ("response_type", "code"),
            ("redirect_uri", redirect_uri.as_str()),
            ("code_challenge", code_challenge.as_str()),
            ("code_challenge_method", "S256"),
            ("scope", config::spotify_scope().as_str()),
        ],
    )
    .map_err(|e| SpotifyError::Token(format!("invalid authorize URL: {}", e)))?;

    // Store verifier in shared state before redirect
    {
        let mut lock = shared_state.lock().await;
        *lock = Some(PkceToken {
            code_verifier,
            token: None,
        });
    }

    let server_state = Arc::clone(&shared_state);
    let server = tokio::spawn(async move {
        if let Err(e) = start_callback_server(server_state).await {
            tracing::error!(error = %e, "Callback server stopped");
        }
    });

    if webbrowser::open(auth_url.as_str()).is_err() {
        crate::warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    }

    let token = wait_for_token(shared_state).await;
    server.abort();

    token.ok_or_else(|| SpotifyError::Token("authorization failed or timed out".to_string()))
}

/// Polls the shared state once a second until the callback stored a token.
async fn wait_for_token(shared_state: Arc<Mutex<Option<PkceToken>>>) -> Option<Token> {
    use std::time::Instant;

    let start = Instant::now();

    while start.elapsed() < AUTH_TIMEOUT {
        let lock = shared_state.lock().await;
        if let Some(token) = lock.as_ref().and_then(|pkce| pkce.token.clone()) {
            return Some(token);
        }
        drop(lock);
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    None
}

/// Exchanges a refresh token for a new access token.
///
/// Spotify may or may not rotate the refresh token; when the response has
/// none, the one passed in is kept.
pub async fn refresh_token(refresh_token: &str) -> Result<Token, SpotifyError> {
    let client_id = config::spotify_client_id().map_err(|e| SpotifyError::Token(e.to_string()))?;

    let token = request_token(
        &http_client()?,
        &config::spotify_apitoken_url(),
        &[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", client_id.as_str()),
        ],
    )
    .await?;
    Ok(into_token(token, Some(refresh_token)))
}

/// Exchanges an authorization code for an access token using PKCE.
///
/// `verifier` must be the code verifier whose challenge was sent with the
/// authorization request.
pub async fn exchange_code_pkce(code: &str, verifier: &str) -> Result<Token, SpotifyError> {
    let client_id = config::spotify_client_id().map_err(|e| SpotifyError::Token(e.to_string()))?;
    let redirect_uri =
        config::spotify_redirect_uri().map_err(|e| SpotifyError::Token(e.to_string()))?;

    let token = request_token(
        &http_client()?,
        &config::spotify_apitoken_url(),
        &[
            ("grant_type", "authorization_code"),
            ("client_id", client_id.as_str()),
            ("code", code),
            ("code_verifier", verifier),
            ("redirect_uri", redirect_uri.as_str()),
        ],
    )
    .await?;
    Ok(into_token(token, None))
}

async fn request_token(
    client: &Client,
    token_url: &str,
    form: &[(&str, &str)],
) -> Result<TokenResponse, SpotifyError> {
    let response = client.post(token_url).form(form).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(SpotifyError::Api {
            status: status.as_u16(),
            message: response.text().await.unwrap_or_default(),
        });
    }
    Ok(response.json::<TokenResponse>().await?)
}

fn into_token(response: TokenResponse, previous_refresh: Option<&str>) -> Token {
    Token {
        access_token: response.access_token,
        refresh_token: response
            .refresh_token
            .or_else(|| previous_refresh.map(str::to_string))
            .unwrap_or_default(),
        scope: response.scope,
        expires_in: response.expires_in,
        obtained_at: Utc::now().timestamp() as u64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spotify::client::http_client_with_timeout;

    #[test]
    fn test_refresh_keeps_previous_refresh_token() {
        let response: TokenResponse =
            serde_json::from_str(r#"{"access_token": "new", "expires_in": 1800}"#).unwrap();
        let token = into_token(response, Some("old-refresh"));

        assert_eq!(token.access_token, "new");
        assert_eq!(token.refresh_token, "old-refresh");
        assert_eq!(token.expires_in, 1800);
    }

    #[test]
    fn test_rotated_refresh_token_wins() {
        let response: TokenResponse = serde_json::from_str(
            r#"{"access_token": "new", "refresh_token": "rotated", "scope": "playlist-modify-private"}"#,
        )
        .unwrap();
        let token = into_token(response, Some("old-refresh"));

        assert_eq!(token.refresh_token, "rotated");
        assert_eq!(token.expires_in, 3600);
    }

    #[tokio::test]
    async fn test_stalled_token_endpoint_times_out() {
        use wiremock::{
            Mock, MockServer, ResponseTemplate,
            matchers::{method, path},
        };

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"access_token": "late"}))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let client =
            http_client_with_timeout(Duration::from_millis(200)).unwrap();
        let url = format!("{}/api/token", server.uri());
        let result = tokio::time::timeout(
            Duration::from_secs(3),
            request_token(&client, &url, &[("grant_type", "refresh_token")]),
        )
        .await
        .expect("token request should give up on its own");

        match result {
            Err(SpotifyError::Http(e)) => assert!(e.is_timeout()),
            other => panic!("expected a timeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_token_endpoint_error_keeps_status() {
        use wiremock::{
            Mock, MockServer, ResponseTemplate,
            matchers::{body_string_contains, method},
        };

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("grant_type=authorization_code"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid_grant"))
            .mount(&server)
            .await;

        let client = http_client().unwrap();
        let result = request_token(
            &client,
            &server.uri(),
            &[("grant_type", "authorization_code")],
        )
        .await;

        match result {
            Err(SpotifyError::Api { status, message }) => {
                assert_eq!(status, 400);
                assert_eq!(message, "invalid_grant");
            }
            other => panic!("expected an API error, got {:?}", other),
        }
    }
}
