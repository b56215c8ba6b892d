use std::{io, net::SocketAddr, sync::Arc};

use axum::{
    Extension, Router,
    routing::{get, post},
};
use tokio::sync::Mutex;
use tracing::info;

use crate::{
    api::{self, AppState},
    config,
    types::PkceToken,
};

fn bind_addr() -> io::Result<SocketAddr> {
    config::server_addr()
        .parse::<SocketAddr>()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))
}

/// Routes of the long-running admin server.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/jobs", get(api::list_jobs))
        .route("/jobs/{tag}/start", post(api::start_job))
        .route("/jobs/{tag}/stop", post(api::stop_job))
        .route("/jobs/{tag}/disable", post(api::disable_job))
        .route("/scheduler/start", post(api::start_scheduler))
        .route("/scheduler/stop", post(api::stop_scheduler))
        .route("/sync/{period}", post(api::trigger_sync))
        .layer(Extension(state))
}

/// Serves the OAuth callback for the duration of `lastsync auth`.
pub async fn start_callback_server(state: Arc<Mutex<Option<PkceToken>>>) -> io::Result<()> {
    let app = Router::new()
        .route("/health", get(api::health))
        .route("/callback", get(api::callback).layer(Extension(state)));

    let addr = bind_addr()?;
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await
}

/// Serves the admin API until `shutdown` resolves.
pub async fn start_api_server(
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> io::Result<()> {
    let addr = bind_addr()?;
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "Admin API listening");

    axum::serve(listener, api_router(state))
        .with_graceful_shutdown(shutdown)
        .await
}
