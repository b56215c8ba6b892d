//! # API Module
//!
//! HTTP endpoints of the `lastsync` server.
//!
//! - [`health`]: status and version
//! - [`callback`]: Spotify OAuth PKCE callback, served while `lastsync auth` runs
//! - [`list_jobs`], [`start_job`], [`stop_job`], [`disable_job`]: per-tag
//!   scheduler control, persisted to the schedule state file
//! - [`start_scheduler`], [`stop_scheduler`]: global resume and pause
//! - [`trigger_sync`]: manual sync of one period, same code path as a
//!   scheduled run
//!
//! Handlers receive an [`AppState`] through an axum `Extension` layer and fail
//! with [`ApiError`], which renders as `{"error": "..."}` with a status code
//! matching the cause.

mod callback;
mod health;
mod jobs;
mod sync;

use std::sync::Arc;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::{
    error::{SchedulerError, SyncError},
    management::ScheduleStateManager,
    scheduler::Scheduler,
    sync::Syncer,
};

pub use callback::callback;
pub use health::health;
pub use jobs::{disable_job, list_jobs, start_job, start_scheduler, stop_job, stop_scheduler};
pub use sync::trigger_sync;

/// Shared by all admin handlers
#[derive(Clone)]
pub struct AppState {
    pub scheduler: Scheduler,
    pub syncer: Syncer,
    pub schedule_state: Arc<Mutex<ScheduleStateManager>>,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Sync(e) if e.is_invalid_input() => StatusCode::BAD_REQUEST,
            ApiError::Sync(SyncError::Config(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Sync(_) => StatusCode::BAD_GATEWAY,
            ApiError::Scheduler(SchedulerError::InvalidTag(_)) => StatusCode::BAD_REQUEST,
            ApiError::Scheduler(SchedulerError::AlreadyRunning) => StatusCode::CONFLICT,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ConfigError, spotify::SpotifyError};

    #[test]
    fn test_status_mapping() {
        let invalid = ApiError::from(SyncError::InvalidPeriod("daily".to_string()));
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

        let config = ApiError::from(SyncError::Config(ConfigError::Missing("LASTFM_USERNAME")));
        assert_eq!(config.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let upstream = ApiError::from(SyncError::TargetFetch(SpotifyError::Unauthorized));
        assert_eq!(upstream.status(), StatusCode::BAD_GATEWAY);

        let tag = ApiError::from(SchedulerError::InvalidTag("daily".to_string()));
        assert_eq!(tag.status(), StatusCode::BAD_REQUEST);
    }
}
