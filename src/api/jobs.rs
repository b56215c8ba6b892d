use axum::{Extension, Json, extract::Path};
use serde_json::{Value, json};
use tracing::warn;

use super::{ApiError, AppState};
use crate::{
    error::SchedulerError,
    types::{Period, SchedulerSnapshot},
};

fn parse_tag(tag: &str) -> Result<Period, ApiError> {
    tag.parse()
        .map_err(|_| ApiError::Scheduler(SchedulerError::InvalidTag(tag.to_string())))
}

/// Writes the enabled-tag change to disk. The in-memory scheduler is the
/// source of truth, so a failed write is only logged.
async fn remember(state: &AppState, period: Period, enabled: bool) {
    let mut schedule = state.schedule_state.lock().await;
    if enabled {
        schedule.enable(period);
    } else {
        schedule.disable(period);
    }
    if let Err(e) = schedule.persist().await {
        warn!(%period, error = %e, "Failed to persist schedule state");
    }
}

pub async fn list_jobs(Extension(state): Extension<AppState>) -> Json<SchedulerSnapshot> {
    Json(state.scheduler.jobs().await)
}

pub async fn start_job(
    Path(tag): Path<String>,
    Extension(state): Extension<AppState>,
) -> Result<Json<Value>, ApiError> {
    let period = parse_tag(&tag)?;
    let outcome = state.scheduler.start_job(period.as_str()).await?;
    remember(&state, period, true).await;
    Ok(Json(json!({ "tag": period, "outcome": outcome })))
}

pub async fn stop_job(
    Path(tag): Path<String>,
    Extension(state): Extension<AppState>,
) -> Result<Json<Value>, ApiError> {
    let period = parse_tag(&tag)?;
    let removed = state.scheduler.stop_job(period.as_str()).await?;
    remember(&state, period, false).await;
    Ok(Json(json!({ "tag": period, "removed": removed })))
}

pub async fn disable_job(
    Path(tag): Path<String>,
    Extension(state): Extension<AppState>,
) -> Result<Json<Value>, ApiError> {
    let period = parse_tag(&tag)?;
    let disabled = state.scheduler.disable_job(period.as_str()).await?;
    remember(&state, period, false).await;
    Ok(Json(json!({ "tag": period, "disabled": disabled })))
}

pub async fn start_scheduler(Extension(state): Extension<AppState>) -> Json<SchedulerSnapshot> {
    state.scheduler.start_scheduler().await;
    Json(state.scheduler.jobs().await)
}

pub async fn stop_scheduler(Extension(state): Extension<AppState>) -> Json<SchedulerSnapshot> {
    state.scheduler.stop_scheduler().await;
    Json(state.scheduler.jobs().await)
}
