use axum::{Extension, Json, extract::Path};

use super::{ApiError, AppState};
use crate::sync::SyncReport;

/// Runs a sync right away, outside the schedule.
pub async fn trigger_sync(
    Path(period): Path<String>,
    Extension(state): Extension<AppState>,
) -> Result<Json<SyncReport>, ApiError> {
    let report = state.syncer.sync_named(&period).await?;
    Ok(Json(report))
}
