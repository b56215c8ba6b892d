use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    api::AppState,
    clock::SystemClock,
    config, error, info,
    management::ScheduleStateManager,
    scheduler::Scheduler,
    server, success, warning,
};

/// Runs the scheduler and the admin API until Ctrl-C.
///
/// Enabled tags come from the persisted schedule state, or from the
/// `SYNC_*_ENABLED` variables when nothing was persisted yet.
pub async fn serve() {
    let syncer = match super::syncer_from_env().await {
        Ok(syncer) => syncer,
        Err(e) => error!("Cannot set up sync. Err: {}", e),
    };

    let state = match ScheduleStateManager::load_or(
        ScheduleStateManager::default_path(),
        config::enabled_periods(),
    )
    .await
    {
        Ok(state) => state,
        Err(e) => error!("Failed to load schedule state. Err: {}", e),
    };
    let enabled = state.enabled();

    let scheduler = Scheduler::new(Arc::new(SystemClock), Arc::new(syncer.clone()));
    if let Err(e) = scheduler.setup_schedule(&enabled).await {
        error!("Failed to start scheduler. Err: {}", e);
    }

    if enabled.is_empty() {
        warning!("No jobs enabled, start one with POST /jobs/{{tag}}/start");
    } else {
        let tags: Vec<&str> = enabled.iter().map(|p| p.as_str()).collect();
        info!("Scheduled jobs: {}", tags.join(", "));
    }

    let app_state = AppState {
        scheduler: scheduler.clone(),
        syncer,
        schedule_state: Arc::new(Mutex::new(state)),
    };

    info!("Serving admin API on {}", config::server_addr());
    let shutdown = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };
    if let Err(e) = server::start_api_server(app_state, shutdown).await {
        warning!("Server stopped with error. Err: {}", e);
    }

    scheduler.shutdown().await;
    success!("Scheduler stopped.");
}
