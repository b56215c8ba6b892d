use tabled::Table;

use crate::{
    clock::{Clock, SystemClock},
    config, error, info,
    management::ScheduleStateManager,
    scheduler::Cadence,
    types::JobTableRow,
};

/// Lists the enabled tags and when `serve` would fire them next.
pub async fn jobs() {
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
    if enabled.is_empty() {
        info!("No jobs enabled.");
        return;
    }

    let now = SystemClock.now();
    let rows: Vec<JobTableRow> = enabled
        .into_iter()
        .map(|period| {
            let cadence = Cadence::for_period(period);
            JobTableRow {
                tag: period.to_string(),
                cadence: cadence.describe().to_string(),
                next_run: cadence.next_after(now).format("%Y-%m-%d %H:%M").to_string(),
            }
        })
        .collect();

    let table = Table::new(rows);
    println!("{}", table);
}
