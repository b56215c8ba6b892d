use crate::{error, success, types::Period, utils, warning};

pub async fn sync(period: &str) {
    let period: Period = match period.parse() {
        Ok(period) => period,
        Err(e) => error!("{}", e),
    };

    let syncer = match super::syncer_from_env().await {
        Ok(syncer) => syncer,
        Err(e) => error!("Cannot set up sync. Err: {}", e),
    };

    let pb = utils::spinner(format!("Syncing {} top tracks to Spotify...", period));
    let result = syncer.sync(period).await;
    pb.finish_and_clear();

    let report = match result {
        Ok(report) => report,
        Err(e) => error!("Sync failed. Err: {}", e),
    };

    success!(
        "Created playlist '{}' with {} of {} tracks",
        report.target.name,
        report.resolved_count(),
        report.resolutions.len()
    );

    for resolution in &report.resolutions {
        if let Err(reason) = &resolution.outcome {
            warning!(
                "Skipped #{} {} - {} ({})",
                resolution.track.rank,
                resolution.track.artist_name,
                resolution.track.name,
                reason
            );
        }
    }
}
