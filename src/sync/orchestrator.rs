use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument};

use super::{
    PeriodConfigSource, PlaylistBuilder, PlaylistService, SkipReason, TopTracksSource,
    TrackResolver, naming,
};
use crate::{
    clock::Clock,
    error::SyncError,
    types::{Period, PlaylistTarget, TrackSummary},
};

/// What happened to one track of the report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackResolution {
    pub track: TrackSummary,
    pub outcome: Result<String, SkipReason>,
}

/// Outcome of a successful run
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub period: Period,
    pub playlist_id: String,
    pub target: PlaylistTarget,
    pub resolutions: Vec<TrackResolution>,
}

impl SyncReport {
    pub fn resolved_count(&self) -> usize {
        self.resolutions.iter().filter(|r| r.outcome.is_ok()).count()
    }

    pub fn skipped_count(&self) -> usize {
        self.resolutions.len() - self.resolved_count()
    }
}

/// Runs one period of Last.fm top tracks into a new Spotify playlist.
///
/// Shared by the scheduler, the CLI and the HTTP trigger.
#[derive(Clone)]
pub struct Syncer {
    source: Arc<dyn TopTracksSource>,
    target: Arc<dyn PlaylistService>,
    config: Arc<dyn PeriodConfigSource>,
    clock: Arc<dyn Clock>,
}

impl Syncer {
    pub fn new(
        source: Arc<dyn TopTracksSource>,
        target: Arc<dyn PlaylistService>,
        config: Arc<dyn PeriodConfigSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            source,
            target,
            config,
            clock,
        }
    }

    /// Parses `period` and runs [`Syncer::sync`].
    ///
    /// An unknown period fails with [`SyncError::InvalidPeriod`] before any
    /// collaborator is called.
    pub async fn sync_named(&self, period: &str) -> Result<SyncReport, SyncError> {
        let period: Period = period.parse()?;
        self.sync(period).await
    }

    #[instrument(skip(self), fields(period = %period))]
    pub async fn sync(&self, period: Period) -> Result<SyncReport, SyncError> {
        let config = self.config.period_config(period).await?;

        let report = self
            .source
            .top_tracks(period, config.max_tracks, &config.source_username)
            .await
            .map_err(SyncError::SourceFetch)?;

        let user = self
            .target
            .current_user()
            .await
            .map_err(SyncError::TargetFetch)?;

        let resolver = TrackResolver::new(Arc::clone(&self.target));
        let outcomes = resolver.resolve_all(&report.tracks).await;
        let resolutions: Vec<TrackResolution> = report
            .tracks
            .into_iter()
            .zip(outcomes)
            .map(|(track, outcome)| TrackResolution { track, outcome })
            .collect();

        let track_ids = resolutions
            .iter()
            .filter_map(|r| r.outcome.as_ref().ok().cloned())
            .collect();

        let target = PlaylistTarget {
            owner_user_id: user.id,
            name: naming::playlist_name(period, self.clock.now()),
            track_ids,
        };
        let description = format!(
            "Top tracks from Last.fm ({}) for {}",
            period, config.source_username
        );

        let playlist_id = PlaylistBuilder::new(Arc::clone(&self.target))
            .build(&target, &description)
            .await?;

        let report = SyncReport {
            period,
            playlist_id,
            target,
            resolutions,
        };
        info!(
            playlist = %report.target.name,
            resolved = report.resolved_count(),
            skipped = report.skipped_count(),
            "Sync finished"
        );
        Ok(report)
    }
}
