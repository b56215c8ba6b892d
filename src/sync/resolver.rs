use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use super::PlaylistService;
use crate::types::TrackSummary;

/// Only the best hit is used
const SEARCH_LIMIT: u32 = 1;

/// Why a track did not make it into the playlist
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    #[error("search failed: {0}")]
    SearchFailed(String),

    #[error("no match")]
    NoMatch,
}

/// Field-qualified Spotify search query for one track.
pub fn build_query(artist: &str, title: &str) -> String {
    format!("artist: \"{}\" track: \"{}\"", artist, title)
}

/// Drops the characters Spotify's search syntax chokes on.
pub fn sanitize_query(query: &str) -> String {
    query
        .chars()
        .filter(|c| !matches!(c, '\'' | '{' | '}'))
        .collect()
}

/// Maps Last.fm tracks to Spotify track ids, one search per track.
#[derive(Clone)]
pub struct TrackResolver {
    service: Arc<dyn PlaylistService>,
}

impl TrackResolver {
    pub fn new(service: Arc<dyn PlaylistService>) -> Self {
        Self { service }
    }

    /// Resolves a single track.
    ///
    /// A failed search and an empty result are both reported as a
    /// [`SkipReason`], never as an error of the run.
    pub async fn resolve(&self, track: &TrackSummary) -> Result<String, SkipReason> {
        let query = sanitize_query(&build_query(&track.artist_name, &track.name));

        match self.service.search_track(&query, SEARCH_LIMIT).await {
            Ok(ids) => match ids.into_iter().next() {
                Some(id) => {
                    debug!(artist = %track.artist_name, track = %track.name, %id, "Resolved track");
                    Ok(id)
                }
                None => {
                    warn!(artist = %track.artist_name, track = %track.name, "No Spotify match, skipping");
                    Err(SkipReason::NoMatch)
                }
            },
            Err(e) => {
                warn!(
                    artist = %track.artist_name,
                    track = %track.name,
                    error = %e,
                    "Spotify search failed, skipping"
                );
                Err(SkipReason::SearchFailed(e.to_string()))
            }
        }
    }

    /// Resolves `tracks` sequentially, keeping their order.
    pub async fn resolve_all(&self, tracks: &[TrackSummary]) -> Vec<Result<String, SkipReason>> {
        let mut outcomes = Vec::with_capacity(tracks.len());
        for track in tracks {
            outcomes.push(self.resolve(track).await);
        }
        outcomes
    }
}
