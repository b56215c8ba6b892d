use std::sync::Arc;

use tracing::{debug, info};

use super::PlaylistService;
use crate::{error::SyncError, spotify, types::PlaylistTarget};

/// Creates the playlist for a [`PlaylistTarget`] and fills it in one batch.
#[derive(Clone)]
pub struct PlaylistBuilder {
    service: Arc<dyn PlaylistService>,
}

impl PlaylistBuilder {
    pub fn new(service: Arc<dyn PlaylistService>) -> Self {
        Self { service }
    }

    /// Returns the id of the created playlist.
    ///
    /// # Errors
    ///
    /// - [`SyncError::PlaylistCreate`] when nothing was created
    /// - [`SyncError::PlaylistPopulate`] when the playlist exists but the add
    ///   call failed; the playlist is left in place
    pub async fn build(
        &self,
        target: &PlaylistTarget,
        description: &str,
    ) -> Result<String, SyncError> {
        let playlist_id = self
            .service
            .create_playlist(&target.owner_user_id, &target.name, description)
            .await
            .map_err(|source| SyncError::PlaylistCreate {
                name: target.name.clone(),
                source,
            })?;
        debug!(%playlist_id, name = %target.name, "Playlist created");

        let uris: Vec<String> = target
            .track_ids
            .iter()
            .map(|id| spotify::track_uri(id))
            .collect();

        self.service
            .add_tracks(&playlist_id, &uris)
            .await
            .map_err(|source| SyncError::PlaylistPopulate {
                playlist_id: playlist_id.clone(),
                source,
            })?;

        info!(%playlist_id, track_count = uris.len(), "Playlist populated");
        Ok(playlist_id)
    }
}
