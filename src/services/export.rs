use std::sync::Arc;

use color_eyre::eyre::WrapErr;
use serde::{Deserialize, Serialize};

use crate::error::CatalogResult;
use crate::ports::queue::MessageProducer;
use crate::services::playlist::PlaylistService;

/// Message consumed by the export worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportPlaylistJob {
    pub user_id: String,
    pub playlist_id: String,
    pub target_email: String,
}

pub struct ExportService {
    playlists: PlaylistService,
    producer: Arc<dyn MessageProducer>,
    queue: String,
}

impl ExportService {
    pub fn new(playlists: PlaylistService, producer: Arc<dyn MessageProducer>, queue: String) -> Self {
        Self {
            playlists,
            producer,
            queue,
        }
    }

    /// Queue an export of the playlist to `target_email`. Only the owner may
    /// export; nothing is sent otherwise.
    pub async fn request_playlist_export(
        &self,
        user_id: &str,
        playlist_id: &str,
        target_email: &str,
    ) -> CatalogResult<()> {
        self.playlists
            .verify_playlist_owner(playlist_id, user_id)
            .await?;

        let job = ExportPlaylistJob {
            user_id: user_id.to_owned(),
            playlist_id: playlist_id.to_owned(),
            target_email: target_email.to_owned(),
        };
        let message = serde_json::to_vec(&job).wrap_err("Failed to serialize export job")?;

        self.producer
            .send_message(&self.queue, message)
            .await
            .wrap_err("Failed to queue playlist export")?;

        tracing::info!(%playlist_id, queue = %self.queue, "Playlist export queued");
        Ok(())
    }
}
