use std::sync::Arc;

use crate::database::Database;
use crate::http_server::validator::Validators;
use crate::ports::cache::CacheStore;
use crate::ports::queue::MessageProducer;
use crate::services::album::AlbumService;
use crate::services::collaboration::CollaborationService;
use crate::services::export::ExportService;
use crate::services::playlist::PlaylistService;
use crate::services::song::SongService;
use crate::services::user::UserService;

pub struct AppState {
    pub db: Arc<Database>,
    pub cache: Arc<dyn CacheStore>,
    pub producer: Arc<dyn MessageProducer>,
    pub export_queue: String,
    pub validators: Validators,
}

impl AppState {
    pub fn album_service(&self) -> AlbumService {
        AlbumService::new(self.db.clone(), self.cache.clone())
    }

    pub fn song_service(&self) -> SongService {
        SongService::new(self.db.clone())
    }

    pub fn playlist_service(&self) -> PlaylistService {
        PlaylistService::new(self.db.clone())
    }

    pub fn collaboration_service(&self) -> CollaborationService {
        CollaborationService::new(self.db.clone())
    }

    pub fn user_service(&self) -> UserService {
        UserService::new(self.db.clone())
    }

    pub fn export_service(&self) -> ExportService {
        ExportService::new(
            self.playlist_service(),
            self.producer.clone(),
            self.export_queue.clone(),
        )
    }
}
