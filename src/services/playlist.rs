use std::collections::HashMap;
use std::sync::Arc;

use color_eyre::eyre::WrapErr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, ModelTrait, QueryFilter, QueryOrder,
    Set,
};

use crate::database::Database;
use crate::entities;
use crate::error::{CatalogError, CatalogResult};
use crate::services::collaboration::CollaborationService;
use crate::services::generate_id;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistSummary {
    pub id: String,
    pub name: String,
    /// Username of the owner
    pub username: String,
}

pub struct PlaylistWithSongs {
    pub playlist: entities::playlist::Model,
    pub username: String,
    pub songs: Vec<entities::song::Model>,
}

pub struct PlaylistService {
    db: Arc<Database>,
}

impl PlaylistService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub async fn add_playlist(&self, name: String, owner: &str) -> CatalogResult<String> {
        let playlist = entities::playlist::ActiveModel {
            id: Set(generate_id("playlist")),
            name: Set(name),
            owner: Set(owner.to_owned()),
        };

        let model = playlist
            .insert(&self.db.conn)
            .await
            .map_err(|e| CatalogError::from_write(e, "Failed to add playlist"))?;

        tracing::info!(playlist_id = %model.id, %owner, "Playlist added");
        Ok(model.id)
    }

    /// Playlists the user owns or collaborates on, ordered by name.
    pub async fn get_playlists(&self, user_id: &str) -> CatalogResult<Vec<PlaylistSummary>> {
        let shared_ids: Vec<String> = entities::collaboration::Entity::find()
            .filter(entities::collaboration::Column::UserId.eq(user_id))
            .all(&self.db.conn)
            .await
            .wrap_err("Failed to fetch collaborations")?
            .into_iter()
            .map(|c| c.playlist_id)
            .collect();

        let mut condition =
            Condition::any().add(entities::playlist::Column::Owner.eq(user_id));
        if !shared_ids.is_empty() {
            condition = condition.add(entities::playlist::Column::Id.is_in(shared_ids));
        }

        let playlists = entities::playlist::Entity::find()
            .filter(condition)
            .order_by_asc(entities::playlist::Column::Name)
            .all(&self.db.conn)
            .await
            .wrap_err("Failed to fetch playlists")?;

        if playlists.is_empty() {
            return Ok(Vec::new());
        }

        let owner_ids: Vec<String> = playlists.iter().map(|p| p.owner.clone()).collect();
        let usernames: HashMap<String, String> = entities::user::Entity::find()
            .filter(entities::user::Column::Id.is_in(owner_ids))
            .all(&self.db.conn)
            .await
            .wrap_err("Failed to fetch playlist owners")?
            .into_iter()
            .map(|u| (u.id, u.username))
            .collect();

        Ok(playlists
            .into_iter()
            .map(|p| PlaylistSummary {
                username: usernames.get(&p.owner).cloned().unwrap_or_default(),
                id: p.id,
                name: p.name,
            })
            .collect())
    }

    pub async fn delete_playlist_by_id(&self, id: &str) -> CatalogResult<()> {
        let result = entities::playlist::Entity::delete_by_id(id.to_owned())
            .exec(&self.db.conn)
            .await
            .wrap_err("Failed to delete playlist")?;

        if result.rows_affected == 0 {
            return Err(CatalogError::not_found(
                "Failed to delete playlist. Id not found",
            ));
        }

        tracing::info!(playlist_id = %id, "Playlist deleted");
        Ok(())
    }

    /// Missing playlist is `NotFound`; someone else's is `Authorization`.
    pub async fn verify_playlist_owner(&self, id: &str, user_id: &str) -> CatalogResult<()> {
        let playlist = self.find_playlist(id).await?;

        if playlist.owner != user_id {
            return Err(CatalogError::authorization(
                "You are not allowed to access this resource",
            ));
        }

        Ok(())
    }

    /// Owners and collaborators pass. A missing playlist is still `NotFound`.
    pub async fn verify_playlist_access(&self, id: &str, user_id: &str) -> CatalogResult<()> {
        match self.verify_playlist_owner(id, user_id).await {
            Ok(()) => Ok(()),
            Err(CatalogError::Authorization(_)) => {
                CollaborationService::new(self.db.clone())
                    .verify_collaborator(id, user_id)
                    .await
            }
            Err(e) => Err(e),
        }
    }

    /// Adding a song that is already in the playlist is a no-op.
    pub async fn add_song_to_playlist(&self, playlist_id: &str, song_id: &str) -> CatalogResult<()> {
        entities::song::Entity::find_by_id(song_id.to_owned())
            .one(&self.db.conn)
            .await
            .wrap_err("Failed to fetch song")?
            .ok_or_else(|| CatalogError::not_found("Song not found"))?;

        let existing = entities::playlist_song::Entity::find()
            .filter(
                Condition::all()
                    .add(entities::playlist_song::Column::PlaylistId.eq(playlist_id))
                    .add(entities::playlist_song::Column::SongId.eq(song_id)),
            )
            .one(&self.db.conn)
            .await
            .wrap_err("Failed to check existing playlist song")?;

        if existing.is_some() {
            return Ok(());
        }

        let link = entities::playlist_song::ActiveModel {
            id: Set(generate_id("playlist-song")),
            playlist_id: Set(playlist_id.to_owned()),
            song_id: Set(song_id.to_owned()),
        };
        link.insert(&self.db.conn)
            .await
            .map_err(|e| CatalogError::from_write(e, "Failed to add song to playlist"))?;

        tracing::info!(%playlist_id, %song_id, "Song added to playlist");
        Ok(())
    }

    pub async fn get_songs_in_playlist(&self, playlist_id: &str) -> CatalogResult<PlaylistWithSongs> {
        let playlist = self.find_playlist(playlist_id).await?;

        let username = entities::user::Entity::find_by_id(playlist.owner.clone())
            .one(&self.db.conn)
            .await
            .wrap_err("Failed to fetch playlist owner")?
            .map(|u| u.username)
            .unwrap_or_default();

        let songs = playlist
            .find_related(entities::song::Entity)
            .order_by_asc(entities::song::Column::Title)
            .all(&self.db.conn)
            .await
            .wrap_err("Failed to fetch playlist songs")?;

        Ok(PlaylistWithSongs {
            playlist,
            username,
            songs,
        })
    }

    /// Removes the song from this playlist only.
    pub async fn delete_song_from_playlist(
        &self,
        playlist_id: &str,
        song_id: &str,
    ) -> CatalogResult<()> {
        let result = entities::playlist_song::Entity::delete_many()
            .filter(
                Condition::all()
                    .add(entities::playlist_song::Column::PlaylistId.eq(playlist_id))
                    .add(entities::playlist_song::Column::SongId.eq(song_id)),
            )
            .exec(&self.db.conn)
            .await
            .wrap_err("Failed to remove song from playlist")?;

        if result.rows_affected == 0 {
            return Err(CatalogError::not_found(
                "Failed to remove song. Song is not in the playlist",
            ));
        }

        tracing::info!(%playlist_id, %song_id, "Song removed from playlist");
        Ok(())
    }

    async fn find_playlist(&self, id: &str) -> CatalogResult<entities::playlist::Model> {
        entities::playlist::Entity::find_by_id(id.to_owned())
            .one(&self.db.conn)
            .await
            .wrap_err("Failed to fetch playlist")?
            .ok_or_else(|| CatalogError::not_found("Playlist not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::song::{NewSong, SongService};
    use crate::test_utils::{insert_user, test_db};
    use sea_orm::PaginatorTrait;

    async fn insert_song(db: &Arc<Database>, title: &str) -> String {
        SongService::new(db.clone())
            .add_song(NewSong {
                title: title.into(),
                year: 2000,
                genre: "Rock".into(),
                performer: "Band".into(),
                duration: None,
                album_id: None,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_get_playlists_empty() {
        let db = test_db().await;
        let user = insert_user(&db, "lonely").await;
        let service = PlaylistService::new(db);

        assert!(service.get_playlists(&user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_playlists_includes_shared() {
        let db = test_db().await;
        let owner = insert_user(&db, "owner").await;
        let guest = insert_user(&db, "guest").await;
        let service = PlaylistService::new(db.clone());

        let shared = service.add_playlist("Shared".into(), &owner).await.unwrap();
        service.add_playlist("Private".into(), &owner).await.unwrap();
        service.add_playlist("Mine".into(), &guest).await.unwrap();
        CollaborationService::new(db)
            .add_collaboration(&shared, &guest)
            .await
            .unwrap();

        let playlists = service.get_playlists(&guest).await.unwrap();
        assert_eq!(
            playlists,
            vec![
                PlaylistSummary {
                    id: playlists[0].id.clone(),
                    name: "Mine".into(),
                    username: "guest".into(),
                },
                PlaylistSummary {
                    id: shared,
                    name: "Shared".into(),
                    username: "owner".into(),
                },
            ]
        );
        assert_eq!(service.get_playlists(&owner).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_verify_owner_and_access() {
        let db = test_db().await;
        let owner = insert_user(&db, "owner").await;
        let guest = insert_user(&db, "guest").await;
        let stranger = insert_user(&db, "stranger").await;
        let service = PlaylistService::new(db.clone());
        let id = service.add_playlist("Party".into(), &owner).await.unwrap();
        CollaborationService::new(db)
            .add_collaboration(&id, &guest)
            .await
            .unwrap();

        service.verify_playlist_owner(&id, &owner).await.unwrap();
        assert!(matches!(
            service.verify_playlist_owner(&id, &guest).await,
            Err(CatalogError::Authorization(_))
        ));

        service.verify_playlist_access(&id, &owner).await.unwrap();
        service.verify_playlist_access(&id, &guest).await.unwrap();
        assert!(matches!(
            service.verify_playlist_access(&id, &stranger).await,
            Err(CatalogError::Authorization(_))
        ));
        assert!(matches!(
            service.verify_playlist_access("playlist-missing", &owner).await,
            Err(CatalogError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_playlist_songs_lifecycle() {
        let db = test_db().await;
        let owner = insert_user(&db, "owner").await;
        let service = PlaylistService::new(db.clone());
        let id = service.add_playlist("Mix".into(), &owner).await.unwrap();
        let song = insert_song(&db, "Track").await;

        let empty = service.get_songs_in_playlist(&id).await.unwrap();
        assert_eq!(empty.username, "owner");
        assert!(empty.songs.is_empty());

        service.add_song_to_playlist(&id, &song).await.unwrap();
        // Idempotent
        service.add_song_to_playlist(&id, &song).await.unwrap();

        let with_song = service.get_songs_in_playlist(&id).await.unwrap();
        assert_eq!(with_song.playlist.name, "Mix");
        assert_eq!(with_song.songs.len(), 1);
        assert_eq!(with_song.songs[0].id, song);

        service.delete_song_from_playlist(&id, &song).await.unwrap();
        assert!(service.get_songs_in_playlist(&id).await.unwrap().songs.is_empty());
        assert!(matches!(
            service.delete_song_from_playlist(&id, &song).await,
            Err(CatalogError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_song_from_one_playlist_keeps_others() {
        let db = test_db().await;
        let owner = insert_user(&db, "owner").await;
        let service = PlaylistService::new(db.clone());
        let first = service.add_playlist("First".into(), &owner).await.unwrap();
        let second = service.add_playlist("Second".into(), &owner).await.unwrap();
        let song = insert_song(&db, "Shared song").await;

        service.add_song_to_playlist(&first, &song).await.unwrap();
        service.add_song_to_playlist(&second, &song).await.unwrap();
        service.delete_song_from_playlist(&first, &song).await.unwrap();

        assert!(service.get_songs_in_playlist(&first).await.unwrap().songs.is_empty());
        assert_eq!(service.get_songs_in_playlist(&second).await.unwrap().songs.len(), 1);
    }

    #[tokio::test]
    async fn test_add_missing_song_to_playlist() {
        let db = test_db().await;
        let owner = insert_user(&db, "owner").await;
        let service = PlaylistService::new(db);
        let id = service.add_playlist("Mix".into(), &owner).await.unwrap();

        let result = service.add_song_to_playlist(&id, "song-missing").await;
        assert!(matches!(result, Err(CatalogError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_playlist_cascades_songs_and_collaborations() {
        let db = test_db().await;
        let owner = insert_user(&db, "owner").await;
        let guest = insert_user(&db, "guest").await;
        let service = PlaylistService::new(db.clone());
        let id = service.add_playlist("Temp".into(), &owner).await.unwrap();
        let song = insert_song(&db, "Track").await;
        service.add_song_to_playlist(&id, &song).await.unwrap();
        CollaborationService::new(db.clone())
            .add_collaboration(&id, &guest)
            .await
            .unwrap();

        service.delete_playlist_by_id(&id).await.unwrap();

        let links = entities::playlist_song::Entity::find()
            .count(&db.conn)
            .await
            .unwrap();
        let collaborations = entities::collaboration::Entity::find()
            .count(&db.conn)
            .await
            .unwrap();
        assert_eq!(links, 0);
        assert_eq!(collaborations, 0);
        assert!(service.get_playlists(&guest).await.unwrap().is_empty());
        assert!(matches!(
            service.get_songs_in_playlist(&id).await,
            Err(CatalogError::NotFound(_))
        ));
        assert!(matches!(
            service.delete_playlist_by_id(&id).await,
            Err(CatalogError::NotFound(_))
        ));
        // Song survives the playlist
        SongService::new(db).get_song_by_id(&song).await.unwrap();
    }
}
