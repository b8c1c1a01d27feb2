use std::sync::Arc;

use color_eyre::eyre::WrapErr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::database::Database;
use crate::entities;
use crate::error::{CatalogError, CatalogResult};
use crate::services::generate_id;

#[derive(Debug, Clone)]
pub struct NewSong {
    pub title: String,
    pub year: i32,
    pub genre: String,
    pub performer: String,
    pub duration: Option<i32>,
    pub album_id: Option<String>,
}

/// The columns returned when listing songs.
#[derive(Debug, Clone, PartialEq, Eq, sea_orm::FromQueryResult)]
pub struct SongSummary {
    pub id: String,
    pub title: String,
    pub performer: String,
}

pub struct SongService {
    db: Arc<Database>,
}

impl SongService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Insert a song. An `album_id` that names no album is rejected.
    pub async fn add_song(&self, song: NewSong) -> CatalogResult<String> {
        let active = entities::song::ActiveModel {
            id: Set(generate_id("song")),
            title: Set(song.title),
            year: Set(song.year),
            genre: Set(song.genre),
            performer: Set(song.performer),
            duration: Set(song.duration),
            album_id: Set(song.album_id),
        };

        let model = active
            .insert(&self.db.conn)
            .await
            .map_err(|e| CatalogError::from_write(e, "Failed to add song. Album not found"))?;

        tracing::info!(song_id = %model.id, "Song added");
        Ok(model.id)
    }

    /// List songs, optionally narrowed by title and performer substrings.
    /// Both filters must match when both are given.
    pub async fn get_songs(
        &self,
        title: Option<&str>,
        performer: Option<&str>,
    ) -> CatalogResult<Vec<SongSummary>> {
        let mut query = entities::song::Entity::find()
            .select_only()
            .column(entities::song::Column::Id)
            .column(entities::song::Column::Title)
            .column(entities::song::Column::Performer);

        if let Some(title) = title.filter(|t| !t.is_empty()) {
            query = query.filter(entities::song::Column::Title.like(format!("%{}%", title)));
        }
        if let Some(performer) = performer.filter(|p| !p.is_empty()) {
            query =
                query.filter(entities::song::Column::Performer.like(format!("%{}%", performer)));
        }

        let songs = query
            .order_by_asc(entities::song::Column::Title)
            .into_model::<SongSummary>()
            .all(&self.db.conn)
            .await
            .wrap_err("Failed to fetch songs")?;

        Ok(songs)
    }

    pub async fn get_song_by_id(&self, id: &str) -> CatalogResult<entities::song::Model> {
        self.find_song_or(id, "Song not found").await
    }

    pub async fn edit_song_by_id(&self, id: &str, song: NewSong) -> CatalogResult<()> {
        let existing = self
            .find_song_or(id, "Failed to update song. Id not found")
            .await?;

        let mut active: entities::song::ActiveModel = existing.into();
        active.title = Set(song.title);
        active.year = Set(song.year);
        active.genre = Set(song.genre);
        active.performer = Set(song.performer);
        active.duration = Set(song.duration);
        active.album_id = Set(song.album_id);
        active
            .update(&self.db.conn)
            .await
            .map_err(|e| CatalogError::from_write(e, "Failed to update song. Album not found"))?;

        tracing::info!(song_id = %id, "Song updated");
        Ok(())
    }

    pub async fn delete_song_by_id(&self, id: &str) -> CatalogResult<()> {
        let result = entities::song::Entity::delete_by_id(id.to_owned())
            .exec(&self.db.conn)
            .await
            .wrap_err("Failed to delete song")?;

        if result.rows_affected == 0 {
            return Err(CatalogError::not_found("Failed to delete song. Id not found"));
        }

        tracing::info!(song_id = %id, "Song deleted");
        Ok(())
    }

    async fn find_song_or(
        &self,
        id: &str,
        not_found_message: &str,
    ) -> CatalogResult<entities::song::Model> {
        entities::song::Entity::find_by_id(id.to_owned())
            .one(&self.db.conn)
            .await
            .wrap_err("Failed to fetch song")?
            .ok_or_else(|| CatalogError::not_found(not_found_message))
    }
}
