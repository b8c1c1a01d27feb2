use std::sync::Arc;

use color_eyre::eyre::WrapErr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::database::Database;
use crate::entities;
use crate::error::{CatalogError, CatalogResult};
use crate::ports::cache::CacheStore;
use crate::services::generate_id;

pub struct AlbumWithSongs {
    pub album: entities::album::Model,
    pub songs: Vec<entities::song::Model>,
}

/// Outcome of a like toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeToggle {
    Liked,
    Unliked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlbumLikes {
    pub likes: u64,
    pub from_cache: bool,
}

/// Generation stamped on a cached count when no write has happened yet.
const INITIAL_LIKES_GENERATION: &str = "0";

fn likes_cache_key(album_id: &str) -> String {
    format!("album-likes:{}", album_id)
}

/// Every like write moves the album to a new generation. A cached count is
/// only served while its generation is current, so a count computed before a
/// write can never be served after it.
fn likes_generation_key(album_id: &str) -> String {
    format!("album-likes-gen:{}", album_id)
}

pub struct AlbumService {
    db: Arc<Database>,
    cache: Arc<dyn CacheStore>,
}

impl AlbumService {
    pub fn new(db: Arc<Database>, cache: Arc<dyn CacheStore>) -> Self {
        Self { db, cache }
    }

    pub async fn add_album(
        &self,
        name: String,
        year: i32,
        cover_url: Option<String>,
    ) -> CatalogResult<String> {
        let album = entities::album::ActiveModel {
            id: Set(generate_id("album")),
            name: Set(name),
            year: Set(year),
            cover_url: Set(cover_url),
        };

        let model = album
            .insert(&self.db.conn)
            .await
            .map_err(|e| CatalogError::from_write(e, "Failed to add album"))?;

        tracing::info!(album_id = %model.id, "Album added");
        Ok(model.id)
    }

    pub async fn get_albums(&self) -> CatalogResult<Vec<entities::album::Model>> {
        let albums = entities::album::Entity::find()
            .order_by_asc(entities::album::Column::Name)
            .all(&self.db.conn)
            .await
            .wrap_err("Failed to fetch albums")?;

        Ok(albums)
    }

    pub async fn get_album_by_id(&self, id: &str) -> CatalogResult<AlbumWithSongs> {
        let album = self.find_album(id).await?;

        let songs = album
            .find_related(entities::song::Entity)
            .order_by_asc(entities::song::Column::Title)
            .all(&self.db.conn)
            .await
            .wrap_err("Failed to fetch album songs")?;

        Ok(AlbumWithSongs { album, songs })
    }

    pub async fn edit_album_by_id(&self, id: &str, name: String, year: i32) -> CatalogResult<()> {
        let album = self
            .find_album_or(id, "Failed to update album. Id not found")
            .await?;

        let mut active_album: entities::album::ActiveModel = album.into();
        active_album.name = Set(name);
        active_album.year = Set(year);
        active_album
            .update(&self.db.conn)
            .await
            .map_err(|e| CatalogError::from_write(e, "Failed to update album"))?;

        tracing::info!(album_id = %id, "Album updated");
        Ok(())
    }

    /// Point the album at a new cover image. Storing the image itself is the
    /// caller's concern.
    pub async fn update_cover_album(&self, id: &str, cover_url: String) -> CatalogResult<()> {
        let album = self
            .find_album_or(id, "Failed to update album cover. Id not found")
            .await?;

        let mut active_album: entities::album::ActiveModel = album.into();
        active_album.cover_url = Set(Some(cover_url));
        active_album
            .update(&self.db.conn)
            .await
            .map_err(|e| CatalogError::from_write(e, "Failed to update album cover"))?;

        Ok(())
    }

    pub async fn delete_album_by_id(&self, id: &str) -> CatalogResult<()> {
        let result = entities::album::Entity::delete_by_id(id.to_owned())
            .exec(&self.db.conn)
            .await
            .wrap_err("Failed to delete album")?;

        if result.rows_affected == 0 {
            return Err(CatalogError::not_found(
                "Failed to delete album. Id not found",
            ));
        }

        // Likes go with the album; a stale count must not outlive it
        self.invalidate_likes(id).await;

        tracing::info!(album_id = %id, "Album deleted");
        Ok(())
    }

    // ---- Likes ----

    /// Like the album for `user_id`, or remove the like if one exists.
    ///
    /// The cached count for the album is invalidated either way.
    pub async fn add_like_in_album(
        &self,
        user_id: &str,
        album_id: &str,
    ) -> CatalogResult<LikeToggle> {
        self.find_album(album_id).await?;

        let removed = entities::user_album_like::Entity::delete_many()
            .filter(entities::user_album_like::Column::UserId.eq(user_id))
            .filter(entities::user_album_like::Column::AlbumId.eq(album_id))
            .exec(&self.db.conn)
            .await
            .wrap_err("Failed to remove album like")?;

        let toggle = if removed.rows_affected > 0 {
            LikeToggle::Unliked
        } else {
            let like = entities::user_album_like::ActiveModel {
                id: Set(generate_id("like")),
                user_id: Set(user_id.to_owned()),
                album_id: Set(album_id.to_owned()),
            };
            like.insert(&self.db.conn)
                .await
                .map_err(|e| CatalogError::from_write(e, "Failed to like album"))?;
            LikeToggle::Liked
        };

        self.invalidate_likes(album_id).await;

        tracing::info!(%user_id, %album_id, ?toggle, "Toggled album like");
        Ok(toggle)
    }

    /// Number of likes on the album, read through the cache.
    ///
    /// A cache error counts as a miss. A failure to repopulate the cache is
    /// logged and does not fail the read.
    pub async fn get_likes_in_album(&self, album_id: &str) -> CatalogResult<AlbumLikes> {
        let key = likes_cache_key(album_id);

        // Read before counting so a write that lands mid-count retires our value
        let generation = match self.cache.get(&likes_generation_key(album_id)).await {
            Ok(generation) => {
                Some(generation.unwrap_or_else(|| INITIAL_LIKES_GENERATION.to_string()))
            }
            Err(e) => {
                tracing::warn!(error = ?e, %album_id, "Like cache generation read failed");
                None
            }
        };

        if let Some(generation) = &generation {
            match self.cache.get(&key).await {
                Ok(Some(cached)) => match parse_cached_likes(&cached) {
                    Some((cached_generation, likes)) if cached_generation == generation.as_str() => {
                        return Ok(AlbumLikes {
                            likes,
                            from_cache: true,
                        });
                    }
                    Some(_) => tracing::debug!(%key, "Cached like count is from an old generation"),
                    None => tracing::warn!(%key, %cached, "Ignoring malformed cached like count"),
                },
                Ok(None) => {}
                Err(e) => tracing::warn!(error = ?e, %key, "Like cache read failed"),
            }
        }

        let likes = entities::user_album_like::Entity::find()
            .filter(entities::user_album_like::Column::AlbumId.eq(album_id))
            .count(&self.db.conn)
            .await
            .wrap_err("Failed to count album likes")?;

        if let Some(generation) = generation {
            let value = format!("{generation}:{likes}");
            if let Err(e) = self.cache.set(&key, value).await {
                tracing::warn!(error = ?e, %key, "Failed to cache like count");
            }
        }

        Ok(AlbumLikes {
            likes,
            from_cache: false,
        })
    }

    async fn invalidate_likes(&self, album_id: &str) {
        let generation_key = likes_generation_key(album_id);
        let generation = uuid::Uuid::new_v4().simple().to_string();
        if let Err(e) = self.cache.set(&generation_key, generation).await {
            tracing::warn!(error = ?e, key = %generation_key, "Failed to advance like cache generation");
        }

        let key = likes_cache_key(album_id);
        if let Err(e) = self.cache.delete(&key).await {
            tracing::warn!(error = ?e, %key, "Failed to invalidate cached like count");
        }
    }

    // ---- Shared helpers ----

    async fn find_album(&self, id: &str) -> CatalogResult<entities::album::Model> {
        self.find_album_or(id, "Album not found").await
    }

    async fn find_album_or(
        &self,
        id: &str,
        not_found_message: &str,
    ) -> CatalogResult<entities::album::Model> {
        entities::album::Entity::find_by_id(id.to_owned())
            .one(&self.db.conn)
            .await
            .wrap_err("Failed to fetch album")?
            .ok_or_else(|| CatalogError::not_found(not_found_message))
    }
}

/// Split a cached `<generation>:<count>` value.
fn parse_cached_likes(cached: &str) -> Option<(&str, u64)> {
    let (generation, likes) = cached.rsplit_once(':')?;
    Some((generation, likes.parse().ok()?))
}
