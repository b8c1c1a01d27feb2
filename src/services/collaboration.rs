use std::sync::Arc;

use color_eyre::eyre::WrapErr;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};

use crate::database::Database;
use crate::entities;
use crate::error::{CatalogError, CatalogResult};
use crate::services::generate_id;
use crate::services::user::UserService;

/// Grants and revokes access to playlists for users other than the owner.
///
/// Ownership checks are the caller's job; see `PlaylistService::verify_playlist_owner`.
pub struct CollaborationService {
    db: Arc<Database>,
}

impl CollaborationService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub async fn add_collaboration(&self, playlist_id: &str, user_id: &str) -> CatalogResult<String> {
        UserService::new(self.db.clone())
            .verify_user_exists(user_id)
            .await?;

        let collaboration = entities::collaboration::ActiveModel {
            id: Set(generate_id("collab")),
            playlist_id: Set(playlist_id.to_owned()),
            user_id: Set(user_id.to_owned()),
        };

        let model = collaboration.insert(&self.db.conn).await.map_err(|e| {
            CatalogError::from_write(e, "Failed to add collaboration. It already exists")
        })?;

        tracing::info!(%playlist_id, %user_id, "Collaboration added");
        Ok(model.id)
    }

    pub async fn delete_collaboration(&self, playlist_id: &str, user_id: &str) -> CatalogResult<()> {
        let result = entities::collaboration::Entity::delete_many()
            .filter(entities::collaboration::Column::PlaylistId.eq(playlist_id))
            .filter(entities::collaboration::Column::UserId.eq(user_id))
            .exec(&self.db.conn)
            .await
            .wrap_err("Failed to delete collaboration")?;

        if result.rows_affected == 0 {
            return Err(CatalogError::not_found(
                "Failed to delete collaboration. Collaboration not found",
            ));
        }

        tracing::info!(%playlist_id, %user_id, "Collaboration deleted");
        Ok(())
    }

    pub async fn verify_collaborator(&self, playlist_id: &str, user_id: &str) -> CatalogResult<()> {
        let found = entities::collaboration::Entity::find()
            .filter(entities::collaboration::Column::PlaylistId.eq(playlist_id))
            .filter(entities::collaboration::Column::UserId.eq(user_id))
            .one(&self.db.conn)
            .await
            .wrap_err("Failed to fetch collaboration")?;

        match found {
            Some(_) => Ok(()),
            None => Err(CatalogError::authorization(
                "You are not allowed to access this resource",
            )),
        }
    }
}
