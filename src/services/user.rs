use std::sync::Arc;

use color_eyre::eyre::WrapErr;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};

use crate::database::Database;
use crate::entities;
use crate::error::{CatalogError, CatalogResult};
use crate::services::generate_id;

pub struct UserService {
    db: Arc<Database>,
}

impl UserService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Register a user. A taken username is an invariant error.
    pub async fn add_user(&self, username: String, fullname: String) -> CatalogResult<String> {
        let user = entities::user::ActiveModel {
            id: Set(generate_id("user")),
            username: Set(username),
            fullname: Set(fullname),
        };

        let model = user
            .insert(&self.db.conn)
            .await
            .map_err(|e| CatalogError::from_write(e, "Failed to add user. Username is taken"))?;

        tracing::info!(user_id = %model.id, "User added");
        Ok(model.id)
    }

    pub async fn get_username(&self, id: &str) -> CatalogResult<String> {
        let user = entities::user::Entity::find_by_id(id.to_owned())
            .one(&self.db.conn)
            .await
            .wrap_err("Failed to fetch user")?
            .ok_or_else(|| CatalogError::not_found("User not found"))?;

        Ok(user.username)
    }

    pub async fn verify_user_exists(&self, id: &str) -> CatalogResult<()> {
        self.get_username(id).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_db;

    #[tokio::test]
    async fn test_add_user_and_get_username() {
        let db = test_db().await;
        let service = UserService::new(db);

        let id = service
            .add_user("dicoding".into(), "Dicoding Indonesia".into())
            .await
            .unwrap();

        assert!(id.starts_with("user-"));
        assert_eq!(service.get_username(&id).await.unwrap(), "dicoding");
    }

    #[tokio::test]
    async fn test_add_user_duplicate_username() {
        let db = test_db().await;
        let service = UserService::new(db);

        service
            .add_user("taken".into(), "First".into())
            .await
            .unwrap();
        let result = service.add_user("taken".into(), "Second".into()).await;

        assert!(matches!(result, Err(CatalogError::Invariant(_))));
    }

    #[tokio::test]
    async fn test_get_username_not_found() {
        let db = test_db().await;
        let service = UserService::new(db);

        let result = service.get_username("user-missing").await;
        assert!(matches!(result, Err(CatalogError::NotFound(_))));
    }
}
