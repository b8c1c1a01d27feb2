use std::sync::Arc;

use migration::MigratorTrait;
use sea_orm::{ConnectionTrait, Database as SeaDatabase};

use crate::database::Database;
use crate::services::user::UserService;

pub async fn test_db() -> Arc<Database> {
    let conn = SeaDatabase::connect("sqlite::memory:").await.unwrap();

    // Cascades and SET NULL rely on this
    conn.execute_unprepared("PRAGMA foreign_keys = ON")
        .await
        .unwrap();

    migration::Migrator::up(&conn, None)
        .await
        .unwrap_or_else(|e| panic!("Failed to migrate test database: {}", e));

    Arc::new(Database { conn })
}

/// Insert a user and return its id.
pub async fn insert_user(db: &Arc<Database>, username: &str) -> String {
    UserService::new(db.clone())
        .add_user(username.to_string(), format!("{} fullname", username))
        .await
        .unwrap()
}
