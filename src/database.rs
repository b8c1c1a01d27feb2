use color_eyre::{Result, eyre::Context};
use migration::MigratorTrait;
use sea_orm::{ConnectOptions, Database as SeaDatabase, DatabaseConnection};
use std::path::PathBuf;
use std::time::Duration;

pub struct Database {
    pub conn: DatabaseConnection,
}

impl Database {
    /// Connect to the database at `url` without touching the schema.
    pub async fn connect(url: &str) -> Result<Self> {
        tracing::debug!("Connecting to database");

        // `mode=rwc` creates the file but not its directory
        if let Some(parent) = sqlite_file_path(url).as_deref().and_then(|p| p.parent()) {
            std::fs::create_dir_all(parent).context(format!(
                "Failed to create database directory: {}",
                parent.display()
            ))?;
        }

        let mut opt = ConnectOptions::new(url.to_owned());
        opt.max_connections(20)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(8))
            .acquire_timeout(Duration::from_secs(8))
            .idle_timeout(Duration::from_secs(300))
            .sqlx_logging(false);

        let conn = SeaDatabase::connect(opt)
            .await
            .context("Failed to connect to database")?;

        Ok(Database { conn })
    }

    /// Apply all pending migrations.
    pub async fn migrate(&self) -> Result<()> {
        tracing::debug!("Running database migrations");
        migration::Migrator::up(&self.conn, None)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    /// Connect and bring the schema up to date
    pub async fn open(url: &str) -> Result<Self> {
        let database = Self::connect(url).await?;
        database.migrate().await?;
        tracing::info!("Database ready");
        Ok(database)
    }
}

/// Path of the database file for a `sqlite://` URL. In-memory and
/// non-sqlite URLs have none.
fn sqlite_file_path(url: &str) -> Option<PathBuf> {
    let rest = url.strip_prefix("sqlite://")?;
    let path = rest.split('?').next().unwrap_or(rest);
    if path.is_empty() || path.starts_with(":memory:") {
        return None;
    }
    Some(PathBuf::from(path))
}
