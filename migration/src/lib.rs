pub use sea_orm_migration::prelude::*;

mod m20221011_000001_create_catalog_tables;
mod m20221112_000001_add_album_cover_url;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20221011_000001_create_catalog_tables::Migration),
            Box::new(m20221112_000001_add_album_cover_url::Migration),
        ]
    }
}
