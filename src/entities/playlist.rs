use sea_orm::entity::prelude::*;

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "playlists")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    /// Id of the owning user
    pub owner: String,

    #[sea_orm(has_many, via = "playlist_song")]
    pub songs: HasMany<super::song::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
