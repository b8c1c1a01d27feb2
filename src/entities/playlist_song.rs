use sea_orm::entity::prelude::*;

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "playlist_songs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub playlist_id: String,
    pub song_id: String,

    #[sea_orm(belongs_to, from = "playlist_id", to = "id")]
    pub playlist: Option<super::playlist::Entity>,
    #[sea_orm(belongs_to, from = "song_id", to = "id")]
    pub song: Option<super::song::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
