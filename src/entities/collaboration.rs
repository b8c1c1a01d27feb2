use sea_orm::entity::prelude::*;

/// Grants `user_id` access to a playlist they do not own.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "collaborations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub playlist_id: String,
    pub user_id: String,
}

impl ActiveModelBehavior for ActiveModel {}
