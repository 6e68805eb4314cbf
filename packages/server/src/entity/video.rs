use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "video")]
pub struct Model {
    /// UUIDv7 primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub video_file_url: String,
    pub video_file_storage_id: String,
    pub thumbnail_url: String,
    pub thumbnail_storage_id: String,

    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    /// Seconds, as reported by the media host.
    pub duration: f64,
    pub views: i64,
    pub is_published: bool,

    pub owner_id: Uuid,
    #[sea_orm(belongs_to, from = "owner_id", to = "id")]
    pub owner: HasOne<super::user::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
