use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One row per (user, video); a re-watch does not move the entry.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "watch_history")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub video_id: Uuid,
    #[sea_orm(belongs_to, from = "video_id", to = "id")]
    pub video: HasOne<super::video::Entity>,

    pub watched_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
