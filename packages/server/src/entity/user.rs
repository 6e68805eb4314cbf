use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    /// UUIDv7 primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Always stored lowercase.
    #[sea_orm(unique)]
    pub username: String,
    /// Always stored trimmed and lowercase.
    #[sea_orm(unique)]
    pub email: String,
    pub full_name: String,

    /// Argon2 PHC string. Never leaves the server.
    pub password: String,

    pub avatar_url: String,
    pub avatar_storage_id: String,
    pub cover_image_url: Option<String>,
    pub cover_image_storage_id: Option<String>,

    /// The single active refresh token; `None` when logged out.
    pub refresh_token: Option<String>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
