use std::time::Duration;

use sea_orm::sea_query::{Index, PostgresQueryBuilder};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr};
use tracing::info;

use crate::entity::video;

pub async fn init_db(db_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(db_url.to_owned());

    // Set connection pool options
    opt.max_connections(50)
        .min_connections(2)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(60))
        .sqlx_logging(true);

    let db = Database::connect(opt).await?;
    db.get_schema_registry("server::entity::*")
        .sync(&db)
        .await?;

    Ok(db)
}

/// Ensure the composite indexes used by video listing exist.
///
/// Schema sync only creates the single-column unique indexes declared on the
/// entities, so these are created manually on startup.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    let indexes = [
        Index::create()
            .if_not_exists()
            .name("idx_video_published_created")
            .table(video::Entity)
            .col(video::Column::IsPublished)
            .col(video::Column::CreatedAt)
            .to_string(PostgresQueryBuilder),
        Index::create()
            .if_not_exists()
            .name("idx_video_owner_created")
            .table(video::Entity)
            .col(video::Column::OwnerId)
            .col(video::Column::CreatedAt)
            .to_string(PostgresQueryBuilder),
    ];

    for stmt in indexes {
        match db.execute_unprepared(&stmt).await {
            Ok(_) => info!("Ensured index: {}", stmt),
            Err(e) => tracing::warn!("Failed to create index ({}): {}", stmt, e),
        }
    }

    Ok(())
}
