use std::sync::Arc;

use common::MediaRelay;
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub media: Arc<dyn MediaRelay>,
    pub config: AppConfig,
}
