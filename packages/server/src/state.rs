use std::sync::Arc;
use std::time::Duration;

use common::cache::ListCache;
use common::storage::UploadStore;
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub cache: Arc<dyn ListCache>,
    pub uploads: Arc<dyn UploadStore>,
    pub config: AppConfig,
}

impl AppState {
    /// Expiry applied to cached lists.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.config.cache.ttl_secs)
    }
}
