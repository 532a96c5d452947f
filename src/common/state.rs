// Application state shared across all modules

use sqlx::SqlitePool;
use std::sync::Arc;

use crate::services::GoogleService;

/// Application state containing database pool and services
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub google_service: Arc<GoogleService>,
}
