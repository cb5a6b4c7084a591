//! Shared, read-only request state.

use crate::{
    config::AppConfig,
    middleware::cors::AllowList,
    services::{
        media_repository::MediaRepository, session::SessionResolver,
        storage_adapter::MediaStorageAdapter,
    },
};
use sqlx::PgPool;
use std::sync::Arc;

/// Everything a handler may need. Built once at start-up; cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: Arc<PgPool>,
    pub allow_list: Arc<AllowList>,
    pub media: MediaRepository,
    pub adapter: MediaStorageAdapter,
    pub sessions: Arc<dyn SessionResolver>,
}

impl AppState {
    pub fn new(
        config: Arc<AppConfig>,
        db: Arc<PgPool>,
        adapter: MediaStorageAdapter,
        sessions: Arc<dyn SessionResolver>,
    ) -> Self {
        Self {
            allow_list: Arc::new(AllowList::new(config.allowed_origins.iter().cloned())),
            media: MediaRepository::new(db.clone()),
            config,
            db,
            adapter,
            sessions,
        }
    }
}
