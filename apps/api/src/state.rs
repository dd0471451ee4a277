use sqlx::PgPool;

use crate::config::Config;
use crate::sync::SyncPipeline;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// GitHub → stats → goals pipeline, shared with the background loop.
    pub sync: SyncPipeline,
    pub config: Config,
}
