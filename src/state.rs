use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AppConfig;

/// Shared per-process resources, constructed once in main and injected into
/// every handler. The pool is the only shared mutable resource; its lifecycle
/// is tied to process start/stop.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(pool: PgPool, config: AppConfig) -> Self {
        Self { pool, config: Arc::new(config) }
    }
}
