pub mod bootstrap;

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::DatabaseConfig;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("database connection failed after {0} attempts")]
    ConnectExhausted(u32),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Build the shared connection pool. Bounded at base + overflow connections,
/// liveness-checked before use, with an acquire timeout and periodic
/// recycling of long-lived connections.
pub fn build_pool(cfg: &DatabaseConfig) -> Result<PgPool, DbError> {
    let pool = PgPoolOptions::new()
        .min_connections(cfg.pool_size)
        .max_connections(cfg.max_connections())
        .acquire_timeout(Duration::from_secs(cfg.pool_timeout_secs))
        .max_lifetime(Duration::from_secs(cfg.pool_recycle_secs))
        .test_before_acquire(true)
        .connect_lazy(&cfg.url)?;
    Ok(pool)
}

/// Initialize the database: ping until reachable (bounded retry with a fixed
/// delay), then create tables idempotently. This is the only place in the
/// service where automatic retry occurs.
pub async fn init_db(pool: &PgPool, cfg: &DatabaseConfig) -> Result<(), DbError> {
    let mut attempts_left = cfg.connect_retries.max(1);

    loop {
        info!("connecting to database ({} attempts left)", attempts_left);
        match sqlx::query("SELECT 1").execute(pool).await {
            Ok(_) => break,
            Err(e) => {
                attempts_left -= 1;
                if attempts_left == 0 {
                    return Err(DbError::ConnectExhausted(cfg.connect_retries));
                }
                warn!(
                    "database not ready yet, retrying in {}s: {}",
                    cfg.connect_retry_delay_secs, e
                );
                tokio::time::sleep(Duration::from_secs(cfg.connect_retry_delay_secs)).await;
            }
        }
    }

    create_tables(pool).await?;
    info!("database connected and tables ready");
    Ok(())
}

/// Idempotent schema creation, mirroring the out-of-band migration set.
async fn create_tables(pool: &PgPool) -> Result<(), sqlx::Error> {
    let statements = [
        r#"CREATE TABLE IF NOT EXISTS client (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            name TEXT NOT NULL,
            client_key TEXT NOT NULL UNIQUE,
            is_active BOOLEAN NOT NULL DEFAULT TRUE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )"#,
        r#"CREATE TABLE IF NOT EXISTS inference_client (
            id TEXT PRIMARY KEY,
            api_key TEXT NOT NULL UNIQUE,
            is_active BOOLEAN NOT NULL DEFAULT TRUE,
            role TEXT,
            max_sessions INTEGER,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )"#,
        r#"CREATE TABLE IF NOT EXISTS event (
            id BIGSERIAL PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT,
            start_at TIMESTAMPTZ NOT NULL,
            end_at TIMESTAMPTZ,
            all_day BOOLEAN NOT NULL DEFAULT FALSE,
            location TEXT,
            version INTEGER NOT NULL DEFAULT 1,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )"#,
        r#"CREATE TABLE IF NOT EXISTS task (
            id BIGSERIAL PRIMARY KEY,
            title TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending',
            priority INTEGER NOT NULL DEFAULT 1,
            event_id BIGINT REFERENCES event(id),
            timing_relative_to_event TEXT,
            version INTEGER NOT NULL DEFAULT 1,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )"#,
        r#"CREATE TABLE IF NOT EXISTS reminder (
            id BIGSERIAL PRIMARY KEY,
            message TEXT NOT NULL,
            trigger_at TIMESTAMPTZ NOT NULL,
            is_completed BOOLEAN NOT NULL DEFAULT FALSE,
            task_id BIGINT REFERENCES task(id),
            event_id BIGINT REFERENCES event(id),
            version INTEGER NOT NULL DEFAULT 1,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )"#,
        r#"CREATE TABLE IF NOT EXISTS conversation (
            id BIGSERIAL PRIMARY KEY,
            client_id UUID NOT NULL REFERENCES client(id),
            title TEXT,
            status TEXT NOT NULL DEFAULT 'active',
            version INTEGER NOT NULL DEFAULT 1,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )"#,
        r#"CREATE TABLE IF NOT EXISTS message (
            id BIGSERIAL PRIMARY KEY,
            conversation_id BIGINT NOT NULL REFERENCES conversation(id),
            role TEXT NOT NULL,
            content TEXT NOT NULL,
            version INTEGER NOT NULL DEFAULT 1,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )"#,
    ];

    for stmt in statements {
        sqlx::query(stmt).execute(pool).await?;
    }
    Ok(())
}
