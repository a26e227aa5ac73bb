use anyhow::Context;

use jotadb::config::AppConfig;
use jotadb::db;
use jotadb::router;
use jotadb::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, API_SECRET_KEY, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jotadb=info,tower_http=info".into()),
        )
        .init();

    let config = AppConfig::from_env().context("loading configuration")?;

    if config.security.api_secret.is_none() {
        tracing::warn!("API_SECRET_KEY is not set; all protected routes will fail");
    }

    let pool = db::build_pool(&config.database).context("building connection pool")?;
    db::init_db(&pool, &config.database)
        .await
        .context("initializing database")?;

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("JotaDB listening on http://{}", bind_addr);

    let app = router::app(AppState::new(pool, config));
    axum::serve(listener, app).await.context("server")?;

    Ok(())
}
