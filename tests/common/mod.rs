// Not every test binary uses every fixture
#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;

use jotadb::db::{self, bootstrap};
use jotadb::models::{Client, InferenceClient};

/// Shared secret the spawned server is configured with.
pub const SECRET: &str = "test-platform-secret";

pub const CLIENT_A_KEY: &str = "test_client_key_a";
pub const CLIENT_B_KEY: &str = "test_client_key_b";
pub const RETIRED_CLIENT_KEY: &str = "test_client_key_retired";
pub const SERVICE_KEY: &str = "test_service_key";
pub const SERVICE_ID: &str = "TestService";

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub base_url: String,
    #[allow(dead_code)]
    child: Child,
}

pub struct TestContext {
    pub base_url: String,
    pub client_a: Client,
    pub client_b: Client,
    pub retired_client: Client,
    pub service: InferenceClient,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_jotadb"));
        cmd.env("JOTADB_PORT", port.to_string())
            .env("API_SECRET_KEY", SECRET)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;
        Ok(Self { base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK
                    || resp.status() == StatusCode::SERVICE_UNAVAILABLE
                {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!(
            "server did not become ready on {} within {:?}",
            self.base_url,
            timeout
        )
    }
}

/// Spin up the shared server and seed the principal fixtures. Returns None
/// (test should skip) when no DATABASE_URL is configured.
pub async fn setup() -> Result<Option<TestContext>> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(None);
    };

    // Seed through the library so fixtures exist before the first request
    let cfg = jotadb::config::DatabaseConfig {
        url,
        pool_size: 2,
        max_overflow: 2,
        pool_timeout_secs: 10,
        pool_recycle_secs: 3600,
        connect_retries: 2,
        connect_retry_delay_secs: 1,
    };
    let pool = db::build_pool(&cfg)?;
    db::init_db(&pool, &cfg).await?;

    let client_a = bootstrap::ensure_client(&pool, "Test Client A", CLIENT_A_KEY)
        .await?
        .record;
    let client_b = bootstrap::ensure_client(&pool, "Test Client B", CLIENT_B_KEY)
        .await?
        .record;
    let retired_client =
        bootstrap::ensure_client(&pool, "Retired Client", RETIRED_CLIENT_KEY)
            .await?
            .record;
    sqlx::query("UPDATE client SET is_active = FALSE WHERE client_key = $1")
        .bind(RETIRED_CLIENT_KEY)
        .execute(&pool)
        .await?;

    let service = bootstrap::ensure_service(&pool, SERVICE_ID, SERVICE_KEY, Some("admin"))
        .await?
        .record;

    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server"));
    server.wait_ready(Duration::from_secs(10)).await?;

    Ok(Some(TestContext {
        base_url: server.base_url.clone(),
        client_a,
        client_b,
        retired_client,
        service,
    }))
}

/// Request builder with the bearer gate satisfied.
pub fn authed(client: &reqwest::Client, method: reqwest::Method, url: String) -> reqwest::RequestBuilder {
    client.request(method, url).bearer_auth(SECRET)
}
