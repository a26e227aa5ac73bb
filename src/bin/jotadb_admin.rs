//! Administrative CLI for out-of-band provisioning: schema creation and
//! idempotent client/service registration.

use anyhow::Context;
use clap::{Parser, Subcommand};

use jotadb::config::AppConfig;
use jotadb::db::{self, bootstrap};

#[derive(Parser)]
#[command(name = "jotadb-admin")]
#[command(about = "JotaDB administration - schema and principal provisioning")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Connect to the database and create tables")]
    InitDb,

    #[command(about = "Register a client principal (no-op if the key exists)")]
    AddClient {
        #[arg(help = "Display name of the client")]
        name: String,
        #[arg(help = "Unique API key for the client")]
        key: String,
    },

    #[command(about = "Register a service principal (no-op if the key exists)")]
    AddService {
        #[arg(help = "Service identifier")]
        id: String,
        #[arg(help = "Unique API key for the service")]
        key: String,
        #[arg(long, help = "Optional role label")]
        role: Option<String>,
    },

    #[command(about = "Create the standard test fixtures")]
    Seed,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jotadb=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env().context("loading configuration")?;
    let pool = db::build_pool(&config.database).context("building connection pool")?;
    db::init_db(&pool, &config.database)
        .await
        .context("initializing database")?;

    match cli.command {
        Commands::InitDb => {
            // init_db above already created the tables
            println!("database initialized");
        }
        Commands::AddClient { name, key } => {
            let result = bootstrap::ensure_client(&pool, &name, &key).await?;
            if result.created {
                println!(
                    "client '{}' added with key '{}' (id: {})",
                    result.record.name, result.record.client_key, result.record.id
                );
            } else {
                println!(
                    "client with key '{}' already exists (name: {})",
                    key, result.record.name
                );
            }
        }
        Commands::AddService { id, key, role } => {
            let result = bootstrap::ensure_service(&pool, &id, &key, role.as_deref()).await?;
            if result.created {
                println!("service '{}' added", result.record.id);
            } else {
                println!("service with key '{}' already exists (id: {})", key, result.record.id);
            }
        }
        Commands::Seed => {
            let client =
                bootstrap::ensure_client(&pool, "Test Client", "test_client_key").await?;
            println!(
                "test client {} (id: {})",
                if client.created { "created" } else { "already present" },
                client.record.id
            );

            let service = bootstrap::ensure_service(
                &pool,
                "TestService",
                "test_service_key",
                Some("admin"),
            )
            .await?;
            println!(
                "test service {} (id: {})",
                if service.created { "created" } else { "already present" },
                service.record.id
            );
        }
    }

    Ok(())
}
