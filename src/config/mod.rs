use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),
}

/// Application configuration, loaded once at startup and handed to the
/// server as part of the shared state (no global singleton).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

/// Connection pool knobs. The pool is bounded at `pool_size + max_overflow`
/// connections, waits `pool_timeout_secs` before failing an acquisition, and
/// recycles connections older than `pool_recycle_secs`. Connections are
/// liveness-checked before use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: u32,
    pub max_overflow: u32,
    pub pool_timeout_secs: u64,
    pub pool_recycle_secs: u64,
    pub connect_retries: u32,
    pub connect_retry_delay_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Platform-wide shared secret for the bearer gate. When absent the gate
    /// rejects every protected request with a server-side fault.
    pub api_secret: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let url = env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        Ok(Self {
            server: ServerConfig {
                port: env_parse("JOTADB_PORT")
                    .or_else(|| env_parse("PORT"))
                    .unwrap_or(8000),
            },
            database: DatabaseConfig {
                url,
                pool_size: env_parse("DATABASE_POOL_SIZE").unwrap_or(10),
                max_overflow: env_parse("DATABASE_MAX_OVERFLOW").unwrap_or(20),
                pool_timeout_secs: env_parse("DATABASE_POOL_TIMEOUT").unwrap_or(30),
                pool_recycle_secs: env_parse("DATABASE_POOL_RECYCLE").unwrap_or(3600),
                connect_retries: env_parse("DATABASE_CONNECT_RETRIES").unwrap_or(5),
                connect_retry_delay_secs: env_parse("DATABASE_CONNECT_RETRY_DELAY").unwrap_or(3),
            },
            security: SecurityConfig {
                api_secret: env::var("API_SECRET_KEY").ok().filter(|s| !s.is_empty()),
            },
        })
    }
}

impl DatabaseConfig {
    /// Hard ceiling on concurrent connections: base pool plus overflow.
    pub fn max_connections(&self) -> u32 {
        self.pool_size + self.max_overflow
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_ceiling_is_base_plus_overflow() {
        let cfg = DatabaseConfig {
            url: "postgres://localhost/jotadb".into(),
            pool_size: 10,
            max_overflow: 20,
            pool_timeout_secs: 30,
            pool_recycle_secs: 3600,
            connect_retries: 5,
            connect_retry_delay_secs: 3,
        };
        assert_eq!(cfg.max_connections(), 30);
    }
}
