use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// End-user-facing principal (e.g. a desktop app instance). Owns
/// conversations. Rows are provisioned out of band and deactivated rather
/// than deleted; `client_key` stays unique across inactive rows too.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Client {
    pub id: Uuid,
    pub name: String,
    pub client_key: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Trusted internal service (e.g. an orchestrator) permitted to act on
/// behalf of a Client. Never owns domain entities; only an authentication
/// intermediary. `role` and `max_sessions` are reserved fields, not yet
/// consulted by any enforced invariant.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InferenceClient {
    pub id: String,
    pub api_key: String,
    pub is_active: bool,
    pub role: Option<String>,
    pub max_sessions: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
