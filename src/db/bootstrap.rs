//! Idempotent provisioning of principals. Clients and services are created
//! out of band (admin CLI), never through the HTTP surface, and are
//! deactivated rather than deleted.

use sqlx::PgPool;
use tracing::info;

use crate::models::{Client, InferenceClient};

/// Outcome of an ensure call: the row, and whether it was just created.
pub struct Provisioned<T> {
    pub record: T,
    pub created: bool,
}

/// Insert a client unless one with this key already exists.
pub async fn ensure_client(
    pool: &PgPool,
    name: &str,
    key: &str,
) -> Result<Provisioned<Client>, sqlx::Error> {
    if let Some(existing) =
        sqlx::query_as::<_, Client>("SELECT * FROM client WHERE client_key = $1")
            .bind(key)
            .fetch_optional(pool)
            .await?
    {
        return Ok(Provisioned { record: existing, created: false });
    }

    let client = sqlx::query_as::<_, Client>(
        "INSERT INTO client (name, client_key) VALUES ($1, $2) RETURNING *",
    )
    .bind(name)
    .bind(key)
    .fetch_one(pool)
    .await?;

    info!("provisioned client '{}' ({})", client.name, client.id);
    Ok(Provisioned { record: client, created: true })
}

/// Insert a service unless one with this key already exists.
pub async fn ensure_service(
    pool: &PgPool,
    id: &str,
    key: &str,
    role: Option<&str>,
) -> Result<Provisioned<InferenceClient>, sqlx::Error> {
    if let Some(existing) = sqlx::query_as::<_, InferenceClient>(
        "SELECT * FROM inference_client WHERE api_key = $1",
    )
    .bind(key)
    .fetch_optional(pool)
    .await?
    {
        return Ok(Provisioned { record: existing, created: false });
    }

    let service = sqlx::query_as::<_, InferenceClient>(
        "INSERT INTO inference_client (id, api_key, role) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(id)
    .bind(key)
    .bind(role)
    .fetch_one(pool)
    .await?;

    info!("provisioned service '{}'", service.id);
    Ok(Provisioned { record: service, created: true })
}
