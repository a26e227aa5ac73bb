//! Postgres-backed principal lookups for the identity resolver.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{Client, InferenceClient};

use super::PrincipalStore;

#[async_trait]
impl PrincipalStore for PgPool {
    async fn client_by_key(&self, key: &str) -> Result<Option<Client>, ApiError> {
        let client = sqlx::query_as::<_, Client>("SELECT * FROM client WHERE client_key = $1")
            .bind(key)
            .fetch_optional(self)
            .await?;
        Ok(client)
    }

    async fn client_by_id(&self, id: Uuid) -> Result<Option<Client>, ApiError> {
        let client = sqlx::query_as::<_, Client>("SELECT * FROM client WHERE id = $1")
            .bind(id)
            .fetch_optional(self)
            .await?;
        Ok(client)
    }

    async fn service_by_key(&self, key: &str) -> Result<Option<InferenceClient>, ApiError> {
        let service = sqlx::query_as::<_, InferenceClient>(
            "SELECT * FROM inference_client WHERE api_key = $1",
        )
        .bind(key)
        .fetch_optional(self)
        .await?;
        Ok(service)
    }
}
