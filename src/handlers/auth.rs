//! Credential validation endpoints. These let collaborating processes check
//! a principal's standing without touching any domain data; the identity
//! resolver itself is exercised by the client-scoped chat routes.

use axum::{extract::State, http::HeaderMap, Json};

use crate::error::ApiError;
use crate::models::{Client, InferenceClient};
use crate::state::AppState;

use super::require_header;

/// GET /auth/internal - validate a service principal (id + key)
pub async fn auth_internal(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<InferenceClient>, ApiError> {
    let client_id = require_header(&headers, "x-client-id")?;
    let api_key = require_header(&headers, "x-api-key")?;

    let service = sqlx::query_as::<_, InferenceClient>(
        "SELECT * FROM inference_client WHERE id = $1",
    )
    .bind(client_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| ApiError::unauthorized("Client not found"))?;

    if service.api_key != api_key {
        return Err(ApiError::unauthorized("Invalid API Key"));
    }

    if !service.is_active {
        return Err(ApiError::not_authorized("Client is inactive"));
    }

    Ok(Json(service))
}

/// GET /auth/client - validate a direct client key
pub async fn auth_client(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Client>, ApiError> {
    let api_key = require_header(&headers, "x-api-key")?;

    let client = sqlx::query_as::<_, Client>("SELECT * FROM client WHERE client_key = $1")
        .bind(api_key)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Client not found"))?;

    if !client.is_active {
        return Err(ApiError::not_authorized("Client is inactive"));
    }

    Ok(Json(client))
}
