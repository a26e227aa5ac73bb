//! Conversation log endpoints. These are the client-scoped routes: every
//! request is attributed to exactly one Client via the identity resolver,
//! and conversations may only be touched by their owner.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::Utc;
use serde::Deserialize;

use crate::auth::resolve_client;
use crate::error::ApiError;
use crate::models::{Client, Conversation, Message};
use crate::state::AppState;

use super::{optional_header, require_header};

const DEFAULT_LIST_LIMIT: i64 = 50;
const MAX_LIST_LIMIT: i64 = 200;

#[derive(Debug, Deserialize)]
pub struct ConversationCreate {
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ConversationListQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct MessageListQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct MessageCreate {
    pub role: String,
    pub content: String,
}

/// POST /chat/conversation - create a conversation owned by the acting client
pub async fn create_conversation(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<ConversationCreate>,
) -> Result<(StatusCode, Json<Conversation>), ApiError> {
    let client = acting_client(&state, &headers).await?;

    let conversation = sqlx::query_as::<_, Conversation>(
        "INSERT INTO conversation (client_id, title) VALUES ($1, $2) RETURNING *",
    )
    .bind(client.id)
    .bind(&body.title)
    .fetch_one(&state.pool)
    .await?;

    Ok((StatusCode::CREATED, Json(conversation)))
}

/// GET /chat/conversations - list owned conversations, most recent activity first
pub async fn list_conversations(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ConversationListQuery>,
) -> Result<Json<Vec<Conversation>>, ApiError> {
    let client = acting_client(&state, &headers).await?;
    let limit = clamp_limit(query.limit);

    let mut qb = sqlx::QueryBuilder::<sqlx::Postgres>::new("SELECT * FROM conversation WHERE client_id = ");
    qb.push_bind(client.id);
    if let Some(status) = &query.status {
        qb.push(" AND status = ").push_bind(status);
    }
    qb.push(" ORDER BY updated_at DESC LIMIT ").push_bind(limit);

    let conversations = qb
        .build_query_as::<Conversation>()
        .fetch_all(&state.pool)
        .await?;
    Ok(Json(conversations))
}

/// GET /chat/:id/messages - chronological history of an owned conversation
pub async fn list_messages(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(conversation_id): Path<i64>,
    Query(query): Query<MessageListQuery>,
) -> Result<Json<Vec<Message>>, ApiError> {
    let client = acting_client(&state, &headers).await?;
    owned_conversation(&state, conversation_id, &client).await?;

    let mut qb = sqlx::QueryBuilder::<sqlx::Postgres>::new("SELECT * FROM message WHERE conversation_id = ");
    qb.push_bind(conversation_id);
    qb.push(" ORDER BY created_at, id");
    if let Some(limit) = query.limit {
        qb.push(" LIMIT ").push_bind(limit.max(0));
    }

    let messages = qb.build_query_as::<Message>().fetch_all(&state.pool).await?;
    Ok(Json(messages))
}

/// POST /chat/:id/messages - append a message, advancing the conversation's
/// last-activity timestamp in the same transaction
pub async fn create_message(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(conversation_id): Path<i64>,
    Json(body): Json<MessageCreate>,
) -> Result<(StatusCode, Json<Message>), ApiError> {
    let client = acting_client(&state, &headers).await?;
    owned_conversation(&state, conversation_id, &client).await?;

    let mut tx = state.pool.begin().await?;

    let message = sqlx::query_as::<_, Message>(
        "INSERT INTO message (conversation_id, role, content) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(conversation_id)
    .bind(&body.role)
    .bind(&body.content)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("UPDATE conversation SET updated_at = $1 WHERE id = $2")
        .bind(Utc::now())
        .bind(conversation_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(message)))
}

/// Run the identity resolver over the request's identity headers.
async fn acting_client(state: &AppState, headers: &HeaderMap) -> Result<Client, ApiError> {
    let api_key = require_header(headers, "x-api-key")?;
    let client_id = optional_header(headers, "x-client-id");
    resolve_client(&state.pool, api_key, client_id).await
}

/// Fetch a conversation and enforce ownership. Existence is checked first so
/// a missing conversation is always 404 and a foreign one always 403.
async fn owned_conversation(
    state: &AppState,
    id: i64,
    client: &Client,
) -> Result<Conversation, ApiError> {
    let conversation =
        sqlx::query_as::<_, Conversation>("SELECT * FROM conversation WHERE id = $1")
            .bind(id)
            .fetch_optional(&state.pool)
            .await?
            .ok_or_else(|| ApiError::not_found("Conversation not found"))?;

    if conversation.client_id != client.id {
        return Err(ApiError::not_authorized(
            "Not authorized to access this conversation",
        ));
    }

    Ok(conversation)
}

fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT)
}
