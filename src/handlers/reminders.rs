use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::locking::{self, Versioned};
use crate::models::Reminder;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ReminderCreate {
    pub message: String,
    pub trigger_at: DateTime<Utc>,
    #[serde(default)]
    pub is_completed: bool,
    pub task_id: Option<i64>,
    pub event_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ReminderListQuery {
    pub is_completed: Option<bool>,
    pub task_id: Option<i64>,
    pub event_id: Option<i64>,
    pub trigger_after: Option<DateTime<Utc>>,
    pub trigger_before: Option<DateTime<Utc>>,
}

/// POST /reminders
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<ReminderCreate>,
) -> Result<(StatusCode, Json<Reminder>), ApiError> {
    let reminder = sqlx::query_as::<_, Reminder>(
        "INSERT INTO reminder (message, trigger_at, is_completed, task_id, event_id) \
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(&body.message)
    .bind(body.trigger_at)
    .bind(body.is_completed)
    .bind(body.task_id)
    .bind(body.event_id)
    .fetch_one(&state.pool)
    .await?;

    Ok((StatusCode::CREATED, Json(reminder)))
}

/// GET /reminders
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ReminderListQuery>,
) -> Result<Json<Vec<Reminder>>, ApiError> {
    let mut qb = sqlx::QueryBuilder::<sqlx::Postgres>::new("SELECT * FROM reminder WHERE TRUE");
    if let Some(is_completed) = query.is_completed {
        qb.push(" AND is_completed = ").push_bind(is_completed);
    }
    if let Some(task_id) = query.task_id {
        qb.push(" AND task_id = ").push_bind(task_id);
    }
    if let Some(event_id) = query.event_id {
        qb.push(" AND event_id = ").push_bind(event_id);
    }
    if let Some(trigger_after) = query.trigger_after {
        qb.push(" AND trigger_at >= ").push_bind(trigger_after);
    }
    if let Some(trigger_before) = query.trigger_before {
        qb.push(" AND trigger_at <= ").push_bind(trigger_before);
    }
    qb.push(" ORDER BY trigger_at");

    let reminders = qb.build_query_as::<Reminder>().fetch_all(&state.pool).await?;
    Ok(Json(reminders))
}

/// GET /reminders/:id
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Reminder>, ApiError> {
    let reminder = fetch_reminder(&state, id).await?;
    Ok(Json(reminder))
}

/// PATCH /reminders/:id - partial update with optimistic locking
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(mut payload): Json<Map<String, Value>>,
) -> Result<Json<Reminder>, ApiError> {
    let mut reminder = fetch_reminder(&state, id).await?;

    locking::check_version(&reminder, &mut payload)?;

    let read_version = reminder.version;
    reminder.apply_update(&payload);
    reminder.bump();

    let result = sqlx::query(
        "UPDATE reminder SET message = $1, trigger_at = $2, is_completed = $3, \
         task_id = $4, event_id = $5, version = $6, updated_at = $7 \
         WHERE id = $8 AND version = $9",
    )
    .bind(&reminder.message)
    .bind(reminder.trigger_at)
    .bind(reminder.is_completed)
    .bind(reminder.task_id)
    .bind(reminder.event_id)
    .bind(reminder.version)
    .bind(reminder.updated_at)
    .bind(reminder.id)
    .bind(read_version)
    .execute(&state.pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::ConcurrentUpdate);
    }

    Ok(Json(reminder))
}

/// DELETE /reminders/:id
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let result = sqlx::query("DELETE FROM reminder WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Reminder not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn fetch_reminder(state: &AppState, id: i64) -> Result<Reminder, ApiError> {
    sqlx::query_as::<_, Reminder>("SELECT * FROM reminder WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Reminder not found"))
}
