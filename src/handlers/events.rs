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
use crate::models::Event;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EventCreate {
    pub title: String,
    pub description: Option<String>,
    pub start_at: DateTime<Utc>,
    pub end_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub all_day: bool,
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EventListQuery {
    pub start_after: Option<DateTime<Utc>>,
    pub start_before: Option<DateTime<Utc>>,
    pub all_day: Option<bool>,
}

/// POST /events
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<EventCreate>,
) -> Result<(StatusCode, Json<Event>), ApiError> {
    let event = sqlx::query_as::<_, Event>(
        "INSERT INTO event (title, description, start_at, end_at, all_day, location) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
    )
    .bind(&body.title)
    .bind(&body.description)
    .bind(body.start_at)
    .bind(body.end_at)
    .bind(body.all_day)
    .bind(&body.location)
    .fetch_one(&state.pool)
    .await?;

    Ok((StatusCode::CREATED, Json(event)))
}

/// GET /events
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<EventListQuery>,
) -> Result<Json<Vec<Event>>, ApiError> {
    let mut qb = sqlx::QueryBuilder::<sqlx::Postgres>::new("SELECT * FROM event WHERE TRUE");
    if let Some(start_after) = query.start_after {
        qb.push(" AND start_at >= ").push_bind(start_after);
    }
    if let Some(start_before) = query.start_before {
        qb.push(" AND start_at <= ").push_bind(start_before);
    }
    if let Some(all_day) = query.all_day {
        qb.push(" AND all_day = ").push_bind(all_day);
    }
    qb.push(" ORDER BY start_at");

    let events = qb.build_query_as::<Event>().fetch_all(&state.pool).await?;
    Ok(Json(events))
}

/// GET /events/:id
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Event>, ApiError> {
    let event = fetch_event(&state, id).await?;
    Ok(Json(event))
}

/// PATCH /events/:id - partial update with optimistic locking
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(mut payload): Json<Map<String, Value>>,
) -> Result<Json<Event>, ApiError> {
    let mut event = fetch_event(&state, id).await?;

    locking::check_version(&event, &mut payload)?;

    let read_version = event.version;
    event.apply_update(&payload);
    event.bump();

    let result = sqlx::query(
        "UPDATE event SET title = $1, description = $2, start_at = $3, end_at = $4, \
         all_day = $5, location = $6, version = $7, updated_at = $8 \
         WHERE id = $9 AND version = $10",
    )
    .bind(&event.title)
    .bind(&event.description)
    .bind(event.start_at)
    .bind(event.end_at)
    .bind(event.all_day)
    .bind(&event.location)
    .bind(event.version)
    .bind(event.updated_at)
    .bind(event.id)
    .bind(read_version)
    .execute(&state.pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::ConcurrentUpdate);
    }

    Ok(Json(event))
}

/// DELETE /events/:id
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let result = sqlx::query("DELETE FROM event WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Event not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn fetch_event(state: &AppState, id: i64) -> Result<Event, ApiError> {
    sqlx::query_as::<_, Event>("SELECT * FROM event WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Event not found"))
}
