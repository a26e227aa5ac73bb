use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::locking::{self, Versioned};
use crate::models::Task;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TaskCreate {
    pub title: String,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default = "default_priority")]
    pub priority: i32,
    pub event_id: Option<i64>,
    pub timing_relative_to_event: Option<String>,
}

fn default_status() -> String {
    "pending".to_string()
}

fn default_priority() -> i32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct TaskListQuery {
    pub status: Option<String>,
    pub priority: Option<i32>,
    pub event_id: Option<i64>,
}

/// POST /tasks
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<TaskCreate>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let task = sqlx::query_as::<_, Task>(
        "INSERT INTO task (title, status, priority, event_id, timing_relative_to_event) \
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(&body.title)
    .bind(&body.status)
    .bind(body.priority)
    .bind(body.event_id)
    .bind(&body.timing_relative_to_event)
    .fetch_one(&state.pool)
    .await?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// GET /tasks
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<TaskListQuery>,
) -> Result<Json<Vec<Task>>, ApiError> {
    let mut qb = sqlx::QueryBuilder::<sqlx::Postgres>::new("SELECT * FROM task WHERE TRUE");
    if let Some(status) = &query.status {
        qb.push(" AND status = ").push_bind(status);
    }
    if let Some(priority) = query.priority {
        qb.push(" AND priority = ").push_bind(priority);
    }
    if let Some(event_id) = query.event_id {
        qb.push(" AND event_id = ").push_bind(event_id);
    }
    qb.push(" ORDER BY id");

    let tasks = qb.build_query_as::<Task>().fetch_all(&state.pool).await?;
    Ok(Json(tasks))
}

/// GET /tasks/:id
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Task>, ApiError> {
    let task = fetch_task(&state, id).await?;
    Ok(Json(task))
}

/// PATCH /tasks/:id - partial update with optimistic locking
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(mut payload): Json<Map<String, Value>>,
) -> Result<Json<Task>, ApiError> {
    let mut task = fetch_task(&state, id).await?;

    locking::check_version(&task, &mut payload)?;

    let read_version = task.version;
    task.apply_update(&payload);
    task.bump();

    // Conditional write: a concurrent update that committed after our read
    // surfaces as zero affected rows instead of a silent overwrite.
    let result = sqlx::query(
        "UPDATE task SET title = $1, status = $2, priority = $3, event_id = $4, \
         timing_relative_to_event = $5, version = $6, updated_at = $7 \
         WHERE id = $8 AND version = $9",
    )
    .bind(&task.title)
    .bind(&task.status)
    .bind(task.priority)
    .bind(task.event_id)
    .bind(&task.timing_relative_to_event)
    .bind(task.version)
    .bind(task.updated_at)
    .bind(task.id)
    .bind(read_version)
    .execute(&state.pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::ConcurrentUpdate);
    }

    Ok(Json(task))
}

/// DELETE /tasks/:id
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let result = sqlx::query("DELETE FROM task WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Task not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn fetch_task(state: &AppState, id: i64) -> Result<Task, ApiError> {
    sqlx::query_as::<_, Task>("SELECT * FROM task WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Task not found"))
}
