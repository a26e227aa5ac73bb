pub mod auth;
pub mod chat;
pub mod events;
pub mod health;
pub mod reminders;
pub mod tasks;

use axum::http::HeaderMap;

use crate::error::ApiError;

/// Pull a required identity header off the request, rejecting absent or
/// non-UTF8 values.
pub(crate) fn require_header<'a>(
    headers: &'a HeaderMap,
    name: &str,
) -> Result<&'a str, ApiError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized(format!("Missing {} header", name)))
}

pub(crate) fn optional_header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
