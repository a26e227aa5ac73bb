pub mod client;
pub mod conversation;
pub mod event;
pub mod reminder;
pub mod task;

pub use client::{Client, InferenceClient};
pub use conversation::{Conversation, Message};
pub use event::Event;
pub use reminder::Reminder;
pub use task::Task;

use chrono::{DateTime, Utc};
use serde_json::Value;

// Coercion helpers for partial-update payloads. Each returns None when the
// JSON value is not of the expected shape; callers then leave the field
// untouched, matching the "unknown or unusable input is ignored" contract.

pub(crate) fn as_string(v: &Value) -> Option<String> {
    v.as_str().map(|s| s.to_string())
}

pub(crate) fn as_bool(v: &Value) -> Option<bool> {
    v.as_bool()
}

pub(crate) fn as_i32(v: &Value) -> Option<i32> {
    v.as_i64().and_then(|n| i32::try_from(n).ok())
}

pub(crate) fn as_i64(v: &Value) -> Option<i64> {
    v.as_i64()
}

pub(crate) fn as_datetime(v: &Value) -> Option<DateTime<Utc>> {
    v.as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}
