use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;

use super::{as_bool, as_datetime, as_string};
use crate::locking::Versioned;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub start_at: DateTime<Utc>,
    /// None means the end is indeterminate
    pub end_at: Option<DateTime<Utc>>,
    pub all_day: bool,
    pub location: Option<String>,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Overwrite known mutable fields from a partial-update payload.
    /// Unknown keys are silently ignored; `id` and `created_at` are never
    /// overwritten; null clears nullable fields.
    pub fn apply_update(&mut self, data: &Map<String, Value>) {
        for (key, value) in data {
            match key.as_str() {
                "title" => {
                    if let Some(v) = as_string(value) {
                        self.title = v;
                    }
                }
                "description" => {
                    if value.is_null() {
                        self.description = None;
                    } else if let Some(v) = as_string(value) {
                        self.description = Some(v);
                    }
                }
                "start_at" => {
                    if let Some(v) = as_datetime(value) {
                        self.start_at = v;
                    }
                }
                "end_at" => {
                    if value.is_null() {
                        self.end_at = None;
                    } else if let Some(v) = as_datetime(value) {
                        self.end_at = Some(v);
                    }
                }
                "all_day" => {
                    if let Some(v) = as_bool(value) {
                        self.all_day = v;
                    }
                }
                "location" => {
                    if value.is_null() {
                        self.location = None;
                    } else if let Some(v) = as_string(value) {
                        self.location = Some(v);
                    }
                }
                _ => {}
            }
        }
    }
}

impl Versioned for Event {
    fn version(&self) -> i32 {
        self.version
    }

    fn bump(&mut self) {
        self.version += 1;
        self.updated_at = Utc::now();
    }
}
