use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;

use super::{as_i32, as_i64, as_string};
use crate::locking::Versioned;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: i64,
    pub title: String,
    /// pending, doing, done
    pub status: String,
    /// 1 (low) to 5 (critical)
    pub priority: i32,
    pub event_id: Option<i64>,
    /// When the task happens relative to its event: "before", "during", "after"
    pub timing_relative_to_event: Option<String>,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn apply_update(&mut self, data: &Map<String, Value>) {
        for (key, value) in data {
            match key.as_str() {
                "title" => {
                    if let Some(v) = as_string(value) {
                        self.title = v;
                    }
                }
                "status" => {
                    if let Some(v) = as_string(value) {
                        self.status = v;
                    }
                }
                "priority" => {
                    if let Some(v) = as_i32(value) {
                        self.priority = v;
                    }
                }
                "event_id" => {
                    if value.is_null() {
                        self.event_id = None;
                    } else if let Some(v) = as_i64(value) {
                        self.event_id = Some(v);
                    }
                }
                "timing_relative_to_event" => {
                    if value.is_null() {
                        self.timing_relative_to_event = None;
                    } else if let Some(v) = as_string(value) {
                        self.timing_relative_to_event = Some(v);
                    }
                }
                _ => {}
            }
        }
    }
}

impl Versioned for Task {
    fn version(&self) -> i32 {
        self.version
    }

    fn bump(&mut self) {
        self.version += 1;
        self.updated_at = Utc::now();
    }
}
