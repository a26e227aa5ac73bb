use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;

use super::{as_bool, as_datetime, as_i64, as_string};
use crate::locking::Versioned;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Reminder {
    pub id: i64,
    pub message: String,
    pub trigger_at: DateTime<Utc>,
    pub is_completed: bool,
    pub task_id: Option<i64>,
    pub event_id: Option<i64>,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reminder {
    pub fn apply_update(&mut self, data: &Map<String, Value>) {
        for (key, value) in data {
            match key.as_str() {
                "message" => {
                    if let Some(v) = as_string(value) {
                        self.message = v;
                    }
                }
                "trigger_at" => {
                    if let Some(v) = as_datetime(value) {
                        self.trigger_at = v;
                    }
                }
                "is_completed" => {
                    if let Some(v) = as_bool(value) {
                        self.is_completed = v;
                    }
                }
                "task_id" => {
                    if value.is_null() {
                        self.task_id = None;
                    } else if let Some(v) = as_i64(value) {
                        self.task_id = Some(v);
                    }
                }
                "event_id" => {
                    if value.is_null() {
                        self.event_id = None;
                    } else if let Some(v) = as_i64(value) {
                        self.event_id = Some(v);
                    }
                }
                _ => {}
            }
        }
    }
}

impl Versioned for Reminder {
    fn version(&self) -> i32 {
        self.version
    }

    fn bump(&mut self) {
        self.version += 1;
        self.updated_at = Utc::now();
    }
}
