//! Optimistic locking for partial updates.
//!
//! Mutable entities carry a `version` counter starting at 1. An update
//! payload may include the current version; if it does and the value does
//! not match the stored one the update is rejected with a conflict carrying
//! both values. The check is opt-in: a payload without `version` updates
//! unconditionally. Either way the version is incremented by exactly 1 and
//! `updated_at` refreshed after field application.

use serde_json::{Map, Value};

use crate::error::ApiError;

/// Entities subject to optimistic concurrency control.
pub trait Versioned {
    fn version(&self) -> i32;

    /// Increment the version by 1 and refresh `updated_at`.
    fn bump(&mut self);
}

/// Validate the payload's `version` (if present) against the entity's stored
/// version, then strip it so callers cannot set the counter directly.
///
/// A `version` key holding anything other than the entity's current version
/// as an integer is a conflict; the supplied value is reported as -1 when it
/// is not an integer at all.
pub fn check_version<E: Versioned>(
    entity: &E,
    payload: &mut Map<String, Value>,
) -> Result<(), ApiError> {
    if let Some(value) = payload.get("version") {
        let supplied = value.as_i64().unwrap_or(-1);
        if supplied != i64::from(entity.version()) {
            return Err(ApiError::VersionConflict { expected: entity.version(), supplied });
        }
        payload.remove("version");
    }
    Ok(())
}
