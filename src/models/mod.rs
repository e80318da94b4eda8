//! Domain models for the project board.
//!
//! # Hierarchy
//!
//! - [`Project`]: top-level record grouping features.
//! - [`Feature`]: owned by exactly one project, groups tasks.
//! - [`Task`]: leaf backlog item owned by exactly one feature.
//!
//! JSON keys keep the service's wire names (`nome`, `descricao`,
//! `resultados_financeiros`, `status`, `data`) while the Rust fields use
//! English names.
//!
//! # Partial updates
//!
//! The `Update*Input` types carry each field as `Option<Option<T>>`:
//! `None` when the key is absent (keep the stored value), `Some(None)` for an
//! explicit `null` and `Some(Some(v))` for a new value. See [`patch`].

mod feature;
pub mod patch;
mod project;
mod task;

pub use feature::*;
pub use project::*;
pub use task::*;

/// Timestamp format used for the `data` column and JSON field.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Current UTC time without offset, truncated to microseconds so that a value
/// read back from the store compares equal to the one written.
pub fn now_utc() -> chrono::NaiveDateTime {
    use chrono::{DurationRound, TimeDelta};

    let now = chrono::Utc::now().naive_utc();
    now.duration_trunc(TimeDelta::microseconds(1)).unwrap_or(now)
}

/// `{"message": ...}` body returned by update and delete endpoints.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
