use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::patch;

/// Status stored when a task is created without one.
pub const DEFAULT_TASK_STATUS: &str = "pending";

/// A backlog item owned by exactly one feature.
///
/// `status` is free text: the board stores whatever the client sends and
/// never transitions it on its own. `modified_at` (`data` on the wire) is set
/// on creation and refreshed on every update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub feature_id: i64,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "descricao")]
    pub description: Option<String>,
    pub status: String,
    #[serde(rename = "data")]
    pub modified_at: NaiveDateTime,
}

/// Input for creating a new task.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTaskInput {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "descricao", default)]
    pub description: Option<String>,
    /// Defaults to [`DEFAULT_TASK_STATUS`] when absent or `null`.
    #[serde(default)]
    pub status: Option<String>,
}

/// Input for updating a task. Absent keys keep their value; the timestamp is
/// refreshed regardless.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTaskInput {
    #[serde(rename = "nome", default, deserialize_with = "patch::present")]
    pub name: Option<Option<String>>,
    #[serde(rename = "descricao", default, deserialize_with = "patch::present")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch::present")]
    pub status: Option<Option<String>>,
}

impl UpdateTaskInput {
    pub fn validate(&self) -> Result<(), String> {
        if patch::is_null(&self.name) {
            return Err("nome não pode ser nulo".to_string());
        }
        if patch::is_null(&self.status) {
            return Err("status não pode ser nulo".to_string());
        }
        Ok(())
    }
}

/// Response body for `POST /features/{id}/tasks`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskCreated {
    pub message: String,
    pub task_id: i64,
}
