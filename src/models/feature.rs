use serde::{Deserialize, Serialize};

use super::patch;
use super::task::{CreateTaskInput, Task};

/// A mid-level record grouping tasks, owned by exactly one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub id: i64,
    #[serde(rename = "projeto_id")]
    pub project_id: i64,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "descricao")]
    pub description: Option<String>,
}

/// Input for creating a new feature, either on its own or embedded in a
/// project creation request.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateFeatureInput {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "descricao", default)]
    pub description: Option<String>,
    /// Backlog created together with the feature.
    #[serde(default)]
    pub tasks: Vec<CreateTaskInput>,
}

/// Input for updating an existing feature. Absent keys keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateFeatureInput {
    #[serde(rename = "nome", default, deserialize_with = "patch::present")]
    pub name: Option<Option<String>>,
    #[serde(rename = "descricao", default, deserialize_with = "patch::present")]
    pub description: Option<Option<String>>,
}

impl UpdateFeatureInput {
    pub fn validate(&self) -> Result<(), String> {
        if patch::is_null(&self.name) {
            return Err("nome não pode ser nulo".to_string());
        }
        Ok(())
    }
}

/// A feature with its tasks, used for the detail response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureWithTasks {
    #[serde(flatten)]
    pub feature: Feature,
    pub tasks: Vec<Task>,
}

/// Response body for `POST /projects/{id}/features`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureCreated {
    pub message: String,
    pub feature_id: i64,
}
