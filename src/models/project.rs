use serde::{Deserialize, Serialize};

use super::feature::{CreateFeatureInput, Feature};
use super::patch;

/// A project containing features.
///
/// Projects are the top-level organizational unit. Deleting a project removes
/// its features and, through them, every task below it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "descricao")]
    pub description: Option<String>,
    /// Free-text financial results.
    #[serde(rename = "resultados_financeiros")]
    pub financial_results: Option<String>,
}

/// Input for creating a new project.
///
/// The optional `features` array (each with its own optional `tasks`) is
/// materialized together with the project in a single transaction.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProjectInput {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "descricao", default)]
    pub description: Option<String>,
    #[serde(rename = "resultados_financeiros", default)]
    pub financial_results: Option<String>,
    #[serde(default)]
    pub features: Vec<CreateFeatureInput>,
}

/// Input for updating an existing project. Absent keys keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProjectInput {
    #[serde(rename = "nome", default, deserialize_with = "patch::present")]
    pub name: Option<Option<String>>,
    #[serde(rename = "descricao", default, deserialize_with = "patch::present")]
    pub description: Option<Option<String>>,
    #[serde(rename = "resultados_financeiros", default, deserialize_with = "patch::present")]
    pub financial_results: Option<Option<String>>,
}

impl UpdateProjectInput {
    /// Reject explicit `null` for fields the store requires.
    pub fn validate(&self) -> Result<(), String> {
        if patch::is_null(&self.name) {
            return Err("nome não pode ser nulo".to_string());
        }
        Ok(())
    }
}

/// A project with its features, used for the detail response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectWithFeatures {
    #[serde(flatten)]
    pub project: Project,
    pub features: Vec<Feature>,
}

/// Response body for `POST /projects`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectCreated {
    pub message: String,
    pub project_id: i64,
}
