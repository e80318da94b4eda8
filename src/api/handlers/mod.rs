use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use super::error::ApiError;
use crate::db::Database;
use crate::models::*;

type ApiResult<T> = Result<T, ApiError>;

pub const WELCOME: &str = "Bem-vindo à Plataforma de Gerenciamento de Projetos!";

const PROJECT_NOT_FOUND: &str = "Projeto não encontrado";
const FEATURE_NOT_FOUND: &str = "Feature não encontrada";
const TASK_NOT_FOUND: &str = "Task não encontrada";

// Bodies arrive as `Result<Json<_>, JsonRejection>` so the path entity can be
// checked first: a missing record is a 404 even when the body is malformed.
// Ids arrive as `Result<Path<_>, PathRejection>` so a bad id keeps the JSON
// error body.

// ============================================================
// Health
// ============================================================

pub async fn index() -> &'static str {
    WELCOME
}

pub async fn unknown_route() -> ApiError {
    ApiError::NotFound("Rota não encontrada")
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Projects
// ============================================================

pub async fn list_projects(State(db): State<Database>) -> ApiResult<Json<Vec<Project>>> {
    Ok(Json(db.get_all_projects()?))
}

pub async fn create_project(
    State(db): State<Database>,
    payload: Result<Json<CreateProjectInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ProjectCreated>)> {
    let Json(input) = payload?;
    let project = db.create_project(input)?;

    Ok((
        StatusCode::CREATED,
        Json(ProjectCreated {
            message: "Projeto criado".to_string(),
            project_id: project.id,
        }),
    ))
}

pub async fn get_project(
    State(db): State<Database>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<ProjectWithFeatures>> {
    let Path(id) = id?;
    db.get_project_with_features(id)?
        .map(Json)
        .ok_or(ApiError::NotFound(PROJECT_NOT_FOUND))
}

pub async fn update_project(
    State(db): State<Database>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateProjectInput>, JsonRejection>,
) -> ApiResult<Json<Message>> {
    let Path(id) = id?;
    require_project(&db, id)?;
    let Json(input) = payload?;
    input.validate().map_err(ApiError::Validation)?;

    db.update_project(id, input)?
        .ok_or(ApiError::NotFound(PROJECT_NOT_FOUND))?;
    Ok(Json(Message::new("Projeto atualizado")))
}

pub async fn delete_project(
    State(db): State<Database>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Message>> {
    let Path(id) = id?;
    if db.delete_project(id)? {
        Ok(Json(Message::new("Projeto deletado")))
    } else {
        Err(ApiError::NotFound(PROJECT_NOT_FOUND))
    }
}

// ============================================================
// Features
// ============================================================

pub async fn list_project_features(
    State(db): State<Database>,
    project_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Vec<Feature>>> {
    let Path(project_id) = project_id?;
    require_project(&db, project_id)?;
    Ok(Json(db.get_features_by_project(project_id)?))
}

pub async fn create_feature(
    State(db): State<Database>,
    project_id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<CreateFeatureInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<FeatureCreated>)> {
    let Path(project_id) = project_id?;
    require_project(&db, project_id)?;
    let Json(input) = payload?;

    let feature = db
        .create_feature(project_id, input)?
        .ok_or(ApiError::NotFound(PROJECT_NOT_FOUND))?;

    Ok((
        StatusCode::CREATED,
        Json(FeatureCreated {
            message: "Feature criada".to_string(),
            feature_id: feature.id,
        }),
    ))
}

pub async fn get_feature(
    State(db): State<Database>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<FeatureWithTasks>> {
    let Path(id) = id?;
    db.get_feature_with_tasks(id)?
        .map(Json)
        .ok_or(ApiError::NotFound(FEATURE_NOT_FOUND))
}

pub async fn update_feature(
    State(db): State<Database>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateFeatureInput>, JsonRejection>,
) -> ApiResult<Json<Message>> {
    let Path(id) = id?;
    require_feature(&db, id)?;
    let Json(input) = payload?;
    input.validate().map_err(ApiError::Validation)?;

    db.update_feature(id, input)?
        .ok_or(ApiError::NotFound(FEATURE_NOT_FOUND))?;
    Ok(Json(Message::new("Feature atualizada")))
}

pub async fn delete_feature(
    State(db): State<Database>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Message>> {
    let Path(id) = id?;
    if db.delete_feature(id)? {
        Ok(Json(Message::new("Feature deletada")))
    } else {
        Err(ApiError::NotFound(FEATURE_NOT_FOUND))
    }
}

// ============================================================
// Tasks
// ============================================================

pub async fn list_feature_tasks(
    State(db): State<Database>,
    feature_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Vec<Task>>> {
    let Path(feature_id) = feature_id?;
    require_feature(&db, feature_id)?;
    Ok(Json(db.get_tasks_by_feature(feature_id)?))
}

pub async fn create_task(
    State(db): State<Database>,
    feature_id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<CreateTaskInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<TaskCreated>)> {
    let Path(feature_id) = feature_id?;
    require_feature(&db, feature_id)?;
    let Json(input) = payload?;

    let task = db
        .create_task(feature_id, input)?
        .ok_or(ApiError::NotFound(FEATURE_NOT_FOUND))?;

    Ok((
        StatusCode::CREATED,
        Json(TaskCreated {
            message: "Task criada".to_string(),
            task_id: task.id,
        }),
    ))
}

pub async fn get_task(
    State(db): State<Database>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Task>> {
    let Path(id) = id?;
    db.get_task(id)?
        .map(Json)
        .ok_or(ApiError::NotFound(TASK_NOT_FOUND))
}

pub async fn update_task(
    State(db): State<Database>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateTaskInput>, JsonRejection>,
) -> ApiResult<Json<Message>> {
    let Path(id) = id?;
    require_task(&db, id)?;
    let Json(input) = payload?;
    input.validate().map_err(ApiError::Validation)?;

    db.update_task(id, input)?
        .ok_or(ApiError::NotFound(TASK_NOT_FOUND))?;
    Ok(Json(Message::new("Task atualizada")))
}

pub async fn delete_task(
    State(db): State<Database>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Message>> {
    let Path(id) = id?;
    if db.delete_task(id)? {
        Ok(Json(Message::new("Task deletada")))
    } else {
        Err(ApiError::NotFound(TASK_NOT_FOUND))
    }
}

// ============================================================
// Existence checks
// ============================================================

fn require_project(db: &Database, id: i64) -> ApiResult<()> {
    db.get_project(id)?
        .map(|_| ())
        .ok_or(ApiError::NotFound(PROJECT_NOT_FOUND))
}

fn require_feature(db: &Database, id: i64) -> ApiResult<()> {
    db.get_feature(id)?
        .map(|_| ())
        .ok_or(ApiError::NotFound(FEATURE_NOT_FOUND))
}

fn require_task(db: &Database, id: i64) -> ApiResult<()> {
    db.get_task(id)?
        .map(|_| ())
        .ok_or(ApiError::NotFound(TASK_NOT_FOUND))
}
