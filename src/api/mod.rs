mod error;
mod handlers;

pub use error::ApiError;
pub use handlers::WELCOME;

use anyhow::Result;
use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::db::Database;

/// Router with permissive CORS, used for local serving and tests.
pub fn create_router(db: Database) -> Router {
    router(db, CorsLayer::permissive())
}

/// Router whose CORS policy only admits the given origins.
pub fn create_router_with_origins(db: Database, origins: &[String]) -> Result<Router> {
    let origins = origins
        .iter()
        .map(|o| HeaderValue::from_str(o))
        .collect::<Result<Vec<_>, _>>()?;

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any);

    Ok(router(db, cors))
}

fn router(db: Database, cors: CorsLayer) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        // Projects
        .route(
            "/projects",
            get(handlers::list_projects).post(handlers::create_project),
        )
        .route(
            "/projects/{id}",
            get(handlers::get_project)
                .put(handlers::update_project)
                .delete(handlers::delete_project),
        )
        .route(
            "/projects/{id}/features",
            get(handlers::list_project_features).post(handlers::create_feature),
        )
        // Features
        .route(
            "/features/{id}",
            get(handlers::get_feature)
                .put(handlers::update_feature)
                .delete(handlers::delete_feature),
        )
        .route(
            "/features/{id}/tasks",
            get(handlers::list_feature_tasks).post(handlers::create_task),
        )
        // Tasks
        .route(
            "/tasks/{id}",
            get(handlers::get_task)
                .put(handlers::update_task)
                .delete(handlers::delete_task),
        )
        .fallback(handlers::unknown_route)
        .method_not_allowed_fallback(handlers::method_not_allowed)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(db)
}
