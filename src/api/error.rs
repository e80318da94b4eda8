//! Error type returned by every handler.

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// A path-referenced record does not exist.
    #[error("{0}")]
    NotFound(&'static str),

    /// The body parsed but carries a value the store cannot accept.
    #[error("{0}")]
    Validation(String),

    /// The path id is not an integer.
    #[error(transparent)]
    BadPath(#[from] PathRejection),

    /// The route exists but not for this method.
    #[error("Método não permitido")]
    MethodNotAllowed,

    /// The body could not be read as the expected JSON shape.
    #[error(transparent)]
    Rejected(#[from] JsonRejection),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::BadPath(rejection) => rejection.status(),
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Rejected(rejection) => rejection.status(),
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::Internal(e) => {
                // Full detail stays in the log; clients get a generic message.
                tracing::error!("Internal error: {:#}", e);
                "Internal server error".to_string()
            }
            Self::BadPath(rejection) => {
                tracing::warn!("Rejected request path: {}", rejection.body_text());
                rejection.body_text()
            }
            Self::Rejected(rejection) => {
                tracing::warn!("Rejected request body: {}", rejection.body_text());
                rejection.body_text()
            }
            other => other.to_string(),
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
