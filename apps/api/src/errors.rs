use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::profile::skills::SkillSetError;
use crate::session::SessionError;
use crate::summary::SummaryError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Every variant is reported to the caller; nothing here is retried.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized")]
    Unauthorized,

    /// The request collides with an existing record, e.g. a taken user name.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// An operation was invoked without the state it depends on.
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    /// The browser adapter could not be acquired, opened or navigated.
    #[error("Resource unavailable: {0}")]
    ResourceUnavailable(String),

    /// The summarization service failed.
    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Persistence error: {0}")]
    Persistence(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::ResourceUnavailable(e) => AppError::ResourceUnavailable(e.to_string()),
            SessionError::PreconditionFailed(msg) => AppError::PreconditionFailed(msg.to_string()),
        }
    }
}

impl From<SummaryError> for AppError {
    fn from(err: SummaryError) -> Self {
        AppError::ExternalService(err.to_string())
    }
}

impl From<SkillSetError> for AppError {
    fn from(err: SkillSetError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Invalid user name or password".to_string(),
            ),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::PreconditionFailed(msg) => (
                StatusCode::PRECONDITION_FAILED,
                "PRECONDITION_FAILED",
                msg.clone(),
            ),
            AppError::ResourceUnavailable(msg) => {
                tracing::warn!("Browser resource unavailable: {msg}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "RESOURCE_UNAVAILABLE",
                    "The job site could not be opened. Please retry the search.".to_string(),
                )
            }
            AppError::ExternalService(msg) => {
                tracing::error!("Summary service error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "EXTERNAL_SERVICE_ERROR",
                    "The text summarization service failed".to_string(),
                )
            }
            AppError::Persistence(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PERSISTENCE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
