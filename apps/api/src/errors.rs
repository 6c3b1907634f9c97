use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::assessment::scoring::ScoringError;
use crate::assessment::session::SessionError;
use crate::persistence::PersistenceError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unprocessable entity: {0}")]
    UnprocessableEntity(String),

    #[error("Invalid role: {0}")]
    InvalidRole(String),

    #[error("Data integrity error: {0}")]
    DataIntegrity(String),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}

impl From<ScoringError> for AppError {
    fn from(err: ScoringError) -> Self {
        match err {
            ScoringError::InvalidRole(_) => AppError::InvalidRole(err.to_string()),
            ScoringError::DataIntegrity(msg) => AppError::DataIntegrity(msg),
        }
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Scoring(e) => e.into(),
            SessionError::NotAnswering(_) | SessionError::BatchOutOfRange(..) => {
                AppError::Validation(err.to_string())
            }
            SessionError::IncompleteBatch(_) => AppError::UnprocessableEntity(err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::UnprocessableEntity(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNPROCESSABLE_ENTITY",
                msg.clone(),
            ),
            AppError::InvalidRole(msg) => (StatusCode::NOT_FOUND, "INVALID_ROLE", msg.clone()),
            AppError::DataIntegrity(msg) => {
                tracing::error!("Data integrity error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATA_INTEGRITY",
                    "Question data is inconsistent".to_string(),
                )
            }
            AppError::Persistence(e) => {
                tracing::error!("Persistence error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PERSISTENCE_ERROR",
                    "A storage error occurred".to_string(),
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
