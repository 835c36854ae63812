use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;

/// Coarse error class carried in agent and task envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    UnknownAction,
    AgentNotFound,
    NotFound,
    DependencyUnavailable,
    Aggregation,
    Internal,
}

impl ErrorKind {
    /// Errors caused by the request itself rather than by this service or
    /// its upstreams.
    pub fn is_caller_error(self) -> bool {
        matches!(
            self,
            ErrorKind::Validation | ErrorKind::UnknownAction | ErrorKind::NotFound
        )
    }
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unknown action '{action}' for agent '{agent}'")]
    UnknownAction { agent: String, action: String },

    #[error("Agent '{0}' is not registered")]
    AgentNotFound(String),

    #[error("Agent '{0}' is already registered")]
    DuplicateAgent(String),

    #[error("Dependency unavailable: {0}")]
    DependencyUnavailable(String),

    #[error("Aggregation error in subtask '{subtask_id}': {message}")]
    Aggregation { subtask_id: String, message: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::Validation(_) | AppError::DuplicateAgent(_) => ErrorKind::Validation,
            AppError::UnknownAction { .. } => ErrorKind::UnknownAction,
            AppError::AgentNotFound(_) => ErrorKind::AgentNotFound,
            AppError::DependencyUnavailable(_) | AppError::Database(_) | AppError::Llm(_) => {
                ErrorKind::DependencyUnavailable
            }
            AppError::Aggregation { .. } => ErrorKind::Aggregation,
            AppError::Internal(_) => ErrorKind::Internal,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::UnknownAction { .. } => {
                (StatusCode::BAD_REQUEST, "UNKNOWN_ACTION", self.to_string())
            }
            AppError::AgentNotFound(_) => {
                (StatusCode::NOT_FOUND, "AGENT_NOT_FOUND", self.to_string())
            }
            AppError::DuplicateAgent(_) => {
                (StatusCode::CONFLICT, "DUPLICATE_AGENT", self.to_string())
            }
            AppError::DependencyUnavailable(msg) => {
                tracing::error!("Dependency unavailable: {msg}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "DEPENDENCY_UNAVAILABLE",
                    "A required dependency is unavailable".to_string(),
                )
            }
            AppError::Aggregation { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "AGGREGATION_ERROR",
                self.to_string(),
            ),
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Llm(e) => {
                tracing::error!("LLM error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "LLM_ERROR",
                    "An AI processing error occurred".to_string(),
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
                "kind": self.kind(),
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
