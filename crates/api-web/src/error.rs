//! Error types for the HTTP surface.
//!
//! Every orchestrator failure maps onto one taxonomy entry here; nothing
//! propagates to a caller as an unhandled error.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use orchestrator::OrchestratorError;
use thiserror::Error;

/// Errors surfaced to API callers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No authenticated user on the request.
    #[error("unauthenticated")]
    Unauthenticated,

    /// Input is missing required fields or is otherwise malformed.
    #[error("{0}")]
    Validation(String),

    /// The user's balance does not cover the generation price.
    #[error("not enough coins, top up to generate videos")]
    InsufficientBalance,

    /// Requested entity does not exist or is not owned by the caller.
    #[error("{0} not found")]
    NotFound(String),

    /// A provider refused or could not take the submission. No coins spent.
    #[error("video generation could not be started: {0}")]
    Provider(String),

    /// Internal server error.
    #[error("internal error")]
    Internal(String),
}

impl From<OrchestratorError> for ApiError {
    fn from(err: OrchestratorError) -> Self {
        match err {
            OrchestratorError::Validation(msg) => Self::Validation(msg),
            OrchestratorError::InsufficientBalance => Self::InsufficientBalance,
            OrchestratorError::NotFound(entity) => Self::NotFound(entity),
            OrchestratorError::UnknownProvider(name) => {
                Self::Validation(format!("unknown provider: {name}"))
            }
            OrchestratorError::Provider(e) => Self::Provider(e.to_string()),
            OrchestratorError::Database(e) => Self::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Unauthenticated => (StatusCode::UNAUTHORIZED, self.to_string()),
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::InsufficientBalance => (StatusCode::PAYMENT_REQUIRED, self.to_string()),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::Provider(detail) => {
                tracing::warn!("Provider submission failed: {}", detail);
                (StatusCode::BAD_GATEWAY, self.to_string())
            }
            ApiError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                // Detail stays in the logs.
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers.
pub type Result<T> = std::result::Result<T, ApiError>;
