//! Error types for orchestrator operations.

use database::DatabaseError;
use provider_core::ProviderError;
use thiserror::Error;

/// Errors that can occur while dispatching or reconciling jobs.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Input is missing required fields or is otherwise malformed.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The user's balance does not cover the generation price.
    #[error("insufficient balance")]
    InsufficientBalance,

    /// Requested entity does not exist or is not owned by the caller.
    #[error("{0} not found")]
    NotFound(String),

    /// The selected provider is not configured.
    #[error("provider not configured: {0}")]
    UnknownProvider(String),

    /// Provider call failed at submission time. No coins were spent.
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Persistence failure.
    #[error("database error: {0}")]
    Database(DatabaseError),
}

impl From<DatabaseError> for OrchestratorError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::InsufficientBalance { .. } => Self::InsufficientBalance,
            DatabaseError::NotFound { entity, .. } => Self::NotFound(entity.to_string()),
            other => Self::Database(other),
        }
    }
}
