//! Database error types.

use thiserror::Error;

/// Errors that can occur during database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// SQLx error (connection, query, etc.)
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration error
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Record not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Record already exists
    #[error("{entity} already exists: {id}")]
    AlreadyExists { entity: &'static str, id: String },

    /// A debit was rejected because the user's balance does not cover it.
    #[error("insufficient balance for user {user_id}: need {required}")]
    InsufficientBalance { user_id: String, required: i64 },

    /// A credit carried an external reference that was already recorded.
    /// Callers treat this as "event already processed".
    #[error("external reference already recorded: {reference}")]
    AlreadyRecorded { reference: String },
}

/// Result type for database operations.
pub type Result<T> = std::result::Result<T, DatabaseError>;
