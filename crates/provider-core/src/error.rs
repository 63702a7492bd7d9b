//! Error types for provider adapter operations.

use thiserror::Error;

/// Errors that can occur while talking to a video generation provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider could not be reached or answered with a 5xx.
    ///
    /// During a poll this is transient: callers report the last persisted
    /// job state instead of propagating it.
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    /// The provider rejected the request (4xx or a semantic error in a
    /// 2xx envelope).
    #[error("provider rejected request: {0}")]
    Rejected(String),

    /// The adapter is misconfigured (missing API key, bad URL).
    #[error("provider configuration error: {0}")]
    Configuration(String),

    /// The provider answered with a body the adapter could not parse.
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),
}

/// Errors from parsing an inbound webhook payload.
#[derive(Debug, Error)]
pub enum CallbackError {
    /// No correlation identifier could be extracted from the payload.
    ///
    /// The webhook entry point treats this as "not ours" and acks anyway so
    /// the provider stops retrying.
    #[error("callback payload carries no recognizable job identifier")]
    Unrecognized,
}
