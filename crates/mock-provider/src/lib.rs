//! Mock provider implementations for exercising the generation flow.
//!
//! This crate provides deterministic implementations of the
//! `VideoProvider` trait for testing:
//! - `StaticProvider` - Accepts every submission, polls a fixed status
//! - `SequenceProvider` - Polls a scripted sequence of statuses
//! - `FailingProvider` - Refuses submissions and polls
//!
//! For real generation, use the `pixelle-provider` or `kinetic-provider`
//! crates instead.
//!
//! Mock callbacks use one canonical JSON shape:
//!
//! ```json
//! { "job_id": "...", "phase": "succeeded", "result_url": "...", "detail": "..." }
//! ```

mod failing;
mod sequence;
mod static_provider;

// Re-export provider-core types for convenience
pub use provider_core::{
    async_trait, CallbackError, CallbackEvent, JobPhase, NormalizedStatus, ProviderError,
    ProviderId, SubmitReceipt, SubmitRequest, VideoProvider,
};

pub use failing::{FailingProvider, FailureMode};
pub use sequence::SequenceProvider;
pub use static_provider::StaticProvider;

/// Parse the canonical mock callback shape shared by all mock providers.
pub(crate) fn parse_mock_callback(
    raw: &serde_json::Value,
) -> Result<CallbackEvent, CallbackError> {
    let external_job_id = raw
        .get("job_id")
        .and_then(serde_json::Value::as_str)
        .filter(|id| !id.is_empty())
        .ok_or(CallbackError::Unrecognized)?
        .to_string();

    let result_url = raw
        .get("result_url")
        .and_then(serde_json::Value::as_str)
        .map(str::to_string);
    let detail = raw
        .get("detail")
        .and_then(serde_json::Value::as_str)
        .map(str::to_string);

    let status = match raw.get("phase").and_then(serde_json::Value::as_str) {
        Some("succeeded") => match result_url {
            Some(url) => NormalizedStatus::succeeded(url),
            None => NormalizedStatus::succeeded_without_url(),
        },
        Some("failed") => NormalizedStatus::failed(detail),
        Some(other) => NormalizedStatus::generating(Some(other.to_string())),
        None => NormalizedStatus::generating(None),
    };

    Ok(CallbackEvent {
        external_job_id,
        status,
    })
}
