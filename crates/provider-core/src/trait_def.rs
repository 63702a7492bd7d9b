//! The VideoProvider trait definition.

use async_trait::async_trait;

use crate::error::{CallbackError, ProviderError};
use crate::status::{CallbackEvent, NormalizedStatus, ProviderId, SubmitReceipt, SubmitRequest};

/// A trait for submitting video generation jobs to an external provider and
/// reading their status back.
///
/// Implementations are stateless translators between the internal types and
/// one provider's wire protocol. This trait is object-safe and used as
/// `Arc<dyn VideoProvider>` by the dispatch flow and reconciliation engine.
#[async_trait]
pub trait VideoProvider: Send + Sync {
    /// Which provider this adapter speaks for.
    fn id(&self) -> ProviderId;

    /// Submit a generation job.
    ///
    /// Returns the provider's external identifiers. Errors with
    /// [`ProviderError::Unavailable`] on transport failures and
    /// [`ProviderError::Rejected`] on 4xx or semantic rejection; in either
    /// case the caller must not have debited or persisted anything yet.
    async fn submit(&self, req: &SubmitRequest) -> Result<SubmitReceipt, ProviderError>;

    /// Poll the provider for the current status of a job.
    ///
    /// Provider-specific sub-phases are normalized into
    /// [`JobPhase::Generating`](crate::JobPhase::Generating) plus an opaque
    /// sub-state string.
    async fn poll_status(&self, external_job_id: &str)
        -> Result<NormalizedStatus, ProviderError>;

    /// Parse a raw webhook payload into a correlation id and normalized
    /// status.
    ///
    /// Must be defensive: callback schemas vary release-to-release, so
    /// implementations try an ordered list of extraction strategies. A
    /// recognizable payload with no extractable result URL still parses (as
    /// success-without-URL, which the engine conservatively fails); only a
    /// payload with no extractable identifier is
    /// [`CallbackError::Unrecognized`].
    fn parse_callback(&self, raw: &serde_json::Value) -> Result<CallbackEvent, CallbackError>;
}
