//! Failing provider - refuses submissions and polls.

use async_trait::async_trait;
use provider_core::{
    CallbackError, CallbackEvent, NormalizedStatus, ProviderError, ProviderId, SubmitReceipt,
    SubmitRequest, VideoProvider,
};

/// How the provider should refuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureMode {
    /// Network-level failure (5xx / unreachable).
    Unavailable,
    /// Semantic rejection (4xx).
    Rejected,
}

/// A provider that fails every operation, for exercising the
/// no-charge-without-acceptance path.
pub struct FailingProvider {
    id: ProviderId,
    mode: FailureMode,
}

impl FailingProvider {
    pub fn new(id: ProviderId, mode: FailureMode) -> Self {
        Self { id, mode }
    }

    /// Provider that is unreachable.
    pub fn unavailable(id: ProviderId) -> Self {
        Self::new(id, FailureMode::Unavailable)
    }

    /// Provider that rejects every request.
    pub fn rejecting(id: ProviderId) -> Self {
        Self::new(id, FailureMode::Rejected)
    }

    fn error(&self, context: &str) -> ProviderError {
        match self.mode {
            FailureMode::Unavailable => {
                ProviderError::Unavailable(format!("mock: {context} unavailable"))
            }
            FailureMode::Rejected => ProviderError::Rejected(format!("mock: {context} rejected")),
        }
    }
}

#[async_trait]
impl VideoProvider for FailingProvider {
    fn id(&self) -> ProviderId {
        self.id
    }

    async fn submit(&self, _req: &SubmitRequest) -> Result<SubmitReceipt, ProviderError> {
        Err(self.error("submit"))
    }

    async fn poll_status(
        &self,
        _external_job_id: &str,
    ) -> Result<NormalizedStatus, ProviderError> {
        Err(self.error("poll"))
    }

    fn parse_callback(&self, raw: &serde_json::Value) -> Result<CallbackEvent, CallbackError> {
        crate::parse_mock_callback(raw)
    }
}
