//! Static provider - accepts everything, polls one fixed status.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use provider_core::{
    CallbackError, CallbackEvent, NormalizedStatus, ProviderError, ProviderId, SubmitReceipt,
    SubmitRequest, VideoProvider,
};

/// A provider that accepts every submission and reports one fixed status on
/// every poll.
pub struct StaticProvider {
    id: ProviderId,
    status: NormalizedStatus,
    counter: AtomicU64,
}

impl StaticProvider {
    /// Provider that always reports the given status.
    pub fn new(id: ProviderId, status: NormalizedStatus) -> Self {
        Self {
            id,
            status,
            counter: AtomicU64::new(0),
        }
    }

    /// Provider whose jobs always succeed with the given URL.
    pub fn succeeding(id: ProviderId, result_url: impl Into<String>) -> Self {
        Self::new(id, NormalizedStatus::succeeded(result_url))
    }

    /// Provider whose jobs stay in generation forever.
    pub fn pending(id: ProviderId) -> Self {
        Self::new(id, NormalizedStatus::generating(Some("waiting".to_string())))
    }

    /// How many submissions this provider has accepted.
    pub fn submissions(&self) -> u64 {
        self.counter.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VideoProvider for StaticProvider {
    fn id(&self) -> ProviderId {
        self.id
    }

    async fn submit(&self, _req: &SubmitRequest) -> Result<SubmitReceipt, ProviderError> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(SubmitReceipt::with_task_id(
            format!("mock-job-{n}"),
            format!("mock-task-{n}"),
        ))
    }

    async fn poll_status(
        &self,
        _external_job_id: &str,
    ) -> Result<NormalizedStatus, ProviderError> {
        Ok(self.status.clone())
    }

    fn parse_callback(&self, raw: &serde_json::Value) -> Result<CallbackEvent, CallbackError> {
        crate::parse_mock_callback(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use provider_core::{AspectRatio, JobPhase};

    fn request() -> SubmitRequest {
        SubmitRequest {
            prompt: "a mug".to_string(),
            image_urls: vec!["https://cdn.example/mug.jpg".to_string()],
            aspect_ratio: AspectRatio::Portrait,
            callback_url: None,
        }
    }

    #[tokio::test]
    async fn test_submit_issues_unique_receipts() {
        let provider = StaticProvider::pending(ProviderId::Pixelle);

        let first = provider.submit(&request()).await.unwrap();
        let second = provider.submit(&request()).await.unwrap();
        assert_ne!(first.external_job_id, second.external_job_id);
        assert_eq!(provider.submissions(), 2);
    }

    #[tokio::test]
    async fn test_poll_reports_fixed_status() {
        let provider = StaticProvider::succeeding(ProviderId::Kinetic, "https://cdn.example/v.mp4");
        let status = provider.poll_status("anything").await.unwrap();
        assert_eq!(status.phase, JobPhase::Succeeded);
    }
}
