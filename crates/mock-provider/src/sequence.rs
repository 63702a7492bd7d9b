//! Sequence provider - polls a scripted sequence of statuses.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use provider_core::{
    CallbackError, CallbackEvent, NormalizedStatus, ProviderError, ProviderId, SubmitReceipt,
    SubmitRequest, VideoProvider,
};
use tokio::sync::Mutex;

/// A provider that accepts every submission and replays a scripted sequence
/// of statuses across successive polls. The last status repeats once the
/// script is exhausted.
pub struct SequenceProvider {
    id: ProviderId,
    script: Mutex<VecDeque<NormalizedStatus>>,
    last: Mutex<NormalizedStatus>,
    counter: AtomicU64,
}

impl SequenceProvider {
    /// Provider that replays the given statuses in order.
    ///
    /// An empty script behaves like a forever-generating provider.
    pub fn new(id: ProviderId, script: Vec<NormalizedStatus>) -> Self {
        Self {
            id,
            script: Mutex::new(script.into()),
            last: Mutex::new(NormalizedStatus::generating(None)),
            counter: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl VideoProvider for SequenceProvider {
    fn id(&self) -> ProviderId {
        self.id
    }

    async fn submit(&self, _req: &SubmitRequest) -> Result<SubmitReceipt, ProviderError> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(SubmitReceipt::with_task_id(
            format!("seq-job-{n}"),
            format!("seq-task-{n}"),
        ))
    }

    async fn poll_status(
        &self,
        _external_job_id: &str,
    ) -> Result<NormalizedStatus, ProviderError> {
        let mut script = self.script.lock().await;
        match script.pop_front() {
            Some(status) => {
                *self.last.lock().await = status.clone();
                Ok(status)
            }
            None => Ok(self.last.lock().await.clone()),
        }
    }

    fn parse_callback(&self, raw: &serde_json::Value) -> Result<CallbackEvent, CallbackError> {
        crate::parse_mock_callback(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use provider_core::JobPhase;

    #[tokio::test]
    async fn test_script_plays_in_order_then_repeats() {
        let provider = SequenceProvider::new(
            ProviderId::Kinetic,
            vec![
                NormalizedStatus::generating(Some("queuing".to_string())),
                NormalizedStatus::succeeded("https://cdn.example/v.mp4"),
            ],
        );

        let first = provider.poll_status("j").await.unwrap();
        assert_eq!(first.phase, JobPhase::Generating);

        let second = provider.poll_status("j").await.unwrap();
        assert_eq!(second.phase, JobPhase::Succeeded);

        // Exhausted script repeats the last status.
        let third = provider.poll_status("j").await.unwrap();
        assert_eq!(third.phase, JobPhase::Succeeded);
    }
}
