//! KineticProvider implementation.

use provider_core::{
    async_trait, CallbackError, CallbackEvent, NormalizedStatus, ProviderError, ProviderId,
    SubmitReceipt, SubmitRequest, VideoProvider,
};
use reqwest::Client;
use tracing::debug;

use crate::api_types::{CreateTaskRequest, Envelope, TaskCreated, TaskInput, TaskRecord};
use crate::callback;
use crate::config::KineticConfig;

/// Adapter for the Kinetic video generation API.
pub struct KineticProvider {
    client: Client,
    config: KineticConfig,
}

impl KineticProvider {
    /// Create a new adapter with the given configuration.
    pub fn new(config: KineticConfig) -> Result<Self, ProviderError> {
        let client = Client::builder().build().map_err(|e| {
            ProviderError::Configuration(format!("Failed to create HTTP client: {}", e))
        })?;

        Ok(Self { client, config })
    }

    /// Create an adapter from environment variables.
    ///
    /// See [`KineticConfig::from_env`] for the variables.
    pub fn from_env() -> Result<Self, ProviderError> {
        Self::new(KineticConfig::from_env()?)
    }

    /// Get the configuration.
    pub fn config(&self) -> &KineticConfig {
        &self.config
    }

    async fn error_for_status(
        response: reqwest::Response,
        context: &str,
    ) -> Result<reqwest::Response, ProviderError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let detail = format!("{} ({}): {}", context, status.as_u16(), body);

        if status.is_client_error() {
            Err(ProviderError::Rejected(detail))
        } else {
            Err(ProviderError::Unavailable(detail))
        }
    }

    /// Unwrap the `{code, msg, data}` envelope; `code != 200` inside a 2xx
    /// body is still a rejection.
    fn unwrap_envelope<T>(envelope: Envelope<T>, context: &str) -> Result<T, ProviderError> {
        if envelope.code != 200 {
            return Err(ProviderError::Rejected(format!(
                "{}: code {} ({})",
                context,
                envelope.code,
                envelope.message.unwrap_or_default()
            )));
        }

        envelope.data.ok_or_else(|| {
            ProviderError::MalformedResponse(format!("{}: envelope carried no data", context))
        })
    }
}

/// Map a record-info state word into the normalized shape.
fn normalize_record(record: &TaskRecord) -> NormalizedStatus {
    match record.state.as_deref() {
        Some("success") => {
            let url = record
                .result_json
                .as_deref()
                .and_then(callback::result_url_from_json);
            match url {
                Some(url) => NormalizedStatus::succeeded(url),
                None => NormalizedStatus::succeeded_without_url(),
            }
        }
        Some("fail") => NormalizedStatus::failed(record.fail_msg.clone().filter(|m| !m.is_empty())),
        Some(other) => NormalizedStatus::generating(Some(other.to_string())),
        None => NormalizedStatus::generating(None),
    }
}

#[async_trait]
impl VideoProvider for KineticProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Kinetic
    }

    async fn submit(&self, req: &SubmitRequest) -> Result<SubmitReceipt, ProviderError> {
        let url = format!("{}/jobs/createTask", self.config.api_url);

        let body = CreateTaskRequest {
            model: self.config.model.clone(),
            call_back_url: req.callback_url.clone(),
            input: TaskInput {
                prompt: req.prompt.clone(),
                image_urls: req.image_urls.clone(),
                aspect_ratio: req.aspect_ratio.as_str().to_string(),
                n_frames: self.config.n_frames.clone(),
                remove_watermark: self.config.remove_watermark,
            },
        };

        debug!(url = %url, model = %self.config.model, "Submitting Kinetic task");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Unavailable(format!("Kinetic submit failed: {}", e)))?;

        let response = Self::error_for_status(response, "Kinetic submit").await?;

        let envelope: Envelope<TaskCreated> = response.json().await.map_err(|e| {
            ProviderError::MalformedResponse(format!("Kinetic submit response: {}", e))
        })?;

        let created = Self::unwrap_envelope(envelope, "Kinetic submit")?;

        debug!(task_id = %created.task_id, "Kinetic accepted task");

        // Kinetic issues a single identifier; both columns carry it so
        // correlation works whichever one a callback echoes.
        Ok(SubmitReceipt::with_task_id(
            created.task_id.clone(),
            created.task_id,
        ))
    }

    async fn poll_status(
        &self,
        external_job_id: &str,
    ) -> Result<NormalizedStatus, ProviderError> {
        let url = format!(
            "{}/jobs/recordInfo?taskId={}",
            self.config.api_url, external_job_id
        );

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.config.api_key)
            .send()
            .await
            .map_err(|e| ProviderError::Unavailable(format!("Kinetic status failed: {}", e)))?;

        let response = Self::error_for_status(response, "Kinetic status").await?;

        let envelope: Envelope<TaskRecord> = response.json().await.map_err(|e| {
            ProviderError::MalformedResponse(format!("Kinetic status response: {}", e))
        })?;

        let record = Self::unwrap_envelope(envelope, "Kinetic status")?;

        Ok(normalize_record(&record))
    }

    fn parse_callback(&self, raw: &serde_json::Value) -> Result<CallbackEvent, CallbackError> {
        callback::parse(raw)
    }
}
