//! PixelleProvider implementation.

use provider_core::{
    async_trait, CallbackError, CallbackEvent, NormalizedStatus, ProviderError, ProviderId,
    SubmitReceipt, SubmitRequest, VideoProvider,
};
use reqwest::Client;
use tracing::{debug, warn};

use crate::api_types::{CallbackPayload, CreateVideoRequest, CreateVideoResponse, VideoStatusResponse};
use crate::config::PixelleConfig;

/// Adapter for the Pixelle video generation API.
pub struct PixelleProvider {
    client: Client,
    config: PixelleConfig,
}

impl PixelleProvider {
    /// Create a new adapter with the given configuration.
    pub fn new(config: PixelleConfig) -> Result<Self, ProviderError> {
        let client = Client::builder().build().map_err(|e| {
            ProviderError::Configuration(format!("Failed to create HTTP client: {}", e))
        })?;

        Ok(Self { client, config })
    }

    /// Create an adapter from environment variables.
    ///
    /// See [`PixelleConfig::from_env`] for the variables.
    pub fn from_env() -> Result<Self, ProviderError> {
        Self::new(PixelleConfig::from_env()?)
    }

    /// Get the configuration.
    pub fn config(&self) -> &PixelleConfig {
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
}

/// Map a Pixelle status word plus optional URL/message into the normalized
/// shape. Unknown words are treated as still-generating with the raw word
/// kept as sub-state.
fn normalize_status(
    status: Option<&str>,
    video_url: Option<String>,
    message: Option<String>,
) -> NormalizedStatus {
    match status {
        Some("completed") => match video_url {
            Some(url) if !url.is_empty() => NormalizedStatus::succeeded(url),
            _ => NormalizedStatus::succeeded_without_url(),
        },
        Some("failed") => NormalizedStatus::failed(message),
        Some("processing") | None => NormalizedStatus::generating(None),
        Some(other) => NormalizedStatus::generating(Some(other.to_string())),
    }
}

#[async_trait]
impl VideoProvider for PixelleProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Pixelle
    }

    async fn submit(&self, req: &SubmitRequest) -> Result<SubmitReceipt, ProviderError> {
        let url = format!("{}/sora2-video/create", self.config.api_url);

        let body = CreateVideoRequest {
            prompt: req.prompt.clone(),
            image_urls: req.image_urls.clone(),
            aspect_ratio: req.aspect_ratio.as_str().to_string(),
            n_frames: self.config.n_frames.clone(),
            remove_watermark: self.config.remove_watermark,
            callback_url: req.callback_url.clone(),
        };

        debug!(url = %url, "Submitting Pixelle generation");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Unavailable(format!("Pixelle submit failed: {}", e)))?;

        let response = Self::error_for_status(response, "Pixelle submit").await?;

        let created: CreateVideoResponse = response.json().await.map_err(|e| {
            ProviderError::MalformedResponse(format!("Pixelle submit response: {}", e))
        })?;

        debug!(job_id = %created.job_id, "Pixelle accepted generation");

        Ok(SubmitReceipt {
            external_job_id: created.job_id,
            external_task_id: created.task_id,
        })
    }

    async fn poll_status(
        &self,
        external_job_id: &str,
    ) -> Result<NormalizedStatus, ProviderError> {
        let url = format!("{}/sora2-video/status/{}", self.config.api_url, external_job_id);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.config.api_key)
            .send()
            .await
            .map_err(|e| ProviderError::Unavailable(format!("Pixelle status failed: {}", e)))?;

        let response = Self::error_for_status(response, "Pixelle status").await?;

        let status: VideoStatusResponse = response.json().await.map_err(|e| {
            ProviderError::MalformedResponse(format!("Pixelle status response: {}", e))
        })?;

        Ok(normalize_status(
            status.status.as_deref(),
            status.video_url,
            status.message,
        ))
    }

    fn parse_callback(&self, raw: &serde_json::Value) -> Result<CallbackEvent, CallbackError> {
        let payload: CallbackPayload = match serde_json::from_value(raw.clone()) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "Pixelle callback did not match the expected shape");
                return Err(CallbackError::Unrecognized);
            }
        };

        let external_job_id = payload
            .job_id
            .or(payload.task_id)
            .filter(|id| !id.is_empty())
            .ok_or(CallbackError::Unrecognized)?;

        Ok(CallbackEvent {
            external_job_id,
            status: normalize_status(
                payload.status.as_deref(),
                payload.video_url,
                payload.message,
            ),
        })
    }
}
