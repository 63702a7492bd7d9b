//! Configuration for the Kinetic adapter.

use provider_core::ProviderError;
use std::env;

/// Default Kinetic API base URL.
const DEFAULT_API_URL: &str = "https://api.kinetic.dev/api/v1";

/// Default generation model.
const DEFAULT_MODEL: &str = "sora-2-image-to-video";

/// Configuration for [`KineticProvider`](crate::KineticProvider).
#[derive(Debug, Clone)]
pub struct KineticConfig {
    /// API base URL.
    pub api_url: String,
    /// Bearer token for authentication.
    pub api_key: String,
    /// Generation model identifier.
    pub model: String,
    /// Clip length in frames, as the API spells it ("10" or "15").
    pub n_frames: String,
    /// Ask the provider to strip its watermark.
    pub remove_watermark: bool,
}

impl KineticConfig {
    /// Configuration with explicit values and the API defaults otherwise.
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            n_frames: "15".to_string(),
            remove_watermark: true,
        }
    }

    /// Create configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `KINETIC_API_KEY` | Bearer token | (required) |
    /// | `KINETIC_API_URL` | API base URL | `https://api.kinetic.dev/api/v1` |
    /// | `KINETIC_MODEL` | Generation model | `sora-2-image-to-video` |
    /// | `KINETIC_N_FRAMES` | Clip length in frames | `15` |
    pub fn from_env() -> Result<Self, ProviderError> {
        let api_key = env::var("KINETIC_API_KEY")
            .map_err(|_| ProviderError::Configuration("KINETIC_API_KEY not set".to_string()))?;

        let api_url = env::var("KINETIC_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let model = env::var("KINETIC_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let n_frames = env::var("KINETIC_N_FRAMES").unwrap_or_else(|_| "15".to_string());

        Ok(Self {
            api_url,
            api_key,
            model,
            n_frames,
            remove_watermark: true,
        })
    }
}
