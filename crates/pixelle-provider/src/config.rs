//! Configuration for the Pixelle adapter.

use provider_core::ProviderError;
use std::env;

/// Default Pixelle API base URL.
const DEFAULT_API_URL: &str = "https://api.pixelle.dev/api/v1";

/// Configuration for [`PixelleProvider`](crate::PixelleProvider).
#[derive(Debug, Clone)]
pub struct PixelleConfig {
    /// API base URL.
    pub api_url: String,
    /// Bearer token for authentication.
    pub api_key: String,
    /// Clip length in frames, as the API spells it ("10" or "15").
    pub n_frames: String,
    /// Ask the provider to strip its watermark.
    pub remove_watermark: bool,
}

impl PixelleConfig {
    /// Configuration with explicit values and the API defaults otherwise.
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            api_key: api_key.into(),
            n_frames: "10".to_string(),
            remove_watermark: true,
        }
    }

    /// Create configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `PIXELLE_API_KEY` | Bearer token | (required) |
    /// | `PIXELLE_API_URL` | API base URL | `https://api.pixelle.dev/api/v1` |
    /// | `PIXELLE_N_FRAMES` | Clip length in frames | `10` |
    pub fn from_env() -> Result<Self, ProviderError> {
        let api_key = env::var("PIXELLE_API_KEY")
            .map_err(|_| ProviderError::Configuration("PIXELLE_API_KEY not set".to_string()))?;

        let api_url = env::var("PIXELLE_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let n_frames = env::var("PIXELLE_N_FRAMES").unwrap_or_else(|_| "10".to_string());

        Ok(Self {
            api_url,
            api_key,
            n_frames,
            remove_watermark: true,
        })
    }
}
