//! Caption generation boundary.
//!
//! Captions come from an external LLM collaborator whose only contract is
//! "returns text or errors". Dispatch never depends on it succeeding: any
//! error falls back to [`stock_caption`].

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;
use tracing::debug;

/// Errors from a caption writer.
#[derive(Debug, Error)]
pub enum CaptionError {
    #[error("caption writer configuration error: {0}")]
    Configuration(String),

    #[error("caption request failed: {0}")]
    Network(String),

    #[error("caption response malformed: {0}")]
    Malformed(String),
}

/// External caption collaborator.
#[async_trait]
pub trait CaptionWriter: Send + Sync {
    /// Produce a post-ready caption (text plus hashtags) for a product.
    async fn write_caption(&self, name: &str, features: &str) -> Result<String, CaptionError>;
}

/// Deterministic caption used when no writer is configured or the writer
/// errors.
pub fn stock_caption(name: &str, features: &str) -> String {
    let snippet: String = features.chars().take(50).collect();
    let ellipsis = if features.chars().count() > 50 { "..." } else { "" };
    format!("\u{2728} {name} - {snippet}{ellipsis}\n#TikTok #NewFind")
}

/// Configuration for [`LlmCaptionWriter`].
#[derive(Debug, Clone)]
pub struct LlmCaptionConfig {
    /// OpenAI-compatible chat completions base URL.
    pub api_url: String,
    /// Bearer token.
    pub api_key: String,
    /// Model identifier.
    pub model: String,
}

impl LlmCaptionConfig {
    /// Create configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `CAPTION_API_KEY` | Bearer token | (required) |
    /// | `CAPTION_API_URL` | Chat completions base URL | `https://openrouter.ai/api/v1` |
    /// | `CAPTION_MODEL` | Model identifier | `openai/gpt-4o-mini` |
    pub fn from_env() -> Result<Self, CaptionError> {
        let api_key = env::var("CAPTION_API_KEY")
            .map_err(|_| CaptionError::Configuration("CAPTION_API_KEY not set".to_string()))?;

        let api_url = env::var("CAPTION_API_URL")
            .unwrap_or_else(|_| "https://openrouter.ai/api/v1".to_string());

        let model =
            env::var("CAPTION_MODEL").unwrap_or_else(|_| "openai/gpt-4o-mini".to_string());

        Ok(Self {
            api_url,
            api_key,
            model,
        })
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Caption writer backed by an OpenAI-compatible chat completions endpoint.
pub struct LlmCaptionWriter {
    client: Client,
    config: LlmCaptionConfig,
}

impl LlmCaptionWriter {
    /// Create a writer with the given configuration.
    pub fn new(config: LlmCaptionConfig) -> Result<Self, CaptionError> {
        let client = Client::builder().build().map_err(|e| {
            CaptionError::Configuration(format!("Failed to create HTTP client: {}", e))
        })?;

        Ok(Self { client, config })
    }

    /// Create a writer from environment variables.
    pub fn from_env() -> Result<Self, CaptionError> {
        Self::new(LlmCaptionConfig::from_env()?)
    }

    fn build_prompt(name: &str, features: &str) -> String {
        format!(
            "You write captions and hashtags for short-form product videos.\n\
Product name: {name}\n\
Details: {features}\n\
Write a short, catchy caption (at most 150 characters) with emoji, plus 5-8 \
relevant hashtags.\n\
Answer as JSON: {{\"caption\": \"...\", \"hashtags\": [\"#...\", \"#...\"]}}"
        )
    }
}

/// Pull a usable caption out of the model's reply.
///
/// Models usually answer with the requested JSON object, sometimes wrapped in
/// prose or a code fence; a JSON-shaped substring is parsed first and the
/// raw text (truncated) is the fallback.
fn extract_caption(response: &str) -> String {
    if let (Some(start), Some(end)) = (response.find('{'), response.rfind('}')) {
        if start < end {
            if let Ok(parsed) = serde_json::from_str::<serde_json::Value>(&response[start..=end]) {
                let caption = parsed
                    .get("caption")
                    .and_then(serde_json::Value::as_str)
                    .unwrap_or_default();
                let hashtags = parsed
                    .get("hashtags")
                    .and_then(serde_json::Value::as_array)
                    .map(|tags| {
                        tags.iter()
                            .filter_map(serde_json::Value::as_str)
                            .collect::<Vec<_>>()
                            .join(" ")
                    })
                    .unwrap_or_default();

                if !caption.is_empty() {
                    return if hashtags.is_empty() {
                        caption.to_string()
                    } else {
                        format!("{caption}\n\n{hashtags}")
                    };
                }
            }
        }
    }

    response.chars().take(150).collect()
}

#[async_trait]
impl CaptionWriter for LlmCaptionWriter {
    async fn write_caption(&self, name: &str, features: &str) -> Result<String, CaptionError> {
        let url = format!("{}/chat/completions", self.config.api_url);

        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage {
                role: "user",
                content: Self::build_prompt(name, features),
            }],
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| CaptionError::Network(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CaptionError::Network(format!(
                "caption API error ({}): {}",
                status.as_u16(),
                body
            )));
        }

        let completion: ChatResponse = response
            .json()
            .await
            .map_err(|e| CaptionError::Malformed(format!("Failed to parse response: {}", e)))?;

        let text = completion
            .choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .ok_or_else(|| CaptionError::Malformed("response carried no content".to_string()))?;

        debug!(chars = text.len(), "Caption writer answered");

        Ok(extract_caption(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_caption_truncates_long_features() {
        let long = "x".repeat(80);
        let caption = stock_caption("Mug", &long);
        assert!(caption.contains("Mug"));
        assert!(caption.contains("..."));
        assert!(caption.contains("#TikTok"));
    }

    #[test]
    fn test_extract_caption_from_clean_json() {
        let caption = extract_caption(
            r##"{"caption": "Morning upgrade ☕", "hashtags": ["#coffee", "#mug"]}"##,
        );
        assert!(caption.starts_with("Morning upgrade"));
        assert!(caption.contains("#coffee #mug"));
    }

    #[test]
    fn test_extract_caption_from_wrapped_json() {
        let caption = extract_caption(
            "Sure! Here you go:\n{\"caption\": \"Shine on\", \"hashtags\": [\"#glow\"]}\nEnjoy!",
        );
        assert_eq!(caption, "Shine on\n\n#glow");
    }

    #[test]
    fn test_extract_caption_falls_back_to_plain_text() {
        let caption = extract_caption("Just a plain suggestion without JSON");
        assert_eq!(caption, "Just a plain suggestion without JSON");
    }
}
