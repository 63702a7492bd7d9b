//! Pixelle API request and response types.

use serde::{Deserialize, Serialize};

/// Submission request body.
#[derive(Debug, Clone, Serialize)]
pub struct CreateVideoRequest {
    pub prompt: String,
    pub image_urls: Vec<String>,
    pub aspect_ratio: String,
    pub n_frames: String,
    pub remove_watermark: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
}

/// Submission response.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateVideoResponse {
    pub job_id: String,
    pub task_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Status poll response.
#[derive(Debug, Clone, Deserialize)]
pub struct VideoStatusResponse {
    #[serde(default)]
    pub job_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Callback payload: same fields as a status poll, delivered at the root.
#[derive(Debug, Clone, Deserialize)]
pub struct CallbackPayload {
    #[serde(default)]
    pub job_id: Option<String>,
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
