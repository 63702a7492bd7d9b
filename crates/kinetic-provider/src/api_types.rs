//! Kinetic API request and response types.

use serde::{Deserialize, Serialize};

/// Envelope wrapping every Kinetic response.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub code: i64,
    /// Older releases say `message`, newer ones `msg`.
    #[serde(default, alias = "msg")]
    pub message: Option<String>,
    pub data: Option<T>,
}

/// Submission request body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_back_url: Option<String>,
    pub input: TaskInput,
}

/// Generation parameters, nested under `input`.
#[derive(Debug, Clone, Serialize)]
pub struct TaskInput {
    pub prompt: String,
    pub image_urls: Vec<String>,
    pub aspect_ratio: String,
    pub n_frames: String,
    pub remove_watermark: bool,
}

/// `data` of a successful task creation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCreated {
    pub task_id: String,
}

/// `data` of a record-info poll.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    pub task_id: Option<String>,
    /// One of `waiting`, `queuing`, `generating`, `success`, `fail`.
    pub state: Option<String>,
    /// JSON string; its `resultUrls[0]` is the video URL.
    pub result_json: Option<String>,
    pub fail_code: Option<String>,
    pub fail_msg: Option<String>,
}
