//! Pixelle video generation API adapter.
//!
//! Pixelle speaks plain snake_case JSON: submission returns a
//! `job_id`/`task_id` pair and status polling returns one of
//! `processing`/`completed`/`failed` with an optional `video_url`. Its
//! callbacks mirror the status shape at the payload root.

mod adapter;
mod api_types;
mod config;

pub use adapter::PixelleProvider;
pub use config::PixelleConfig;
