//! Core trait and types for video generation provider adapters.
//!
//! This crate provides the shared interface for all provider adapters in the
//! generation service. It defines:
//!
//! - [`VideoProvider`] - The trait every provider adapter implements
//! - [`SubmitRequest`] / [`SubmitReceipt`] - Submission input/output types
//! - [`NormalizedStatus`] / [`JobPhase`] - The provider-agnostic status shape
//! - [`ProviderError`] / [`CallbackError`] - Error types for adapter operations
//!
//! Adapters are pure translation: they turn a generic submit/poll/callback
//! into provider-specific wire calls and normalize the heterogeneous
//! responses. All provider-specific parsing brittleness is quarantined behind
//! this interface, so the reconciliation engine is written once.
//!
//! # Example
//!
//! ```rust
//! use provider_core::{
//!     async_trait, CallbackError, CallbackEvent, NormalizedStatus, ProviderError,
//!     ProviderId, SubmitReceipt, SubmitRequest, VideoProvider,
//! };
//!
//! struct AlwaysDone;
//!
//! #[async_trait]
//! impl VideoProvider for AlwaysDone {
//!     fn id(&self) -> ProviderId {
//!         ProviderId::Pixelle
//!     }
//!
//!     async fn submit(&self, _req: &SubmitRequest) -> Result<SubmitReceipt, ProviderError> {
//!         Ok(SubmitReceipt::new("job-1"))
//!     }
//!
//!     async fn poll_status(&self, _id: &str) -> Result<NormalizedStatus, ProviderError> {
//!         Ok(NormalizedStatus::succeeded("https://cdn.example/v.mp4"))
//!     }
//!
//!     fn parse_callback(&self, _raw: &serde_json::Value) -> Result<CallbackEvent, CallbackError> {
//!         Err(CallbackError::Unrecognized)
//!     }
//! }
//! ```

mod error;
pub mod prompt;
mod status;
mod trait_def;

pub use error::{CallbackError, ProviderError};
pub use status::{
    AspectRatio, CallbackEvent, JobPhase, NormalizedStatus, ProviderId, SubmitReceipt,
    SubmitRequest, UnknownProvider,
};
pub use trait_def::VideoProvider;

// Re-export async_trait for convenience
pub use async_trait::async_trait;
