//! Dispatch flow and job lifecycle reconciliation engine.
//!
//! This crate coordinates the coin ledger, the provider adapters and the job
//! store:
//!
//! - [`Orchestrator::submit_generation`] validates input, resolves a caption,
//!   submits to a provider, then charges and records the job atomically.
//! - [`Orchestrator::reconcile_job`] and [`Orchestrator::reconcile_callback`]
//!   drive a processing job to its terminal state. Both channels (client
//!   poll and provider webhook) funnel into the same transition logic, so
//!   duplicate and racing signals are harmless.
//! - [`Orchestrator::confirm_payment`] credits purchased coins idempotently.
//!
//! Providers are injected as `Arc<dyn VideoProvider>` through a
//! [`ProviderRegistry`]; the orchestrator itself holds no provider-specific
//! logic.

mod caption;
mod error;
pub mod failure;
mod orchestrator;
mod providers;
mod reconcile;
mod types;

pub use caption::{stock_caption, CaptionError, CaptionWriter, LlmCaptionConfig, LlmCaptionWriter};
pub use error::OrchestratorError;
pub use orchestrator::Orchestrator;
pub use providers::ProviderRegistry;
pub use types::{CallbackOutcome, GenerationInput, JobSnapshot, PaymentOutcome};

/// Price of one generation job, in coins.
pub const COINS_PER_VIDEO: i64 = 15;
