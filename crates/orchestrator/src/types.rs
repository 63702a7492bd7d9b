//! Input and output types for the orchestrator's entry points.

use database::{GenerationJob, JobState};
use provider_core::ProviderId;
use serde::{Deserialize, Serialize};

/// Validated-by-the-orchestrator input for one generation.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationInput {
    pub name: String,
    pub image_url: String,
    pub features: String,
    pub concept: String,
    pub target_audience: String,
    /// Caller-supplied caption. When absent the caption writer runs.
    pub caption: Option<String>,
    /// Requested backend; the orchestrator's default applies when absent.
    pub provider: Option<ProviderId>,
    /// Save (or update) the product for later regeneration.
    #[serde(default)]
    pub save_product: bool,
    /// Existing product to update when saving.
    pub product_id: Option<String>,
}

/// What the poll entry point reports: the persisted truth about one job.
#[derive(Debug, Clone, Serialize)]
pub struct JobSnapshot {
    pub state: JobState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

impl From<&GenerationJob> for JobSnapshot {
    fn from(job: &GenerationJob) -> Self {
        Self {
            state: job.state,
            sub_state: job.sub_state.clone(),
            result_url: job.result_url.clone(),
            failure_reason: job.failure_reason.clone(),
        }
    }
}

/// What became of an inbound webhook payload.
///
/// All three outcomes are acked to the provider; only the first one mutated
/// anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// The payload resolved a processing job (or updated its sub-state).
    Applied,
    /// The referenced job had already reached a terminal state.
    AlreadyTerminal,
    /// The payload was unparseable or referenced no known job.
    Ignored,
}

/// What became of a payment confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentOutcome {
    /// Coins were credited.
    Credited,
    /// This external payment was already recorded; nothing changed.
    AlreadyProcessed,
}
