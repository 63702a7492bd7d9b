//! Database models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A user account, identified by the external auth subject id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    /// External auth subject (e.g. "auth0|5f7c...")
    pub id: String,
    /// Display name
    pub name: String,
    /// Current coin balance. Cached projection of the ledger, never negative.
    pub balance: i64,
    /// When the seeded bonus coins lapse, if set. Informational.
    pub balance_expires_at: Option<String>,
    /// Creation timestamp.
    pub created_at: String,
}

/// Classification of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LedgerKind {
    /// One-time welcome credit at account creation.
    Bonus,
    /// Coins bought through the payment collaborator.
    Purchase,
    /// Debit for one generation job.
    Generation,
    /// Compensating credit after a failed job.
    Refund,
}

impl LedgerKind {
    /// Stable lowercase identifier, as stored in the `kind` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerKind::Bonus => "bonus",
            LedgerKind::Purchase => "purchase",
            LedgerKind::Generation => "generation",
            LedgerKind::Refund => "refund",
        }
    }
}

/// One append-only, balance-affecting transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct LedgerEntry {
    /// Auto-incrementing ID.
    pub id: i64,
    /// Owning user.
    pub user_id: String,
    /// Entry classification.
    pub kind: LedgerKind,
    /// Signed coin amount (negative for debits).
    pub amount: i64,
    /// Human-readable description. Free text only; never used for dedup.
    pub note: String,
    /// External event id (payment session etc.). UNIQUE, so replaying the
    /// same event is a constraint violation instead of a double credit.
    pub external_reference: Option<String>,
    /// Creation timestamp.
    pub created_at: String,
}

/// Lifecycle state of a generation job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    /// Submitted to the provider, not yet resolved.
    Processing,
    /// Terminal: finished with a playable result URL.
    Completed,
    /// Terminal: failed and refunded.
    Failed,
}

impl JobState {
    /// Stable lowercase identifier, as stored in the `state` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Processing => "processing",
            JobState::Completed => "completed",
            JobState::Failed => "failed",
        }
    }

    /// Whether this state is terminal (immutable once reached).
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }
}

/// One asynchronous video generation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct GenerationJob {
    /// UUID v4.
    pub id: String,
    /// Owning user.
    pub user_id: String,
    /// Linked product, when the caller saved one.
    pub product_id: Option<String>,
    /// Which provider ran the job ("pixelle" or "kinetic").
    pub provider: String,
    /// Provider's primary external identifier.
    pub external_job_id: String,
    /// Provider's secondary identifier, when issued.
    pub external_task_id: Option<String>,
    /// Lifecycle state.
    pub state: JobState,
    /// Provider sub-phase while processing. Informational only.
    pub sub_state: Option<String>,
    /// Playable result URL. Set iff state is completed.
    pub result_url: Option<String>,
    /// User-facing failure category. Set only on failed jobs.
    pub failure_reason: Option<String>,
    /// Full prompt sent to the provider.
    pub prompt: String,
    /// Output aspect ratio.
    pub aspect_ratio: String,
    /// Source product image.
    pub source_image_url: String,
    /// Caption to post alongside the video.
    pub caption: Option<String>,
    /// Creation timestamp.
    pub created_at: String,
}

/// A saved product, the source material for (re)generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Product {
    /// UUID v4.
    pub id: String,
    /// Owning user.
    pub user_id: String,
    pub name: String,
    pub image_url: String,
    pub features: String,
    pub concept: String,
    pub target_audience: String,
    pub caption: Option<String>,
    /// Creation timestamp.
    pub created_at: String,
}
