//! Provider-agnostic request, receipt and status types.

use serde::{Deserialize, Serialize};

/// The video generation backends the service can dispatch to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    /// Pixelle API (plain JSON, `job_id` + `task_id` pair).
    Pixelle,
    /// Kinetic API (`{code, msg, data}` envelope, `taskId` only).
    Kinetic,
}

impl ProviderId {
    /// Stable lowercase identifier, used in persistence and URL paths.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Pixelle => "pixelle",
            ProviderId::Kinetic => "kinetic",
        }
    }
}

impl std::str::FromStr for ProviderId {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pixelle" => Ok(ProviderId::Pixelle),
            "kinetic" => Ok(ProviderId::Kinetic),
            other => Err(UnknownProvider(other.to_string())),
        }
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognized provider identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown provider: {0}")]
pub struct UnknownProvider(pub String);

/// Output aspect ratio for a generated video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectRatio {
    Landscape,
    /// 9:16, the short-form video default.
    #[default]
    Portrait,
    Square,
}

impl AspectRatio {
    /// Stable lowercase identifier, used in persistence and wire formats.
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Landscape => "landscape",
            AspectRatio::Portrait => "portrait",
            AspectRatio::Square => "square",
        }
    }

    /// Parse a persisted identifier, falling back to the default for
    /// anything unrecognized.
    pub fn parse_lossy(s: &str) -> Self {
        match s {
            "landscape" => AspectRatio::Landscape,
            "square" => AspectRatio::Square,
            _ => AspectRatio::Portrait,
        }
    }
}

/// A generic submission request, translated by each adapter into its
/// provider-specific wire call.
#[derive(Debug, Clone)]
pub struct SubmitRequest {
    /// Full generation prompt.
    pub prompt: String,
    /// Source image URLs (typically one product photo).
    pub image_urls: Vec<String>,
    /// Output aspect ratio.
    pub aspect_ratio: AspectRatio,
    /// Publicly reachable URL the provider should call back on completion,
    /// if the provider supports callbacks.
    pub callback_url: Option<String>,
}

/// Identifiers returned by a provider on successful submission.
///
/// Providers are inconsistent about which identifier they echo back in
/// callbacks, so both are persisted and either may be used for correlation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReceipt {
    /// Primary external identifier.
    pub external_job_id: String,
    /// Secondary identifier, when the provider issues one.
    pub external_task_id: Option<String>,
}

impl SubmitReceipt {
    /// Receipt with only a primary identifier.
    pub fn new(external_job_id: impl Into<String>) -> Self {
        Self {
            external_job_id: external_job_id.into(),
            external_task_id: None,
        }
    }

    /// Receipt with both identifiers.
    pub fn with_task_id(
        external_job_id: impl Into<String>,
        external_task_id: impl Into<String>,
    ) -> Self {
        Self {
            external_job_id: external_job_id.into(),
            external_task_id: Some(external_task_id.into()),
        }
    }
}

/// The three phases every provider protocol normalizes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobPhase {
    /// Still running. Provider sub-phases (waiting, queuing, ...) collapse
    /// here; the raw word is kept as `sub_state` for display only.
    Generating,
    /// The provider reports success. A result URL may still be missing if
    /// the payload shape was not extractable.
    Succeeded,
    /// The provider reports failure.
    Failed,
}

/// A provider status report normalized to the internal shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedStatus {
    pub phase: JobPhase,
    /// Opaque provider sub-phase, informational only. Never drives
    /// business logic.
    pub sub_state: Option<String>,
    /// Playable result URL, present only on extractable success.
    pub result_url: Option<String>,
    /// Raw provider error text, mapped to a user-facing category later.
    pub failure_detail: Option<String>,
}

impl NormalizedStatus {
    /// Still generating, with an optional provider sub-phase.
    pub fn generating(sub_state: Option<String>) -> Self {
        Self {
            phase: JobPhase::Generating,
            sub_state,
            result_url: None,
            failure_detail: None,
        }
    }

    /// Succeeded with a playable result URL.
    pub fn succeeded(result_url: impl Into<String>) -> Self {
        Self {
            phase: JobPhase::Succeeded,
            sub_state: None,
            result_url: Some(result_url.into()),
            failure_detail: None,
        }
    }

    /// Succeeded according to the provider, but no result URL could be
    /// extracted from the payload.
    pub fn succeeded_without_url() -> Self {
        Self {
            phase: JobPhase::Succeeded,
            sub_state: None,
            result_url: None,
            failure_detail: None,
        }
    }

    /// Failed, with the provider's error text when available.
    pub fn failed(failure_detail: Option<String>) -> Self {
        Self {
            phase: JobPhase::Failed,
            sub_state: None,
            result_url: None,
            failure_detail,
        }
    }
}

/// A parsed webhook payload: which external job it concerns and what it says.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackEvent {
    /// Correlation identifier extracted from the payload. Matched against
    /// either persisted external identifier.
    pub external_job_id: String,
    /// The normalized status carried by the payload.
    pub status: NormalizedStatus,
}
