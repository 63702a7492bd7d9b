//! Provider callback endpoint.
//!
//! One generic handler serves every provider; the path segment selects the
//! adapter whose parser understands the payload. Webhooks are delivered
//! at-least-once and unauthenticated, so the handler acks everything it can
//! attribute, including duplicates and strays, to stop provider retries.

use axum::extract::{Path, State};
use axum::Json;
use orchestrator::CallbackOutcome;
use provider_core::ProviderId;
use serde::Serialize;
use serde_json::Value;
use std::str::FromStr;
use tracing::{info, warn};

use crate::error::{ApiError, Result};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Ack {
    received: bool,
}

/// Receive a raw provider callback.
pub async fn deliver(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Json(payload): Json<Value>,
) -> Result<Json<Ack>> {
    let provider_id =
        ProviderId::from_str(&provider).map_err(|_| ApiError::NotFound("provider".to_string()))?;

    let outcome = state
        .orchestrator
        .reconcile_callback(provider_id, &payload)
        .await?;

    match outcome {
        CallbackOutcome::Applied => {
            info!(provider = %provider_id, "Callback applied");
        }
        CallbackOutcome::AlreadyTerminal => {
            info!(provider = %provider_id, "Callback for already-terminal job");
        }
        CallbackOutcome::Ignored => {
            warn!(provider = %provider_id, "Callback ignored");
        }
    }

    // Success-shaped in every attributable case, or the provider retries
    // forever.
    Ok(Json(Ack { received: true }))
}
