//! Payment confirmation endpoint.
//!
//! Checkout creation and signature verification live with the payment
//! collaborator; this endpoint only receives the confirmed event and must be
//! idempotent under at-least-once delivery.

use axum::extract::State;
use axum::Json;
use orchestrator::PaymentOutcome;
use serde::{Deserialize, Serialize};

use crate::auth::AuthedUser;
use crate::error::Result;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ConfirmPaymentRequest {
    plan_id: String,
    coin_amount: i64,
    payment_id: String,
}

#[derive(Debug, Serialize)]
pub struct ConfirmPaymentResponse {
    success: bool,
    already_processed: bool,
    /// Coins credited by this call (zero on a replay).
    coins: i64,
}

/// Record a confirmed payment and credit its coins, exactly once.
pub async fn confirm(
    State(state): State<AppState>,
    user: AuthedUser,
    Json(request): Json<ConfirmPaymentRequest>,
) -> Result<Json<ConfirmPaymentResponse>> {
    let outcome = state
        .orchestrator
        .confirm_payment(
            &user.id,
            &request.plan_id,
            request.coin_amount,
            &request.payment_id,
        )
        .await?;

    let response = match outcome {
        PaymentOutcome::Credited => ConfirmPaymentResponse {
            success: true,
            already_processed: false,
            coins: request.coin_amount,
        },
        PaymentOutcome::AlreadyProcessed => ConfirmPaymentResponse {
            success: true,
            already_processed: true,
            coins: 0,
        },
    };

    Ok(Json(response))
}
