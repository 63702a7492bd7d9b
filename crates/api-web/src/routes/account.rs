//! Account endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::auth::AuthedUser;
use crate::error::Result;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AccountResponse {
    id: String,
    name: String,
    balance: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    balance_expires_at: Option<String>,
}

/// Balance snapshot for the caller, provisioning the account (and its
/// welcome bonus) on first sight.
pub async fn me(State(state): State<AppState>, user: AuthedUser) -> Result<Json<AccountResponse>> {
    let account = state.orchestrator.ensure_account(&user.id, &user.name).await?;

    Ok(Json(AccountResponse {
        id: account.id,
        name: account.name,
        balance: account.balance,
        balance_expires_at: account.balance_expires_at,
    }))
}
