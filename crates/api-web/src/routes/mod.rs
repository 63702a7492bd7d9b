//! Route handlers for the API server.

pub mod account;
pub mod generations;
pub mod health;
pub mod payments;
pub mod webhooks;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(health::health))
        // Account
        .route("/api/me", get(account::me))
        // Generations
        .route("/api/generations", post(generations::create))
        .route("/api/generations", get(generations::list))
        .route("/api/generations/regenerate", post(generations::regenerate))
        .route("/api/generations/:id/status", get(generations::status))
        // Payments
        .route("/api/payments/confirm", post(payments::confirm))
        // Provider callbacks
        .route("/webhooks/:provider", post(webhooks::deliver))
}
