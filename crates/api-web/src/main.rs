//! HTTP surface for the video generation service.
//!
//! Wires configuration, the database, the provider adapters and the
//! orchestrator together at startup; every handle is constructed here and
//! injected, nothing is process-global.

mod auth;
mod config;
mod error;
mod routes;
mod state;


use std::env;
use std::sync::Arc;

use database::Database;
use kinetic_provider::KineticProvider;
use orchestrator::{LlmCaptionWriter, Orchestrator, ProviderRegistry};
use pixelle_provider::PixelleProvider;
use tracing::{info, warn};

use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    // Load configuration
    let config = Config::from_env()?;
    info!(addr = %config.addr, "Starting API server");

    // Connect to database
    let db = Database::connect(&config.database_url).await?;
    db.migrate().await?;

    // Register every provider whose credentials are configured
    let mut registry = ProviderRegistry::new();

    match PixelleProvider::from_env() {
        Ok(provider) => registry = registry.with(Arc::new(provider)),
        Err(e) => warn!(error = %e, "Pixelle provider not registered"),
    }

    match KineticProvider::from_env() {
        Ok(provider) => registry = registry.with(Arc::new(provider)),
        Err(e) => warn!(error = %e, "Kinetic provider not registered"),
    }

    if registry.ids().is_empty() {
        return Err("no video provider configured; set PIXELLE_API_KEY or KINETIC_API_KEY".into());
    }
    info!(providers = ?registry.ids(), "Providers registered");

    // Build the orchestrator
    let mut orchestrator =
        Orchestrator::new(db, registry).with_default_provider(config.default_provider);

    if let Some(base_url) = &config.public_base_url {
        orchestrator = orchestrator.with_callback_base_url(base_url.clone());
    } else {
        warn!("PUBLIC_BASE_URL not set; jobs resolve by polling only");
    }

    if env::var("CAPTION_API_KEY").is_ok() {
        match LlmCaptionWriter::from_env() {
            Ok(writer) => orchestrator = orchestrator.with_caption_writer(Arc::new(writer)),
            Err(e) => warn!(error = %e, "Caption writer not configured"),
        }
    }

    // Build application state and router
    let state = AppState::new(orchestrator);
    let app = routes::router().with_state(state);

    // Start server
    info!(addr = %config.addr, "API server listening");
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
