//! risktrack service binary.
//!
//! Wires configuration, storage, the sync engine, the hourly scheduler,
//! and the HTTP server together, then runs until interrupted.

use std::sync::Arc;

use risktrack::api::AppState;
use risktrack::config::Config;
use risktrack::services::jira_client::JiraConnector;
use risktrack::services::notifier::WebhookNotifier;
use risktrack::services::scheduler;
use risktrack::services::sync_engine::SyncEngine;
use risktrack::{db, server};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "Fatal error");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;

    let pool = db::initialize(&config.database_path).await?;
    tracing::info!(path = %config.database_path.display(), "Database ready");

    if config.tracker.is_none() {
        tracing::warn!("Tracker credentials not configured; imports will fail until they are set");
    }

    let connector = Arc::new(JiraConnector::new(config.tracker.clone()));
    let engine = Arc::new(SyncEngine::new(pool.clone(), connector));
    let notifier = Arc::new(WebhookNotifier::new(config.notify_webhook_url.clone())?);

    let state = AppState {
        pool,
        engine: engine.clone(),
        notifier,
        tracker_configured: config.tracker.is_some(),
    };

    let scheduler = scheduler::start(engine, config.sync_interval_secs);
    let server = server::start(config.bind_addr, state, config.static_dir.clone()).await?;
    tracing::info!(addr = %server.addr(), "risktrack ready");

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");

    server.shutdown().await;
    scheduler.shutdown().await;

    Ok(())
}
