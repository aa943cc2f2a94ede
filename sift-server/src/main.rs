//! Sift Server
//!
//! HTTP front end of the review analysis pipeline. Each request runs its own
//! pipeline of external worker processes (collect, index, query) and the
//! response carries what the workers printed.
//!
//! Concurrent requests share no state inside the server. They do share the
//! retrieval index the workers keep on disk, and nothing here serializes
//! access to it: two overlapping index/query runs can observe each other's
//! partially written index.

use anyhow::{Context, Result};
use sift_runner::{PipelineOrchestrator, ProcessStageExecutor};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::service::analysis_service::PipelineRequestHandler;
use crate::service::plan::StagePlanner;

pub mod api;
pub mod config;
pub mod service;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "sift_server=debug,sift_runner=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Sift Server...");

    let config = load_config()?;
    tracing::info!(
        "Workers: {} in {} (timeouts: collect {:?}, index {:?}, query {:?})",
        config.worker_program,
        config.worker_dir.display(),
        config.collect_timeout,
        config.index_timeout,
        config.query_timeout
    );

    if !config.worker_dir.is_dir() {
        tracing::warn!(
            "Worker directory {} does not exist; every stage will fail to launch",
            config.worker_dir.display()
        );
    }

    let orchestrator = PipelineOrchestrator::new(Arc::new(ProcessStageExecutor::new()));
    let handler = PipelineRequestHandler::new(orchestrator, StagePlanner::new(config.clone()));

    // Build router with all API endpoints
    let app = api::create_router(Arc::new(handler));

    tracing::info!("Listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;

    Ok(())
}

/// Loads configuration from environment variables and validates it
fn load_config() -> Result<Config> {
    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    Ok(config)
}
