//! Rate Sync — Standalone Batch Executable
//!
//! Rates the configured route matrix against the express courier and
//! persists the raw results as audit entries. Exit code 0 on completion,
//! even with partial item failures; non-zero only on a top-level
//! unrecoverable error (unreadable config, unreachable storage).

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use tradehaven_logistics::adapters::express::ExpressCourier;
use tradehaven_logistics::adapters::persistence::FileRepository;
use tradehaven_logistics::config::loader;
use tradehaven_logistics::ports::carrier::CarrierApi;
use tradehaven_logistics::usecases::rate_sync::RateSyncJob;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("rate-sync failed: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // ── 1. Load configuration ───────────────────────────────
    let config = loader::load_from_env().context("Failed to load configuration")?;

    // ── 2. Initialize structured JSON logging ───────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.app.log_level)),
        )
        .json()
        .init();

    info!(
        tenant = %config.app.tenant,
        version = env!("CARGO_PKG_VERSION"),
        routes = config.rate_sync.routes.len(),
        "Starting rate sync"
    );

    // ── 3. Wire storage and the courier adapter ─────────────
    let repo = Arc::new(
        FileRepository::from_data_dir(&config.persistence.data_dir)
            .await
            .context("Failed to open data directory")?,
    );
    let carrier = Arc::new(
        ExpressCourier::from_config(&config.express).context("Failed to build courier adapter")?,
    );

    // ── 4. Run the job ──────────────────────────────────────
    let job = RateSyncJob::new(
        Arc::clone(&carrier),
        repo,
        config.rate_sync.routes.clone(),
        Duration::from_millis(config.rate_sync.pacing_ms),
    );
    let summary = job.run().await?;

    info!(
        mode = %carrier.mode(),
        outcome = summary.outcome(),
        succeeded = summary.succeeded,
        failed = summary.failed,
        "Rate sync finished"
    );
    Ok(())
}
