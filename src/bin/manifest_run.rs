//! Manifest Run — Standalone Batch Executable
//!
//! Consolidates yesterday's paid sea-shipping orders into one forwarder
//! booking, generates manifest and packing list, delivers them, and
//! writes per-order shipment records. Exit code 0 on completion, even
//! when the booking fails (the failure is in the event log); non-zero
//! only on a top-level unrecoverable error.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::info;

use tradehaven_logistics::adapters::delivery::DeliveryChannel;
use tradehaven_logistics::adapters::maritime::MaritimeForwarder;
use tradehaven_logistics::adapters::persistence::FileRepository;
use tradehaven_logistics::config::loader;
use tradehaven_logistics::ports::carrier::CarrierApi;
use tradehaven_logistics::usecases::manifest_run::ManifestJob;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("manifest-run failed: {e:#}");
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
        partner = %config.maritime.partner_name,
        "Starting manifest run"
    );

    // ── 3. Wire storage, delivery channel and forwarder ─────
    let repo = Arc::new(
        FileRepository::from_data_dir(&config.persistence.data_dir)
            .await
            .context("Failed to open data directory")?,
    );
    let channel = DeliveryChannel::from_config(&config.delivery);
    let forwarder = Arc::new(MaritimeForwarder::from_config(&config.maritime, channel));

    // ── 4. Run for the prior calendar day ───────────────────
    let job = ManifestJob::new(
        Arc::clone(&forwarder),
        repo,
        config.maritime.shipper.to_party(),
        config.maritime.consignee.to_party(),
    );
    let summary = job.run(Utc::now().date_naive()).await?;

    info!(
        mode = %forwarder.mode(),
        outcome = summary.outcome(),
        orders = summary.succeeded + summary.failed,
        "Manifest run finished"
    );
    Ok(())
}
