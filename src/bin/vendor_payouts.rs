//! Vendor Payouts — Standalone Batch Executable
//!
//! Pays out last week's vendor settlements through the business-banking
//! adapter, skipping below-minimum vendors, vendors without a payout
//! email, and references already paid in a previous run. Exit code 0 on
//! completion, even with partial failures; non-zero only on a top-level
//! unrecoverable error.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::info;

use tradehaven_logistics::adapters::banking::BusinessBankPayouts;
use tradehaven_logistics::adapters::persistence::FileRepository;
use tradehaven_logistics::config::loader;
use tradehaven_logistics::ports::payouts::PayoutProvider;
use tradehaven_logistics::usecases::vendor_payouts::{PayoutPolicy, VendorPayoutJob};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("vendor-payouts failed: {e:#}");
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
        commission_rate = config.payouts.commission_rate,
        minimum_payout = config.payouts.minimum_payout,
        "Starting vendor payout run"
    );

    // ── 3. Wire storage and the banking adapter ─────────────
    let repo = Arc::new(
        FileRepository::from_data_dir(&config.persistence.data_dir)
            .await
            .context("Failed to open data directory")?,
    );
    let provider = Arc::new(
        BusinessBankPayouts::from_config(&config.banking)
            .context("Failed to build banking adapter")?,
    );

    // ── 4. Run for the last complete week ───────────────────
    let job = VendorPayoutJob::new(
        Arc::clone(&provider),
        repo,
        config.app.tenant.clone(),
        PayoutPolicy::from_config(&config.payouts),
    );
    let summary = job.run(Utc::now().date_naive()).await?;

    info!(
        mode = %provider.mode(),
        outcome = summary.outcome(),
        succeeded = summary.succeeded,
        skipped = summary.skipped,
        failed = summary.failed,
        total = %summary.total_amount,
        "Vendor payout run finished"
    );
    Ok(())
}
