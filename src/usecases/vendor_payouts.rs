//! Vendor Payout Job - Weekly Settlement With Idempotent References
//!
//! For the most recently completed Monday-Sunday week, aggregates
//! delivered-order line items by vendor, withholds the configured
//! commission and pays out the net amount. Idempotency lives in the
//! reference string `<tenant>-VENDOR-<vendorId>-<periodStart>`: a payout
//! already persisted under that reference is skipped, so re-running the
//! period never double-pays. The adapter performs no deduplication.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tokio::time::sleep;
use tracing::{info, instrument, warn};

use crate::config::PayoutPolicyConfig;
use crate::domain::order::Vendor;
use crate::domain::payout::{payout_reference, Beneficiary, PayoutRequest};
use crate::domain::statement::{last_complete_week, SkipReason, VendorPayoutBatch};
use crate::ports::payouts::PayoutProvider;
use crate::ports::repository::Repository;

use super::summary::BatchSummary;

const JOB: &str = "vendor-payouts";

/// Resolved payout policy (config floats converted to decimals once).
#[derive(Debug, Clone)]
pub struct PayoutPolicy {
  pub commission_rate: Decimal,
  pub minimum_payout: Decimal,
  pub pacing: Duration,
}

impl PayoutPolicy {
  pub fn from_config(config: &PayoutPolicyConfig) -> Self {
    Self {
      commission_rate: config.commission_rate_decimal(),
      minimum_payout: config.minimum_payout_decimal(),
      pacing: Duration::from_millis(config.pacing_ms),
    }
  }
}

/// Weekly vendor payout batch job.
pub struct VendorPayoutJob<P: PayoutProvider, R: Repository> {
  provider: Arc<P>,
  repo: Arc<R>,
  tenant: String,
  policy: PayoutPolicy,
}

impl<P: PayoutProvider, R: Repository> VendorPayoutJob<P, R> {
  pub fn new(provider: Arc<P>, repo: Arc<R>, tenant: String, policy: PayoutPolicy) -> Self {
    Self {
      provider,
      repo,
      tenant,
      policy,
    }
  }

  /// Run for the week preceding `today`'s week.
  #[instrument(skip(self), fields(tenant = %self.tenant))]
  pub async fn run(&self, today: NaiveDate) -> Result<BatchSummary> {
    let mut summary = BatchSummary::new(JOB);
    let (period_start, period_end) = last_complete_week(today);

    let orders = self
      .repo
      .delivered_orders_between(period_start, period_end)
      .await
      .context("load delivered orders")?;
    let vendors: HashMap<String, Vendor> = self
      .repo
      .load_vendors()
      .await
      .context("load vendors")?
      .into_iter()
      .map(|v| (v.id.clone(), v))
      .collect();

    let batch = VendorPayoutBatch::from_orders(
      period_start,
      period_end,
      &orders,
      self.policy.commission_rate,
    );

    info!(
      %period_start,
      %period_end,
      vendors = batch.statements.len(),
      orders = orders.len(),
      "Computed vendor statements"
    );

    let mut paid_any = false;
    for statement in &batch.statements {
      let vendor = vendors.get(&statement.vendor_id);

      if statement.net_payout < self.policy.minimum_payout {
        summary.record_skip(&statement.vendor_id, SkipReason::AmountTooLow);
        continue;
      }

      let Some(email) = vendor.and_then(|v| v.payout_email.clone()) else {
        warn!(vendor = %statement.vendor_id, "Vendor has no payout email, flagging");
        summary.record_skip(&statement.vendor_id, SkipReason::MissingPayoutEmail);
        continue;
      };

      let reference = payout_reference(&self.tenant, &statement.vendor_id, period_start);
      if self
        .repo
        .payout_by_reference(&reference)
        .await
        .context("payout idempotency lookup")?
        .is_some()
      {
        summary.record_skip(&statement.vendor_id, SkipReason::AlreadyPaid);
        continue;
      }

      // Fixed pacing between consecutive payout calls.
      if paid_any {
        sleep(self.policy.pacing).await;
      }
      paid_any = true;

      let request = PayoutRequest {
        beneficiary: Beneficiary {
          name: vendor
            .map(|v| v.name.clone())
            .unwrap_or_else(|| statement.vendor_id.clone()),
          email,
          bank: vendor.and_then(|v| v.bank.clone()),
        },
        amount: statement.net_payout,
        currency: "EUR".to_string(),
        reference,
      };

      match self.provider.pay(&request).await {
        Ok(payout) => {
          self
            .repo
            .save_payout(&payout)
            .await
            .context("persist payout record")?;
          summary.record_success(Some(statement.net_payout));
          info!(
            vendor = %statement.vendor_id,
            payout_id = %payout.id,
            net = %statement.net_payout,
            "Vendor paid"
          );
        }
        Err(e) if e.is_per_item() => {
          warn!(vendor = %statement.vendor_id, error = %e, "Payout failed, continuing");
          summary.record_failure(&statement.vendor_id, e);
        }
        Err(e) => return Err(e).context("payout provider unusable"),
      }
    }

    summary.finish();
    self
      .repo
      .append_event(&summary.to_event())
      .await
      .context("append payout event")?;

    info!(
      succeeded = summary.succeeded,
      failed = summary.failed,
      skipped = summary.skipped,
      total = %summary.total_amount,
      "Vendor payout run complete"
    );
    Ok(summary)
  }
}
