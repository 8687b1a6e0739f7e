//! Rate Sync Job - Courier Rate Audit Over a Fixed Route Matrix
//!
//! For each configured origin/destination route and each representative
//! package profile, calls `quote()` on the courier adapter and persists
//! the raw result set untransformed as an audit entry. A fixed delay is
//! inserted between requests to respect upstream rate limits.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use rust_decimal_macros::dec;
use tokio::time::sleep;
use tracing::{info, instrument, warn};

use crate::config::RouteConfig;
use crate::domain::shipping::Package;
use crate::ports::carrier::CarrierApi;
use crate::ports::repository::{RateAuditEntry, Repository};

use super::summary::BatchSummary;

const JOB: &str = "rate-sync";

/// Rate sync batch job.
pub struct RateSyncJob<C: CarrierApi, R: Repository> {
  carrier: Arc<C>,
  repo: Arc<R>,
  routes: Vec<RouteConfig>,
  pacing: Duration,
}

impl<C: CarrierApi, R: Repository> RateSyncJob<C, R> {
  pub fn new(carrier: Arc<C>, repo: Arc<R>, routes: Vec<RouteConfig>, pacing: Duration) -> Self {
    Self {
      carrier,
      repo,
      routes,
      pacing,
    }
  }

  /// The fixed package profiles rated for every route.
  pub fn representative_packages() -> Vec<(&'static str, Package)> {
    vec![
      (
        "small-parcel",
        Package::new(dec!(0.5), dec!(25), dec!(18), dec!(5)),
      ),
      (
        "medium-parcel",
        Package::new(dec!(5), dec!(40), dec!(30), dec!(25)),
      ),
      (
        "bulky-parcel",
        Package::new(dec!(20), dec!(60), dec!(50), dec!(40)),
      ),
    ]
  }

  /// Run the full matrix; item failures are recorded and skipped, only
  /// storage or configuration failures abort the run.
  #[instrument(skip(self), fields(routes = self.routes.len()))]
  pub async fn run(&self) -> Result<BatchSummary> {
    let mut summary = BatchSummary::new(JOB);
    let profiles = Self::representative_packages();
    let mut first_request = true;

    for route in &self.routes {
      for (profile, package) in &profiles {
        if !first_request {
          sleep(self.pacing).await;
        }
        first_request = false;

        let item = format!(
          "{}-{}:{}",
          route.origin.country_code, route.destination.country_code, profile
        );

        let quotes = self
          .carrier
          .quote(
            &route.origin.to_route_endpoint(),
            &route.destination.to_route_endpoint(),
            std::slice::from_ref(package),
          )
          .await;

        match quotes {
          Ok(quotes) => {
            let entry = RateAuditEntry {
              origin: format!("{} {}", route.origin.country_code, route.origin.postal_code),
              destination: format!(
                "{} {}",
                route.destination.country_code, route.destination.postal_code
              ),
              package_profile: (*profile).to_string(),
              quotes: serde_json::to_value(&quotes).context("serialize quote audit")?,
              requested_at: Utc::now(),
            };
            self
              .repo
              .save_rate_audit(&entry)
              .await
              .context("persist rate audit entry")?;
            summary.record_success(None);
          }
          Err(e) if e.is_per_item() => {
            warn!(item = %item, error = %e, "Rate request failed, continuing");
            summary.record_failure(&item, e);
          }
          Err(e) => return Err(e).context("courier adapter unusable"),
        }
      }
    }

    summary.finish();
    self
      .repo
      .append_event(&summary.to_event())
      .await
      .context("append rate-sync event")?;

    info!(
      succeeded = summary.succeeded,
      failed = summary.failed,
      "Rate sync complete"
    );
    Ok(summary)
  }
}
