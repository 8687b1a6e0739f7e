//! Repository port — storage behind the batch jobs.
//!
//! Backed by append-only JSONL files; no database dependency. Storage
//! errors are `anyhow` errors and the only class of failure that aborts a
//! whole run, so the trait deliberately does not use `ProviderError`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::order::{StoreOrder, Vendor};
use crate::domain::payout::Payout;
use crate::domain::shipping::ShipmentRecord;

/// One raw quote result persisted by the rate sync job, untransformed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateAuditEntry {
    pub origin: String,
    pub destination: String,
    /// Which representative package profile was rated.
    pub package_profile: String,
    /// The provider's normalized quote list, verbatim as JSON.
    pub quotes: serde_json::Value,
    pub requested_at: DateTime<Utc>,
}

/// A structured entry in the append-only event log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: Uuid,
    /// Job or component that emitted the event.
    pub source: String,
    /// Outcome keyword: completed, failed, manual_follow_up, ...
    pub outcome: String,
    pub at: DateTime<Utc>,
    pub detail: serde_json::Value,
}

impl EventRecord {
    pub fn new(source: &str, outcome: &str, detail: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            source: source.to_string(),
            outcome: outcome.to_string(),
            at: Utc::now(),
            detail,
        }
    }
}

/// Trait for the storage the jobs read pending work from and persist
/// outcomes to.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Paid, sea-shipping orders created on `day` and not yet shipped.
    async fn pending_sea_orders(&self, day: NaiveDate) -> anyhow::Result<Vec<StoreOrder>>;

    /// Orders delivered within the inclusive date range.
    async fn delivered_orders_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> anyhow::Result<Vec<StoreOrder>>;

    /// All registered vendors.
    async fn load_vendors(&self) -> anyhow::Result<Vec<Vendor>>;

    /// Persist shipment records; one write for the whole batch so a failed
    /// booking never leaves partial rows behind.
    async fn save_shipments(&self, records: &[ShipmentRecord]) -> anyhow::Result<()>;

    /// Look up a payout by its idempotency reference.
    async fn payout_by_reference(&self, reference: &str) -> anyhow::Result<Option<Payout>>;

    /// Persist the authoritative payout record.
    async fn save_payout(&self, payout: &Payout) -> anyhow::Result<()>;

    /// Persist one raw rate-sync result.
    async fn save_rate_audit(&self, entry: &RateAuditEntry) -> anyhow::Result<()>;

    /// Append to the structured event log.
    async fn append_event(&self, event: &EventRecord) -> anyhow::Result<()>;

    /// Check the backing storage is writable.
    async fn is_healthy(&self) -> bool;
}
