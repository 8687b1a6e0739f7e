//! Repository Implementation — Concrete Adapter for the Repository Port
//!
//! Wraps `DomainStore` (JSONL domain records) and `EventLog` (append-only
//! audit trail) into a single struct implementing the `Repository` trait.
//! The usecases layer only knows the trait, never files or JSON.

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

use super::event_log::EventLog;
use super::store::DomainStore;
use crate::domain::order::{ShippingMethod, StoreOrder, Vendor};
use crate::domain::payout::Payout;
use crate::domain::shipping::ShipmentRecord;
use crate::ports::repository::{EventRecord, RateAuditEntry, Repository};

/// File-backed repository combining the domain store and the event log.
pub struct FileRepository {
    store: DomainStore,
    events: EventLog,
}

impl FileRepository {
    pub fn new(store: DomainStore, events: EventLog) -> Self {
        Self { store, events }
    }

    /// Initialize both halves inside one data directory.
    pub async fn from_data_dir(data_dir: &str) -> Result<Self> {
        let store = DomainStore::new(data_dir).await?;
        let events = EventLog::new(data_dir).await?;
        Ok(Self::new(store, events))
    }

    /// Direct event-log access for operator tooling.
    pub fn event_log(&self) -> &EventLog {
        &self.events
    }
}

#[async_trait]
impl Repository for FileRepository {
    async fn pending_sea_orders(&self, day: NaiveDate) -> Result<Vec<StoreOrder>> {
        let orders = self.store.load_orders().await?;
        Ok(orders
            .into_iter()
            .filter(|o| {
                o.shipping_method == ShippingMethod::Sea
                    && o.is_paid()
                    && !o.shipped
                    && o.created_at.date_naive() == day
            })
            .collect())
    }

    async fn delivered_orders_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<StoreOrder>> {
        let orders = self.store.load_orders().await?;
        Ok(orders
            .into_iter()
            .filter(|o| {
                o.delivered_at
                    .map(|d| {
                        let day = d.date_naive();
                        day >= from && day <= to
                    })
                    .unwrap_or(false)
            })
            .collect())
    }

    async fn load_vendors(&self) -> Result<Vec<Vendor>> {
        self.store.load_vendors().await
    }

    async fn save_shipments(&self, records: &[ShipmentRecord]) -> Result<()> {
        self.store.append_shipments(records).await
    }

    async fn payout_by_reference(&self, reference: &str) -> Result<Option<Payout>> {
        let payouts = self.store.load_payouts().await?;
        Ok(payouts.into_iter().find(|p| p.reference == reference))
    }

    async fn save_payout(&self, payout: &Payout) -> Result<()> {
        self.store.append_payout(payout).await
    }

    async fn save_rate_audit(&self, entry: &RateAuditEntry) -> Result<()> {
        self.store.append_rate_audit(entry).await
    }

    async fn append_event(&self, event: &EventRecord) -> Result<()> {
        self.events.append(event).await
    }

    async fn is_healthy(&self) -> bool {
        self.store.is_healthy().await && self.events.is_healthy().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::OrderLine;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    async fn repo_with_orders(orders: &[StoreOrder]) -> (tempfile::TempDir, FileRepository) {
        let dir = tempfile::tempdir().unwrap();
        let mut content = String::new();
        for order in orders {
            content.push_str(&serde_json::to_string(order).unwrap());
            content.push('\n');
        }
        std::fs::write(dir.path().join("orders.jsonl"), content).unwrap();
        let repo = FileRepository::from_data_dir(dir.path().to_str().unwrap())
            .await
            .unwrap();
        (dir, repo)
    }

    fn sea_order(id: &str, created_day: u32, paid: bool, shipped: bool) -> StoreOrder {
        StoreOrder {
            id: id.to_string(),
            created_at: Utc.with_ymd_and_hms(2026, 8, created_day, 10, 0, 0).unwrap(),
            shipping_method: ShippingMethod::Sea,
            paid_at: paid.then(|| Utc.with_ymd_and_hms(2026, 8, created_day, 11, 0, 0).unwrap()),
            shipped,
            delivered_at: None,
            lines: vec![OrderLine {
                sku: "SKU-1".to_string(),
                description: "Oak shelf".to_string(),
                quantity: 1,
                unit_weight_kg: dec!(3.4),
                unit_value: dec!(49.90),
                hs_code: "940360".to_string(),
                vendor_id: "vendor-1".to_string(),
            }],
        }
    }

    #[tokio::test]
    async fn pending_sea_orders_filters_day_payment_and_shipped_flag() {
        let orders = vec![
            sea_order("match", 5, true, false),
            sea_order("wrong-day", 4, true, false),
            sea_order("unpaid", 5, false, false),
            sea_order("already-shipped", 5, true, true),
        ];
        let (_dir, repo) = repo_with_orders(&orders).await;

        let day = NaiveDate::from_ymd_opt(2026, 8, 5).unwrap();
        let pending = repo.pending_sea_orders(day).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, "match");
    }

    #[tokio::test]
    async fn payout_lookup_by_reference_finds_saved_payout() {
        let (_dir, repo) = repo_with_orders(&[]).await;
        let payout = crate::domain::payout::Payout {
            id: "pay-1".to_string(),
            beneficiary: crate::domain::payout::Beneficiary {
                name: "Atelier Nord".to_string(),
                email: "ops@atelier-nord.de".to_string(),
                bank: None,
            },
            amount: dec!(92.00),
            currency: "EUR".to_string(),
            reference: "TRADEHAVEN-VENDOR-v1-2026-07-27".to_string(),
            state: crate::domain::payout::PayoutState::Pending,
            created_at: Utc::now(),
            completed_at: None,
        };

        assert!(repo
            .payout_by_reference(&payout.reference)
            .await
            .unwrap()
            .is_none());
        repo.save_payout(&payout).await.unwrap();
        let found = repo.payout_by_reference(&payout.reference).await.unwrap();
        assert_eq!(found.unwrap().id, "pay-1");
    }
}
