//! Domain Store — JSONL Files for Orders, Shipments and Payouts
//!
//! The storefront writes `orders.jsonl` and `vendors.jsonl`; the batch
//! jobs read them and append `shipments.jsonl`, `payouts.jsonl` and
//! `rate_audit.jsonl`. Each line is a self-contained JSON record; a
//! malformed line is skipped with a warning rather than poisoning the
//! whole file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::warn;

use crate::domain::order::{StoreOrder, Vendor};
use crate::domain::payout::Payout;
use crate::domain::shipping::ShipmentRecord;
use crate::ports::repository::RateAuditEntry;

/// JSONL-backed domain store rooted in one data directory.
pub struct DomainStore {
    data_dir: PathBuf,
}

impl DomainStore {
    pub async fn new(data_dir: &str) -> Result<Self> {
        let dir = Path::new(data_dir).to_path_buf();
        fs::create_dir_all(&dir)
            .await
            .context("Failed to create data directory")?;
        Ok(Self { data_dir: dir })
    }

    fn file(&self, name: &str) -> PathBuf {
        self.data_dir.join(name)
    }

    /// Read every valid record from a JSONL file; missing file is empty.
    async fn read_jsonl<T: DeserializeOwned>(&self, name: &str) -> Result<Vec<T>> {
        let path = self.file(name);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {name}"))?;

        let mut records = Vec::new();
        for line in content.lines() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<T>(line) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!(file = name, error = %e, "Skipping malformed record");
                }
            }
        }
        Ok(records)
    }

    /// Append records to a JSONL file in one write.
    async fn append_jsonl<T: Serialize>(&self, name: &str, records: &[T]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let mut buffer = String::new();
        for record in records {
            buffer.push_str(
                &serde_json::to_string(record).with_context(|| format!("serialize for {name}"))?,
            );
            buffer.push('\n');
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.file(name))
            .await
            .with_context(|| format!("Failed to open {name}"))?;
        file.write_all(buffer.as_bytes())
            .await
            .with_context(|| format!("Failed to append to {name}"))?;
        file.flush().await?;
        Ok(())
    }

    pub async fn load_orders(&self) -> Result<Vec<StoreOrder>> {
        self.read_jsonl("orders.jsonl").await
    }

    pub async fn load_vendors(&self) -> Result<Vec<Vendor>> {
        self.read_jsonl("vendors.jsonl").await
    }

    /// One write for the whole batch; a failed booking leaves no rows.
    pub async fn append_shipments(&self, records: &[ShipmentRecord]) -> Result<()> {
        self.append_jsonl("shipments.jsonl", records).await
    }

    pub async fn load_shipments(&self) -> Result<Vec<ShipmentRecord>> {
        self.read_jsonl("shipments.jsonl").await
    }

    pub async fn append_payout(&self, payout: &Payout) -> Result<()> {
        self.append_jsonl("payouts.jsonl", std::slice::from_ref(payout))
            .await
    }

    pub async fn load_payouts(&self) -> Result<Vec<Payout>> {
        self.read_jsonl("payouts.jsonl").await
    }

    pub async fn append_rate_audit(&self, entry: &RateAuditEntry) -> Result<()> {
        self.append_jsonl("rate_audit.jsonl", std::slice::from_ref(entry))
            .await
    }

    pub async fn is_healthy(&self) -> bool {
        let probe = self.data_dir.join(".health_check");
        let result = fs::write(&probe, b"ok").await;
        let _ = fs::remove_file(&probe).await;
        result.is_ok()
    }
}
