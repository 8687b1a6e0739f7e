//! Batch run summary - Fail-open Bookkeeping Shared by All Jobs
//!
//! A run records every item outcome and always produces a summary, even
//! when every item failed. A batch containing both successes and failures
//! is a `partial_failure` outcome in the event log, not a raised error;
//! the process still exits 0.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ports::repository::EventRecord;

/// One failed item within an otherwise continuing run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemFailure {
  pub item: String,
  pub error: String,
}

/// One item excluded from processing, with its reason.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedItem {
  pub item: String,
  pub reason: String,
}

/// Aggregated outcome of one batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
  pub job: String,
  pub started_at: DateTime<Utc>,
  pub finished_at: Option<DateTime<Utc>>,
  pub succeeded: usize,
  pub failed: usize,
  pub skipped: usize,
  /// Sum over successful items only.
  pub total_amount: Decimal,
  pub currency: String,
  pub failures: Vec<ItemFailure>,
  pub skipped_items: Vec<SkippedItem>,
}

impl BatchSummary {
  pub fn new(job: &str) -> Self {
    Self {
      job: job.to_string(),
      started_at: Utc::now(),
      finished_at: None,
      succeeded: 0,
      failed: 0,
      skipped: 0,
      total_amount: Decimal::ZERO,
      currency: "EUR".to_string(),
      failures: Vec::new(),
      skipped_items: Vec::new(),
    }
  }

  pub fn record_success(&mut self, amount: Option<Decimal>) {
    self.succeeded += 1;
    if let Some(amount) = amount {
      self.total_amount += amount;
    }
  }

  pub fn record_failure(&mut self, item: &str, error: impl std::fmt::Display) {
    self.failed += 1;
    self.failures.push(ItemFailure {
      item: item.to_string(),
      error: error.to_string(),
    });
  }

  /// A single failure that sinks `count` items (a consolidated booking).
  pub fn record_batch_failure(&mut self, count: usize, item: &str, error: impl std::fmt::Display) {
    self.failed += count;
    self.failures.push(ItemFailure {
      item: item.to_string(),
      error: error.to_string(),
    });
  }

  pub fn record_skip(&mut self, item: &str, reason: impl std::fmt::Display) {
    self.skipped += 1;
    self.skipped_items.push(SkippedItem {
      item: item.to_string(),
      reason: reason.to_string(),
    });
  }

  pub fn finish(&mut self) {
    self.finished_at = Some(Utc::now());
  }

  /// Outcome keyword for the event log.
  pub fn outcome(&self) -> &'static str {
    match (self.succeeded, self.failed) {
      (_, 0) => "completed",
      (0, _) => "failed",
      _ => "partial_failure",
    }
  }

  /// Render the summary into an event-log record.
  pub fn to_event(&self) -> EventRecord {
    EventRecord::new(
      &self.job,
      self.outcome(),
      serde_json::to_value(self).unwrap_or_else(|_| serde_json::json!({})),
    )
  }
}
