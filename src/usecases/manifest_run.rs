//! Manifest Generation Job - Daily Sea-Freight Consolidation
//!
//! Selects all paid, sea-shipping orders created in the prior full
//! calendar day and not yet shipped, consolidates their line items, and
//! books ONCE for the whole batch. On success every originating order
//! gets its own shipment record referencing the single booking - an
//! intentional one-to-many fan-out. On failure nothing is written.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, Utc};
use rust_decimal_macros::dec;
use tracing::{error, info, instrument};

use crate::domain::order::StoreOrder;
use crate::domain::shipping::{ManifestLine, Package, Party, ShipmentDetails, ShipmentRecord};
use crate::ports::carrier::CarrierApi;
use crate::ports::repository::Repository;

use super::summary::BatchSummary;

const JOB: &str = "manifest-run";

/// Manifest generation batch job.
pub struct ManifestJob<C: CarrierApi, R: Repository> {
  forwarder: Arc<C>,
  repo: Arc<R>,
  shipper: Party,
  consignee: Party,
}

impl<C: CarrierApi, R: Repository> ManifestJob<C, R> {
  pub fn new(forwarder: Arc<C>, repo: Arc<R>, shipper: Party, consignee: Party) -> Self {
    Self {
      forwarder,
      repo,
      shipper,
      consignee,
    }
  }

  /// Consolidate the day's orders into one bookable shipment.
  ///
  /// Every order line becomes exactly one manifest line carrying its
  /// originating order id, so the manifest row count always equals the
  /// total line-item count.
  pub fn consolidate(
    orders: &[StoreOrder],
    shipper: Party,
    consignee: Party,
    day: NaiveDate,
  ) -> ShipmentDetails {
    let lines: Vec<ManifestLine> = orders
      .iter()
      .flat_map(|order| {
        order.lines.iter().map(|line| ManifestLine {
          order_ref: order.id.clone(),
          sku: line.sku.clone(),
          description: line.description.clone(),
          quantity: line.quantity,
          weight_kg: line.unit_weight_kg,
          value_eur: line.unit_value,
          hs_code: line.hs_code.clone(),
        })
      })
      .collect();

    let total_weight = lines
      .iter()
      .map(|l| l.weight_kg * rust_decimal::Decimal::from(l.quantity))
      .sum();

    ShipmentDetails {
      reference: format!("CONSOL-{day}"),
      shipper,
      receiver: consignee,
      // One consolidated pallet profile; the forwarder rates by weight.
      packages: vec![Package::new(total_weight, dec!(120), dec!(100), dec!(100))],
      lines,
      currency: "EUR".to_string(),
    }
  }

  /// Run for the prior full calendar day relative to `today`.
  #[instrument(skip(self))]
  pub async fn run(&self, today: NaiveDate) -> Result<BatchSummary> {
    let mut summary = BatchSummary::new(JOB);
    let day = today - Duration::days(1);

    let orders = self
      .repo
      .pending_sea_orders(day)
      .await
      .context("load pending sea orders")?;

    if orders.is_empty() {
      info!(%day, "No pending sea orders, nothing to consolidate");
      summary.finish();
      self
        .repo
        .append_event(&summary.to_event())
        .await
        .context("append manifest event")?;
      return Ok(summary);
    }

    let details = Self::consolidate(
      &orders,
      self.shipper.clone(),
      self.consignee.clone(),
      day,
    );
    info!(
      orders = orders.len(),
      lines = details.lines.len(),
      "Booking consolidated sea shipment"
    );

    match self.forwarder.book(&details).await {
      Ok(booking) => {
        let now = Utc::now();
        let records: Vec<ShipmentRecord> = orders
          .iter()
          .map(|order| ShipmentRecord {
            order_id: order.id.clone(),
            booking_reference: booking.reference.clone(),
            carrier: self.forwarder.name().to_string(),
            created_at: now,
          })
          .collect();

        // Single write: a storage failure here aborts without partial rows.
        self
          .repo
          .save_shipments(&records)
          .await
          .context("persist shipment records")?;

        for _ in &orders {
          summary.record_success(None);
        }
        summary.total_amount = booking.cost_estimate;

        info!(
          booking_reference = %booking.reference,
          shipments = records.len(),
          documents = booking.documents.len(),
          "Consolidated booking complete"
        );
      }
      Err(e) => {
        // Fail-open: record, write the error event, no shipment rows.
        error!(error = %e, orders = orders.len(), "Consolidated booking failed");
        summary.record_batch_failure(orders.len(), &details.reference, e);
      }
    }

    summary.finish();
    self
      .repo
      .append_event(&summary.to_event())
      .await
      .context("append manifest event")?;
    Ok(summary)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::order::{OrderLine, ShippingMethod};

  fn order(id: &str, line_count: usize) -> StoreOrder {
    StoreOrder {
      id: id.to_string(),
      created_at: Utc::now(),
      shipping_method: ShippingMethod::Sea,
      paid_at: Some(Utc::now()),
      shipped: false,
      delivered_at: None,
      lines: (0..line_count)
        .map(|i| OrderLine {
          sku: format!("SKU-{id}-{i}"),
          description: "Rattan chair".to_string(),
          quantity: 2,
          unit_weight_kg: dec!(4.5),
          unit_value: dec!(75.00),
          hs_code: "940151".to_string(),
          vendor_id: "vendor-1".to_string(),
        })
        .collect(),
    }
  }

  fn party() -> Party {
    Party {
      name: "TradeHaven Fulfilment".to_string(),
      company: None,
      address_line: "Hafenstrasse 12".to_string(),
      city: "Hamburg".to_string(),
      postal_code: "20457".to_string(),
      country_code: "DE".to_string(),
      email: None,
      phone: None,
    }
  }

  #[test]
  fn consolidation_flattens_every_order_line() {
    let orders = vec![order("o1", 2), order("o2", 3), order("o3", 1)];
    let day = NaiveDate::from_ymd_opt(2026, 8, 5).unwrap();
    let details = ManifestJob::<
      crate::adapters::maritime::MaritimeForwarder,
      crate::adapters::persistence::FileRepository,
    >::consolidate(&orders, party(), party(), day);

    assert_eq!(details.lines.len(), 6);
    assert_eq!(details.reference, "CONSOL-2026-08-05");
    assert_eq!(
      details.lines.iter().filter(|l| l.order_ref == "o2").count(),
      3
    );
    // 6 lines x 2 pieces x 4.5 kg
    assert_eq!(details.packages[0].weight_kg, dec!(54.0));
  }
}
