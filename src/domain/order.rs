//! Minimal storage shapes consumed by the batch jobs.
//!
//! These mirror what the storefront persists about orders and vendors; the
//! jobs only read the fields they need (shipping method, payment/delivery
//! markers, vendor attribution per line).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::payout::BankDetails;

/// How an order leaves the warehouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShippingMethod {
    Express,
    Sea,
}

/// One purchased line item with vendor attribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    pub sku: String,
    pub description: String,
    pub quantity: u32,
    pub unit_weight_kg: Decimal,
    pub unit_value: Decimal,
    pub hs_code: String,
    pub vendor_id: String,
}

impl OrderLine {
    pub fn line_total(&self) -> Decimal {
        self.unit_value * Decimal::from(self.quantity)
    }
}

/// A stored storefront order, as read by the batch jobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreOrder {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub shipping_method: ShippingMethod,
    #[serde(default)]
    pub paid_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub shipped: bool,
    #[serde(default)]
    pub delivered_at: Option<DateTime<Utc>>,
    pub lines: Vec<OrderLine>,
}

impl StoreOrder {
    pub fn is_paid(&self) -> bool {
        self.paid_at.is_some()
    }
}

/// A vendor eligible for weekly payouts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vendor {
    pub id: String,
    pub name: String,
    /// Absence skips the vendor in payout runs (flagged, never paid blind).
    #[serde(default)]
    pub payout_email: Option<String>,
    #[serde(default)]
    pub bank: Option<BankDetails>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn line_total_multiplies_by_quantity() {
        let line = OrderLine {
            sku: "SKU-1".to_string(),
            description: "Walnut board".to_string(),
            quantity: 3,
            unit_weight_kg: dec!(1.2),
            unit_value: dec!(19.90),
            hs_code: "442190".to_string(),
            vendor_id: "vendor-1".to_string(),
        };
        assert_eq!(line.line_total(), dec!(59.70));
    }
}
