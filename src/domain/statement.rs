//! Vendor settlement statements.
//!
//! A `VendorPayoutBatch` is derived, never authoritative: it is recomputed
//! from delivered-order history each run, and the persisted `Payout` created
//! from it is the durable record.

use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::order::StoreOrder;

/// Per-vendor aggregation over one settlement period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorStatement {
    pub vendor_id: String,
    pub gross_sales: Decimal,
    pub commission_rate: Decimal,
    pub commission_amount: Decimal,
    pub net_payout: Decimal,
    pub orders_count: usize,
}

impl VendorStatement {
    /// Compute commission and net payout, both rounded to cents.
    pub fn compute(
        vendor_id: String,
        gross_sales: Decimal,
        commission_rate: Decimal,
        orders_count: usize,
    ) -> Self {
        let commission_amount = (gross_sales * commission_rate).round_dp(2);
        let net_payout = (gross_sales - commission_amount).round_dp(2);
        Self {
            vendor_id,
            gross_sales: gross_sales.round_dp(2),
            commission_rate,
            commission_amount,
            net_payout,
            orders_count,
        }
    }
}

/// Why a vendor was excluded from a payout run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum SkipReason {
    /// Net payout below the configured minimum.
    AmountTooLow,
    /// Vendor record has no payout email.
    MissingPayoutEmail,
    /// A payout with this reference already exists (re-run of the period).
    AlreadyPaid,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AmountTooLow => write!(f, "amount too low"),
            Self::MissingPayoutEmail => write!(f, "missing payout email"),
            Self::AlreadyPaid => write!(f, "already paid"),
        }
    }
}

/// Derived statement set for one Monday–Sunday settlement week.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorPayoutBatch {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub statements: Vec<VendorStatement>,
}

impl VendorPayoutBatch {
    /// Aggregate delivered-order line items by vendor.
    ///
    /// Orders are expected to be pre-filtered to the period by the caller;
    /// vendors are emitted in stable (sorted) order so re-runs process the
    /// same sequence.
    pub fn from_orders(
        period_start: NaiveDate,
        period_end: NaiveDate,
        orders: &[StoreOrder],
        commission_rate: Decimal,
    ) -> Self {
        let mut gross: BTreeMap<String, Decimal> = BTreeMap::new();
        let mut order_counts: BTreeMap<String, usize> = BTreeMap::new();

        for order in orders {
            let mut vendors_in_order: Vec<&str> = Vec::new();
            for line in &order.lines {
                *gross.entry(line.vendor_id.clone()).or_default() += line.line_total();
                if !vendors_in_order.contains(&line.vendor_id.as_str()) {
                    vendors_in_order.push(&line.vendor_id);
                }
            }
            for vendor_id in vendors_in_order {
                *order_counts.entry(vendor_id.to_string()).or_default() += 1;
            }
        }

        let statements = gross
            .into_iter()
            .map(|(vendor_id, gross_sales)| {
                let orders_count = order_counts.get(&vendor_id).copied().unwrap_or(0);
                VendorStatement::compute(vendor_id, gross_sales, commission_rate, orders_count)
            })
            .collect();

        Self {
            period_start,
            period_end,
            statements,
        }
    }
}

/// The most recently completed Monday–Sunday week strictly before `today`'s
/// current week.
pub fn last_complete_week(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let days_from_monday = i64::from(today.weekday().num_days_from_monday());
    let this_monday = today - Duration::days(days_from_monday);
    let period_start = this_monday - Duration::days(7);
    let period_end = period_start + Duration::days(6);
    (period_start, period_end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{OrderLine, ShippingMethod};
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn order(id: &str, lines: Vec<OrderLine>) -> StoreOrder {
        StoreOrder {
            id: id.to_string(),
            created_at: Utc::now(),
            shipping_method: ShippingMethod::Express,
            paid_at: Some(Utc::now()),
            shipped: true,
            delivered_at: Some(Utc::now()),
            lines,
        }
    }

    fn line(vendor: &str, quantity: u32, unit_value: Decimal) -> OrderLine {
        OrderLine {
            sku: format!("SKU-{vendor}"),
            description: "item".to_string(),
            quantity,
            unit_weight_kg: dec!(0.4),
            unit_value,
            hs_code: "000000".to_string(),
            vendor_id: vendor.to_string(),
        }
    }

    #[test]
    fn hundred_euro_at_eight_percent_nets_ninety_two() {
        let stmt =
            VendorStatement::compute("vendor-1".to_string(), dec!(100), dec!(0.08), 3);
        assert_eq!(stmt.commission_amount, dec!(8.00));
        assert_eq!(stmt.net_payout, dec!(92.00));
    }

    #[test]
    fn aggregation_groups_lines_by_vendor() {
        let orders = vec![
            order("o1", vec![line("a", 2, dec!(25)), line("b", 1, dec!(10))]),
            order("o2", vec![line("a", 1, dec!(50))]),
        ];
        let period = NaiveDate::from_ymd_opt(2026, 7, 27).unwrap();
        let batch =
            VendorPayoutBatch::from_orders(period, period + Duration::days(6), &orders, dec!(0.08));

        assert_eq!(batch.statements.len(), 2);
        let a = &batch.statements[0];
        assert_eq!(a.vendor_id, "a");
        assert_eq!(a.gross_sales, dec!(100.00));
        assert_eq!(a.net_payout, dec!(92.00));
        assert_eq!(a.orders_count, 2);

        let b = &batch.statements[1];
        assert_eq!(b.gross_sales, dec!(10.00));
        assert_eq!(b.orders_count, 1);
    }

    #[test]
    fn last_complete_week_is_monday_through_sunday() {
        // 2026-08-06 is a Thursday; the prior full week is Jul 27 – Aug 02.
        let today = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
        let (start, end) = last_complete_week(today);
        assert_eq!(start, NaiveDate::from_ymd_opt(2026, 7, 27).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2026, 8, 2).unwrap());

        // Run on a Monday: still the week that just ended.
        let monday = NaiveDate::from_ymd_opt(2026, 8, 3).unwrap();
        let (start, end) = last_complete_week(monday);
        assert_eq!(start, NaiveDate::from_ymd_opt(2026, 7, 27).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2026, 8, 2).unwrap());
    }
}
