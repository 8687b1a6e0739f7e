//! Shipment domain types: packages, parties, quotes and bookings.
//!
//! A `Quote` is produced by a carrier quote operation and consumed
//! immediately by the caller; it is never persisted. A `Booking` is the
//! durable output of a book operation — its reference joins downstream
//! shipment records to the carrier side.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{ProviderError, ProviderResult};

/// A physical package with weight and outer dimensions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Package {
    /// Gross weight in kilograms.
    pub weight_kg: Decimal,
    /// Length in centimetres.
    pub length_cm: Decimal,
    /// Width in centimetres.
    pub width_cm: Decimal,
    /// Height in centimetres.
    pub height_cm: Decimal,
}

impl Package {
    pub fn new(weight_kg: Decimal, length_cm: Decimal, width_cm: Decimal, height_cm: Decimal) -> Self {
        Self {
            weight_kg,
            length_cm,
            width_cm,
            height_cm,
        }
    }

    /// Reject zero/negative weight or dimensions before any network call.
    pub fn validate(&self) -> ProviderResult<()> {
        let dims = [self.weight_kg, self.length_cm, self.width_cm, self.height_cm];
        if dims.iter().any(|d| *d <= Decimal::ZERO) {
            return Err(ProviderError::Validation(
                "package weight and dimensions must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Validate a quote request's package list: non-empty, all positive.
pub fn validate_packages(packages: &[Package]) -> ProviderResult<()> {
    if packages.is_empty() {
        return Err(ProviderError::Validation(
            "at least one package is required".to_string(),
        ));
    }
    for package in packages {
        package.validate()?;
    }
    Ok(())
}

/// A shipper, receiver or consignee block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Party {
    pub name: String,
    #[serde(default)]
    pub company: Option<String>,
    pub address_line: String,
    pub city: String,
    pub postal_code: String,
    /// ISO 3166-1 alpha-2.
    pub country_code: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Origin/destination of a quote request (no full address needed).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteEndpoint {
    pub country_code: String,
    pub postal_code: String,
    pub city: String,
}

/// A rated service option returned by a quote operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub service_code: String,
    pub service_name: String,
    pub total_price: Decimal,
    pub currency: String,
    /// Human-readable transit estimate, e.g. "2 business days".
    pub transit_estimate: String,
    /// Same-day cutoff, when the provider declares one.
    #[serde(default)]
    pub cutoff_time: Option<String>,
}

/// Kind of document artifact attached to a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    ManifestCsv,
    PackingListPdf,
    WaybillPdf,
}

/// Metadata for a document produced by a booking.
///
/// Bytes are not carried here; generated files live in a scoped workspace
/// for the duration of the booking attempt (see `adapters::documents`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentArtifact {
    pub kind: DocumentKind,
    pub file_name: String,
    pub size_bytes: u64,
}

/// Durable result of a book operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    /// Tracking or booking reference; the key joining shipment records.
    pub reference: String,
    pub cost_estimate: Decimal,
    pub currency: String,
    pub documents: Vec<DocumentArtifact>,
}

/// One manifest row: a single line item of an originating order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestLine {
    pub order_ref: String,
    pub sku: String,
    pub description: String,
    pub quantity: u32,
    pub weight_kg: Decimal,
    pub value_eur: Decimal,
    pub hs_code: String,
}

/// Everything a carrier needs to book a shipment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipmentDetails {
    /// Caller-side reference (order id or consolidation id).
    pub reference: String,
    pub shipper: Party,
    pub receiver: Party,
    pub packages: Vec<Package>,
    /// Line items; drives customs payloads and forwarder manifests.
    pub lines: Vec<ManifestLine>,
    pub currency: String,
}

impl ShipmentDetails {
    /// Total declared value across all lines.
    pub fn declared_value(&self) -> Decimal {
        self.lines
            .iter()
            .map(|l| l.value_eur * Decimal::from(l.quantity))
            .sum()
    }

    /// Total gross weight across all lines.
    pub fn total_weight_kg(&self) -> Decimal {
        self.lines
            .iter()
            .map(|l| l.weight_kg * Decimal::from(l.quantity))
            .sum()
    }
}

/// Internal shipment record joined to a carrier booking by reference.
///
/// Manifest generation intentionally fans one booking out to many records:
/// every originating order gets its own row, all sharing the booking
/// reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipmentRecord {
    pub order_id: String,
    pub booking_reference: String,
    pub carrier: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn package() -> Package {
        Package::new(dec!(2.5), dec!(30), dec!(20), dec!(15))
    }

    #[test]
    fn empty_package_list_is_rejected() {
        let err = validate_packages(&[]).unwrap_err();
        assert!(matches!(err, ProviderError::Validation(_)));
    }

    #[test]
    fn non_positive_dimension_is_rejected() {
        let mut bad = package();
        bad.height_cm = Decimal::ZERO;
        assert!(validate_packages(&[package(), bad]).is_err());
    }

    #[test]
    fn declared_value_and_weight_multiply_by_quantity() {
        let details = ShipmentDetails {
            reference: "ORD-1".to_string(),
            shipper: sample_party(),
            receiver: sample_party(),
            packages: vec![package()],
            lines: vec![ManifestLine {
                order_ref: "ORD-1".to_string(),
                sku: "SKU-9".to_string(),
                description: "Ceramic mug".to_string(),
                quantity: 4,
                weight_kg: dec!(0.5),
                value_eur: dec!(7.25),
                hs_code: "691200".to_string(),
            }],
            currency: "EUR".to_string(),
        };
        assert_eq!(details.declared_value(), dec!(29.00));
        assert_eq!(details.total_weight_kg(), dec!(2.0));
    }

    fn sample_party() -> Party {
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
}
