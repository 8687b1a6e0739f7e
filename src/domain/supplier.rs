//! Supplier references, products and dropship orders.
//!
//! Routing between the two dropshipping suppliers is a typed
//! `SupplierRef { kind, external_id }` carried on every product and order
//! item. The legacy `eu_`/`int_` prefix remains only as the wire/storage
//! rendering of a reference, so every internal id ever surfaced to the
//! storefront still routes back to its owning adapter by construction.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::shipping::Party;

/// The two registered dropshipping suppliers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupplierKind {
    EuropeanSupplier,
    InternationalImport,
}

impl SupplierKind {
    /// Storage/wire prefix for internal product ids.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::EuropeanSupplier => "eu_",
            Self::InternationalImport => "int_",
        }
    }

    pub const ALL: [Self; 2] = [Self::EuropeanSupplier, Self::InternationalImport];
}

impl std::fmt::Display for SupplierKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EuropeanSupplier => write!(f, "european-supplier"),
            Self::InternationalImport => write!(f, "international-import"),
        }
    }
}

/// Typed reference to a product at its owning supplier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SupplierRef {
    pub kind: SupplierKind,
    pub external_id: String,
}

impl SupplierRef {
    pub fn new(kind: SupplierKind, external_id: impl Into<String>) -> Self {
        Self {
            kind,
            external_id: external_id.into(),
        }
    }

    /// Render the storefront-internal id, e.g. `eu_88412`.
    pub fn internal_id(&self) -> String {
        format!("{}{}", self.kind.prefix(), self.external_id)
    }

    /// Parse an internal id back into a typed reference.
    pub fn parse(internal_id: &str) -> Option<Self> {
        for kind in SupplierKind::ALL {
            if let Some(external) = internal_id.strip_prefix(kind.prefix()) {
                if !external.is_empty() {
                    return Some(Self::new(kind, external));
                }
            }
        }
        None
    }
}

/// A supplier catalog entry normalized into the shared shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierProduct {
    pub supplier: SupplierRef,
    pub title: String,
    pub price: Decimal,
    pub currency: String,
    pub stock: u32,
    /// Supplier-declared shipping estimate, e.g. "3-5 days".
    pub shipping_estimate: String,
}

impl SupplierProduct {
    /// The id the storefront stores and displays.
    pub fn internal_id(&self) -> String {
        self.supplier.internal_id()
    }
}

/// One line of a dropship order, already typed to its supplier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DropshipItem {
    pub supplier: SupplierRef,
    pub title: String,
    pub quantity: u32,
}

/// A storefront order to be fanned out across suppliers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DropshipOrder {
    pub reference: String,
    pub recipient: Party,
    pub items: Vec<DropshipItem>,
}

/// The per-supplier slice of a dropship order sent to one gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierOrder {
    pub reference: String,
    pub recipient: Party,
    pub items: Vec<SupplierOrderLine>,
}

/// An order line in the owning supplier's own id space.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierOrderLine {
    pub external_id: String,
    pub quantity: u32,
}

/// What a supplier returns for an accepted order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierOrderReceipt {
    pub kind: SupplierKind,
    pub external_order_id: String,
    #[serde(default)]
    pub tracking_number: Option<String>,
    pub accepted_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_recognizes_both_prefixes() {
        let eu = SupplierRef::parse("eu_88412").unwrap();
        assert_eq!(eu.kind, SupplierKind::EuropeanSupplier);
        assert_eq!(eu.external_id, "88412");

        let intl = SupplierRef::parse("int_A-77").unwrap();
        assert_eq!(intl.kind, SupplierKind::InternationalImport);
        assert_eq!(intl.external_id, "A-77");
    }

    #[test]
    fn parse_rejects_unknown_or_empty() {
        assert!(SupplierRef::parse("local_123").is_none());
        assert!(SupplierRef::parse("eu_").is_none());
        assert!(SupplierRef::parse("").is_none());
    }

    #[test]
    fn internal_id_round_trips_through_parse() {
        let original = SupplierRef::new(SupplierKind::InternationalImport, "SKU-42");
        let parsed = SupplierRef::parse(&original.internal_id()).unwrap();
        assert_eq!(parsed, original);
    }
}
