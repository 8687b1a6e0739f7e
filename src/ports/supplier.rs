//! Supplier port — one gateway per dropshipping catalog.

use async_trait::async_trait;

use super::OperatingMode;
use crate::domain::supplier::{SupplierKind, SupplierOrder, SupplierOrderReceipt, SupplierProduct};
use crate::domain::tracking::TrackingState;
use crate::error::ProviderResult;

/// Contract over a single supplier catalog API.
///
/// The routing manager fans orders out across gateways and aggregates
/// tracking; a gateway only ever answers for its own catalog.
#[async_trait]
pub trait SupplierGateway: Send + Sync {
    /// Which supplier this gateway fronts.
    fn kind(&self) -> SupplierKind;

    fn mode(&self) -> OperatingMode;

    /// Fast-path check: does this tracking number carry our prefix?
    fn owns_tracking_number(&self, tracking_number: &str) -> bool;

    /// Full catalog, normalized into the shared product shape.
    async fn fetch_products(&self) -> ProviderResult<Vec<SupplierProduct>>;

    /// Place the per-supplier slice of a storefront order.
    async fn create_order(&self, order: &SupplierOrder) -> ProviderResult<SupplierOrderReceipt>;

    /// Resolve a tracking number this supplier issued.
    ///
    /// Returns `NotFound` when the number is not recognized, which the
    /// routing manager uses while probing gateways in turn.
    async fn track_order(&self, tracking_number: &str) -> ProviderResult<TrackingState>;

    async fn is_healthy(&self) -> bool;
}
