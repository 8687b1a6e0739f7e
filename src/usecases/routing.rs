//! Supplier Routing Manager - One Facade Over N Supplier Gateways
//!
//! Presents `all_products` / `create_order` / `track_order` over the
//! registered supplier gateways. Routing is driven by the typed
//! `SupplierRef` on every item; one supplier's failure never blocks
//! another's.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::domain::supplier::{
  DropshipOrder, SupplierKind, SupplierOrder, SupplierOrderLine, SupplierOrderReceipt,
  SupplierProduct,
};
use crate::domain::tracking::TrackingState;
use crate::error::{ProviderError, ProviderResult};
use crate::ports::supplier::SupplierGateway;

/// Outcome of one supplier's slice of a fanned-out order.
#[derive(Debug)]
pub struct SupplierOrderResult {
  pub kind: SupplierKind,
  pub result: ProviderResult<SupplierOrderReceipt>,
}

/// Facade over the registered supplier gateways.
pub struct SupplierRoutingManager {
  gateways: Vec<Arc<dyn SupplierGateway>>,
}

impl SupplierRoutingManager {
  pub fn new(gateways: Vec<Arc<dyn SupplierGateway>>) -> Self {
    Self { gateways }
  }

  pub fn gateway_count(&self) -> usize {
    self.gateways.len()
  }

  fn gateway_for(&self, kind: SupplierKind) -> Option<&Arc<dyn SupplierGateway>> {
    self.gateways.iter().find(|g| g.kind() == kind)
  }

  /// Aggregate catalog across all gateways.
  ///
  /// A failing gateway is logged and skipped; partial results are
  /// expected and acceptable.
  #[instrument(skip(self))]
  pub async fn all_products(&self) -> Vec<SupplierProduct> {
    let mut products = Vec::new();
    for gateway in &self.gateways {
      match gateway.fetch_products().await {
        Ok(batch) => products.extend(batch),
        Err(e) => {
          warn!(
            supplier = %gateway.kind(),
            error = %e,
            "Supplier failed, skipping in aggregate catalog"
          );
        }
      }
    }
    info!(products = products.len(), "Aggregate catalog assembled");
    products
  }

  /// Fan a storefront order out across its suppliers.
  ///
  /// Items are grouped by their `SupplierRef`; each group is placed
  /// independently and the caller gets one result per supplier, so a
  /// failure at one supplier never blocks another's sub-order.
  #[instrument(skip(self, order), fields(reference = %order.reference, items = order.items.len()))]
  pub async fn create_order(&self, order: &DropshipOrder) -> Vec<SupplierOrderResult> {
    let mut groups: Vec<(SupplierKind, Vec<SupplierOrderLine>)> = Vec::new();
    for item in &order.items {
      let line = SupplierOrderLine {
        external_id: item.supplier.external_id.clone(),
        quantity: item.quantity,
      };
      match groups.iter_mut().find(|(kind, _)| *kind == item.supplier.kind) {
        Some((_, lines)) => lines.push(line),
        None => groups.push((item.supplier.kind, vec![line])),
      }
    }

    let mut results = Vec::with_capacity(groups.len());
    for (kind, items) in groups {
      let result = match self.gateway_for(kind) {
        Some(gateway) => {
          let supplier_order = SupplierOrder {
            reference: order.reference.clone(),
            recipient: order.recipient.clone(),
            items,
          };
          gateway.create_order(&supplier_order).await
        }
        None => Err(ProviderError::Configuration {
          provider: "supplier-routing",
          reason: format!("no gateway registered for {kind}"),
        }),
      };

      if let Err(e) = &result {
        warn!(supplier = %kind, error = %e, "Sub-order failed");
      }
      results.push(SupplierOrderResult { kind, result });
    }
    results
  }

  /// Resolve a tracking number across gateways.
  ///
  /// Fast path first: the gateway whose prefix matches answers
  /// authoritatively. Unrecognized prefixes fall back to probing every
  /// gateway in turn; `NotFound` is raised only after all have been tried.
  #[instrument(skip(self))]
  pub async fn track_order(&self, tracking_number: &str) -> ProviderResult<TrackingState> {
    for gateway in &self.gateways {
      if gateway.owns_tracking_number(tracking_number) {
        return gateway.track_order(tracking_number).await;
      }
    }

    for gateway in &self.gateways {
      match gateway.track_order(tracking_number).await {
        Ok(state) => return Ok(state),
        Err(ProviderError::NotFound(_)) => continue,
        Err(e) => {
          warn!(
            supplier = %gateway.kind(),
            error = %e,
            "Probe failed, trying next gateway"
          );
        }
      }
    }

    Err(ProviderError::NotFound(tracking_number.to_string()))
  }
}
