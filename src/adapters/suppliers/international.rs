//! International Import Gateway — Overseas Dropship Catalog
//!
//! Independent of the European supplier, with its own wire vocabulary:
//! `GET /catalog/items`, `POST /purchase-orders`, `GET /shipments/{tn}`.
//! Prices arrive as decimal strings in USD-denominated fields the partner
//! nonetheless settles in EUR; tracking numbers carry the configured
//! prefix (default `INTL`).

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{info, instrument, warn};

use crate::config::SupplierEndpointConfig;
use crate::domain::supplier::{
    SupplierKind, SupplierOrder, SupplierOrderReceipt, SupplierProduct, SupplierRef,
};
use crate::domain::tracking::{TrackingEvent, TrackingState, TrackingStatus};
use crate::error::{ProviderError, ProviderResult};
use crate::ports::supplier::SupplierGateway;
use crate::ports::OperatingMode;

const PROVIDER: &str = "international-import";

/// `GET /catalog/items` entry.
#[derive(Debug, Deserialize)]
struct IntlItem {
    sku: String,
    title: String,
    /// Decimal string, e.g. "12.40".
    unit_price: String,
    available: u32,
    est_shipping_days: u32,
}

/// `POST /purchase-orders` response.
#[derive(Debug, Deserialize)]
struct IntlOrderResponse {
    po_number: String,
    #[serde(default)]
    shipment_id: Option<String>,
}

/// `GET /shipments/{tn}` response.
#[derive(Debug, Deserialize)]
struct IntlShipmentResponse {
    #[serde(default)]
    checkpoints: Vec<IntlCheckpoint>,
}

#[derive(Debug, Deserialize)]
struct IntlCheckpoint {
    /// created | packed | dispatched | linehaul | customs_hold | delivered
    phase: String,
    #[serde(default)]
    port: Option<String>,
    time: DateTime<Utc>,
    #[serde(default)]
    remark: String,
}

/// International import gateway.
pub struct InternationalImport {
    mode: OperatingMode,
    http: Client,
    base_url: String,
    api_key: Option<String>,
    tracking_prefix: String,
}

impl InternationalImport {
    pub fn from_config(config: &SupplierEndpointConfig) -> anyhow::Result<Self> {
        use anyhow::Context;

        let mode = if config.api_key.is_some() {
            OperatingMode::Live
        } else {
            warn!(provider = PROVIDER, "API key absent, running simulated");
            OperatingMode::Simulated
        };

        Ok(Self {
            mode,
            http: Client::builder()
                .timeout(Duration::from_secs(config.timeout_seconds))
                .build()
                .context("Failed to build HTTP client")?,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            tracking_prefix: config.tracking_prefix.clone(),
        })
    }

    async fn get(&self, path: &str) -> ProviderResult<String> {
        let api_key = self.api_key.as_ref().ok_or_else(|| {
            ProviderError::configuration(PROVIDER, "adapter is simulated")
        })?;
        let response = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .bearer_auth(api_key)
            .send()
            .await
            .map_err(|source| ProviderError::Transport {
                provider: PROVIDER,
                source,
            })?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(ProviderError::upstream(PROVIDER, status.as_u16(), body));
        }
        Ok(body)
    }

    fn normalize_phase(phase: &str) -> TrackingStatus {
        match phase {
            "created" => TrackingStatus::Booked,
            "packed" => TrackingStatus::InPreparation,
            "dispatched" => TrackingStatus::Shipped,
            "linehaul" => TrackingStatus::InTransit,
            "customs_hold" => TrackingStatus::Customs,
            "delivered" => TrackingStatus::Delivered,
            "voided" => TrackingStatus::Cancelled,
            _ => TrackingStatus::Exception,
        }
    }

    fn simulated_products(&self) -> Vec<SupplierProduct> {
        [
            ("IMP-1001", "Bamboo storage basket", "9.80", 400_u32, 18_u32),
            ("IMP-1002", "Rattan pendant shade", "21.30", 120, 21),
        ]
        .into_iter()
        .map(|(sku, title, price, stock, days)| SupplierProduct {
            supplier: SupplierRef::new(SupplierKind::InternationalImport, sku),
            title: format!("{title} (simulated)"),
            price: price.parse().expect("static price literal"),
            currency: "EUR".to_string(),
            stock,
            shipping_estimate: format!("{days} days"),
        })
        .collect()
    }
}

#[async_trait]
impl SupplierGateway for InternationalImport {
    fn kind(&self) -> SupplierKind {
        SupplierKind::InternationalImport
    }

    fn mode(&self) -> OperatingMode {
        self.mode
    }

    fn owns_tracking_number(&self, tracking_number: &str) -> bool {
        tracking_number.starts_with(&self.tracking_prefix)
    }

    #[instrument(skip(self))]
    async fn fetch_products(&self) -> ProviderResult<Vec<SupplierProduct>> {
        if !self.mode.is_live() {
            return Ok(self.simulated_products());
        }

        let body = self.get("/catalog/items").await?;
        let wire: Vec<IntlItem> = serde_json::from_str(&body).map_err(|e| {
            ProviderError::upstream(PROVIDER, 200, format!("bad catalog: {e}"))
        })?;

        // Either every item normalizes or the whole call fails.
        let mut products = Vec::with_capacity(wire.len());
        for item in wire {
            let price: Decimal = item.unit_price.parse().map_err(|_| {
                ProviderError::upstream(
                    PROVIDER,
                    200,
                    format!("unparseable unit_price for {}", item.sku),
                )
            })?;
            products.push(SupplierProduct {
                supplier: SupplierRef::new(SupplierKind::InternationalImport, item.sku),
                title: item.title,
                price,
                currency: "EUR".to_string(),
                stock: item.available,
                shipping_estimate: format!("{} days", item.est_shipping_days),
            });
        }

        info!(provider = PROVIDER, products = products.len(), "Catalog fetched");
        Ok(products)
    }

    #[instrument(skip(self, order), fields(reference = %order.reference, items = order.items.len()))]
    async fn create_order(&self, order: &SupplierOrder) -> ProviderResult<SupplierOrderReceipt> {
        if order.items.is_empty() {
            return Err(ProviderError::Validation(
                "supplier order has no items".to_string(),
            ));
        }

        if !self.mode.is_live() {
            return Ok(SupplierOrderReceipt {
                kind: SupplierKind::InternationalImport,
                external_order_id: format!("PO-SIM-{}", Utc::now().timestamp()),
                tracking_number: Some(format!(
                    "{}{}",
                    self.tracking_prefix,
                    Utc::now().timestamp()
                )),
                accepted_at: Utc::now(),
            });
        }

        let api_key = self.api_key.as_ref().ok_or_else(|| {
            ProviderError::configuration(PROVIDER, "adapter is simulated")
        })?;
        let payload = serde_json::json!({
            "client_reference": order.reference,
            "deliver_to": {
                "contact": order.recipient.name,
                "address_1": order.recipient.address_line,
                "city": order.recipient.city,
                "postcode": order.recipient.postal_code,
                "country": order.recipient.country_code,
            },
            "lines": order.items.iter().map(|i| serde_json::json!({
                "sku": i.external_id,
                "qty": i.quantity,
            })).collect::<Vec<_>>(),
        });

        let response = self
            .http
            .post(format!("{}/purchase-orders", self.base_url))
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|source| ProviderError::Transport {
                provider: PROVIDER,
                source,
            })?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(ProviderError::upstream(PROVIDER, status.as_u16(), body));
        }

        let wire: IntlOrderResponse = serde_json::from_str(&body).map_err(|e| {
            ProviderError::upstream(PROVIDER, status.as_u16(), format!("bad PO response: {e}"))
        })?;

        info!(provider = PROVIDER, po_number = %wire.po_number, "Purchase order placed");
        Ok(SupplierOrderReceipt {
            kind: SupplierKind::InternationalImport,
            external_order_id: wire.po_number,
            tracking_number: wire.shipment_id,
            accepted_at: Utc::now(),
        })
    }

    #[instrument(skip(self))]
    async fn track_order(&self, tracking_number: &str) -> ProviderResult<TrackingState> {
        if !self.owns_tracking_number(tracking_number) {
            return Err(ProviderError::NotFound(tracking_number.to_string()));
        }

        if !self.mode.is_live() {
            return TrackingState::from_events(vec![TrackingEvent {
                status: TrackingStatus::Shipped,
                location: Some("Origin port".to_string()),
                timestamp: Utc::now(),
                description: "Dispatched (simulated)".to_string(),
            }])
            .ok_or_else(|| ProviderError::NotFound(tracking_number.to_string()));
        }

        let body = self.get(&format!("/shipments/{tracking_number}")).await?;
        let wire: IntlShipmentResponse = serde_json::from_str(&body).map_err(|e| {
            ProviderError::upstream(PROVIDER, 200, format!("bad shipment response: {e}"))
        })?;

        let events = wire
            .checkpoints
            .into_iter()
            .map(|c| TrackingEvent {
                status: Self::normalize_phase(&c.phase),
                location: c.port,
                timestamp: c.time,
                description: c.remark,
            })
            .collect();

        TrackingState::from_events(events)
            .ok_or_else(|| ProviderError::NotFound(tracking_number.to_string()))
    }

    async fn is_healthy(&self) -> bool {
        match self.mode {
            OperatingMode::Simulated => true,
            OperatingMode::Live => self.get("/catalog/items").await.is_ok(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simulated() -> InternationalImport {
        InternationalImport::from_config(&SupplierEndpointConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            api_key: None,
            tracking_prefix: "INTL".to_string(),
            timeout_seconds: 1,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn simulated_catalog_uses_int_prefix() {
        let products = simulated().fetch_products().await.unwrap();
        assert!(!products.is_empty());
        assert!(products.iter().all(|p| p.internal_id().starts_with("int_")));
    }

    #[tokio::test]
    async fn owns_only_its_prefix() {
        let gateway = simulated();
        assert!(gateway.owns_tracking_number("INTL20260101"));
        assert!(!gateway.owns_tracking_number("EUS20260101"));
    }

    #[test]
    fn phases_normalize_into_shared_vocabulary() {
        assert_eq!(
            InternationalImport::normalize_phase("linehaul"),
            TrackingStatus::InTransit
        );
        assert_eq!(
            InternationalImport::normalize_phase("customs_hold"),
            TrackingStatus::Customs
        );
        assert_eq!(
            InternationalImport::normalize_phase("mystery"),
            TrackingStatus::Exception
        );
    }
}
