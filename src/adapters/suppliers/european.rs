//! European Supplier Gateway — EU Warehouse Catalog
//!
//! REST catalog with bearer-token auth: `GET /products`, `POST /orders`,
//! `GET /tracking/{id}`. Prices arrive in integer cents; tracking numbers
//! carry the configured prefix (default `EUS`).

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, instrument, warn};

use crate::config::SupplierEndpointConfig;
use crate::domain::money::from_minor_units;
use crate::domain::supplier::{
    SupplierKind, SupplierOrder, SupplierOrderReceipt, SupplierProduct, SupplierRef,
};
use crate::domain::tracking::{TrackingEvent, TrackingState, TrackingStatus};
use crate::error::{ProviderError, ProviderResult};
use crate::ports::supplier::SupplierGateway;
use crate::ports::OperatingMode;

const PROVIDER: &str = "european-supplier";

/// `GET /products` entry.
#[derive(Debug, Deserialize)]
struct EuProduct {
    id: String,
    name: String,
    price_cents: i64,
    stock: u32,
    delivery_days: u32,
}

/// `POST /orders` response.
#[derive(Debug, Deserialize)]
struct EuOrderResponse {
    order_id: String,
    #[serde(default)]
    tracking_number: Option<String>,
}

/// `GET /tracking/{id}` response.
#[derive(Debug, Deserialize)]
struct EuTrackingResponse {
    #[serde(default)]
    history: Vec<EuTrackingEvent>,
}

#[derive(Debug, Deserialize)]
struct EuTrackingEvent {
    /// PROCESSING | SHIPPED | IN_TRANSIT | CUSTOMS | DELIVERED | ...
    state: String,
    #[serde(default)]
    depot: Option<String>,
    timestamp: DateTime<Utc>,
    #[serde(default)]
    note: String,
}

/// European supplier gateway.
pub struct EuropeanSupplier {
    mode: OperatingMode,
    http: Client,
    base_url: String,
    api_key: Option<String>,
    tracking_prefix: String,
}

impl EuropeanSupplier {
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

    fn normalize_state(state: &str) -> TrackingStatus {
        match state {
            "RECEIVED" => TrackingStatus::Booked,
            "PROCESSING" => TrackingStatus::InPreparation,
            "SHIPPED" => TrackingStatus::Shipped,
            "IN_TRANSIT" => TrackingStatus::InTransit,
            "CUSTOMS" => TrackingStatus::Customs,
            "DELIVERED" => TrackingStatus::Delivered,
            "CANCELLED" => TrackingStatus::Cancelled,
            _ => TrackingStatus::Exception,
        }
    }

    fn simulated_products(&self) -> Vec<SupplierProduct> {
        [
            ("88412", "Beechwood serving tray", 2450_i64, 140_u32),
            ("88413", "Linen table runner", 1890, 85),
            ("88977", "Stoneware vase, small", 3200, 40),
        ]
        .into_iter()
        .map(|(id, title, cents, stock)| SupplierProduct {
            supplier: SupplierRef::new(SupplierKind::EuropeanSupplier, id),
            title: format!("{title} (simulated)"),
            price: from_minor_units(cents),
            currency: "EUR".to_string(),
            stock,
            shipping_estimate: "3 days".to_string(),
        })
        .collect()
    }
}

#[async_trait]
impl SupplierGateway for EuropeanSupplier {
    fn kind(&self) -> SupplierKind {
        SupplierKind::EuropeanSupplier
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

        let body = self.get("/products").await?;
        let wire: Vec<EuProduct> = serde_json::from_str(&body).map_err(|e| {
            ProviderError::upstream(PROVIDER, 200, format!("bad product list: {e}"))
        })?;

        let products = wire
            .into_iter()
            .map(|p| SupplierProduct {
                supplier: SupplierRef::new(SupplierKind::EuropeanSupplier, p.id),
                title: p.name,
                price: from_minor_units(p.price_cents),
                currency: "EUR".to_string(),
                stock: p.stock,
                shipping_estimate: format!("{} days", p.delivery_days),
            })
            .collect::<Vec<_>>();

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
                kind: SupplierKind::EuropeanSupplier,
                external_order_id: format!("EU-SIM-{}", Utc::now().timestamp()),
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
            "reference": order.reference,
            "recipient": {
                "name": order.recipient.name,
                "street": order.recipient.address_line,
                "city": order.recipient.city,
                "zip": order.recipient.postal_code,
                "country": order.recipient.country_code,
            },
            "items": order.items.iter().map(|i| serde_json::json!({
                "product_id": i.external_id,
                "quantity": i.quantity,
            })).collect::<Vec<_>>(),
        });

        let response = self
            .http
            .post(format!("{}/orders", self.base_url))
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

        let wire: EuOrderResponse = serde_json::from_str(&body).map_err(|e| {
            ProviderError::upstream(PROVIDER, status.as_u16(), format!("bad order response: {e}"))
        })?;

        info!(provider = PROVIDER, external_order_id = %wire.order_id, "Order placed");
        Ok(SupplierOrderReceipt {
            kind: SupplierKind::EuropeanSupplier,
            external_order_id: wire.order_id,
            tracking_number: wire.tracking_number,
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
                status: TrackingStatus::InPreparation,
                location: Some("EU warehouse".to_string()),
                timestamp: Utc::now(),
                description: "Order picked (simulated)".to_string(),
            }])
            .ok_or_else(|| ProviderError::NotFound(tracking_number.to_string()));
        }

        let body = self.get(&format!("/tracking/{tracking_number}")).await?;
        let wire: EuTrackingResponse = serde_json::from_str(&body).map_err(|e| {
            ProviderError::upstream(PROVIDER, 200, format!("bad tracking response: {e}"))
        })?;

        let events = wire
            .history
            .into_iter()
            .map(|e| TrackingEvent {
                status: Self::normalize_state(&e.state),
                location: e.depot,
                timestamp: e.timestamp,
                description: e.note,
            })
            .collect();

        TrackingState::from_events(events)
            .ok_or_else(|| ProviderError::NotFound(tracking_number.to_string()))
    }

    async fn is_healthy(&self) -> bool {
        match self.mode {
            OperatingMode::Simulated => true,
            OperatingMode::Live => self.get("/products").await.is_ok(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::shipping::Party;
    use crate::domain::supplier::SupplierOrderLine;

    fn simulated() -> EuropeanSupplier {
        EuropeanSupplier::from_config(&SupplierEndpointConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            api_key: None,
            tracking_prefix: "EUS".to_string(),
            timeout_seconds: 1,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn simulated_catalog_is_prefixed_and_priced() {
        let gateway = simulated();
        assert_eq!(gateway.mode(), OperatingMode::Simulated);

        let products = gateway.fetch_products().await.unwrap();
        assert!(!products.is_empty());
        for product in &products {
            assert!(product.internal_id().starts_with("eu_"));
            assert!(product.price > rust_decimal::Decimal::ZERO);
        }
    }

    #[tokio::test]
    async fn simulated_order_yields_prefixed_tracking_number() {
        let gateway = simulated();
        let order = SupplierOrder {
            reference: "ORD-9".to_string(),
            recipient: Party {
                name: "Jo Verlinden".to_string(),
                company: None,
                address_line: "Kade 3".to_string(),
                city: "Antwerp".to_string(),
                postal_code: "2000".to_string(),
                country_code: "BE".to_string(),
                email: None,
                phone: None,
            },
            items: vec![SupplierOrderLine {
                external_id: "88412".to_string(),
                quantity: 2,
            }],
        };
        let receipt = gateway.create_order(&order).await.unwrap();
        assert_eq!(receipt.kind, SupplierKind::EuropeanSupplier);
        assert!(receipt.tracking_number.unwrap().starts_with("EUS"));
    }

    #[tokio::test]
    async fn empty_order_is_rejected_before_network() {
        let gateway = simulated();
        let order = SupplierOrder {
            reference: "ORD-9".to_string(),
            recipient: Party {
                name: "Jo".to_string(),
                company: None,
                address_line: "Kade 3".to_string(),
                city: "Antwerp".to_string(),
                postal_code: "2000".to_string(),
                country_code: "BE".to_string(),
                email: None,
                phone: None,
            },
            items: Vec::new(),
        };
        assert!(matches!(
            gateway.create_order(&order).await.unwrap_err(),
            ProviderError::Validation(_)
        ));
    }

    #[tokio::test]
    async fn foreign_tracking_number_is_not_found() {
        let gateway = simulated();
        assert!(!gateway.owns_tracking_number("INTL555"));
        assert!(matches!(
            gateway.track_order("INTL555").await.unwrap_err(),
            ProviderError::NotFound(_)
        ));
    }

    #[test]
    fn wire_states_normalize_into_shared_vocabulary() {
        assert_eq!(
            EuropeanSupplier::normalize_state("PROCESSING"),
            TrackingStatus::InPreparation
        );
        assert_eq!(
            EuropeanSupplier::normalize_state("DELIVERED"),
            TrackingStatus::Delivered
        );
        assert_eq!(
            EuropeanSupplier::normalize_state("LOST?"),
            TrackingStatus::Exception
        );
    }
}
