//! Express Courier Adapter — Quotes, Bookings and Tracking
//!
//! Implements the `CarrierApi` port against the courier's JSON REST API.
//! Live mode authenticates via the OAuth2 client-credentials exchange in
//! `auth.rs`; a 401 triggers exactly one re-authentication retry, never a
//! loop. With any credential absent the adapter is constructed in
//! simulated mode and serves deterministic placeholder results without any
//! network access.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use chrono::{DateTime, Utc};
use reqwest::{Client, Method, StatusCode};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{info, instrument, warn};

use super::auth::BearerTokenManager;
use super::types::{BookingResponse, RateResponse, TrackingResponse};
use crate::config::ExpressConfig;
use crate::domain::shipping::{
    validate_packages, Booking, DocumentArtifact, DocumentKind, Package, Quote, RouteEndpoint,
    ShipmentDetails,
};
use crate::domain::tracking::{TrackingEvent, TrackingState, TrackingStatus};
use crate::error::{ProviderError, ProviderResult};
use crate::ports::carrier::CarrierApi;
use crate::ports::OperatingMode;

const PROVIDER: &str = "express-courier";

/// Live-mode state: HTTP client, endpoint and token manager.
struct LiveClient {
    http: Client,
    base_url: String,
    account_number: String,
    auth: BearerTokenManager,
}

/// Express courier adapter.
pub struct ExpressCourier {
    mode: OperatingMode,
    live: Option<LiveClient>,
}

impl ExpressCourier {
    /// Resolve the operating mode from credential presence and build the
    /// adapter. Missing credentials mean simulated mode, never an error.
    pub fn from_config(config: &ExpressConfig) -> anyhow::Result<Self> {
        use anyhow::Context;

        let credentials = match (
            config.client_id.as_ref(),
            config.client_secret.as_ref(),
            config.account_number.as_ref(),
        ) {
            (Some(id), Some(secret), Some(account)) => {
                Some((id.clone(), secret.clone(), account.clone()))
            }
            _ => None,
        };

        let Some((client_id, client_secret, account_number)) = credentials else {
            warn!(provider = PROVIDER, "Credentials absent, running simulated");
            return Ok(Self {
                mode: OperatingMode::Simulated,
                live: None,
            });
        };

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .pool_max_idle_per_host(2)
            .build()
            .context("Failed to build HTTP client")?;

        let auth = BearerTokenManager::new(
            http.clone(),
            format!("{}/oauth/token", config.base_url),
            client_id,
            client_secret,
            PROVIDER,
        );

        info!(provider = PROVIDER, environment = %config.environment, "Adapter in live mode");
        Ok(Self {
            mode: OperatingMode::Live,
            live: Some(LiveClient {
                http,
                base_url: config.base_url.clone(),
                account_number,
                auth,
            }),
        })
    }

    fn live(&self) -> ProviderResult<&LiveClient> {
        self.live
            .as_ref()
            .ok_or_else(|| ProviderError::configuration(PROVIDER, "adapter is simulated"))
    }

    /// Execute an authorized JSON request with the single 401 refresh.
    async fn request_json(
        &self,
        method: Method,
        path: &str,
        query: Option<&[(&str, String)]>,
        body: Option<&serde_json::Value>,
    ) -> ProviderResult<String> {
        let live = self.live()?;
        let url = format!("{}{}", live.base_url, path);
        let mut refreshed = false;

        loop {
            let token = live.auth.bearer_token().await?;
            let mut request = live.http.request(method.clone(), &url).bearer_auth(&token);
            if let Some(query) = query {
                request = request.query(query);
            }
            if let Some(body) = body {
                request = request.json(body);
            }

            let response = request.send().await.map_err(|source| {
                ProviderError::Transport {
                    provider: PROVIDER,
                    source,
                }
            })?;

            let status = response.status();
            if status == StatusCode::UNAUTHORIZED && !refreshed {
                warn!(provider = PROVIDER, "Token rejected, re-authenticating once");
                live.auth.invalidate().await;
                refreshed = true;
                continue;
            }

            let text = response.text().await.unwrap_or_default();
            if !status.is_success() {
                return Err(ProviderError::upstream(PROVIDER, status.as_u16(), text));
            }
            return Ok(text);
        }
    }

    fn decode<T: serde::de::DeserializeOwned>(body: &str) -> ProviderResult<T> {
        serde_json::from_str(body).map_err(|e| {
            ProviderError::upstream(PROVIDER, 200, format!("unexpected response shape: {e}"))
        })
    }

    /// Fixed representative quotes served without credentials.
    fn simulated_quotes() -> Vec<Quote> {
        vec![
            Quote {
                service_code: "SIM-EXPRESS".to_string(),
                service_name: "Express Worldwide (simulated)".to_string(),
                total_price: dec!(45.50),
                currency: "EUR".to_string(),
                transit_estimate: "2 business days".to_string(),
                cutoff_time: Some("17:00".to_string()),
            },
            Quote {
                service_code: "SIM-ECONOMY".to_string(),
                service_name: "Economy Select (simulated)".to_string(),
                total_price: dec!(38.90),
                currency: "EUR".to_string(),
                transit_estimate: "4 business days".to_string(),
                cutoff_time: None,
            },
        ]
    }

    /// Deterministic-looking booking so downstream code exercises the live
    /// code path end-to-end without credentials.
    fn simulated_booking(details: &ShipmentDetails) -> Booking {
        let reference = format!("THX{}", Utc::now().format("%Y%m%d%H%M%S"));
        Booking {
            documents: vec![DocumentArtifact {
                kind: DocumentKind::WaybillPdf,
                file_name: format!("{reference}-waybill.pdf"),
                size_bytes: 0,
            }],
            reference,
            cost_estimate: dec!(45.50),
            currency: details.currency.clone(),
        }
    }

    fn simulated_tracking() -> TrackingState {
        let now = Utc::now();
        TrackingState::from_events(vec![
            TrackingEvent {
                status: TrackingStatus::Booked,
                location: Some("Origin facility".to_string()),
                timestamp: now - chrono::Duration::hours(6),
                description: "Shipment booked (simulated)".to_string(),
            },
            TrackingEvent {
                status: TrackingStatus::InTransit,
                location: Some("Sorting hub".to_string()),
                timestamp: now,
                description: "In transit (simulated)".to_string(),
            },
        ])
        .expect("static event list is non-empty")
    }

    /// Map the courier's event status codes into the shared vocabulary.
    fn normalize_status(code: &str) -> TrackingStatus {
        match code {
            "BKD" => TrackingStatus::Booked,
            "PRE" => TrackingStatus::InPreparation,
            "PU" => TrackingStatus::Shipped,
            "TR" => TrackingStatus::InTransit,
            "CC" => TrackingStatus::Customs,
            "OK" => TrackingStatus::Delivered,
            "CX" => TrackingStatus::Cancelled,
            _ => TrackingStatus::Exception,
        }
    }
}

#[async_trait]
impl CarrierApi for ExpressCourier {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn mode(&self) -> OperatingMode {
        self.mode
    }

    #[instrument(skip(self, packages), fields(package_count = packages.len()))]
    async fn quote(
        &self,
        origin: &RouteEndpoint,
        destination: &RouteEndpoint,
        packages: &[Package],
    ) -> ProviderResult<Vec<Quote>> {
        validate_packages(packages)?;

        if !self.mode.is_live() {
            return Ok(Self::simulated_quotes());
        }

        let live = self.live()?;
        let total_weight: Decimal = packages.iter().map(|p| p.weight_kg).sum();
        let query = [
            ("accountNumber", live.account_number.clone()),
            ("originCountryCode", origin.country_code.clone()),
            ("originPostalCode", origin.postal_code.clone()),
            ("originCityName", origin.city.clone()),
            ("destinationCountryCode", destination.country_code.clone()),
            ("destinationPostalCode", destination.postal_code.clone()),
            ("destinationCityName", destination.city.clone()),
            ("weight", total_weight.to_string()),
        ];

        let body = self
            .request_json(Method::GET, "/rates", Some(&query[..]), None)
            .await?;
        let rates: RateResponse = Self::decode(&body)?;

        // Either every product normalizes or the whole call fails.
        let mut quotes = Vec::with_capacity(rates.products.len());
        for product in rates.products {
            let total_price = Decimal::from_f64(product.total_price).ok_or_else(|| {
                ProviderError::upstream(
                    PROVIDER,
                    200,
                    format!("unrepresentable price for {}", product.product_code),
                )
            })?;
            quotes.push(Quote {
                service_code: product.product_code,
                service_name: product.product_name,
                total_price: total_price.round_dp(2),
                currency: product.currency,
                transit_estimate: product.delivery_time,
                cutoff_time: product.cutoff_time,
            });
        }

        info!(provider = PROVIDER, quotes = quotes.len(), "Rates fetched");
        Ok(quotes)
    }

    #[instrument(skip(self, details), fields(reference = %details.reference))]
    async fn book(&self, details: &ShipmentDetails) -> ProviderResult<Booking> {
        validate_packages(&details.packages)?;
        if details.reference.is_empty() {
            return Err(ProviderError::Validation(
                "shipment reference must not be empty".to_string(),
            ));
        }

        if !self.mode.is_live() {
            return Ok(Self::simulated_booking(details));
        }

        let live = self.live()?;
        let payload = serde_json::json!({
            "plannedShippingDateAndTime": Utc::now().to_rfc3339(),
            "accountNumber": live.account_number,
            "customerReferences": [{ "value": details.reference }],
            "shipper": party_block(&details.shipper),
            "receiver": party_block(&details.receiver),
            "packages": details.packages.iter().map(|p| serde_json::json!({
                "weight": p.weight_kg,
                "dimensions": {
                    "length": p.length_cm,
                    "width": p.width_cm,
                    "height": p.height_cm,
                },
            })).collect::<Vec<_>>(),
            "exportDeclaration": {
                "declaredValue": details.declared_value(),
                "declaredValueCurrency": details.currency,
                "lineItems": details.lines.iter().map(|l| serde_json::json!({
                    "number": l.order_ref,
                    "description": l.description,
                    "quantity": { "value": l.quantity },
                    "commodityCodes": [{ "typeCode": "outbound", "value": l.hs_code }],
                    "weight": { "netValue": l.weight_kg },
                    "price": l.value_eur,
                })).collect::<Vec<_>>(),
            },
        });

        let body = self
            .request_json(Method::POST, "/shipments", None, Some(&payload))
            .await?;
        let response: BookingResponse = Self::decode(&body)?;

        let mut cost = Decimal::ZERO;
        for charge in &response.shipment_charges {
            cost += Decimal::from_f64(charge.price).ok_or_else(|| {
                ProviderError::upstream(PROVIDER, 200, "unrepresentable shipment charge")
            })?;
        }
        let currency = response
            .shipment_charges
            .first()
            .map_or_else(|| details.currency.clone(), |c| c.currency.clone());

        let documents = response
            .documents
            .iter()
            .map(|d| {
                let size = base64::engine::general_purpose::STANDARD
                    .decode(&d.content)
                    .map(|bytes| bytes.len() as u64)
                    .unwrap_or(0);
                DocumentArtifact {
                    kind: DocumentKind::WaybillPdf,
                    file_name: format!(
                        "{}-{}.pdf",
                        response.shipment_tracking_number,
                        d.type_code.to_lowercase()
                    ),
                    size_bytes: size,
                }
            })
            .collect();

        info!(
            provider = PROVIDER,
            tracking_number = %response.shipment_tracking_number,
            "Shipment booked"
        );

        Ok(Booking {
            reference: response.shipment_tracking_number,
            cost_estimate: cost.round_dp(2),
            currency,
            documents,
        })
    }

    #[instrument(skip(self))]
    async fn track(&self, reference: &str) -> ProviderResult<TrackingState> {
        if reference.is_empty() {
            return Err(ProviderError::Validation(
                "tracking reference must not be empty".to_string(),
            ));
        }

        if !self.mode.is_live() {
            return Ok(Self::simulated_tracking());
        }

        let path = format!("/shipments/{reference}/tracking");
        let body = self.request_json(Method::GET, &path, None, None).await?;
        let response: TrackingResponse = Self::decode(&body)?;

        let wire_events = response
            .shipments
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::NotFound(reference.to_string()))?
            .events;

        let mut events = Vec::with_capacity(wire_events.len());
        for event in wire_events {
            let timestamp = DateTime::parse_from_rfc3339(&event.timestamp)
                .map_err(|e| {
                    ProviderError::upstream(PROVIDER, 200, format!("bad event timestamp: {e}"))
                })?
                .with_timezone(&Utc);
            events.push(TrackingEvent {
                status: Self::normalize_status(&event.status_code),
                location: event.location,
                timestamp,
                description: event.description,
            });
        }

        TrackingState::from_events(events)
            .ok_or_else(|| ProviderError::NotFound(reference.to_string()))
    }

    async fn is_healthy(&self) -> bool {
        match &self.live {
            None => true,
            // Token endpoint reachability doubles as the health probe.
            Some(live) => live.auth.bearer_token().await.is_ok(),
        }
    }
}

fn party_block(party: &crate::domain::shipping::Party) -> serde_json::Value {
    serde_json::json!({
        "postalAddress": {
            "postalCode": party.postal_code,
            "cityName": party.city,
            "countryCode": party.country_code,
            "addressLine1": party.address_line,
        },
        "contactInformation": {
            "fullName": party.name,
            "companyName": party.company.clone().unwrap_or_else(|| party.name.clone()),
            "email": party.email,
            "phone": party.phone,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::shipping::Party;

    fn simulated_adapter() -> ExpressCourier {
        // Unroutable base URL: any accidental network call would fail loudly.
        ExpressCourier::from_config(&ExpressConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            environment: "sandbox".to_string(),
            client_id: None,
            client_secret: None,
            account_number: None,
            timeout_seconds: 1,
        })
        .unwrap()
    }

    fn endpoint(country: &str) -> RouteEndpoint {
        RouteEndpoint {
            country_code: country.to_string(),
            postal_code: "20457".to_string(),
            city: "Hamburg".to_string(),
        }
    }

    fn packages(n: usize) -> Vec<Package> {
        (0..n)
            .map(|_| Package::new(dec!(2.0), dec!(30), dec!(20), dec!(10)))
            .collect()
    }

    #[tokio::test]
    async fn missing_credentials_resolve_to_simulated_mode() {
        let adapter = simulated_adapter();
        assert_eq!(adapter.mode(), OperatingMode::Simulated);
    }

    #[tokio::test]
    async fn simulated_quote_returns_two_fixed_prices() {
        let adapter = simulated_adapter();
        let quotes = adapter
            .quote(&endpoint("DE"), &endpoint("NL"), &packages(3))
            .await
            .unwrap();

        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[0].total_price, dec!(45.50));
        assert_eq!(quotes[1].total_price, dec!(38.90));
        assert!(quotes.iter().all(|q| q.currency == "EUR"));
        assert!(quotes.iter().all(|q| q.service_name.contains("simulated")));
    }

    #[tokio::test]
    async fn quote_rejects_empty_and_invalid_packages() {
        let adapter = simulated_adapter();
        let err = adapter
            .quote(&endpoint("DE"), &endpoint("NL"), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Validation(_)));

        let bad = vec![Package::new(dec!(0), dec!(30), dec!(20), dec!(10))];
        let err = adapter
            .quote(&endpoint("DE"), &endpoint("NL"), &bad)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Validation(_)));
    }

    #[tokio::test]
    async fn simulated_booking_has_reference_and_documents() {
        let adapter = simulated_adapter();
        let details = ShipmentDetails {
            reference: "ORD-77".to_string(),
            shipper: dummy_party(),
            receiver: dummy_party(),
            packages: packages(1),
            lines: Vec::new(),
            currency: "EUR".to_string(),
        };
        let booking = adapter.book(&details).await.unwrap();
        assert!(booking.reference.starts_with("THX"));
        assert!(!booking.documents.is_empty());
    }

    #[tokio::test]
    async fn simulated_tracking_status_matches_latest_event() {
        let adapter = simulated_adapter();
        let state = adapter.track("THX20260101000000").await.unwrap();
        assert_eq!(state.status, state.events.last().unwrap().status);
        assert_eq!(state.status, TrackingStatus::InTransit);
    }

    #[test]
    fn status_codes_map_into_shared_vocabulary() {
        assert_eq!(ExpressCourier::normalize_status("PU"), TrackingStatus::Shipped);
        assert_eq!(ExpressCourier::normalize_status("OK"), TrackingStatus::Delivered);
        assert_eq!(
            ExpressCourier::normalize_status("??"),
            TrackingStatus::Exception
        );
    }

    fn dummy_party() -> Party {
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
