//! Business Bank Payout Adapter — Outbound Vendor Payments
//!
//! Implements the `PayoutProvider` port against the bank's mTLS API. The
//! client certificate is loaded exactly once at construction; a missing
//! certificate file permanently downgrades the adapter to simulated mode —
//! never partially. When bank details accompany a beneficiary and no
//! counterparty exists yet, a counterparty is created before the payout.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Identity, StatusCode};
use serde::Deserialize;
use tracing::{info, instrument, warn};

use crate::config::BankingConfig;
use crate::domain::money::to_minor_units;
use crate::domain::payout::{Payout, PayoutRequest, PayoutState};
use crate::error::{ProviderError, ProviderResult};
use crate::ports::payouts::PayoutProvider;
use crate::ports::OperatingMode;

const PROVIDER: &str = "business-bank";

/// `POST /pay` response.
#[derive(Debug, Deserialize)]
struct PayResponse {
    payment_id: String,
    /// pending | processing | completed | failed
    state: String,
}

/// `GET /counterparties` response.
#[derive(Debug, Deserialize)]
struct CounterpartyList {
    #[serde(default)]
    counterparties: Vec<Counterparty>,
}

#[derive(Debug, Deserialize)]
struct Counterparty {
    id: String,
}

struct LiveClient {
    http: Client,
    base_url: String,
    account_id: String,
    api_token: String,
}

/// Business-banking payout adapter.
pub struct BusinessBankPayouts {
    mode: OperatingMode,
    live: Option<LiveClient>,
}

impl BusinessBankPayouts {
    /// Resolve the mode from credential and certificate presence.
    ///
    /// The certificate is read here, once; any read or parse failure
    /// downgrades to simulated mode for the lifetime of the adapter.
    pub fn from_config(config: &BankingConfig) -> anyhow::Result<Self> {
        use anyhow::Context;

        let simulated = Self {
            mode: OperatingMode::Simulated,
            live: None,
        };

        let (Some(account_id), Some(api_token), Some(cert_path)) = (
            config.account_id.clone(),
            config.api_token.clone(),
            config.certificate_path.clone(),
        ) else {
            warn!(provider = PROVIDER, "Credentials absent, running simulated");
            return Ok(simulated);
        };

        let identity = match std::fs::read(&cert_path) {
            Ok(pem) => match Identity::from_pem(&pem) {
                Ok(identity) => identity,
                Err(e) => {
                    warn!(
                        provider = PROVIDER,
                        certificate_path = %cert_path,
                        error = %e,
                        "Client certificate unusable, running simulated"
                    );
                    return Ok(simulated);
                }
            },
            Err(e) => {
                warn!(
                    provider = PROVIDER,
                    certificate_path = %cert_path,
                    error = %e,
                    "Client certificate missing, running simulated"
                );
                return Ok(simulated);
            }
        };

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .identity(identity)
            .build()
            .context("Failed to build mTLS HTTP client")?;

        info!(provider = PROVIDER, environment = %config.environment, "Adapter in live mode");
        Ok(Self {
            mode: OperatingMode::Live,
            live: Some(LiveClient {
                http,
                base_url: config.base_url.clone(),
                account_id,
                api_token,
            }),
        })
    }

    fn live(&self) -> ProviderResult<&LiveClient> {
        self.live
            .as_ref()
            .ok_or_else(|| ProviderError::configuration(PROVIDER, "adapter is simulated"))
    }

    async fn post_json(
        &self,
        path: &str,
        payload: &serde_json::Value,
    ) -> ProviderResult<String> {
        let live = self.live()?;
        let response = live
            .http
            .post(format!("{}{}", live.base_url, path))
            .bearer_auth(&live.api_token)
            .json(payload)
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

    /// Find or create the counterparty for a beneficiary with bank details.
    async fn ensure_counterparty(&self, request: &PayoutRequest) -> ProviderResult<Option<String>> {
        let Some(bank) = &request.beneficiary.bank else {
            return Ok(None);
        };
        let live = self.live()?;

        let response = live
            .http
            .get(format!("{}/counterparties", live.base_url))
            .bearer_auth(&live.api_token)
            .query(&[("email", request.beneficiary.email.as_str())])
            .send()
            .await
            .map_err(|source| ProviderError::Transport {
                provider: PROVIDER,
                source,
            })?;

        let status = response.status();
        if status != StatusCode::NOT_FOUND {
            let body = response.text().await.unwrap_or_default();
            if !status.is_success() {
                return Err(ProviderError::upstream(PROVIDER, status.as_u16(), body));
            }
            let list: CounterpartyList = serde_json::from_str(&body).map_err(|e| {
                ProviderError::upstream(PROVIDER, status.as_u16(), format!("bad counterparty list: {e}"))
            })?;
            if let Some(existing) = list.counterparties.first() {
                return Ok(Some(existing.id.clone()));
            }
        }

        let payload = serde_json::json!({
            "name": request.beneficiary.name,
            "email": request.beneficiary.email,
            "iban": bank.iban,
            "bic": bank.bic,
        });
        let body = self.post_json("/counterparty", &payload).await?;
        let created: Counterparty = serde_json::from_str(&body).map_err(|e| {
            ProviderError::upstream(PROVIDER, 200, format!("bad counterparty response: {e}"))
        })?;
        info!(provider = PROVIDER, counterparty_id = %created.id, "Counterparty created");
        Ok(Some(created.id))
    }

    fn parse_state(state: &str) -> PayoutState {
        match state {
            "pending" => PayoutState::Pending,
            "processing" => PayoutState::Processing,
            "completed" => PayoutState::Completed,
            _ => PayoutState::Failed,
        }
    }
}

#[async_trait]
impl PayoutProvider for BusinessBankPayouts {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn mode(&self) -> OperatingMode {
        self.mode
    }

    #[instrument(skip(self, request), fields(reference = %request.reference, amount = %request.amount))]
    async fn pay(&self, request: &PayoutRequest) -> ProviderResult<Payout> {
        request.validate()?;

        if !self.mode.is_live() {
            return Ok(Payout::pending_simulated(request));
        }

        let counterparty_id = self.ensure_counterparty(request).await?;
        let live = self.live()?;

        let minor = to_minor_units(request.amount).ok_or_else(|| {
            ProviderError::Validation(format!("amount out of range: {}", request.amount))
        })?;

        let payload = serde_json::json!({
            "request_id": request.reference,
            "account_id": live.account_id,
            "receiver": {
                "name": request.beneficiary.name,
                "email": request.beneficiary.email,
                "counterparty_id": counterparty_id,
            },
            "amount": minor,
            "currency": request.currency,
            "reference": request.reference,
        });

        let body = self.post_json("/pay", &payload).await?;
        let response: PayResponse = serde_json::from_str(&body).map_err(|e| {
            ProviderError::upstream(PROVIDER, 200, format!("bad pay response: {e}"))
        })?;

        let state = Self::parse_state(&response.state);
        info!(provider = PROVIDER, payment_id = %response.payment_id, ?state, "Payout issued");

        Ok(Payout {
            id: response.payment_id,
            beneficiary: request.beneficiary.clone(),
            amount: request.amount,
            currency: request.currency.clone(),
            reference: request.reference.clone(),
            state,
            created_at: Utc::now(),
            completed_at: matches!(state, PayoutState::Completed).then(Utc::now),
        })
    }

    async fn is_healthy(&self) -> bool {
        match &self.live {
            None => true,
            Some(live) => live
                .http
                .get(format!("{}/ping", live.base_url))
                .bearer_auth(&live.api_token)
                .send()
                .await
                .map(|r| r.status().is_success())
                .unwrap_or(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payout::{BankDetails, Beneficiary};
    use rust_decimal_macros::dec;

    fn simulated_adapter() -> BusinessBankPayouts {
        BusinessBankPayouts::from_config(&BankingConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            environment: "sandbox".to_string(),
            account_id: None,
            api_token: None,
            certificate_path: None,
            timeout_seconds: 1,
        })
        .unwrap()
    }

    fn request() -> PayoutRequest {
        PayoutRequest {
            beneficiary: Beneficiary {
                name: "Atelier Nord".to_string(),
                email: "ops@atelier-nord.de".to_string(),
                bank: Some(BankDetails {
                    iban: "DE89370400440532013000".to_string(),
                    bic: "COBADEFFXXX".to_string(),
                }),
            },
            amount: dec!(92.00),
            currency: "EUR".to_string(),
            reference: "TRADEHAVEN-VENDOR-v1-2026-07-27".to_string(),
        }
    }

    #[tokio::test]
    async fn missing_certificate_downgrades_to_simulated() {
        let adapter = BusinessBankPayouts::from_config(&BankingConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            environment: "live".to_string(),
            account_id: Some("acc-1".to_string()),
            api_token: Some("token".to_string()),
            certificate_path: Some("/nonexistent/client.pem".to_string()),
            timeout_seconds: 1,
        })
        .unwrap();
        assert_eq!(adapter.mode(), OperatingMode::Simulated);
    }

    #[tokio::test]
    async fn simulated_pay_returns_pending_payout_with_synthetic_id() {
        let adapter = simulated_adapter();
        let payout = adapter.pay(&request()).await.unwrap();
        assert!(payout.id.starts_with("sim-pay-"));
        assert_eq!(payout.state, PayoutState::Pending);
        assert_eq!(payout.amount, dec!(92.00));
        assert_eq!(payout.reference, request().reference);
    }

    #[tokio::test]
    async fn validation_runs_before_any_network_call() {
        let adapter = simulated_adapter();

        let mut zero = request();
        zero.amount = dec!(0);
        assert!(matches!(
            adapter.pay(&zero).await.unwrap_err(),
            ProviderError::Validation(_)
        ));

        let mut bad_email = request();
        bad_email.beneficiary.email = "not-an-address".to_string();
        assert!(matches!(
            adapter.pay(&bad_email).await.unwrap_err(),
            ProviderError::Validation(_)
        ));
    }

    #[test]
    fn upstream_states_map_into_payout_states() {
        assert_eq!(BusinessBankPayouts::parse_state("pending"), PayoutState::Pending);
        assert_eq!(
            BusinessBankPayouts::parse_state("processing"),
            PayoutState::Processing
        );
        assert_eq!(
            BusinessBankPayouts::parse_state("completed"),
            PayoutState::Completed
        );
        assert_eq!(BusinessBankPayouts::parse_state("rejected"), PayoutState::Failed);
    }
}
