//! Vendor payout domain types.
//!
//! A `Payout` is the authoritative record of money sent to a vendor. Its
//! `reference` is the idempotency key: the payout job never calls the
//! banking provider twice for the same reference, so re-running a period
//! cannot double-pay (the adapter itself performs no deduplication).

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ProviderError, ProviderResult};

/// Bank account details needed to create a counterparty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankDetails {
    pub iban: String,
    pub bic: String,
}

/// The receiving side of a payout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Beneficiary {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub bank: Option<BankDetails>,
}

/// Forward-only payout lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutState {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl PayoutState {
    /// Transitions only move forward: pending → processing → completed,
    /// or any non-terminal state → failed.
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Processing)
                | (Self::Pending, Self::Failed)
                | (Self::Processing, Self::Completed)
                | (Self::Processing, Self::Failed)
        )
    }
}

/// Input to a pay operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayoutRequest {
    pub beneficiary: Beneficiary,
    pub amount: Decimal,
    pub currency: String,
    /// Idempotency-bearing reference, see [`payout_reference`].
    pub reference: String,
}

impl PayoutRequest {
    /// Validate before any network call: positive amount, plausible email.
    pub fn validate(&self) -> ProviderResult<()> {
        if self.amount <= Decimal::ZERO {
            return Err(ProviderError::Validation(format!(
                "payout amount must be positive, got {}",
                self.amount
            )));
        }
        if !is_plausible_email(&self.beneficiary.email) {
            return Err(ProviderError::Validation(format!(
                "beneficiary email is not a valid address: {:?}",
                self.beneficiary.email
            )));
        }
        Ok(())
    }
}

/// The authoritative payout record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payout {
    pub id: String,
    pub beneficiary: Beneficiary,
    pub amount: Decimal,
    pub currency: String,
    pub reference: String,
    pub state: PayoutState,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Payout {
    /// A pending payout as returned by a simulated pay operation.
    pub fn pending_simulated(request: &PayoutRequest) -> Self {
        Self {
            id: format!("sim-pay-{}", Uuid::new_v4()),
            beneficiary: request.beneficiary.clone(),
            amount: request.amount,
            currency: request.currency.clone(),
            reference: request.reference.clone(),
            state: PayoutState::Pending,
            created_at: Utc::now(),
            completed_at: None,
        }
    }
}

/// Deterministic idempotency reference for a vendor/period pair.
///
/// Format: `<tenant>-VENDOR-<vendorId>-<periodStartDate>`.
pub fn payout_reference(tenant: &str, vendor_id: &str, period_start: NaiveDate) -> String {
    format!("{tenant}-VENDOR-{vendor_id}-{period_start}")
}

/// Minimal address plausibility check: one `@` with a dotted domain.
///
/// Full RFC validation is the mail library's job; this only catches inputs
/// that would be rejected before reaching any provider.
fn is_plausible_email(address: &str) -> bool {
    let Some((local, domain)) = address.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !address.contains(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn request(amount: Decimal, email: &str) -> PayoutRequest {
        PayoutRequest {
            beneficiary: Beneficiary {
                name: "Atelier Nord".to_string(),
                email: email.to_string(),
                bank: None,
            },
            amount,
            currency: "EUR".to_string(),
            reference: "TRADEHAVEN-VENDOR-v1-2026-07-27".to_string(),
        }
    }

    #[test]
    fn rejects_non_positive_amount() {
        assert!(request(dec!(0), "ops@atelier-nord.de").validate().is_err());
        assert!(request(dec!(-5), "ops@atelier-nord.de").validate().is_err());
        assert!(request(dec!(12.50), "ops@atelier-nord.de").validate().is_ok());
    }

    #[test]
    fn rejects_malformed_email() {
        for bad in ["", "not-an-email", "a@b", "a @b.de", "@x.de", "a@.de"] {
            assert!(request(dec!(10), bad).validate().is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn reference_format_is_stable() {
        let date = NaiveDate::from_ymd_opt(2026, 7, 27).unwrap();
        assert_eq!(
            payout_reference("TRADEHAVEN", "vendor-42", date),
            "TRADEHAVEN-VENDOR-vendor-42-2026-07-27"
        );
    }

    #[test]
    fn state_transitions_only_move_forward() {
        use PayoutState::*;
        assert!(Pending.can_transition_to(Processing));
        assert!(Processing.can_transition_to(Completed));
        assert!(Processing.can_transition_to(Failed));
        assert!(!Completed.can_transition_to(Pending));
        assert!(!Failed.can_transition_to(Processing));
        assert!(!Pending.can_transition_to(Completed));
    }
}
