//! Payout port — outbound vendor payments.

use async_trait::async_trait;

use super::OperatingMode;
use crate::domain::payout::{Payout, PayoutRequest};
use crate::error::ProviderResult;

/// Contract over the business-banking payout provider.
///
/// The provider performs no deduplication: idempotency lives entirely in
/// the request `reference`, which the payout job checks against persisted
/// payouts before calling `pay`.
#[async_trait]
pub trait PayoutProvider: Send + Sync {
    fn name(&self) -> &'static str;

    fn mode(&self) -> OperatingMode;

    /// Issue a payout, creating a counterparty first when bank details are
    /// supplied and none exists yet.
    async fn pay(&self, request: &PayoutRequest) -> ProviderResult<Payout>;

    async fn is_healthy(&self) -> bool;
}
