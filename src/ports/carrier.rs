//! Carrier port — quote, book and track against one freight provider.

use async_trait::async_trait;

use super::OperatingMode;
use crate::domain::shipping::{Booking, Package, Quote, RouteEndpoint, ShipmentDetails};
use crate::domain::tracking::TrackingState;
use crate::error::ProviderResult;

/// Uniform contract over freight providers (express courier, sea forwarder).
///
/// Adapters raise typed `ProviderError`s and perform no retries of their
/// own beyond the single auth-refresh inside the courier client; callers
/// decide whether to retry or skip an item.
#[async_trait]
pub trait CarrierApi: Send + Sync {
    /// Short provider name used in errors and log fields.
    fn name(&self) -> &'static str;

    /// Mode resolved at construction.
    fn mode(&self) -> OperatingMode;

    /// Rate the route for the given packages.
    ///
    /// Either the full normalized quote list is returned or an error is
    /// raised; partial normalization never escapes the adapter.
    async fn quote(
        &self,
        origin: &RouteEndpoint,
        destination: &RouteEndpoint,
        packages: &[Package],
    ) -> ProviderResult<Vec<Quote>>;

    /// Create a booking; document-producing providers generate their
    /// artifacts synchronously before returning.
    async fn book(&self, details: &ShipmentDetails) -> ProviderResult<Booking>;

    /// Poll the provider for the current tracking state.
    async fn track(&self, reference: &str) -> ProviderResult<TrackingState>;

    /// Cheap reachability probe for operator tooling.
    async fn is_healthy(&self) -> bool;
}
