//! Configuration Module - TOML-based Job Configuration
//!
//! Loads and validates configuration from `config.toml` with credential
//! overrides from environment variables. Provider endpoints, payout policy
//! and delivery settings are all externalized here - nothing is hardcoded
//! in the domain layer. Presence or absence of the credential fields is
//! what resolves each adapter's operating mode at construction.

pub mod loader;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::domain::shipping::{Party, RouteEndpoint};

/// Top-level configuration for all logistics jobs.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  /// Tenant identity and logging.
  pub app: AppInfo,
  /// Express courier API (quotes, bookings, tracking).
  pub express: ExpressConfig,
  /// Maritime forwarder (documents + delivery, no formal API).
  pub maritime: MaritimeConfig,
  /// Business-banking payout API (mTLS).
  pub banking: BankingConfig,
  /// The two dropshipping supplier catalogs.
  pub suppliers: SuppliersConfig,
  /// Vendor payout policy.
  pub payouts: PayoutPolicyConfig,
  /// Rate sync route matrix.
  pub rate_sync: RateSyncConfig,
  /// Document delivery channels (SFTP primary, email fallback).
  #[serde(default)]
  pub delivery: DeliveryConfig,
  /// Persistence configuration.
  pub persistence: PersistenceConfig,
}

/// Tenant identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppInfo {
  /// Human-readable deployment name.
  pub name: String,
  /// Tenant code used in payout idempotency references.
  pub tenant: String,
  /// Log level (trace, debug, info, warn, error).
  #[serde(default = "default_log_level")]
  pub log_level: String,
}

/// Express courier credentials and endpoint.
///
/// Live mode requires client id, client secret and account number; with
/// any of them absent the adapter runs simulated.
#[derive(Debug, Clone, Deserialize)]
pub struct ExpressConfig {
  pub base_url: String,
  #[serde(default = "default_environment")]
  pub environment: String,
  #[serde(default)]
  pub client_id: Option<String>,
  #[serde(default)]
  pub client_secret: Option<String>,
  #[serde(default)]
  pub account_number: Option<String>,
  #[serde(default = "default_timeout")]
  pub timeout_seconds: u64,
}

/// Maritime forwarder settings.
#[derive(Debug, Clone, Deserialize)]
pub struct MaritimeConfig {
  /// Forwarding partner display name.
  pub partner_name: String,
  /// Flat sea-freight rate per kilogram for cost estimates.
  pub rate_per_kg: f64,
  /// Minimum charge per consolidated booking.
  pub minimum_charge: f64,
  /// Default transit assumption in days.
  #[serde(default = "default_sea_transit_days")]
  pub default_transit_days: u32,
  /// Shipper block printed on manifests and packing lists.
  pub shipper: PartyConfig,
  /// Consignee block (the forwarding partner's receiving warehouse).
  pub consignee: PartyConfig,
}

/// Business-banking payout credentials.
///
/// Live mode requires api token, account id and a readable client
/// certificate; a missing certificate file permanently downgrades the
/// adapter to simulated.
#[derive(Debug, Clone, Deserialize)]
pub struct BankingConfig {
  pub base_url: String,
  #[serde(default = "default_environment")]
  pub environment: String,
  #[serde(default)]
  pub account_id: Option<String>,
  #[serde(default)]
  pub api_token: Option<String>,
  /// Path to the PEM bundle (certificate + key) for mTLS.
  #[serde(default)]
  pub certificate_path: Option<String>,
  #[serde(default = "default_timeout")]
  pub timeout_seconds: u64,
}

/// The two supplier catalog endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct SuppliersConfig {
  pub european: SupplierEndpointConfig,
  pub international: SupplierEndpointConfig,
}

/// One supplier catalog endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SupplierEndpointConfig {
  pub base_url: String,
  #[serde(default)]
  pub api_key: Option<String>,
  /// Prefix this supplier stamps on its tracking numbers.
  pub tracking_prefix: String,
  #[serde(default = "default_timeout")]
  pub timeout_seconds: u64,
}

/// Vendor payout policy constants.
#[derive(Debug, Clone, Deserialize)]
pub struct PayoutPolicyConfig {
  /// Marketplace commission withheld from gross sales.
  #[serde(default = "default_commission_rate")]
  pub commission_rate: f64,
  /// Vendors below this net amount are skipped, not paid.
  #[serde(default = "default_minimum_payout")]
  pub minimum_payout: f64,
  /// Fixed delay between consecutive payout calls (milliseconds).
  #[serde(default = "default_pacing_ms")]
  pub pacing_ms: u64,
}

impl PayoutPolicyConfig {
  pub fn commission_rate_decimal(&self) -> Decimal {
    Decimal::from_f64(self.commission_rate)
      .unwrap_or_else(|| Decimal::new(8, 2))
  }

  pub fn minimum_payout_decimal(&self) -> Decimal {
    Decimal::from_f64(self.minimum_payout)
      .unwrap_or_else(|| Decimal::from(10))
  }
}

/// Rate sync job configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RateSyncConfig {
  /// Fixed delay between quote requests (milliseconds).
  #[serde(default = "default_pacing_ms")]
  pub pacing_ms: u64,
  /// Origin/destination matrix to rate each run.
  #[serde(default)]
  pub routes: Vec<RouteConfig>,
}

/// One origin/destination pair for the rate matrix.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteConfig {
  pub origin: EndpointConfig,
  pub destination: EndpointConfig,
}

/// A quote endpoint (country, postal code, city).
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointConfig {
  pub country_code: String,
  pub postal_code: String,
  pub city: String,
}

impl EndpointConfig {
  pub fn to_route_endpoint(&self) -> RouteEndpoint {
    RouteEndpoint {
      country_code: self.country_code.clone(),
      postal_code: self.postal_code.clone(),
      city: self.city.clone(),
    }
  }
}

/// Document delivery configuration. Both channels are optional; with
/// neither configured the forwarder runs simulated.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeliveryConfig {
  #[serde(default)]
  pub sftp: Option<SftpConfig>,
  #[serde(default)]
  pub email: Option<EmailFallbackConfig>,
}

/// Secure file transfer to the forwarding partner.
#[derive(Debug, Clone, Deserialize)]
pub struct SftpConfig {
  pub host: String,
  #[serde(default = "default_sftp_port")]
  pub port: u16,
  pub username: String,
  #[serde(default)]
  pub password: Option<String>,
  /// Remote base directory; bookings land in `<base_dir>/<bookingRef>/`.
  #[serde(default = "default_sftp_base_dir")]
  pub base_dir: String,
}

/// Email attachment fallback to the operations mailbox.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailFallbackConfig {
  pub smtp_host: String,
  #[serde(default = "default_smtp_port")]
  pub smtp_port: u16,
  pub username: String,
  #[serde(default)]
  pub password: Option<String>,
  pub from_address: String,
  /// Where documents go when SFTP is unavailable.
  pub ops_mailbox: String,
}

/// Persistence configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PersistenceConfig {
  /// Directory for JSONL stores and the event log.
  #[serde(default = "default_data_dir")]
  pub data_dir: String,
}

/// Shipper/consignee block as written in config.
#[derive(Debug, Clone, Deserialize)]
pub struct PartyConfig {
  pub name: String,
  #[serde(default)]
  pub company: Option<String>,
  pub address_line: String,
  pub city: String,
  pub postal_code: String,
  pub country_code: String,
  #[serde(default)]
  pub email: Option<String>,
}

impl PartyConfig {
  pub fn to_party(&self) -> Party {
    Party {
      name: self.name.clone(),
      company: self.company.clone(),
      address_line: self.address_line.clone(),
      city: self.city.clone(),
      postal_code: self.postal_code.clone(),
      country_code: self.country_code.clone(),
      email: self.email.clone(),
      phone: None,
    }
  }
}

// Default value functions for serde

fn default_log_level() -> String {
  "info".to_string()
}

fn default_environment() -> String {
  "sandbox".to_string()
}

fn default_timeout() -> u64 {
  30
}

fn default_sea_transit_days() -> u32 {
  35
}

fn default_commission_rate() -> f64 {
  0.08
}

fn default_minimum_payout() -> f64 {
  10.0
}

fn default_pacing_ms() -> u64 {
  750
}

fn default_sftp_port() -> u16 {
  22
}

fn default_sftp_base_dir() -> String {
  "/incoming".to_string()
}

fn default_smtp_port() -> u16 {
  587
}

fn default_data_dir() -> String {
  "data".to_string()
}
