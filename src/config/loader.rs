//! Configuration Loader - File Loading, Env Overrides and Validation
//!
//! Handles loading `config.toml`, layering credential overrides from
//! environment variables on top, validating all parameters, and providing
//! clear error messages for misconfiguration. Credentials never live in
//! the checked-in config file.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::AppConfig;

/// Environment variable naming the config file; defaults to `config.toml`.
pub const CONFIG_PATH_VAR: &str = "LOGISTICS_CONFIG";

/// Load, override and validate configuration.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let mut config: AppConfig = toml::from_str(&content)
    .with_context(|| "Failed to parse config.toml")?;

  apply_env_overrides(&mut config);
  validate_config(&config)?;

  info!(
    tenant = %config.app.tenant,
    routes = config.rate_sync.routes.len(),
    commission_rate = config.payouts.commission_rate,
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Resolve the config path from the environment and load it.
pub fn load_from_env() -> Result<AppConfig> {
  let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| "config.toml".to_string());
  load_config(&path)
}

/// Layer credentials from environment variables over the file values.
///
/// Only the secret-bearing fields are overridable; endpoints stay in the
/// file where they are reviewable.
fn apply_env_overrides(config: &mut AppConfig) {
  let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());

  if let Some(v) = var("EXPRESS_CLIENT_ID") {
    config.express.client_id = Some(v);
  }
  if let Some(v) = var("EXPRESS_CLIENT_SECRET") {
    config.express.client_secret = Some(v);
  }
  if let Some(v) = var("EXPRESS_ACCOUNT_NUMBER") {
    config.express.account_number = Some(v);
  }
  if let Some(v) = var("BANKING_API_TOKEN") {
    config.banking.api_token = Some(v);
  }
  if let Some(v) = var("BANKING_ACCOUNT_ID") {
    config.banking.account_id = Some(v);
  }
  if let Some(v) = var("BANKING_CERTIFICATE_PATH") {
    config.banking.certificate_path = Some(v);
  }
  if let Some(v) = var("SUPPLIER_EU_API_KEY") {
    config.suppliers.european.api_key = Some(v);
  }
  if let Some(v) = var("SUPPLIER_INTL_API_KEY") {
    config.suppliers.international.api_key = Some(v);
  }
  if let Some(v) = var("SFTP_PASSWORD") {
    if let Some(sftp) = config.delivery.sftp.as_mut() {
      sftp.password = Some(v);
    }
  }
  if let Some(v) = var("SMTP_PASSWORD") {
    if let Some(email) = config.delivery.email.as_mut() {
      email.password = Some(v);
    }
  }
}

/// Validate all configuration parameters.
fn validate_config(config: &AppConfig) -> Result<()> {
  anyhow::ensure!(
    !config.app.tenant.is_empty(),
    "app.tenant must not be empty (it prefixes payout references)"
  );

  anyhow::ensure!(
    !config.express.base_url.is_empty(),
    "express.base_url must not be empty"
  );
  anyhow::ensure!(
    !config.banking.base_url.is_empty(),
    "banking.base_url must not be empty"
  );
  anyhow::ensure!(
    !config.suppliers.european.base_url.is_empty(),
    "suppliers.european.base_url must not be empty"
  );
  anyhow::ensure!(
    !config.suppliers.international.base_url.is_empty(),
    "suppliers.international.base_url must not be empty"
  );
  anyhow::ensure!(
    !config.suppliers.european.tracking_prefix.is_empty()
      && !config.suppliers.international.tracking_prefix.is_empty(),
    "supplier tracking prefixes must not be empty"
  );
  anyhow::ensure!(
    config.suppliers.european.tracking_prefix
      != config.suppliers.international.tracking_prefix,
    "supplier tracking prefixes must be distinct, both are {}",
    config.suppliers.european.tracking_prefix
  );

  anyhow::ensure!(
    config.payouts.commission_rate > 0.0 && config.payouts.commission_rate < 1.0,
    "payouts.commission_rate must be in (0, 1), got {}",
    config.payouts.commission_rate
  );
  anyhow::ensure!(
    config.payouts.minimum_payout >= 0.0,
    "payouts.minimum_payout must not be negative, got {}",
    config.payouts.minimum_payout
  );

  anyhow::ensure!(
    config.maritime.rate_per_kg > 0.0,
    "maritime.rate_per_kg must be positive, got {}",
    config.maritime.rate_per_kg
  );
  anyhow::ensure!(
    config.maritime.minimum_charge >= 0.0,
    "maritime.minimum_charge must not be negative"
  );

  for (i, route) in config.rate_sync.routes.iter().enumerate() {
    anyhow::ensure!(
      !route.origin.country_code.is_empty() && !route.destination.country_code.is_empty(),
      "rate_sync.routes[{}] has an empty country code",
      i
    );
  }

  anyhow::ensure!(
    !config.persistence.data_dir.is_empty(),
    "persistence.data_dir must not be empty"
  );

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn minimal_toml() -> String {
    r#"
      [app]
      name = "logistics"
      tenant = "TRADEHAVEN"

      [express]
      base_url = "https://api.express.example"

      [maritime]
      partner_name = "Neptune Forwarding"
      rate_per_kg = 1.8
      minimum_charge = 120.0

      [maritime.shipper]
      name = "TradeHaven Fulfilment"
      address_line = "Hafenstrasse 12"
      city = "Hamburg"
      postal_code = "20457"
      country_code = "DE"

      [maritime.consignee]
      name = "Neptune Forwarding"
      address_line = "Pier 4"
      city = "Rotterdam"
      postal_code = "3011"
      country_code = "NL"

      [banking]
      base_url = "https://api.bank.example"

      [suppliers.european]
      base_url = "https://api.eu-supplier.example"
      tracking_prefix = "EUS"

      [suppliers.international]
      base_url = "https://api.intl-supplier.example"
      tracking_prefix = "INTL"

      [payouts]

      [rate_sync]

      [persistence]
      data_dir = "data"
    "#
    .to_string()
  }

  #[test]
  fn minimal_config_parses_with_defaults() {
    let config: AppConfig = toml::from_str(&minimal_toml()).unwrap();
    validate_config(&config).unwrap();
    assert_eq!(config.payouts.commission_rate, 0.08);
    assert_eq!(config.payouts.minimum_payout, 10.0);
    assert_eq!(config.express.environment, "sandbox");
    assert!(config.express.client_id.is_none());
    assert!(config.delivery.sftp.is_none());
  }

  #[test]
  fn rejects_out_of_range_commission() {
    let toml = minimal_toml().replace("[payouts]", "[payouts]\ncommission_rate = 1.5");
    let config: AppConfig = toml::from_str(&toml).unwrap();
    assert!(validate_config(&config).is_err());
  }

  #[test]
  fn rejects_duplicate_tracking_prefixes() {
    let toml = minimal_toml().replace("tracking_prefix = \"INTL\"", "tracking_prefix = \"EUS\"");
    let config: AppConfig = toml::from_str(&toml).unwrap();
    assert!(validate_config(&config).is_err());
  }

  #[test]
  fn load_nonexistent_file_fails() {
    assert!(load_config("nonexistent.toml").is_err());
  }
}
