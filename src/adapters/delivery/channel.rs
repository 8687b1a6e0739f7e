//! Delivery channel — primary/fallback policy over document transports.
//!
//! Booking success is deliberately decoupled from document-delivery
//! success: `deliver` never returns an error. The worst outcome is
//! `ManualFollowUp`, which the caller records in the event log while the
//! booking stands.

use tracing::{info, warn};

use crate::config::DeliveryConfig;
use crate::ports::delivery::{DeliveryOutcome, DocumentTransport, OutboundDocument};

use super::email::EmailTransport;
use super::sftp::SftpTransport;

/// Primary/fallback pair of document transports.
pub struct DeliveryChannel {
    primary: Option<Box<dyn DocumentTransport>>,
    fallback: Option<Box<dyn DocumentTransport>>,
}

impl DeliveryChannel {
    /// Wire transports from configuration: SFTP primary, email fallback.
    pub fn from_config(config: &DeliveryConfig) -> Self {
        let primary = config
            .sftp
            .clone()
            .map(|c| Box::new(SftpTransport::new(c)) as Box<dyn DocumentTransport>);
        let fallback = config
            .email
            .clone()
            .map(|c| Box::new(EmailTransport::new(c)) as Box<dyn DocumentTransport>);
        Self { primary, fallback }
    }

    /// Build from explicit transports (used by tests).
    pub fn new(
        primary: Option<Box<dyn DocumentTransport>>,
        fallback: Option<Box<dyn DocumentTransport>>,
    ) -> Self {
        Self { primary, fallback }
    }

    /// True when at least one transport is configured.
    pub fn is_configured(&self) -> bool {
        self.primary.is_some() || self.fallback.is_some()
    }

    /// Deliver the booking's documents, degrading through the fallback.
    pub async fn deliver(
        &self,
        booking_reference: &str,
        documents: &[OutboundDocument],
    ) -> DeliveryOutcome {
        if let Some(primary) = &self.primary {
            match primary.deliver(booking_reference, documents).await {
                Ok(remote_dir) => {
                    return DeliveryOutcome::SecureTransfer { remote_dir };
                }
                Err(e) => {
                    warn!(
                        booking_reference,
                        transport = primary.name(),
                        error = %e,
                        "Primary document delivery failed, trying fallback"
                    );
                }
            }
        }

        if let Some(fallback) = &self.fallback {
            match fallback.deliver(booking_reference, documents).await {
                Ok(mailbox) => {
                    return DeliveryOutcome::EmailFallback { mailbox };
                }
                Err(e) => {
                    warn!(
                        booking_reference,
                        transport = fallback.name(),
                        error = %e,
                        "Fallback document delivery failed, manual processing required"
                    );
                    return DeliveryOutcome::ManualFollowUp {
                        reason: format!("fallback delivery failed: {e}"),
                    };
                }
            }
        }

        info!(
            booking_reference,
            "No delivery channel configured, manual processing required"
        );
        DeliveryOutcome::ManualFollowUp {
            reason: "no delivery channel configured".to_string(),
        }
    }
}
