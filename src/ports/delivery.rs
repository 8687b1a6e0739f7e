//! Document transport port — moving generated artifacts to the partner.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// An in-memory document headed for the forwarding partner.
#[derive(Debug, Clone)]
pub struct OutboundDocument {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// How a delivery attempt concluded.
///
/// `ManualFollowUp` is a success from the booking's point of view: the
/// booking reference and documents exist, the operations team just has to
/// move them by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum DeliveryOutcome {
    SecureTransfer { remote_dir: String },
    EmailFallback { mailbox: String },
    ManualFollowUp { reason: String },
}

/// One way of moving documents to the partner (SFTP, email, ...).
#[async_trait]
pub trait DocumentTransport: Send + Sync {
    fn name(&self) -> &'static str;

    /// Deliver all documents for one booking; returns a human-readable
    /// detail string (remote directory, mailbox) on success.
    async fn deliver(
        &self,
        booking_reference: &str,
        documents: &[OutboundDocument],
    ) -> anyhow::Result<String>;
}
