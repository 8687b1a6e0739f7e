//! Provider error taxonomy.
//!
//! Adapters raise typed errors; the routing manager and batch jobs catch
//! them per item and continue. Only configuration-level or
//! storage-unreachable errors propagate to the top of a job run.

use thiserror::Error;

/// Errors raised by provider adapters.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Credentials or required configuration are missing/invalid.
    ///
    /// Most adapters downgrade to simulated mode instead of raising this;
    /// it surfaces where an operation cannot proceed at all (e.g. a live
    /// banking call without the client certificate).
    #[error("{provider} not configured: {reason}")]
    Configuration {
        provider: &'static str,
        reason: String,
    },

    /// Non-2xx from an external system, with status and body for diagnostics.
    #[error("{provider} returned HTTP {status}: {body}")]
    Upstream {
        provider: &'static str,
        status: u16,
        body: String,
    },

    /// Malformed input caught before any network call.
    #[error("invalid request: {0}")]
    Validation(String),

    /// Tracking reference unrecognized by any adapter.
    #[error("tracking reference not recognized: {0}")]
    NotFound(String),

    /// The request never produced an HTTP status (DNS, TLS, timeout).
    #[error("transport error talking to {provider}: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// Document artifact could not be rendered or written.
    #[error("artifact error: {0}")]
    Artifact(String),
}

impl ProviderError {
    /// Build an `Upstream` error from a provider name and HTTP response parts.
    pub fn upstream(provider: &'static str, status: u16, body: impl Into<String>) -> Self {
        Self::Upstream {
            provider,
            status,
            body: body.into(),
        }
    }

    /// Build a `Configuration` error.
    pub fn configuration(provider: &'static str, reason: impl Into<String>) -> Self {
        Self::Configuration {
            provider,
            reason: reason.into(),
        }
    }

    /// True for errors a batch run records and skips past rather than
    /// letting them abort the run.
    pub fn is_per_item(&self) -> bool {
        !matches!(self, Self::Configuration { .. })
    }
}

/// Result alias used throughout ports and adapters.
pub type ProviderResult<T> = Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_error_carries_provider_and_status() {
        let err = ProviderError::upstream("express-courier", 503, "upstream down");
        let msg = err.to_string();
        assert!(msg.contains("express-courier"));
        assert!(msg.contains("503"));
        assert!(msg.contains("upstream down"));
    }

    #[test]
    fn configuration_errors_are_not_per_item() {
        let config = ProviderError::configuration("business-bank", "certificate missing");
        assert!(!config.is_per_item());

        let upstream = ProviderError::upstream("express-courier", 400, "bad request");
        assert!(upstream.is_per_item());
    }
}
