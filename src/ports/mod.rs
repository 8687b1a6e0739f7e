//! Port traits — the boundary between batch jobs and the outside world.
//!
//! One trait per external concern (carrier, payouts, supplier catalogs,
//! document transport, storage). Adapters implement these; usecases depend
//! only on the traits.

pub mod carrier;
pub mod delivery;
pub mod payouts;
pub mod repository;
pub mod supplier;

use serde::{Deserialize, Serialize};

/// Whether an adapter talks to the real provider or answers locally.
///
/// Resolved exactly once at adapter construction from the presence of the
/// required credentials, then injected; never re-derived per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatingMode {
    /// Real HTTP calls with full auth.
    Live,
    /// Deterministic placeholder results, no network access at all.
    Simulated,
}

impl OperatingMode {
    pub fn is_live(self) -> bool {
        matches!(self, Self::Live)
    }
}

impl std::fmt::Display for OperatingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Live => write!(f, "live"),
            Self::Simulated => write!(f, "simulated"),
        }
    }
}
