//! Adapters — concrete implementations of the port traits.
//!
//! One module per external system plus the document/delivery/persistence
//! machinery the maritime forwarder builds on. Every adapter resolves its
//! operating mode once at construction and can serve the full contract in
//! simulated mode without touching the network.

pub mod banking;
pub mod delivery;
pub mod documents;
pub mod express;
pub mod maritime;
pub mod persistence;
pub mod suppliers;
