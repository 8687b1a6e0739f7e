//! Maritime forwarder adapter (document interface, no formal API).

pub mod forwarder;

pub use forwarder::MaritimeForwarder;
