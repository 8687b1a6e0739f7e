//! TradeHaven Logistics — Library Root
//!
//! Re-exports all modules for integration tests and the job binaries.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod ports;
pub mod usecases;
