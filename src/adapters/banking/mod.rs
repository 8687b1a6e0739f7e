//! Business-banking payout adapter (mTLS + bearer token).

pub mod payouts;

pub use payouts::BusinessBankPayouts;
