//! Client for the financial aggregator (SimpleFIN bridge protocol).
//!
//! Fetches accounts with their balances and transactions over HTTP Basic auth
//! and converts the wire payload into the core [`AccountSnapshot`] type.
//!
//! [`AccountSnapshot`]: pocketwise_core::ledger::AccountSnapshot

pub mod client;
pub mod error;
pub mod types;

pub use client::{LedgerClient, LedgerConfig};
pub use error::{LedgerError, Result};
