//! Pocketwise Core - Domain entities, services, and traits.
//!
//! Holds the sync pipeline that pulls accounts and transactions from the
//! financial aggregator and categorizes them. It is database-agnostic and
//! defines traits implemented by the `storage-sqlite`, `ledger` and `ai` crates.

pub mod accounts;
pub mod categories;
pub mod errors;
pub mod ledger;
pub mod sync;
pub mod transactions;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
