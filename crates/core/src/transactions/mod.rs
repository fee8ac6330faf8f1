//! Transactions: immutable ledger lines keyed by the aggregator's identifier.

mod transactions_model;
mod transactions_traits;

pub use transactions_model::*;
pub use transactions_traits::*;
