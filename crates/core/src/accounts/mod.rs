//! Accounts: the aggregator-owned balance holders that transactions hang off.

mod accounts_model;
mod accounts_traits;

pub use accounts_model::*;
pub use accounts_traits::*;
