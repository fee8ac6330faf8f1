//! Account and transaction synchronization with the aggregator.

mod refresh_schedule;
mod retry_policy;
mod sync_model;
mod sync_service;

pub use refresh_schedule::*;
pub use retry_policy::*;
pub use sync_model::*;
pub use sync_service::*;
