mod model;
mod repository;

pub use model::{parse_decimal, AccountBalanceDB, AccountDB, AccountRefreshDB};
pub use repository::AccountRepository;
