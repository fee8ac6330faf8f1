//! Spending categories: the fixed taxonomy and how a transaction acquires one.

mod categories_traits;
mod category_resolver;
mod taxonomy;

pub use categories_traits::*;
pub use category_resolver::*;
pub use taxonomy::*;
