use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::errors::Result;

/// External text classifier constrained to the category taxonomy.
///
/// Implementations return the raw label text; callers normalize it.
#[async_trait]
pub trait TransactionClassifierTrait: Send + Sync {
    async fn classify(&self, description: &str, amount: &Decimal) -> Result<String>;
}
