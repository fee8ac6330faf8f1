use std::sync::Arc;

use log::{debug, warn};

use super::categories_traits::TransactionClassifierTrait;
use super::taxonomy::{match_taxonomy, FALLBACK_CATEGORY};
use crate::ledger::TransactionSnapshot;
use crate::transactions::TransactionRepositoryTrait;

/// Where a resolved category came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategorySource {
    /// Reused from an earlier transaction with the same payee.
    PayeeHistory,
    /// Classifier answered with a taxonomy label.
    Classifier,
    /// Classifier failed or answered outside the taxonomy.
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryResolution {
    pub category: String,
    pub source: CategorySource,
}

impl CategoryResolution {
    /// True when resolving this category cost an external classifier call.
    pub fn used_classifier(&self) -> bool {
        !matches!(self.source, CategorySource::PayeeHistory)
    }
}

/// Assigns categories, memoized per payee.
pub struct CategoryResolver {
    transaction_repository: Arc<dyn TransactionRepositoryTrait>,
    classifier: Arc<dyn TransactionClassifierTrait>,
}

impl CategoryResolver {
    pub fn new(
        transaction_repository: Arc<dyn TransactionRepositoryTrait>,
        classifier: Arc<dyn TransactionClassifierTrait>,
    ) -> Self {
        Self {
            transaction_repository,
            classifier,
        }
    }

    /// Resolves a category for an incoming transaction. Never fails: any
    /// classifier problem degrades to [`FALLBACK_CATEGORY`].
    pub async fn resolve(&self, transaction: &TransactionSnapshot) -> CategoryResolution {
        if let Some(category) = self.category_from_history(&transaction.payee) {
            debug!(
                "Reusing category '{}' for payee '{}' (transaction {})",
                category, transaction.payee, transaction.id
            );
            return CategoryResolution {
                category,
                source: CategorySource::PayeeHistory,
            };
        }

        match self
            .classifier
            .classify(&transaction.description, &transaction.amount)
            .await
        {
            Ok(raw) => match match_taxonomy(&raw) {
                Some(label) => CategoryResolution {
                    category: label.to_string(),
                    source: CategorySource::Classifier,
                },
                None => {
                    warn!(
                        "Classifier answered '{}' for transaction {}, which is not a known category; using '{}'",
                        raw.trim(),
                        transaction.id,
                        FALLBACK_CATEGORY
                    );
                    Self::fallback()
                }
            },
            Err(e) => {
                warn!(
                    "Classifier failed for transaction {}: {}; using '{}'",
                    transaction.id, e, FALLBACK_CATEGORY
                );
                Self::fallback()
            }
        }
    }

    fn category_from_history(&self, payee: &str) -> Option<String> {
        if payee.is_empty() {
            return None;
        }
        match self.transaction_repository.find_category_by_payee(payee) {
            Ok(found) => found.filter(|category| !category.trim().is_empty()),
            Err(e) => {
                warn!("Payee category lookup failed for '{}': {}", payee, e);
                None
            }
        }
    }

    fn fallback() -> CategoryResolution {
        CategoryResolution {
            category: FALLBACK_CATEGORY.to_string(),
            source: CategorySource::Fallback,
        }
    }
}
