use rust_decimal::Decimal;

use pocketwise_core::categories::{CATEGORY_TAXONOMY, FALLBACK_CATEGORY};

pub(crate) fn system_prompt() -> String {
    format!(
        "You are a transaction categorizer. Classify each transaction into only one of these categories: {}. \
         If it's unclear, categorize it as '{}'. Respond with only the category name, without any extra words or punctuation.",
        CATEGORY_TAXONOMY.join(", "),
        FALLBACK_CATEGORY
    )
}

pub(crate) fn user_prompt(description: &str, amount: &Decimal) -> String {
    format!("Transaction: '{}' Amount: ${}", description, amount)
}
