/// The closed set of labels a transaction can be categorized with.
pub const CATEGORY_TAXONOMY: [&str; 15] = [
    "Food & Dining",
    "Groceries",
    "Transportation",
    "Entertainment",
    "Health & Wellness",
    "Shopping",
    "Utilities",
    "Rent",
    "Travel",
    "Education",
    "Subscriptions",
    "Gifts & Donations",
    "Insurance",
    "Personal Care",
    "Other",
];

/// Label used whenever no taxonomy member can be determined.
pub const FALLBACK_CATEGORY: &str = "Other";

/// Maps free classifier text onto a taxonomy label.
///
/// Surrounding whitespace, quotes, a leading `Category:` and trailing
/// punctuation are ignored and the comparison is case-insensitive. Returns the
/// canonical spelling, or `None` for empty or out-of-taxonomy text.
pub fn match_taxonomy(raw: &str) -> Option<&'static str> {
    let mut cleaned = raw.trim();
    if let Some(prefix) = cleaned.get(..9) {
        if prefix.eq_ignore_ascii_case("category:") {
            cleaned = cleaned[9..].trim();
        }
    }
    let cleaned = cleaned
        .trim_matches(|c: char| matches!(c, '"' | '\'' | '`'))
        .trim_end_matches(|c: char| matches!(c, '.' | '!'))
        .trim();

    if cleaned.is_empty() {
        return None;
    }

    CATEGORY_TAXONOMY
        .iter()
        .copied()
        .find(|label| label.eq_ignore_ascii_case(cleaned))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_labels_pass_through() {
        for label in CATEGORY_TAXONOMY {
            assert_eq!(match_taxonomy(label), Some(label));
        }
        assert!(CATEGORY_TAXONOMY.contains(&FALLBACK_CATEGORY));
    }

    #[test]
    fn classifier_noise_is_stripped() {
        assert_eq!(match_taxonomy("  Groceries\n"), Some("Groceries"));
        assert_eq!(match_taxonomy("\"Food & Dining\"."), Some("Food & Dining"));
        assert_eq!(match_taxonomy("health & wellness"), Some("Health & Wellness"));
        assert_eq!(match_taxonomy("Category: Travel"), Some("Travel"));
    }

    #[test]
    fn unknown_or_empty_labels_do_not_match() {
        assert_eq!(match_taxonomy(""), None);
        assert_eq!(match_taxonomy("   "), None);
        assert_eq!(match_taxonomy("Restaurants"), None);
        assert_eq!(match_taxonomy("This looks like Groceries to me"), None);
    }

    #[test]
    fn short_inputs_do_not_panic_on_prefix_check() {
        assert_eq!(match_taxonomy("Rent"), Some("Rent"));
        assert_eq!(match_taxonomy("é"), None);
    }
}
