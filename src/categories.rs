use crate::models::TransactionType;

/// The open-ended choice. Submitting it requires a custom name, which is
/// what gets stored.
pub const OTHERS: &str = "Others";

pub const EXPENSE_CATEGORIES: &[&str] = &[
    "Food & Dining",
    "Shopping",
    "Housing",
    "Transportation",
    "Vehicle",
    "Life & Entertainment",
    "Communication, PC",
    "Financial Expenses",
    "Investments",
    OTHERS,
];

pub const INCOME_CATEGORIES: &[&str] = &["Salary", "Free Lance", "Investments", OTHERS];

pub fn suggested(kind: TransactionType) -> &'static [&'static str] {
    match kind {
        TransactionType::Income => INCOME_CATEGORIES,
        TransactionType::Expense => EXPENSE_CATEGORIES,
    }
}

/// True when `category` is one of the fixed names for `kind` (other than `Others`).
pub fn is_suggested(kind: TransactionType, category: &str) -> bool {
    suggested(kind)
        .iter()
        .any(|c| *c != OTHERS && c.eq_ignore_ascii_case(category))
}

pub fn icon(category: &str) -> &'static str {
    match category.to_lowercase().as_str() {
        "free lance" => "\u{1f4bb}",
        "entertainment" | "life & entertainment" => "\u{1f39f}",
        "transportation" => "\u{1f697}",
        "food & dining" | "groceries" => "\u{1f37d}",
        "housing" => "\u{1f3e0}",
        _ => "\u{1f4e6}",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocabulary_differs_by_type() {
        assert!(suggested(TransactionType::Expense).contains(&"Housing"));
        assert!(!suggested(TransactionType::Income).contains(&"Housing"));
        assert!(suggested(TransactionType::Income).contains(&"Salary"));
        assert_eq!(suggested(TransactionType::Income).last(), Some(&OTHERS));
        assert_eq!(suggested(TransactionType::Expense).last(), Some(&OTHERS));
    }

    #[test]
    fn test_is_suggested() {
        assert!(is_suggested(TransactionType::Expense, "housing"));
        assert!(!is_suggested(TransactionType::Expense, "Others"));
        assert!(!is_suggested(TransactionType::Income, "Pet Insurance"));
    }

    #[test]
    fn test_icon_lookup_is_case_insensitive() {
        assert_eq!(icon("Housing"), icon("housing"));
        assert_eq!(icon("Groceries"), icon("Food & Dining"));
        assert_eq!(icon("Something else"), "\u{1f4e6}");
    }
}
