//! The fixed category sets that entries are validated against. Expense and income categories are
//! separate sets; which one applies depends on the transaction type.

use crate::model::TransactionType;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The categories an expense may be filed under.
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum ExpenseCategory {
    House,
    Car,
    Childcare,
    Groceries,
    Utilities,
    Shopping,
    Medical,
    #[serde(rename = "Family support")]
    FamilySupport,
    #[serde(rename = "Kids activities")]
    KidsActivities,
    Restaurant,
    #[serde(rename = "Health & Fitness")]
    HealthAndFitness,
    Entertainment,
    Travel,
    Gifts,
    Taxes,
    Other,
}

serde_plain::derive_display_from_serialize!(ExpenseCategory);
serde_plain::derive_fromstr_from_deserialize!(ExpenseCategory);

impl ExpenseCategory {
    /// Every expense category, in the order they are offered to the user.
    pub const ALL: [ExpenseCategory; 16] = [
        ExpenseCategory::House,
        ExpenseCategory::Car,
        ExpenseCategory::Childcare,
        ExpenseCategory::Groceries,
        ExpenseCategory::Utilities,
        ExpenseCategory::Shopping,
        ExpenseCategory::Medical,
        ExpenseCategory::FamilySupport,
        ExpenseCategory::KidsActivities,
        ExpenseCategory::Restaurant,
        ExpenseCategory::HealthAndFitness,
        ExpenseCategory::Entertainment,
        ExpenseCategory::Travel,
        ExpenseCategory::Gifts,
        ExpenseCategory::Taxes,
        ExpenseCategory::Other,
    ];

    /// Matches `s` against the category labels, ignoring case and surrounding whitespace.
    pub fn find(s: &str) -> Option<ExpenseCategory> {
        find(&Self::ALL, s)
    }
}

/// The categories an income may be filed under.
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum IncomeCategory {
    Paycheck,
    Bonus,
    Reimbursement,
    Cashback,
    Gift,
}

serde_plain::derive_display_from_serialize!(IncomeCategory);
serde_plain::derive_fromstr_from_deserialize!(IncomeCategory);

impl IncomeCategory {
    /// Every income category, in the order they are offered to the user.
    pub const ALL: [IncomeCategory; 5] = [
        IncomeCategory::Paycheck,
        IncomeCategory::Bonus,
        IncomeCategory::Reimbursement,
        IncomeCategory::Cashback,
        IncomeCategory::Gift,
    ];

    /// Matches `s` against the category labels, ignoring case and surrounding whitespace.
    pub fn find(s: &str) -> Option<IncomeCategory> {
        find(&Self::ALL, s)
    }
}

/// The category labels that are valid for `kind`.
pub fn category_labels(kind: TransactionType) -> Vec<String> {
    match kind {
        TransactionType::Expense => ExpenseCategory::ALL.iter().map(|c| c.to_string()).collect(),
        TransactionType::Income => IncomeCategory::ALL.iter().map(|c| c.to_string()).collect(),
    }
}

fn find<T>(all: &[T], s: &str) -> Option<T>
where
    T: Copy + std::fmt::Display,
{
    let wanted = s.trim();
    all.iter()
        .copied()
        .find(|c| c.to_string().eq_ignore_ascii_case(wanted))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multi_word_labels() {
        assert_eq!(ExpenseCategory::FamilySupport.to_string(), "Family support");
        assert_eq!(ExpenseCategory::HealthAndFitness.to_string(), "Health & Fitness");
        assert_eq!(
            "Kids activities".parse::<ExpenseCategory>().unwrap(),
            ExpenseCategory::KidsActivities
        );
    }

    #[test]
    fn test_find_ignores_case() {
        assert_eq!(
            ExpenseCategory::find("  groceries "),
            Some(ExpenseCategory::Groceries)
        );
        assert_eq!(
            ExpenseCategory::find("health & fitness"),
            Some(ExpenseCategory::HealthAndFitness)
        );
        assert_eq!(IncomeCategory::find("PAYCHECK"), Some(IncomeCategory::Paycheck));
        assert_eq!(ExpenseCategory::find("Paycheck"), None);
        assert_eq!(IncomeCategory::find("Groceries"), None);
    }

    #[test]
    fn test_category_labels() {
        let expense = category_labels(TransactionType::Expense);
        assert_eq!(expense.len(), 16);
        assert_eq!(expense.first().map(String::as_str), Some("House"));
        assert_eq!(expense.last().map(String::as_str), Some("Other"));
        let income = category_labels(TransactionType::Income);
        assert_eq!(income, vec!["Paycheck", "Bonus", "Reimbursement", "Cashback", "Gift"]);
    }
}
