//! Validation of submitted expenses and incomes.
//!
//! A submission either becomes a `Transaction` that is ready to append, or a `Rejection` that is
//! shown to the user. Nothing is written to the store for a rejected submission.

use crate::model::{
    Amount, ExpenseCategory, IncomeCategory, Transaction, TransactionType, MAX_AMOUNT,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The reasons a submission can be turned away.
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum Rejection {
    /// Zero and negative amounts are not accepted.
    #[error("the amount must be greater than zero, got {0}")]
    NonPositiveAmount(Decimal),

    /// Amounts beyond `MAX_AMOUNT` would count as zero when read back.
    #[error("the amount must not exceed {max}, got {0}", max = MAX_AMOUNT)]
    AmountTooLarge(Decimal),

    /// Expenses need a description.
    #[error("an expense needs a description")]
    MissingDescription,

    /// Incomes need a category.
    #[error("an income needs a category")]
    MissingCategory,

    /// The category is not one of the categories for the transaction type.
    #[error("'{category}' is not an {kind} category, expected one of: {}", expected.join(", "))]
    UnknownCategory {
        category: String,
        kind: TransactionType,
        expected: Vec<String>,
    },
}

/// A submitted expense.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ExpenseEntry {
    pub category: String,
    pub description: String,
    pub amount: Decimal,
    pub date: NaiveDate,
}

/// A submitted income. Incomes carry no description.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct IncomeEntry {
    pub category: Option<String>,
    pub amount: Decimal,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum Entry {
    Expense(ExpenseEntry),
    Income(IncomeEntry),
}

impl From<ExpenseEntry> for Entry {
    fn from(value: ExpenseEntry) -> Self {
        Entry::Expense(value)
    }
}

impl From<IncomeEntry> for Entry {
    fn from(value: IncomeEntry) -> Self {
        Entry::Income(value)
    }
}

impl Entry {
    /// Checks the submission and, if it is acceptable, produces the `Transaction` to append.
    /// Amounts are kept to cents and the category is written with its canonical label.
    pub fn validate(&self) -> Result<Transaction, Rejection> {
        match self {
            Entry::Expense(e) => {
                let amount = positive_amount(e.amount)?;
                let description = e.description.trim();
                if description.is_empty() {
                    return Err(Rejection::MissingDescription);
                }
                let category = ExpenseCategory::find(&e.category)
                    .ok_or_else(|| unknown(&e.category, TransactionType::Expense))?;
                Ok(Transaction {
                    date: e.date,
                    category: category.to_string(),
                    item: description.to_string(),
                    amount,
                    kind: TransactionType::Expense,
                })
            }
            Entry::Income(e) => {
                let amount = positive_amount(e.amount)?;
                let category = match e.category.as_deref().map(str::trim) {
                    None | Some("") => return Err(Rejection::MissingCategory),
                    Some(c) => IncomeCategory::find(c)
                        .ok_or_else(|| unknown(c, TransactionType::Income))?,
                };
                Ok(Transaction {
                    date: e.date,
                    category: category.to_string(),
                    item: String::new(),
                    amount,
                    kind: TransactionType::Income,
                })
            }
        }
    }
}

fn positive_amount(value: Decimal) -> Result<Amount, Rejection> {
    let cents = value.round_dp(2);
    if cents <= Decimal::ZERO {
        return Err(Rejection::NonPositiveAmount(value));
    }
    if cents > MAX_AMOUNT {
        return Err(Rejection::AmountTooLarge(value));
    }
    Ok(Amount::new(cents))
}

fn unknown(category: &str, kind: TransactionType) -> Rejection {
    Rejection::UnknownCategory {
        category: category.trim().to_string(),
        kind,
        expected: crate::model::category_labels(kind),
    }
}

/// Today's date in the local timezone. Entries that do not name a date are recorded on this day.
pub fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    fn expense(category: &str, description: &str, amount: i64) -> Entry {
        Entry::Expense(ExpenseEntry {
            category: category.to_string(),
            description: description.to_string(),
            amount: Decimal::new(amount, 2),
            date: date(),
        })
    }

    fn income(category: Option<&str>, amount: i64) -> Entry {
        Entry::Income(IncomeEntry {
            category: category.map(str::to_string),
            amount: Decimal::new(amount, 2),
            date: date(),
        })
    }

    #[test]
    fn test_valid_expense() {
        let t = expense("groceries", "  milk ", 1000).validate().unwrap();
        assert_eq!(t.category(), "Groceries");
        assert_eq!(t.item(), "milk");
        assert_eq!(t.amount().value(), Decimal::new(1000, 2));
        assert_eq!(t.kind(), TransactionType::Expense);
        assert_eq!(t.date(), date());
    }

    #[test]
    fn test_valid_income() {
        let t = income(Some("Paycheck"), 200000).validate().unwrap();
        assert_eq!(t.category(), "Paycheck");
        assert_eq!(t.item(), "");
        assert_eq!(t.kind(), TransactionType::Income);
    }

    #[test]
    fn test_zero_and_negative_rejected() {
        assert_eq!(
            expense("Groceries", "milk", 0).validate(),
            Err(Rejection::NonPositiveAmount(Decimal::new(0, 2)))
        );
        assert_eq!(
            income(Some("Paycheck"), -500).validate(),
            Err(Rejection::NonPositiveAmount(Decimal::new(-500, 2)))
        );
        // rounds to 0.00
        let tiny = Entry::Expense(ExpenseEntry {
            category: "Groceries".to_string(),
            description: "gum".to_string(),
            amount: Decimal::new(1, 3),
            date: date(),
        });
        assert!(matches!(
            tiny.validate(),
            Err(Rejection::NonPositiveAmount(_))
        ));
    }

    #[test]
    fn test_oversized_amount_rejected() {
        let huge = Entry::Expense(ExpenseEntry {
            category: "House".to_string(),
            description: "castle".to_string(),
            amount: MAX_AMOUNT + Decimal::ONE,
            date: date(),
        });
        assert_eq!(
            huge.validate(),
            Err(Rejection::AmountTooLarge(MAX_AMOUNT + Decimal::ONE))
        );
    }

    #[test]
    fn test_missing_fields_rejected() {
        assert_eq!(
            expense("Groceries", "   ", 100).validate(),
            Err(Rejection::MissingDescription)
        );
        assert_eq!(
            income(None, 100).validate(),
            Err(Rejection::MissingCategory)
        );
        assert_eq!(
            income(Some(""), 100).validate(),
            Err(Rejection::MissingCategory)
        );
    }

    #[test]
    fn test_category_must_match_type() {
        let err = expense("Paycheck", "oops", 100).validate().unwrap_err();
        assert!(matches!(
            err,
            Rejection::UnknownCategory {
                kind: TransactionType::Expense,
                ..
            }
        ));
        assert!(err.to_string().contains("'Paycheck' is not an Expense category"));

        let err = income(Some("Groceries"), 100).validate().unwrap_err();
        assert!(err.to_string().contains("Paycheck, Bonus"));
    }

    #[test]
    fn test_amount_kept_to_cents() {
        let e = Entry::Expense(ExpenseEntry {
            category: "Car".to_string(),
            description: "gas".to_string(),
            amount: Decimal::new(123456, 3),
            date: date(),
        });
        let t = e.validate().unwrap();
        assert_eq!(t.amount().value(), Decimal::new(12346, 2));
    }
}
