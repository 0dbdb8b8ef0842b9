use crate::model::table::{AMOUNT_STR, CATEGORY_STR, DATE_STR, ITEM_STR, TYPE_STR};
use crate::model::Amount;
use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The date format used when writing a transaction date to the worksheet.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Whether a transaction is money going out or coming in.
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum TransactionType {
    Expense,
    Income,
}

serde_plain::derive_display_from_serialize!(TransactionType);
serde_plain::derive_fromstr_from_deserialize!(TransactionType);

impl TransactionType {
    /// Parses a `Type` cell, ignoring case and surrounding whitespace.
    pub fn parse_cell(s: &str) -> Option<TransactionType> {
        match s.trim().to_ascii_lowercase().as_str() {
            "expense" => Some(TransactionType::Expense),
            "income" => Some(TransactionType::Income),
            _ => None,
        }
    }
}

/// A single, validated transaction, ready to be appended to the worksheet.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Transaction {
    pub(crate) date: NaiveDate,
    pub(crate) category: String,
    pub(crate) item: String,
    pub(crate) amount: Amount,
    #[serde(rename = "type")]
    pub(crate) kind: TransactionType,
}

impl Transaction {
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn item(&self) -> &str {
        &self.item
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn kind(&self) -> TransactionType {
        self.kind
    }

    /// Produces the worksheet cells for this transaction, positioned to match `headers`. Columns
    /// that this type does not know about are left empty.
    pub fn to_cells<S>(&self, headers: &[S]) -> Vec<String>
    where
        S: AsRef<str>,
    {
        headers
            .iter()
            .map(|header| match header.as_ref() {
                DATE_STR => self.date.format(DATE_FORMAT).to_string(),
                CATEGORY_STR => self.category.clone(),
                ITEM_STR => self.item.clone(),
                AMOUNT_STR => self.amount.plain().to_string(),
                TYPE_STR => self.kind.to_string(),
                _ => String::new(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_parse_type_cell() {
        assert_eq!(
            TransactionType::parse_cell(" expense "),
            Some(TransactionType::Expense)
        );
        assert_eq!(
            TransactionType::parse_cell("INCOME"),
            Some(TransactionType::Income)
        );
        assert_eq!(TransactionType::parse_cell("Transfer"), None);
        assert_eq!(TransactionType::parse_cell(""), None);
    }

    #[test]
    fn test_to_cells_follows_header_order() {
        let t = Transaction {
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            category: "Groceries".to_string(),
            item: "milk".to_string(),
            amount: Amount::new(Decimal::new(1000, 2)),
            kind: TransactionType::Expense,
        };
        let cells = t.to_cells(&["Type", "Amount", "Notes", "Date", "Item", "Category"]);
        assert_eq!(
            cells,
            vec!["Expense", "10.00", "", "2024-01-15", "milk", "Groceries"]
        );
    }
}
