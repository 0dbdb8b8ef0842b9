use crate::model::Transaction;
use serde::{Deserialize, Serialize};

pub(crate) const DATE_STR: &str = "Date";
pub(crate) const CATEGORY_STR: &str = "Category";
pub(crate) const ITEM_STR: &str = "Item";
pub(crate) const AMOUNT_STR: &str = "Amount";
pub(crate) const TYPE_STR: &str = "Type";

/// The columns every transaction worksheet is expected to have, in the order they are created.
pub const CANONICAL_COLUMNS: [&str; 5] = [DATE_STR, CATEGORY_STR, ITEM_STR, AMOUNT_STR, TYPE_STR];

/// The transaction worksheet exactly as it is stored: a header row and rows of string cells.
///
/// Nothing here is interpreted. Cells that fail to parse, and columns that are not part of the
/// canonical set, are carried along untouched so that rewriting the worksheet never loses data.
/// Interpretation happens in `normalize`.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Default for Table {
    fn default() -> Self {
        Self::empty()
    }
}

impl Table {
    /// An empty table with the canonical columns. This is what a missing or unreadable worksheet
    /// turns into.
    pub fn empty() -> Self {
        Self {
            headers: CANONICAL_COLUMNS.iter().map(|s| s.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Builds a table from worksheet values where the first row with any content holds the
    /// headers.
    ///
    /// Rows with no content are dropped, including blank rows above the header. Rows shorter than the header are padded with empty
    /// cells. If a row is longer than the header, the header is extended with unnamed columns so
    /// that the extra cells survive a rewrite.
    pub fn from_sheet<S, R>(sheet_data: impl IntoIterator<Item = R>) -> Self
    where
        S: Into<String>,
        R: IntoIterator<Item = S>,
    {
        let mut rows = sheet_data
            .into_iter()
            .map(|row| row.into_iter().map(|s| s.into()).collect::<Vec<String>>())
            .filter(|row| !is_blank(row));

        let mut headers: Vec<String> = match rows.next() {
            Some(header_row) => header_row
                .into_iter()
                .map(|h| h.trim().to_string())
                .collect(),
            None => return Self::empty(),
        };

        let data: Vec<Vec<String>> = rows.collect();

        let width = data.iter().map(Vec::len).max().unwrap_or(0);
        if width > headers.len() {
            headers.resize(width, String::new());
        }

        let len = headers.len();
        let data = data
            .into_iter()
            .map(|mut row| {
                row.resize(len, String::new());
                row
            })
            .collect();

        Self {
            headers,
            rows: data,
        }
    }

    /// The table as worksheet values, header row first.
    pub fn to_sheet(&self) -> Vec<Vec<String>> {
        std::iter::once(self.headers.clone())
            .chain(self.rows.iter().cloned())
            .collect()
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// The number of data rows, not counting the header.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The index of the column named `name`, if present.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Appends `transaction` as a new row. Any canonical column missing from the header is added
    /// first.
    pub fn push(&mut self, transaction: &Transaction) {
        for name in CANONICAL_COLUMNS {
            if self.column(name).is_none() {
                self.headers.push(name.to_string());
                for row in self.rows.iter_mut() {
                    row.push(String::new());
                }
            }
        }
        self.rows.push(transaction.to_cells(&self.headers));
    }
}

/// True when `row` has no cell with content. Google returns a blank row as no cells at all.
pub(crate) fn is_blank<S: AsRef<str>>(row: &[S]) -> bool {
    row.iter().all(|cell| cell.as_ref().trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Amount, TransactionType};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn paycheck() -> Transaction {
        Transaction {
            date: NaiveDate::from_ymd_opt(2024, 1, 20).unwrap(),
            category: "Paycheck".to_string(),
            item: String::new(),
            amount: Amount::new(Decimal::new(200000, 2)),
            kind: TransactionType::Income,
        }
    }

    #[test]
    fn test_empty_sheet_is_canonical() {
        let table = Table::from_sheet(Vec::<Vec<String>>::new());
        assert_eq!(table, Table::empty());
        assert_eq!(table.headers(), CANONICAL_COLUMNS);
        assert!(table.is_empty());

        let blank_header = Table::from_sheet(vec![vec!["", " "]]);
        assert_eq!(blank_header, Table::empty());
    }

    #[test]
    fn test_from_sheet_pads_and_skips() {
        let table = Table::from_sheet(vec![
            vec!["Date", "Category", "Item", "Amount", "Type"],
            vec!["2024-01-20", "Paycheck", "", "2000"],
            vec!["", "", "", "", ""],
            vec!["2024-01-15", "Groceries", "milk", "10", "Expense", "extra"],
        ]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.headers().len(), 6);
        assert_eq!(table.rows()[0].len(), 6);
        assert_eq!(table.rows()[0][4], "");
        assert_eq!(table.rows()[1][5], "extra");
    }

    #[test]
    fn test_blank_rows_above_header() {
        let table = Table::from_sheet(vec![
            vec!["", "", "", "", ""],
            vec![],
            vec!["Date", "Category", "Item", "Amount", "Type"],
            vec!["2024-01-01", "Rent", "", "900", "Expense"],
            vec!["2024-01-20", "Paycheck", "", "2000", "Income"],
        ]);
        assert_eq!(table.headers(), CANONICAL_COLUMNS);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0][1], "Rent");
    }

    #[test]
    fn test_push_adds_missing_columns() {
        let mut table = Table::from_sheet(vec![vec!["Date", "Amount", "Notes"], vec![
            "2024-01-01", "5", "n",
        ]]);
        table.push(&paycheck());
        assert_eq!(
            table.headers(),
            ["Date", "Amount", "Notes", "Category", "Item", "Type"]
        );
        assert_eq!(table.rows()[0], ["2024-01-01", "5", "n", "", "", ""]);
        assert_eq!(
            table.rows()[1],
            ["2024-01-20", "2000.00", "", "Paycheck", "", "Income"]
        );
    }

    #[test]
    fn test_to_sheet_round_trip() {
        let mut table = Table::empty();
        table.push(&paycheck());
        let again = Table::from_sheet(table.to_sheet());
        assert_eq!(again, table);
    }
}
