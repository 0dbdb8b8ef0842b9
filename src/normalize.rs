//! Turns the raw worksheet `Table` into typed, period-tagged `Record`s.
//!
//! Every cell is coerced exactly once, here. Aggregation code only ever sees a `Ledger`, so the
//! coercion rules below are the only ones in the program:
//!
//! - `Amount`: parsed with `Amount::from_str`. A cell that does not parse counts as zero and is
//!   logged.
//! - `Date`: one of `DATE_FORMATS`. A row whose date does not parse cannot be put in a period,
//!   so it is skipped and logged.
//! - `Type`: `Expense` or `Income`, any case. Other values are skipped and logged.
//!
//! The table itself is never modified, so skipped rows are still written back on the next append.

use crate::model::{
    Amount, Month, Period, Table, TransactionType, CANONICAL_COLUMNS, DATE_FORMAT, MAX_AMOUNT,
};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::warn;

/// Date formats accepted in the `Date` column. The first is the one this program writes; the
/// others are what a spreadsheet tends to hand back once it has re-rendered a date cell.
const DATE_FORMATS: [&str; 3] = [DATE_FORMAT, "%m/%d/%Y", "%Y/%m/%d"];

/// Date-time formats accepted in the `Date` column. The time part is discarded.
const DATE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// A normalized transaction with its derived calendar fields.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Record {
    pub date: NaiveDate,
    pub category: String,
    pub item: String,
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub year: i32,
    pub month: Month,
}

impl Record {
    pub fn period(&self) -> Period {
        Period::new(self.year, self.month)
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionType::Expense
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionType::Income
    }
}

/// The normalized transactions, in worksheet order. A `Ledger` only exists when there is at least
/// one usable row; "no data" is represented by `normalize` returning `None`.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    records: Vec<Record>,
}

impl Ledger {
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// A ledger from `normalize` always holds at least one record, so this is false for it.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn expenses(&self) -> impl Iterator<Item = &Record> {
        self.records.iter().filter(|r| r.is_expense())
    }

    pub fn incomes(&self) -> impl Iterator<Item = &Record> {
        self.records.iter().filter(|r| r.is_income())
    }
}

/// Normalizes `table`. Returns `None` when there is nothing to report on: the table has no rows,
/// or none of its rows survive normalization.
pub fn normalize(table: &Table) -> Option<Ledger> {
    if table.is_empty() {
        return None;
    }

    let [date_ix, category_ix, item_ix, amount_ix, type_ix] =
        CANONICAL_COLUMNS.map(|name| table.column(name));

    let mut records = Vec::with_capacity(table.len());
    for (row_ix, row) in table.rows().iter().enumerate() {
        // Row numbers in log messages are 1-based and count the header, like the sheet does
        let sheet_row = row_ix + 2;
        let cell = |ix: Option<usize>| -> &str {
            ix.and_then(|ix| row.get(ix))
                .map(|s| s.trim())
                .unwrap_or_default()
        };

        let date = match parse_date(cell(date_ix)) {
            Some(date) => date,
            None => {
                warn!(
                    "Skipping row {sheet_row}: unable to parse date '{}'",
                    cell(date_ix)
                );
                continue;
            }
        };

        let kind = match TransactionType::parse_cell(cell(type_ix)) {
            Some(kind) => kind,
            None => {
                warn!(
                    "Skipping row {sheet_row}: unknown transaction type '{}'",
                    cell(type_ix)
                );
                continue;
            }
        };

        let amount = coerce_amount(cell(amount_ix), sheet_row);
        let period = Period::from(date);

        records.push(Record {
            date,
            category: cell(category_ix).to_string(),
            item: cell(item_ix).to_string(),
            amount,
            kind,
            year: period.year,
            month: period.month,
        });
    }

    if records.is_empty() {
        return None;
    }
    Some(Ledger { records })
}

/// The single amount coercion rule: amounts that are not a number, or whose magnitude is beyond
/// `MAX_AMOUNT`, count as zero.
fn coerce_amount(s: &str, sheet_row: usize) -> Decimal {
    match Amount::from_str(s) {
        Ok(amount) if amount.is_within_limit() => amount.value(),
        Ok(_) => {
            warn!("Row {sheet_row}: amount '{s}' is larger than {MAX_AMOUNT}, counting it as 0");
            Decimal::ZERO
        }
        Err(e) => {
            warn!("Row {sheet_row}: amount '{s}' is not a number ({e}), counting it as 0");
            Decimal::ZERO
        }
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
        .or_else(|| {
            DATE_TIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
                .map(|dt| dt.date())
        })
}
