//! Calendar months and year/month periods.
//!
//! `Month` orders by the calendar, not by its label, so sorting or grouping by month always
//! yields `Jan, Feb, ..., Dec`.

use chrono::{Datelike, NaiveDate};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// A three-letter calendar month. The derived `Ord` follows declaration order, which is calendar
/// order.
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum Month {
    Jan,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
}

serde_plain::derive_display_from_serialize!(Month);
serde_plain::derive_fromstr_from_deserialize!(Month);

impl Month {
    /// All twelve months in calendar order. Used to build a full month axis even when some months
    /// have no data.
    pub const ALL: [Month; 12] = [
        Month::Jan,
        Month::Feb,
        Month::Mar,
        Month::Apr,
        Month::May,
        Month::Jun,
        Month::Jul,
        Month::Aug,
        Month::Sep,
        Month::Oct,
        Month::Nov,
        Month::Dec,
    ];

    /// Converts a 1-based month number, as returned by `chrono::Datelike::month`.
    pub fn from_number(n: u32) -> Option<Month> {
        let ix = usize::try_from(n).ok()?.checked_sub(1)?;
        Month::ALL.get(ix).copied()
    }

    /// The 1-based month number.
    pub fn number(self) -> u32 {
        self as u32 + 1
    }

    /// The zero-based position on a Jan..Dec axis.
    pub fn index(self) -> usize {
        self as usize
    }

    /// The month's three-letter label, e.g. `Jan`.
    pub fn label(self) -> &'static str {
        match self {
            Month::Jan => "Jan",
            Month::Feb => "Feb",
            Month::Mar => "Mar",
            Month::Apr => "Apr",
            Month::May => "May",
            Month::Jun => "Jun",
            Month::Jul => "Jul",
            Month::Aug => "Aug",
            Month::Sep => "Sep",
            Month::Oct => "Oct",
            Month::Nov => "Nov",
            Month::Dec => "Dec",
        }
    }
}

impl From<NaiveDate> for Month {
    fn from(date: NaiveDate) -> Self {
        // chrono guarantees 1..=12
        Month::ALL[date.month0() as usize]
    }
}

/// A calendar month in a specific year: the bucket that transactions are grouped into.
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize, JsonSchema,
)]
pub struct Period {
    pub year: i32,
    pub month: Month,
}

impl Period {
    pub fn new(year: i32, month: Month) -> Self {
        Self { year, month }
    }

    /// The period immediately before this one. January rolls back to December of the previous
    /// year.
    pub fn previous(self) -> Period {
        match self.month {
            Month::Jan => Period::new(self.year - 1, Month::Dec),
            m => Period::new(self.year, Month::ALL[m.index() - 1]),
        }
    }

    /// Returns true if `date` falls within this period.
    pub fn contains(self, date: NaiveDate) -> bool {
        Period::from(date) == self
    }
}

impl From<NaiveDate> for Period {
    fn from(date: NaiveDate) -> Self {
        Period::new(date.year(), Month::from(date))
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.month, self.year)
    }
}
