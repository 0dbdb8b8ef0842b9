//! Aggregations over a normalized `Ledger`.
//!
//! Everything in here is a pure function of its inputs. Functions that depend on "now" take an
//! explicit `today` so that callers (and tests) decide what the current period is.

use crate::model::{Month, Period, TransactionType};
use crate::normalize::{Ledger, Record};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sum of Expense amounts in the calendar month containing `today`. Not rounded.
pub fn current_month_expense(ledger: &Ledger, today: NaiveDate) -> Decimal {
    period_total(ledger, Period::from(today), TransactionType::Expense)
}

/// Sum of Income amounts in the calendar month before the one containing `today`, rounded to a
/// whole unit (half to even).
pub fn last_month_income(ledger: &Ledger, today: NaiveDate) -> Decimal {
    period_total(ledger, Period::from(today).previous(), TransactionType::Income).round()
}

fn period_total(ledger: &Ledger, period: Period, kind: TransactionType) -> Decimal {
    ledger
        .records()
        .iter()
        .filter(|r| r.kind == kind && r.period() == period)
        .map(|r| r.amount)
        .sum()
}

/// Expense amounts for one month, by category.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct MonthBreakdown {
    pub month: Month,
    pub categories: BTreeMap<String, Decimal>,
    pub total: Decimal,
}

/// Expense amounts for one year, by month and category. There is always one entry per month, in
/// calendar order.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct MonthlyBreakdown {
    pub year: i32,
    pub months: Vec<MonthBreakdown>,
}

impl MonthlyBreakdown {
    /// Twelve months with nothing in them.
    pub fn empty(year: i32) -> Self {
        let months = Month::ALL
            .iter()
            .map(|&month| MonthBreakdown {
                month,
                categories: BTreeMap::new(),
                total: Decimal::ZERO,
            })
            .collect();
        Self { year, months }
    }

    /// True when no expense was recorded in any month of the year.
    pub fn is_empty(&self) -> bool {
        self.months.iter().all(|m| m.total.is_zero())
    }

    /// Every category that has an amount in at least one month, sorted.
    pub fn categories(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .months
            .iter()
            .flat_map(|m| m.categories.keys().map(String::as_str))
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }
}

/// Expense amounts of `year` grouped by month and category, with a total per month.
pub fn monthly_breakdown(ledger: &Ledger, year: i32) -> MonthlyBreakdown {
    let mut breakdown = MonthlyBreakdown::empty(year);
    for r in ledger.expenses().filter(|r| r.year == year) {
        let m = &mut breakdown.months[r.month.index()];
        *m.categories.entry(r.category.clone()).or_default() += r.amount;
        m.total += r.amount;
    }
    breakdown
}

/// Grand totals by transaction type.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct TypeTotals {
    pub income: Decimal,
    pub expense: Decimal,
}

impl TypeTotals {
    pub fn is_empty(&self) -> bool {
        self.income.is_zero() && self.expense.is_zero()
    }
}

pub fn type_totals(ledger: &Ledger) -> TypeTotals {
    ledger
        .records()
        .iter()
        .fold(TypeTotals::default(), |mut totals, r| {
            match r.kind {
                TransactionType::Income => totals.income += r.amount,
                TransactionType::Expense => totals.expense += r.amount,
            }
            totals
        })
}

/// Restricts the expense trend to one category and/or one year.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct TrendFilter {
    pub category: Option<String>,
    pub year: Option<i32>,
}

impl TrendFilter {
    fn matches(&self, r: &Record) -> bool {
        let category = self
            .category
            .as_deref()
            .map(|c| r.category.eq_ignore_ascii_case(c.trim()))
            .unwrap_or(true);
        let year = self.year.map(|y| r.year == y).unwrap_or(true);
        category && year
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub month: Month,
    pub total: Decimal,
}

/// Monthly expense totals on a full Jan..Dec axis.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Trend {
    pub filter: TrendFilter,
    pub points: Vec<TrendPoint>,
}

impl Trend {
    /// Twelve zero points.
    pub fn empty(filter: TrendFilter) -> Self {
        let points = Month::ALL
            .iter()
            .map(|&month| TrendPoint {
                month,
                total: Decimal::ZERO,
            })
            .collect();
        Self { filter, points }
    }

    pub fn is_empty(&self) -> bool {
        self.points.iter().all(|p| p.total.is_zero())
    }

    pub fn total(&self) -> Decimal {
        self.points.iter().map(|p| p.total).sum()
    }
}

/// Expense amounts summed by month, after applying `filter`. Months with no matching expense are
/// present with a zero total. Without a year filter, the same month of different years lands in
/// the same bucket.
pub fn monthly_expense_trend(ledger: &Ledger, filter: &TrendFilter) -> Trend {
    let mut trend = Trend::empty(filter.clone());
    for r in ledger.expenses().filter(|r| filter.matches(r)) {
        trend.points[r.month.index()].total += r.amount;
    }
    trend
}

/// The headline figures. `remaining` is the plain balance, income minus expenses, and goes
/// negative when spending exceeds income.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct Kpis {
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub remaining: Decimal,
}

pub fn kpis(ledger: &Ledger) -> Kpis {
    let totals = type_totals(ledger);
    Kpis {
        total_income: totals.income,
        total_expense: totals.expense,
        remaining: totals.income - totals.expense,
    }
}

/// The last `n` records in store order, newest first.
pub fn recent(ledger: &Ledger, n: usize) -> Vec<Record> {
    ledger.records().iter().rev().take(n).cloned().collect()
}

/// Everything shown on the dashboard.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub kpis: Kpis,
    pub current_period: Period,
    pub current_month_expense: Decimal,
    pub last_period: Period,
    pub last_month_income: Decimal,
    pub totals: TypeTotals,
    pub recent: Vec<Record>,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum Dashboard {
    /// Nothing has been recorded yet.
    NoData,
    Summary(Box<Summary>),
}

pub fn dashboard(ledger: Option<&Ledger>, today: NaiveDate, recent_count: usize) -> Dashboard {
    let Some(ledger) = ledger else {
        return Dashboard::NoData;
    };
    let current_period = Period::from(today);
    Dashboard::Summary(Box::new(Summary {
        kpis: kpis(ledger),
        current_period,
        current_month_expense: current_month_expense(ledger, today),
        last_period: current_period.previous(),
        last_month_income: last_month_income(ledger, today),
        totals: type_totals(ledger),
        recent: recent(ledger, recent_count),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Table;
    use crate::normalize::normalize;
    use std::str::FromStr;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn ledger(rows: &[[&str; 5]]) -> Ledger {
        let mut sheet = vec![vec!["Date", "Category", "Item", "Amount", "Type"]];
        sheet.extend(rows.iter().map(|r| r.to_vec()));
        normalize(&Table::from_sheet(sheet)).unwrap()
    }

    fn example() -> Ledger {
        ledger(&[
            ["2024-01-15", "Groceries", "milk", "10.00", "Expense"],
            ["2024-01-20", "Paycheck", "", "2000.00", "Income"],
        ])
    }

    #[test]
    fn test_worked_example() {
        let ledger = example();
        let totals = type_totals(&ledger);
        assert_eq!(totals.income, dec("2000.00"));
        assert_eq!(totals.expense, dec("10.00"));
        assert_eq!(current_month_expense(&ledger, date(2024, 1, 31)), dec("10.00"));
        assert_eq!(last_month_income(&ledger, date(2024, 2, 10)), dec("2000"));
    }

    #[test]
    fn test_january_looks_back_to_december() {
        let ledger = ledger(&[
            ["2023-12-31", "Bonus", "", "500", "Income"],
            ["2024-12-01", "Bonus", "", "700", "Income"],
        ]);
        assert_eq!(last_month_income(&ledger, date(2024, 1, 2)), dec("500"));
        assert_eq!(last_month_income(&ledger, date(2025, 1, 2)), dec("700"));
        assert_eq!(last_month_income(&ledger, date(2024, 2, 2)), Decimal::ZERO);
    }

    #[test]
    fn test_last_month_income_rounds_half_to_even() {
        let ledger = ledger(&[
            ["2024-01-10", "Cashback", "", "2.50", "Income"],
            ["2024-02-10", "Cashback", "", "3.50", "Income"],
            ["2024-03-10", "Cashback", "", "3.51", "Income"],
        ]);
        assert_eq!(last_month_income(&ledger, date(2024, 2, 1)), dec("2"));
        assert_eq!(last_month_income(&ledger, date(2024, 3, 1)), dec("4"));
        assert_eq!(last_month_income(&ledger, date(2024, 4, 1)), dec("4"));
    }

    #[test]
    fn test_current_month_expense_is_not_rounded() {
        let ledger = ledger(&[
            ["2024-05-01", "Groceries", "a", "1.25", "Expense"],
            ["2024-05-02", "Groceries", "b", "1.25", "Expense"],
            ["2023-05-02", "Groceries", "c", "9", "Expense"],
        ]);
        assert_eq!(current_month_expense(&ledger, date(2024, 5, 20)), dec("2.50"));
    }

    #[test]
    fn test_income_only_has_no_expense() {
        let ledger = ledger(&[["2024-03-01", "Paycheck", "", "100", "Income"]]);
        assert_eq!(current_month_expense(&ledger, date(2024, 3, 5)), Decimal::ZERO);
        assert_eq!(type_totals(&ledger).expense, Decimal::ZERO);
        assert!(monthly_breakdown(&ledger, 2024).is_empty());
        assert!(monthly_expense_trend(&ledger, &TrendFilter::default()).is_empty());
        assert_eq!(kpis(&ledger).remaining, dec("100"));
    }

    #[test]
    fn test_expense_only_has_no_income() {
        let ledger = ledger(&[["2024-03-01", "Car", "tires", "400", "Expense"]]);
        assert_eq!(last_month_income(&ledger, date(2024, 4, 5)), Decimal::ZERO);
        assert_eq!(type_totals(&ledger).income, Decimal::ZERO);
        assert_eq!(kpis(&ledger).remaining, dec("-400"));
    }

    #[test]
    fn test_monthly_breakdown_has_twelve_ordered_months() {
        let ledger = ledger(&[
            ["2024-11-03", "Travel", "flight", "300", "Expense"],
            ["2024-02-03", "Groceries", "milk", "4", "Expense"],
            ["2024-02-09", "Groceries", "eggs", "6", "Expense"],
            ["2024-02-09", "Restaurant", "pizza", "20", "Expense"],
            ["2023-02-09", "Restaurant", "pizza", "99", "Expense"],
            ["2024-02-10", "Paycheck", "", "1000", "Income"],
        ]);
        let breakdown = monthly_breakdown(&ledger, 2024);
        let months: Vec<Month> = breakdown.months.iter().map(|m| m.month).collect();
        assert_eq!(months, Month::ALL.to_vec());

        let feb = &breakdown.months[1];
        assert_eq!(feb.total, dec("30"));
        assert_eq!(feb.categories.get("Groceries"), Some(&dec("10")));
        assert_eq!(feb.categories.get("Restaurant"), Some(&dec("20")));
        assert!(breakdown.months[0].categories.is_empty());
        assert_eq!(breakdown.months[0].total, Decimal::ZERO);
        assert_eq!(breakdown.months[10].total, dec("300"));
        assert_eq!(
            breakdown.categories(),
            vec!["Groceries", "Restaurant", "Travel"]
        );
    }

    #[test]
    fn test_trend_filters() {
        let ledger = ledger(&[
            ["2023-03-01", "Groceries", "a", "5", "Expense"],
            ["2024-03-01", "Groceries", "b", "7", "Expense"],
            ["2024-03-02", "Car", "gas", "40", "Expense"],
            ["2024-06-02", "groceries", "c", "1", "Expense"],
        ]);

        let all = monthly_expense_trend(&ledger, &TrendFilter::default());
        assert_eq!(all.points.len(), 12);
        assert_eq!(all.points[2].total, dec("52"));
        assert_eq!(all.points[5].total, dec("1"));
        assert_eq!(all.points[0].total, Decimal::ZERO);

        let filter = TrendFilter {
            category: Some("Groceries".to_string()),
            year: Some(2024),
        };
        let groceries = monthly_expense_trend(&ledger, &filter);
        assert_eq!(groceries.points[2].total, dec("7"));
        assert_eq!(groceries.points[5].total, dec("1"));
        assert_eq!(groceries.total(), dec("8"));
        assert_eq!(groceries.filter, filter);
    }

    #[test]
    fn test_recent_is_newest_first() {
        let ledger = ledger(&[
            ["2024-01-01", "Groceries", "a", "1", "Expense"],
            ["2024-01-02", "Groceries", "b", "2", "Expense"],
            ["2024-01-03", "Groceries", "c", "3", "Expense"],
        ]);
        let items: Vec<String> = recent(&ledger, 2).into_iter().map(|r| r.item).collect();
        assert_eq!(items, vec!["c", "b"]);
        assert_eq!(recent(&ledger, 10).len(), 3);
    }

    #[test]
    fn test_dashboard() {
        assert_eq!(dashboard(None, date(2024, 2, 1), 5), Dashboard::NoData);

        let ledger = example();
        let Dashboard::Summary(summary) = dashboard(Some(&ledger), date(2024, 2, 1), 5) else {
            panic!("expected a summary");
        };
        assert_eq!(summary.kpis.total_income, dec("2000"));
        assert_eq!(summary.kpis.total_expense, dec("10"));
        assert_eq!(summary.kpis.remaining, dec("1990"));
        assert_eq!(summary.current_period, Period::new(2024, Month::Feb));
        assert_eq!(summary.last_period, Period::new(2024, Month::Jan));
        assert_eq!(summary.current_month_expense, Decimal::ZERO);
        assert_eq!(summary.last_month_income, dec("2000"));
        assert_eq!(summary.recent.len(), 2);
    }
}
