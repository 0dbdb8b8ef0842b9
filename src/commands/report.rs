use crate::args::{BreakdownArgs, TrendArgs};
use crate::commands::{load_ledger, today_or, Out};
use crate::error::{ErrorType, IntoResult};
use crate::model::Amount;
use crate::report::{
    monthly_breakdown, monthly_expense_trend, type_totals, MonthlyBreakdown, Trend, TrendFilter,
    TypeTotals,
};
use crate::{Config, Result};
use chrono::Datelike;
use rust_decimal::Decimal;

const NO_EXPENSES: &str = "No expenses recorded";

/// Expenses by month and category for one year.
pub async fn report_breakdown(
    config: &Config,
    args: &BreakdownArgs,
) -> Result<Out<MonthlyBreakdown>> {
    let year = args.year.unwrap_or_else(|| today_or(args.today).year());
    let ledger = load_ledger(config).await.pub_result(ErrorType::Store)?;
    let breakdown = match &ledger {
        Some(ledger) => monthly_breakdown(ledger, year),
        None => MonthlyBreakdown::empty(year),
    };

    let message = if breakdown.is_empty() {
        format!("{NO_EXPENSES} in {year}")
    } else {
        let mut lines = vec![format!("Expenses in {year}")];
        for m in breakdown.months.iter().filter(|m| !m.total.is_zero()) {
            lines.push(format!("{}: {}", m.month.label(), money(m.total)));
            lines.extend(
                m.categories
                    .iter()
                    .map(|(category, amount)| format!("    {category:<15} {:>12}", money(*amount))),
            );
        }
        lines.join("\n")
    };
    Ok(Out::new(message, breakdown))
}

/// Expense totals by month, optionally for one category.
pub async fn report_trend(config: &Config, args: &TrendArgs) -> Result<Out<Trend>> {
    let filter = TrendFilter {
        category: args
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string),
        year: if args.all_years {
            None
        } else {
            Some(args.year.unwrap_or_else(|| today_or(args.today).year()))
        },
    };
    let ledger = load_ledger(config).await.pub_result(ErrorType::Store)?;
    let trend = match &ledger {
        Some(ledger) => monthly_expense_trend(ledger, &filter),
        None => Trend::empty(filter.clone()),
    };

    let scope = describe(&filter);
    let message = if trend.is_empty() {
        format!("{NO_EXPENSES} {scope}")
    } else {
        let mut lines = vec![format!("Monthly expenses {scope}")];
        lines.extend(
            trend
                .points
                .iter()
                .map(|p| format!("{}: {:>12}", p.month.label(), money(p.total))),
        );
        lines.push(format!("Total: {}", money(trend.total())));
        lines.join("\n")
    };
    Ok(Out::new(message, trend))
}

/// Total income and total expenses over everything recorded.
pub async fn report_totals(config: &Config) -> Result<Out<TypeTotals>> {
    let ledger = load_ledger(config).await.pub_result(ErrorType::Store)?;
    let totals = ledger.as_ref().map(type_totals).unwrap_or_default();
    let message = if totals.is_empty() {
        "No transactions recorded".to_string()
    } else {
        format!(
            "Income: {}\nExpenses: {}",
            money(totals.income),
            money(totals.expense)
        )
    };
    Ok(Out::new(message, totals))
}

fn describe(filter: &TrendFilter) -> String {
    let category = filter
        .category
        .as_deref()
        .map(|c| format!("for {c} "))
        .unwrap_or_default();
    let year = filter
        .year
        .map(|y| format!("in {y}"))
        .unwrap_or_else(|| "across all years".to_string());
    format!("{category}{year}")
}

fn money(value: Decimal) -> String {
    Amount::currency(value).to_string()
}
