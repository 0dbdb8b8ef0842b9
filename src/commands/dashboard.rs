use crate::args::DashboardArgs;
use crate::commands::{load_ledger, today_or, Out};
use crate::error::{ErrorType, IntoResult};
use crate::model::Amount;
use crate::report::{self, Dashboard, Summary};
use crate::{Config, Result};

const RECENT: usize = 5;
const NO_DATA: &str = "No data found. Add your first expense!";

/// Builds the dashboard: the running totals, this month's expenses, last month's income, the
/// totals by type and the most recent transactions.
pub async fn dashboard(config: &Config, args: &DashboardArgs) -> Result<Out<Dashboard>> {
    let ledger = load_ledger(config).await.pub_result(ErrorType::Store)?;
    let today = today_or(args.today);
    let dashboard = report::dashboard(ledger.as_ref(), today, args.recent.unwrap_or(RECENT));
    let message = match &dashboard {
        Dashboard::NoData => NO_DATA.to_string(),
        Dashboard::Summary(summary) => render(summary),
    };
    Ok(Out::new(message, dashboard))
}

fn render(s: &Summary) -> String {
    let mut lines = vec![
        format!("Total income:    {:>14}", money(s.kpis.total_income)),
        format!("Total expenses:  {:>14}", money(s.kpis.total_expense)),
        format!("Remaining:       {:>14}", money(s.kpis.remaining)),
        format!(
            "Expenses in {}: {}",
            s.current_period,
            money(s.current_month_expense)
        ),
        format!("Income in {}: {}", s.last_period, money(s.last_month_income)),
    ];
    if !s.recent.is_empty() {
        lines.push(String::new());
        lines.push("Recent transactions:".to_string());
        lines.extend(s.recent.iter().map(|r| {
            format!(
                "  {}  {:<7}  {:<15} {:>12}  {}",
                r.date,
                r.kind,
                r.category,
                money(r.amount),
                r.item
            )
            .trim_end()
            .to_string()
        }));
    }
    lines.join("\n")
}

fn money(value: rust_decimal::Decimal) -> String {
    Amount::currency(value).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn test_dashboard_no_data() {
        let env = TestEnv::new().await;
        let out = dashboard(&env.config(), &DashboardArgs::default())
            .await
            .unwrap();
        assert_eq!(out.message(), NO_DATA);
        assert_eq!(out.structure(), Some(&Dashboard::NoData));
    }

    #[tokio::test]
    async fn test_dashboard_summary() {
        let env = TestEnv::new().await;
        env.seed(&[
            &["Date", "Category", "Item", "Amount", "Type"],
            &["2024-01-15", "Groceries", "milk", "10.00", "Expense"],
            &["2024-01-20", "Paycheck", "", "2000.00", "Income"],
            &["2024-02-03", "Rent", "", "$1,200.00", "Expense"],
        ])
        .await;
        let args = DashboardArgs {
            today: NaiveDate::from_ymd_opt(2024, 2, 10),
            recent: Some(2),
        };
        let out = dashboard(&env.config(), &args).await.unwrap();
        let Some(Dashboard::Summary(summary)) = out.structure() else {
            panic!("expected a summary");
        };
        assert_eq!(summary.kpis.total_income, Decimal::from(2000));
        assert_eq!(summary.kpis.total_expense, Decimal::from(1210));
        assert_eq!(summary.kpis.remaining, Decimal::from(790));
        assert_eq!(summary.current_month_expense, Decimal::from(1200));
        assert_eq!(summary.last_month_income, Decimal::from(2000));
        assert_eq!(summary.recent.len(), 2);
        assert_eq!(summary.recent[0].category, "Rent");
        assert!(out.message().contains("$1,210.00"));
        assert!(out.message().contains("Recent transactions"));
    }

    #[tokio::test]
    async fn test_dashboard_lists_five_recent_by_default() {
        let env = TestEnv::new().await;
        let rows: Vec<[String; 5]> = (1..=7)
            .map(|day| {
                [
                    format!("2024-01-{day:02}"),
                    "Groceries".to_string(),
                    format!("item {day}"),
                    "1".to_string(),
                    "Expense".to_string(),
                ]
            })
            .collect();
        let header = ["Date", "Category", "Item", "Amount", "Type"];
        let mut sheet: Vec<&[&str]> = Vec::new();
        sheet.push(&header);
        let cells: Vec<Vec<&str>> = rows
            .iter()
            .map(|r| r.iter().map(String::as_str).collect())
            .collect();
        sheet.extend(cells.iter().map(Vec::as_slice));
        env.seed(&sheet).await;

        let args = DashboardArgs {
            today: NaiveDate::from_ymd_opt(2024, 1, 31),
            recent: None,
        };
        let out = dashboard(&env.config(), &args).await.unwrap();
        let Some(Dashboard::Summary(summary)) = out.structure() else {
            panic!("expected a summary");
        };
        let items: Vec<&str> = summary.recent.iter().map(|r| r.item.as_str()).collect();
        assert_eq!(items, ["item 7", "item 6", "item 5", "item 4", "item 3"]);
    }
}
