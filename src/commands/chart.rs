use crate::args::ChartArgs;
use crate::chart::{expense_trend_chart, monthly_breakdown_chart, render_html, type_totals_chart};
use crate::commands::{load_ledger, today_or, Out};
use crate::error::{ErrorType, IntoResult};
use crate::report::{
    monthly_breakdown, monthly_expense_trend, type_totals, MonthlyBreakdown, Trend, TrendFilter,
    TypeTotals,
};
use crate::{utils, Config, Result};
use chrono::Datelike;
use serde::Serialize;
use std::path::PathBuf;

const CHARTS_HTML: &str = "charts.html";

/// Where the charts were written and which of them had data.
#[derive(Debug, Clone, Serialize)]
pub struct Charted {
    pub path: PathBuf,
    pub charts: Vec<ChartStatus>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartStatus {
    pub id: String,
    pub has_data: bool,
}

/// Writes the monthly breakdown, the totals by type and the expense trend to one HTML page.
pub async fn chart(config: &Config, args: &ChartArgs) -> Result<Out<Charted>> {
    let year = args.year.unwrap_or_else(|| today_or(args.today).year());
    let filter = TrendFilter {
        category: args.category.clone(),
        year: Some(year),
    };
    let ledger = load_ledger(config).await.pub_result(ErrorType::Store)?;
    let (breakdown, totals, trend) = match &ledger {
        Some(ledger) => (
            monthly_breakdown(ledger, year),
            type_totals(ledger),
            monthly_expense_trend(ledger, &filter),
        ),
        None => (
            MonthlyBreakdown::empty(year),
            TypeTotals::default(),
            Trend::empty(filter),
        ),
    };

    let figures = [
        ("breakdown", monthly_breakdown_chart(&breakdown)),
        ("totals", type_totals_chart(&totals)),
        ("trend", expense_trend_chart(&trend)),
    ];
    let html = render_html(&format!("Expenses {year}"), &figures);

    let path = args
        .output
        .clone()
        .unwrap_or_else(|| config.root().join(CHARTS_HTML));
    utils::write(&path, html).await.pub_result(ErrorType::Io)?;

    let charts = figures
        .iter()
        .map(|(id, figure)| ChartStatus {
            id: id.to_string(),
            has_data: !figure.is_no_data(),
        })
        .collect();
    Ok(Out::new(
        format!("Wrote charts to {}", path.display()),
        Charted { path, charts },
    ))
}
