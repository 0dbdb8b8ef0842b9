//! Chart builders for the report aggregates.
//!
//! Each builder takes an aggregate from `report` and returns a `Figure`. An aggregate with nothing
//! in it becomes `Figure::NoData` so a page can show a placeholder instead of an empty chart.
//! Charts are ECharts option objects built with `charming` and rendered into a standalone HTML page
//! by `render_html`.

use crate::model::Month;
use crate::report::{MonthlyBreakdown, Trend, TypeTotals};
use charming::component::{Axis, Grid, Legend, Title};
use charming::element::{
    AxisPointer, AxisPointerType, AxisType, Emphasis, EmphasisFocus, Tooltip, Trigger,
};
use charming::series::{Bar, Line};
use charming::Chart;
use rust_decimal::prelude::ToPrimitive;
use maud::{html, PreEscaped, DOCTYPE};
use rust_decimal::Decimal;

const ECHARTS_CDN: &str = "https://cdn.jsdelivr.net/npm/echarts@5/dist/echarts.min.js";
const NO_DATA: &str = "No data recorded yet.";
const STYLE: &str = "body { font-family: sans-serif; margin: 2rem; }
.chart { width: 100%; max-width: 960px; height: 480px; margin-bottom: 2rem; }
.no-data { height: auto; color: #666; }";

/// A built chart, or the marker that there was nothing to chart.
pub enum Figure {
    Chart(Box<Chart>),
    NoData,
}

impl Figure {
    pub fn is_no_data(&self) -> bool {
        matches!(self, Figure::NoData)
    }

    /// The ECharts option object as JSON, if there is a chart.
    pub fn options(&self) -> Option<String> {
        match self {
            Figure::Chart(chart) => Some(chart.to_string()),
            Figure::NoData => None,
        }
    }
}

impl From<Chart> for Figure {
    fn from(chart: Chart) -> Self {
        Figure::Chart(Box::new(chart))
    }
}

/// Horizontal stacked bars of expenses per month, one series per category. Each month's label
/// carries its total, e.g. `Feb · 1.2k`.
pub fn monthly_breakdown_chart(breakdown: &MonthlyBreakdown) -> Figure {
    if breakdown.is_empty() {
        return Figure::NoData;
    }

    let labels: Vec<String> = breakdown
        .months
        .iter()
        .map(|m| month_label(m.month, m.total))
        .collect();

    let mut chart = Chart::new()
        .title(
            Title::new()
                .text("Monthly Expenses")
                .subtext(format!("{}, by category", breakdown.year)),
        )
        .tooltip(shadow_tooltip())
        .legend(Legend::new().top("bottom"))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom(60)
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Value))
        .y_axis(Axis::new().type_(AxisType::Category).data(labels));

    for category in breakdown.categories() {
        let data: Vec<f64> = breakdown
            .months
            .iter()
            .map(|m| to_f64(m.categories.get(category).copied().unwrap_or_default()))
            .collect();
        chart = chart.series(
            Bar::new()
                .name(category)
                .stack("Expenses")
                .emphasis(Emphasis::new().focus(EmphasisFocus::Series))
                .data(data),
        );
    }

    chart.into()
}

/// Income against expense, all time.
pub fn type_totals_chart(totals: &TypeTotals) -> Figure {
    if totals.is_empty() {
        return Figure::NoData;
    }

    Chart::new()
        .title(Title::new().text("Income vs Expense"))
        .tooltip(shadow_tooltip())
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(
            Axis::new()
                .type_(AxisType::Category)
                .data(vec!["Income", "Expense"]),
        )
        .y_axis(Axis::new().type_(AxisType::Value))
        .series(
            Bar::new()
                .name("Total")
                .data(vec![to_f64(totals.income), to_f64(totals.expense)]),
        )
        .into()
}

/// A line of monthly expense totals over the full Jan..Dec axis.
pub fn expense_trend_chart(trend: &Trend) -> Figure {
    if trend.is_empty() {
        return Figure::NoData;
    }

    let category = trend.filter.category.as_deref().unwrap_or("All categories");
    let subtext = match trend.filter.year {
        Some(year) => format!("{category}, {year}"),
        None => format!("{category}, all years"),
    };

    Chart::new()
        .title(Title::new().text("Expense Trend").subtext(subtext))
        .tooltip(Tooltip::new().trigger(Trigger::Axis))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(
            Axis::new()
                .type_(AxisType::Category)
                .data(Month::ALL.iter().map(|m| m.label()).collect::<Vec<_>>()),
        )
        .y_axis(Axis::new().type_(AxisType::Value))
        .series(
            Line::new()
                .name("Expenses")
                .data(trend.points.iter().map(|p| to_f64(p.total)).collect::<Vec<_>>()),
        )
        .into()
}

/// Renders the figures as a standalone HTML page. ECharts is loaded from a CDN. Each figure gets
/// a container with the given id; `NoData` figures get a placeholder message instead.
pub fn render_html(title: &str, figures: &[(&str, Figure)]) -> String {
    let script = figures
        .iter()
        .filter_map(|(id, figure)| {
            figure.options().map(|options| {
                format!(
                    "echarts.init(document.getElementById({})).setOption({});",
                    script_safe(&serde_json::Value::from(*id).to_string()),
                    script_safe(&options)
                )
            })
        })
        .collect::<Vec<_>>()
        .join("\n");

    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                title { (title) }
                script src=(ECHARTS_CDN) {}
                style { (PreEscaped(STYLE)) }
            }
            body {
                h1 { (title) }
                @for (id, figure) in figures {
                    @if figure.is_no_data() {
                        div id=(id) class="chart no-data" { p { (NO_DATA) } }
                    } @else {
                        div id=(id) class="chart" {}
                    }
                }
                script { (PreEscaped(script)) }
            }
        }
    }
    .into_string()
}

/// Escapes JSON for a `<script>` element so that text such as `</script>` inside a string value
/// cannot end the element. The escapes are still valid JSON.
fn script_safe(json: &str) -> String {
    json.replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}

fn shadow_tooltip() -> Tooltip {
    Tooltip::new()
        .trigger(Trigger::Axis)
        .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow))
}

fn month_label(month: Month, total: Decimal) -> String {
    if total.is_zero() {
        return month.label().to_string();
    }
    format!(
        "{} · {}",
        month.label(),
        format_num::format_num!(".2s", to_f64(total))
    )
}

fn to_f64(d: Decimal) -> f64 {
    d.to_f64().unwrap_or_default()
}
