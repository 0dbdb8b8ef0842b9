//! These structs provide the CLI interface for the expenses CLI.
//!
//! The arguments of the `add`, `dashboard` and `report` subcommands double as the parameters of
//! the matching MCP tools, which is why they also derive `Deserialize` and `JsonSchema`.

use crate::model::Amount;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// expenses: A command-line tool for tracking personal expenses and income.
///
/// Transactions are kept in a single worksheet, either in a Google Sheet or in a local CSV file.
/// You add expenses and incomes from the command line and view a dashboard, monthly reports and
/// charts built from everything recorded so far.
///
/// There is also a mode in which an AI agent can use this program through the mcp subcommand.
#[derive(Debug, Parser, Clone)]
#[command(version)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and initialize the configuration files.
    ///
    /// This is the first command you should run. Choose where transactions are stored:
    ///
    /// - With --csv-dir, transactions are kept in `<worksheet>.csv` in that directory. Nothing else
    ///   is needed.
    ///
    /// - With --sheet-url and --client-secret, transactions are kept in a worksheet of a Google
    ///   Sheet. You need OAuth client credentials for a desktop app, downloaded as JSON from the
    ///   Google Cloud console. Run `expenses auth` afterwards.
    Init(InitArgs),
    /// Authenticate with Google Sheets via OAuth.
    Auth(AuthArgs),
    /// Record an expense or an income.
    Add(AddArgs),
    /// Show the totals, this month's spending, last month's income and recent transactions.
    Dashboard(DashboardArgs),
    /// Show monthly reports.
    Report(ReportArgs),
    /// Write the breakdown, totals and trend charts to an HTML file.
    Chart(ChartArgs),
    /// List the expense and income categories.
    Categories,
    /// Run as an MCP server over stdio.
    Mcp(McpArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where data and configuration is held. Defaults to ~/expenses
    #[arg(long, env = "EXPENSES_HOME", default_value_t = default_expenses_home())]
    expenses_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, expenses_home: PathBuf) -> Self {
        Self {
            log_level,
            expenses_home: expenses_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn expenses_home(&self) -> &DisplayPath {
        &self.expenses_home
    }
}

/// Args for the `expenses init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// Keep transactions as CSV files in this directory. Relative paths are relative to the
    /// expenses home directory.
    #[arg(long, conflicts_with_all = ["sheet_url", "client_secret"])]
    csv_dir: Option<PathBuf>,

    /// The URL to your Google sheet. It looks like this:
    /// https://docs.google.com/spreadsheets/d/1a7Km9FxQwRbPt82JvN4LzYpH5OcGnWsT6iDuE3VhMjX
    #[arg(long, requires = "client_secret")]
    sheet_url: Option<String>,

    /// The path to your downloaded OAuth client credentials. This file will be copied to the
    /// default secrets location in the main data directory.
    #[arg(long, requires = "sheet_url")]
    client_secret: Option<PathBuf>,

    /// The worksheet (tab) that holds the transactions.
    #[arg(long, default_value = "Sheet1")]
    worksheet: String,
}

impl InitArgs {
    pub fn new(
        csv_dir: Option<PathBuf>,
        sheet_url: Option<String>,
        client_secret: Option<PathBuf>,
        worksheet: impl Into<String>,
    ) -> Self {
        Self {
            csv_dir,
            sheet_url,
            client_secret,
            worksheet: worksheet.into(),
        }
    }

    pub fn csv_dir(&self) -> Option<&Path> {
        self.csv_dir.as_deref()
    }

    pub fn sheet_url(&self) -> Option<&str> {
        self.sheet_url.as_deref()
    }

    pub fn client_secret(&self) -> Option<&Path> {
        self.client_secret.as_deref()
    }

    pub fn worksheet(&self) -> &str {
        &self.worksheet
    }
}

/// Args for the `expenses auth` command.
#[derive(Debug, Parser, Clone)]
pub struct AuthArgs {
    /// Verify and refresh authentication.
    #[arg(long)]
    verify: bool,
}

impl AuthArgs {
    pub fn new(verify: bool) -> Self {
        Self { verify }
    }

    pub fn verify(&self) -> bool {
        self.verify
    }
}

/// Args for the `expenses add` command.
#[derive(Debug, Parser, Clone)]
pub struct AddArgs {
    #[command(subcommand)]
    entry: AddSubcommand,
}

impl AddArgs {
    pub fn entry(&self) -> &AddSubcommand {
        &self.entry
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum AddSubcommand {
    /// Record money spent.
    Expense(AddExpenseArgs),
    /// Record money received.
    Income(AddIncomeArgs),
}

/// Records an expense.
#[derive(Debug, Clone, Parser, Serialize, Deserialize, JsonSchema)]
pub struct AddExpenseArgs {
    /// The expense category, one of: House, Car, Childcare, Groceries, Utilities, Shopping,
    /// Medical, Family support, Kids activities, Restaurant, Health & Fitness, Entertainment,
    /// Travel, Gifts, Taxes, Other. Case does not matter.
    #[arg(long)]
    pub category: String,

    /// What the money was spent on.
    #[arg(long)]
    pub description: String,

    /// The amount spent, greater than zero, e.g. "12.50" or "$1,200". It is kept to cents.
    #[arg(long)]
    #[schemars(with = "String")]
    pub amount: Amount,

    /// The date of the expense as YYYY-MM-DD. Defaults to today.
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<String>")]
    pub date: Option<NaiveDate>,
}

/// Records an income.
#[derive(Debug, Clone, Parser, Serialize, Deserialize, JsonSchema)]
pub struct AddIncomeArgs {
    /// The income category, one of: Paycheck, Bonus, Reimbursement, Cashback, Gift. Case does
    /// not matter.
    #[arg(long)]
    pub category: String,

    /// The amount received, greater than zero, e.g. "2000" or "$2,000.00". It is kept to cents.
    #[arg(long)]
    #[schemars(with = "String")]
    pub amount: Amount,

    /// The date of the income as YYYY-MM-DD. Defaults to today.
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<String>")]
    pub date: Option<NaiveDate>,
}

/// Shows the dashboard.
#[derive(Debug, Default, Clone, Parser, Serialize, Deserialize, JsonSchema)]
pub struct DashboardArgs {
    /// Compute "this month" and "last month" as of this date (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<String>")]
    pub today: Option<NaiveDate>,

    /// How many of the most recent transactions to list. Defaults to 5.
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recent: Option<usize>,
}

/// Args for the `expenses report` command.
#[derive(Debug, Parser, Clone)]
pub struct ReportArgs {
    #[command(subcommand)]
    report: ReportSubcommand,
}

impl ReportArgs {
    pub fn report(&self) -> &ReportSubcommand {
        &self.report
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum ReportSubcommand {
    /// Expenses per category for each month of a year.
    Breakdown(BreakdownArgs),
    /// Total expenses per month, optionally for one category.
    Trend(TrendArgs),
    /// Total income and total expenses over everything recorded.
    Totals,
}

/// The monthly expense breakdown for one year.
#[derive(Debug, Default, Clone, Parser, Serialize, Deserialize, JsonSchema)]
pub struct BreakdownArgs {
    /// The year to report on. Defaults to the current year.
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,

    /// The date that decides the current year (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<String>")]
    pub today: Option<NaiveDate>,
}

/// The monthly expense trend.
#[derive(Debug, Default, Clone, Parser, Serialize, Deserialize, JsonSchema)]
pub struct TrendArgs {
    /// Only count expenses in this category. Defaults to all categories.
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// The year to report on. Defaults to the current year.
    #[arg(long, conflicts_with = "all_years")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,

    /// Add up each month across every year instead of reporting on one year.
    #[arg(long)]
    #[serde(default)]
    pub all_years: bool,

    /// The date that decides the current year (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<String>")]
    pub today: Option<NaiveDate>,
}

/// Args for the `expenses chart` command.
#[derive(Debug, Default, Clone, Parser)]
pub struct ChartArgs {
    /// Where to write the HTML page. Defaults to $EXPENSES_HOME/charts.html
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Only chart this expense category in the trend chart.
    #[arg(long)]
    pub category: Option<String>,

    /// The year to chart. Defaults to the current year.
    #[arg(long)]
    pub year: Option<i32>,

    /// The date that decides the current year (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    pub today: Option<NaiveDate>,
}

/// Args for the `expenses mcp` command.
#[derive(Debug, Parser, Clone)]
pub struct McpArgs {}

fn default_expenses_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("expenses"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --expenses-home or EXPENSES_HOME instead of relying on the \
                default home directory. If you continue using the program right now, you may \
                have problems!",
            );
            PathBuf::from("expenses")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}
