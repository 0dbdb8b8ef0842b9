//! Command handlers for the expenses CLI.
//!
//! Each handler returns an `Out`, which the CLI prints and the MCP server returns as tool content.

mod add;
mod auth;
mod categories;
mod chart;
mod dashboard;
mod init;
mod mcp;
mod report;

use crate::normalize::{normalize, Ledger};
use crate::{api, Config, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info};

pub use add::{add, add_expense, add_income, Added};
pub use auth::{auth, auth_verify};
pub use categories::{categories, Categories};
pub use chart::{chart, ChartStatus, Charted};
pub use dashboard::dashboard;
pub use init::init;
pub use mcp::mcp;
pub use report::{report_breakdown, report_totals, report_trend};

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data to both the command line and MCP server interfaces.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// Reads the worksheet and normalizes it. `None` means there is nothing recorded yet, which
/// includes a worksheet that could not be read.
async fn load_ledger(config: &Config) -> Result<Option<Ledger>> {
    let mut store = api::store(config).await?;
    let table = store.read().await;
    Ok(normalize(&table))
}

fn today_or(today: Option<NaiveDate>) -> NaiveDate {
    today.unwrap_or_else(crate::entry::local_today)
}
