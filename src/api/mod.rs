//! Access to the worksheet that holds the transactions.
//!
//! The `Sheet` trait is the raw cell-level interface. It is implemented for a Google spreadsheet
//! (`GoogleSheet`), a directory of CSV files (`CsvSheet`) and, in tests, an in-memory sheet
//! (`TestSheet`). `Store` sits on top of a `Sheet` and speaks in terms of `Table`s.

mod csv_sheet;
mod files;
mod google;
mod oauth;
mod store;
#[cfg(test)]
mod test_sheet;

use crate::config::StoreKind;
use crate::{Config, Result};
use csv_sheet::CsvSheet;
use google::GoogleSheet;
use tracing::debug;

/// OAuth scopes required for reading and writing the spreadsheet.
pub(crate) const OAUTH_SCOPES: &[&str] = &["https://www.googleapis.com/auth/spreadsheets"];

pub(crate) use csv_sheet::write_csv;
pub(crate) use oauth::TokenProvider;
pub(crate) use store::Store;
#[cfg(test)]
pub(crate) use test_sheet::TestSheet;

/// A spreadsheet made of named worksheets, each a grid of string cells.
#[async_trait::async_trait]
pub(crate) trait Sheet: Send + Sync {
    /// Returns every row of `worksheet`, the header row first. A worksheet that does not exist
    /// yet is returned as no rows.
    async fn get(&mut self, worksheet: &str) -> Result<Vec<Vec<String>>>;

    /// Replaces the entire content of `worksheet` with `rows`.
    async fn put(&mut self, worksheet: &str, rows: &[Vec<String>]) -> Result<()>;
}

/// Opens the `Store` described by `config`.
pub(crate) async fn store(config: &Config) -> Result<Store> {
    let sheet: Box<dyn Sheet> = match config.store_kind() {
        StoreKind::Google { spreadsheet_id } => {
            debug!("Opening Google spreadsheet {spreadsheet_id}");
            let token_provider =
                TokenProvider::load(&config.client_secret_path(), &config.token_path()).await?;
            Box::new(GoogleSheet::new(spreadsheet_id, token_provider).await?)
        }
        StoreKind::Csv { dir } => {
            debug!("Opening CSV store in {}", dir.display());
            Box::new(CsvSheet::new(dir))
        }
    };
    Ok(Store::new(sheet, config.worksheet(), config.backup()))
}
