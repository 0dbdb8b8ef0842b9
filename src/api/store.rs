use crate::api::Sheet;
use crate::backup::Backup;
use crate::model::{is_blank, Table, Transaction};
use crate::Result;
use anyhow::Context;
use tracing::{debug, info, warn};

/// Reads and writes the transaction worksheet as a `Table`.
///
/// Every write replaces the whole worksheet. Before an append replaces it, the rows that were there
/// are saved as a CSV snapshot in the backups directory.
pub(crate) struct Store {
    sheet: Box<dyn Sheet>,
    worksheet: String,
    backup: Backup,
}

impl Store {
    pub(crate) fn new(sheet: Box<dyn Sheet>, worksheet: impl Into<String>, backup: Backup) -> Self {
        Self {
            sheet,
            worksheet: worksheet.into(),
            backup,
        }
    }

    pub(crate) fn worksheet(&self) -> &str {
        &self.worksheet
    }

    /// Reads the worksheet for display. A worksheet that cannot be read is logged and treated as
    /// empty, so reports show "no data" rather than failing.
    pub(crate) async fn read(&mut self) -> Table {
        match self.try_read().await {
            Ok(table) => table,
            Err(e) => {
                warn!("Unable to read the '{}' worksheet: {e:#}", self.worksheet);
                Table::empty()
            }
        }
    }

    /// Reads the worksheet, failing if it cannot be read.
    pub(crate) async fn try_read(&mut self) -> Result<Table> {
        Ok(Table::from_sheet(self.get().await?))
    }

    async fn get(&mut self) -> Result<Vec<Vec<String>>> {
        let rows = self.sheet.get(&self.worksheet).await?;
        debug!("Read {} rows from '{}'", rows.len(), self.worksheet);
        Ok(rows)
    }

    /// Appends `transaction` to the end of the worksheet and returns the number of data rows
    /// after the append.
    ///
    /// This reads the whole worksheet, adds the row and writes everything back. There is no
    /// isolation between the read and the write: if another writer changes the worksheet in
    /// between, its change is lost. Callers within one process must serialize appends.
    ///
    /// A failed read aborts the append. Treating an unreadable worksheet as empty here would
    /// replace every existing row with the new one. The backup is taken from the rows exactly as
    /// they were read, before any parsing.
    pub(crate) async fn append(&mut self, transaction: &Transaction) -> Result<usize> {
        let rows = self
            .get()
            .await
            .context("Unable to read the worksheet before appending")?;
        self.save_backup(&rows).await?;
        let mut table = Table::from_sheet(rows);
        table.push(transaction);
        self.write(&table).await?;
        info!(
            "Added {} {} on {} to '{}'",
            transaction.kind(),
            transaction.amount(),
            transaction.date(),
            self.worksheet
        );
        Ok(table.len())
    }

    /// Overwrites the whole worksheet with `table`.
    pub(crate) async fn write(&mut self, table: &Table) -> Result<()> {
        self.sheet
            .put(&self.worksheet, &table.to_sheet())
            .await
            .with_context(|| format!("Unable to write the '{}' worksheet", self.worksheet))
    }

    async fn save_backup(&self, rows: &[Vec<String>]) -> Result<()> {
        if rows.iter().all(|row| is_blank(row)) {
            return Ok(());
        }
        let path = self.backup.save_rows(&self.worksheet, rows).await?;
        debug!("Saved a backup of '{}' to {}", self.worksheet, path.display());
        Ok(())
    }
}
