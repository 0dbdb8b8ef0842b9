//! Implements the `Sheet` trait with local CSV files, one file per worksheet.

use crate::api::Sheet;
use crate::{utils, Result};
use anyhow::Context;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// A directory of CSV files standing in for a spreadsheet. Worksheet `Sheet1` is stored in
/// `Sheet1.csv`. A missing file is an empty worksheet.
#[derive(Debug, Clone)]
pub(super) struct CsvSheet {
    dir: PathBuf,
}

impl CsvSheet {
    pub(super) fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, worksheet: &str) -> PathBuf {
        self.dir.join(format!("{worksheet}.csv"))
    }
}

#[async_trait::async_trait]
impl Sheet for CsvSheet {
    async fn get(&mut self, worksheet: &str) -> Result<Vec<Vec<String>>> {
        let path = self.path(worksheet);
        trace!("get for {}", path.display());
        if !tokio::fs::try_exists(&path)
            .await
            .with_context(|| format!("Unable to check for {}", path.display()))?
        {
            debug!("{} does not exist yet, treating it as empty", path.display());
            return Ok(Vec::new());
        }
        let content = utils::read(&path).await?;
        parse_csv(&content).with_context(|| format!("Unable to parse {}", path.display()))
    }

    async fn put(&mut self, worksheet: &str, rows: &[Vec<String>]) -> Result<()> {
        let path = self.path(worksheet);
        trace!("put {} rows to {}", rows.len(), path.display());
        let data = write_csv(rows)?;

        // Write next to the target and rename over it so a failed write leaves the old file intact
        let tmp = self.dir.join(format!(".{worksheet}.csv.tmp"));
        utils::write(&tmp, data).await?;
        rename(&tmp, &path).await
    }
}

/// Parses CSV text into rows of cells. Rows may have different lengths.
pub(crate) fn parse_csv(content: &str) -> Result<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.context("Invalid CSV record")?;
        rows.push(record.iter().map(|field| field.to_string()).collect());
    }
    Ok(rows)
}

/// Serializes rows of cells as CSV text.
pub(crate) fn write_csv(rows: &[Vec<String>]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());
    for row in rows {
        writer.write_record(row).context("Unable to write CSV record")?;
    }
    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Unable to finish writing CSV: {e}"))
}

async fn rename(from: &Path, to: &Path) -> Result<()> {
    tokio::fs::rename(from, to).await.with_context(|| {
        format!(
            "Unable to move '{}' to '{}'",
            from.display(),
            to.display()
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
        data.iter()
            .map(|r| r.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let tmp = TempDir::new().unwrap();
        let mut sheet = CsvSheet::new(tmp.path());
        assert!(sheet.get("Sheet1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let tmp = TempDir::new().unwrap();
        let mut sheet = CsvSheet::new(tmp.path());
        let data = rows(&[
            &["Date", "Category", "Item", "Amount", "Type"],
            &["2024-01-15", "Groceries", "milk, 2%", "$1,000.50", "Expense"],
            &["2024-01-20", "Paycheck", "", "2000.00", "Income"],
        ]);
        sheet.put("Sheet1", &data).await.unwrap();
        assert!(tmp.path().join("Sheet1.csv").is_file());
        assert!(!tmp.path().join(".Sheet1.csv.tmp").exists());
        assert_eq!(sheet.get("Sheet1").await.unwrap(), data);
        assert!(sheet.get("Other").await.unwrap().is_empty());
    }

    #[test]
    fn test_parse_ragged_rows() {
        let parsed = parse_csv("a,b,c\n1,2\n").unwrap();
        assert_eq!(parsed, rows(&[&["a", "b", "c"], &["1", "2"]]));
    }
}
