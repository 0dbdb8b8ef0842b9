//! Implements the `Sheet` trait in memory for tests.

use crate::api::Sheet;
use crate::Result;
use anyhow::bail;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct State {
    worksheets: HashMap<String, Vec<Vec<String>>>,
    fail_reads: bool,
    fail_writes: bool,
    writes: usize,
}

/// An in-memory `Sheet`. Clones share the same worksheets, so a test can keep a handle and
/// inspect what a `Store` wrote.
#[derive(Debug, Clone, Default)]
pub(crate) struct TestSheet {
    state: Arc<Mutex<State>>,
}

impl TestSheet {
    pub(crate) fn with_rows(worksheet: &str, rows: &[&[&str]]) -> Self {
        let sheet = Self::default();
        sheet.set(
            worksheet,
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        );
        sheet
    }

    pub(crate) fn set(&self, worksheet: &str, rows: Vec<Vec<String>>) {
        self.state
            .lock()
            .unwrap()
            .worksheets
            .insert(worksheet.to_string(), rows);
    }

    pub(crate) fn rows(&self, worksheet: &str) -> Option<Vec<Vec<String>>> {
        self.state.lock().unwrap().worksheets.get(worksheet).cloned()
    }

    pub(crate) fn fail_reads(&self, fail: bool) {
        self.state.lock().unwrap().fail_reads = fail;
    }

    pub(crate) fn fail_writes(&self, fail: bool) {
        self.state.lock().unwrap().fail_writes = fail;
    }

    /// The number of successful `put` calls.
    pub(crate) fn writes(&self) -> usize {
        self.state.lock().unwrap().writes
    }
}

#[async_trait::async_trait]
impl Sheet for TestSheet {
    async fn get(&mut self, worksheet: &str) -> Result<Vec<Vec<String>>> {
        let state = self.state.lock().unwrap();
        if state.fail_reads {
            bail!("simulated read failure for '{worksheet}'");
        }
        Ok(state.worksheets.get(worksheet).cloned().unwrap_or_default())
    }

    async fn put(&mut self, worksheet: &str, rows: &[Vec<String>]) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_writes {
            bail!("simulated write failure for '{worksheet}'");
        }
        state
            .worksheets
            .insert(worksheet.to_string(), rows.to_vec());
        state.writes += 1;
        Ok(())
    }
}
