//! In-process store used by tests and dry runs

use super::{CellValue, RemoteStore, Worksheet};
use crate::error::{ConnectionError, WriteError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct MemoryState {
    // spreadsheet -> worksheet -> rows
    sheets: HashMap<String, HashMap<String, Vec<Vec<CellValue>>>>,
    opens: usize,
    failing_opens: usize,
    failing_append: Option<String>,
}

/// Store that keeps appended rows in memory.
///
/// Clones share the same rows, so a test can keep one clone for inspection
/// while the pipeline owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty worksheet so that `open` can find it
    pub fn with_worksheet(self, spreadsheet: &str, worksheet: &str) -> Self {
        self.lock()
            .sheets
            .entry(spreadsheet.to_string())
            .or_default()
            .entry(worksheet.to_string())
            .or_default();
        self
    }

    /// Rows appended so far
    pub fn rows(&self, spreadsheet: &str, worksheet: &str) -> Vec<Vec<CellValue>> {
        self.lock()
            .sheets
            .get(spreadsheet)
            .and_then(|s| s.get(worksheet))
            .cloned()
            .unwrap_or_default()
    }

    /// Number of successful `open` calls
    pub fn open_count(&self) -> usize {
        self.lock().opens
    }

    /// Make the next `count` opens fail with a transport error
    pub fn fail_opens(&self, count: usize) {
        self.lock().failing_opens = count;
    }

    /// Make the next append fail with the given message
    pub fn fail_next_append(&self, message: impl Into<String>) {
        self.lock().failing_append = Some(message.into());
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RemoteStore for MemoryStore {
    fn open(&self, spreadsheet: &str, worksheet: &str) -> Result<Arc<dyn Worksheet>, ConnectionError> {
        let mut state = self.lock();
        if state.failing_opens > 0 {
            state.failing_opens -= 1;
            return Err(ConnectionError::Transport("simulated outage".to_string()));
        }

        let sheets = state
            .sheets
            .get(spreadsheet)
            .ok_or_else(|| ConnectionError::SpreadsheetNotFound(spreadsheet.to_string()))?;
        if !sheets.contains_key(worksheet) {
            return Err(ConnectionError::WorksheetNotFound {
                spreadsheet: spreadsheet.to_string(),
                worksheet: worksheet.to_string(),
            });
        }
        state.opens += 1;

        Ok(Arc::new(MemoryWorksheet {
            store: self.clone(),
            spreadsheet: spreadsheet.to_string(),
            title: worksheet.to_string(),
        }))
    }
}

struct MemoryWorksheet {
    store: MemoryStore,
    spreadsheet: String,
    title: String,
}

impl Worksheet for MemoryWorksheet {
    fn title(&self) -> &str {
        &self.title
    }

    fn append_row(&self, row: &[CellValue]) -> Result<(), WriteError> {
        let mut state = self.store.lock();
        if let Some(message) = state.failing_append.take() {
            return Err(WriteError::Transport(message));
        }
        state
            .sheets
            .entry(self.spreadsheet.clone())
            .or_default()
            .entry(self.title.clone())
            .or_default()
            .push(row.to_vec());
        Ok(())
    }
}
