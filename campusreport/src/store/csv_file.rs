//! Local directory store: one directory per spreadsheet, one CSV per worksheet

use super::{CellValue, RemoteStore, Worksheet};
use crate::error::{ConnectionError, WriteError};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct CsvFileStore {
    root: PathBuf,
}

impl CsvFileStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }
}

impl RemoteStore for CsvFileStore {
    fn open(&self, spreadsheet: &str, worksheet: &str) -> Result<Arc<dyn Worksheet>, ConnectionError> {
        let dir = self.root.join(spreadsheet);
        if !dir.is_dir() {
            return Err(ConnectionError::SpreadsheetNotFound(spreadsheet.to_string()));
        }

        // Worksheets are never created implicitly.
        let path = dir.join(format!("{}.csv", worksheet));
        if !path.is_file() {
            return Err(ConnectionError::WorksheetNotFound {
                spreadsheet: spreadsheet.to_string(),
                worksheet: worksheet.to_string(),
            });
        }

        Ok(Arc::new(CsvWorksheet {
            title: worksheet.to_string(),
            path,
        }))
    }
}

struct CsvWorksheet {
    title: String,
    path: PathBuf,
}

impl Worksheet for CsvWorksheet {
    fn title(&self) -> &str {
        &self.title
    }

    fn append_row(&self, row: &[CellValue]) -> Result<(), WriteError> {
        let file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|e| WriteError::Transport(format!("{}: {}", self.path.display(), e)))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer
            .write_record(row.iter().map(|cell| cell.to_string()))
            .map_err(|e| WriteError::Transport(e.to_string()))?;
        writer
            .flush()
            .map_err(|e| WriteError::Transport(e.to_string()))?;
        Ok(())
    }
}
