//! Remote worksheet stores
//!
//! A store opens a named worksheet inside a named spreadsheet and hands back
//! a handle whose only write operation is appending one row.

use crate::config::{StoreBackend, StoreConfig};
use crate::error::{ConnectionError, WriteError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

pub mod csv_file;
pub mod memory;
#[cfg(feature = "sheets-api")]
pub mod sheets_api;

pub use csv_file::CsvFileStore;
pub use memory::MemoryStore;
#[cfg(feature = "sheets-api")]
pub use sheets_api::SheetsApiStore;

/// A scalar cell written to the worksheet
///
/// Amounts serialize as their exact decimal string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Int(i64),
    Amount(Decimal),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Int(i) => write!(f, "{}", i),
            CellValue::Amount(a) => write!(f, "{}", a),
        }
    }
}

/// Handle to one worksheet; appends are the only write path
pub trait Worksheet: Send + Sync {
    /// Worksheet title
    fn title(&self) -> &str;

    /// Append one row of ordered scalar values
    fn append_row(&self, row: &[CellValue]) -> Result<(), WriteError>;
}

/// Something that can locate worksheets
pub trait RemoteStore: Send + Sync {
    /// Open `worksheet` inside `spreadsheet`
    fn open(&self, spreadsheet: &str, worksheet: &str) -> Result<Arc<dyn Worksheet>, ConnectionError>;
}

/// Build the store selected in configuration
pub fn from_config(config: &StoreConfig) -> Result<Box<dyn RemoteStore>, ConnectionError> {
    match config.backend {
        StoreBackend::Csv => Ok(Box::new(CsvFileStore::new(&config.csv_dir))),
        #[cfg(feature = "sheets-api")]
        StoreBackend::Sheets => Ok(Box::new(SheetsApiStore::from_config(config)?)),
        #[cfg(not(feature = "sheets-api"))]
        StoreBackend::Sheets => Err(ConnectionError::Transport(
            "built without the sheets-api feature".to_string(),
        )),
    }
}
