//! Error taxonomy for the submission pipeline

use crate::violation::Violation;
use std::path::PathBuf;
use thiserror::Error;

/// Reference data could not be loaded
#[derive(Debug, Error)]
pub enum ReferenceError {
    #[error("reference file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("failed to read reference file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("reference file is empty: {}", .0.display())]
    Empty(PathBuf),
    #[error("reference file is not valid {encoding} at byte {offset}")]
    Encoding { encoding: &'static str, offset: usize },
    #[error("failed to parse reference file: {0}")]
    Parse(#[from] csv::Error),
    #[error("column not found in reference file: {0}")]
    MissingColumn(&'static str),
    #[error("unknown reference encoding: {0}")]
    UnknownEncoding(String),
}

/// The remote worksheet could not be reached
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("spreadsheet not found: {0}")]
    SpreadsheetNotFound(String),
    #[error("worksheet '{worksheet}' not found in spreadsheet '{spreadsheet}'")]
    WorksheetNotFound {
        spreadsheet: String,
        worksheet: String,
    },
    #[error("missing credentials: {0}")]
    Auth(String),
    #[error("transport error: {0}")]
    Transport(String),
}

/// The append call failed after validation passed
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("remote store rejected the row ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("transport error: {0}")]
    Transport(String),
}

/// A single input step could not be applied to the form state
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormError {
    #[error("unknown field: {0}")]
    UnknownField(String),
    #[error("'{value}' is not an option for {field}")]
    NotAnOption { field: String, value: String },
    #[error("{field} expects a non-negative number, got '{value}'")]
    InvalidNumber { field: String, value: String },
    #[error("{field} does not accept this kind of input")]
    WrongKind { field: String },
}

/// One or more field or cross-field rules were violated
#[derive(Debug, Error)]
#[error("{} validation rule(s) violated", .0.len())]
pub struct ValidationError(pub Vec<Violation>);
