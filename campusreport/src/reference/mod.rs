//! Reference data loader for the region/campus table

use crate::error::ReferenceError;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

pub mod index;

pub use index::{RegionIndex, UNSET};

const REGION_COLUMN: &str = "Region";
const CAMPUS_COLUMN: &str = "Campus";
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Text encoding of the reference file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    /// ISO-8859-1, every byte maps to one code point
    #[default]
    Latin1,
    Utf8,
}

impl Encoding {
    pub fn parse(name: &str) -> Result<Self, ReferenceError> {
        match name.to_ascii_lowercase().replace('_', "-").as_str() {
            "latin1" | "latin-1" | "iso-8859-1" | "iso8859-1" => Ok(Encoding::Latin1),
            "utf8" | "utf-8" => Ok(Encoding::Utf8),
            _ => Err(ReferenceError::UnknownEncoding(name.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Encoding::Latin1 => "ISO-8859-1",
            Encoding::Utf8 => "UTF-8",
        }
    }

    fn decode(&self, bytes: &[u8]) -> Result<String, ReferenceError> {
        match self {
            Encoding::Latin1 => Ok(bytes.iter().map(|&b| b as char).collect()),
            Encoding::Utf8 => std::str::from_utf8(bytes)
                .map(str::to_string)
                .map_err(|e| ReferenceError::Encoding {
                    encoding: self.as_str(),
                    offset: e.valid_up_to(),
                }),
        }
    }
}

/// Load the region index from a CSV file
pub fn load<P: AsRef<Path>>(path: P, encoding: Encoding) -> Result<RegionIndex, ReferenceError> {
    let path_ref = path.as_ref();

    let bytes = fs::read(path_ref).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ReferenceError::NotFound(path_ref.to_path_buf()),
        _ => ReferenceError::Io {
            path: path_ref.to_path_buf(),
            source: e,
        },
    })?;

    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes[..]);
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(ReferenceError::Empty(path_ref.to_path_buf()));
    }

    let text = encoding.decode(bytes)?;
    let index = parse(&text)?;
    if index.is_empty() {
        return Err(ReferenceError::Empty(path_ref.to_path_buf()));
    }

    debug!(
        path = %path_ref.display(),
        regions = index.region_count(),
        campuses = index.campus_count(),
        "loaded reference data"
    );
    Ok(index)
}

/// Parse CSV text with `Region` and `Campus` headers
pub fn parse(text: &str) -> Result<RegionIndex, ReferenceError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let region_col = column_position(&headers, REGION_COLUMN)?;
    let campus_col = column_position(&headers, CAMPUS_COLUMN)?;

    let mut pairs = Vec::new();
    for record in reader.records() {
        let record = record?;
        let region = record.get(region_col).unwrap_or_default().to_string();
        let campus = record.get(campus_col).unwrap_or_default().to_string();
        pairs.push((region, campus));
    }

    Ok(RegionIndex::from_pairs(pairs))
}

fn column_position(headers: &csv::StringRecord, name: &'static str) -> Result<usize, ReferenceError> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or(ReferenceError::MissingColumn(name))
}
