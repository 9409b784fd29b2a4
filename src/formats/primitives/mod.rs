//! Shared primitives for the file-type adapters.
//!
//! This module provides:
//! - [`FormatError`], the fatal errors an adapter can raise
//! - [`SourceRecord`], the common record shape every adapter yields
//! - [`tab_delimited`]: streaming line reader and positional column layouts
//!
//! # Example: Column layouts
//!
//! ```
//! use annoval::formats::primitives::ColumnLayout;
//! use annoval::schema::RawValue;
//!
//! let layout = ColumnLayout::new(&["seqid", "location.start", "location.end"]);
//! let raw = layout.to_raw(&["1", "100", "101"]);
//!
//! assert_eq!(raw.get("seqid"), Some(&RawValue::from("1")));
//! match raw.get("location") {
//!     Some(RawValue::Record(location)) => assert_eq!(location.len(), 2),
//!     other => panic!("expected nested location, got {:?}", other),
//! }
//! ```

use crate::schema::RawRecord;
use thiserror::Error;

pub mod tab_delimited;

pub use tab_delimited::{ColumnLayout, DelimitedRecords, TabDelimitedLine, TabDelimitedReader};

/// Errors that abort reading a source file.
///
/// Per-record problems (wrong column count, bad values) are never a
/// `FormatError`; they surface as [`RecordContent::Malformed`] or as schema
/// failures.
#[derive(Debug, Error)]
pub enum FormatError {
    /// I/O error.
    #[error("I/O error")]
    Io(#[from] std::io::Error),

    /// Parquet decoding error.
    #[error("Parquet error")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// Columnar file lacks columns the record shape maps.
    #[error("Missing required columns: {}", .missing.join(", "))]
    MissingColumns {
        /// Source column names absent from the file
        missing: Vec<String>,
    },
}

/// Result type for format operations.
pub type Result<T> = std::result::Result<T, FormatError>;

/// Payload of one source record.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordContent {
    /// Record split into named raw values
    Raw(RawRecord),
    /// Record that could not even be split into fields
    Malformed(String),
}

/// One record from a source file, tagged with its position.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRecord {
    /// 1-based line number (delimited text) or row number (columnar)
    pub position: usize,
    /// The record payload
    pub content: RecordContent,
}

impl SourceRecord {
    /// A successfully split record.
    pub fn raw(position: usize, raw: RawRecord) -> Self {
        SourceRecord {
            position,
            content: RecordContent::Raw(raw),
        }
    }

    /// A record that could not be split.
    pub fn malformed(position: usize, reason: impl Into<String>) -> Self {
        SourceRecord {
            position,
            content: RecordContent::Malformed(reason.into()),
        }
    }
}
