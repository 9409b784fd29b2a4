//! File-type adapters.
//!
//! Each adapter splits one physical format into a lazy, ordered stream of
//! [`SourceRecord`]s. Whatever the format, the schema sees the same shape: a
//! raw record keyed by logical field name.
//!
//! - [`bed`]: six-column BED (positional)
//! - [`gff`]: GFF3, plain or gzip-compressed (positional)
//! - [`parquet`]: Parquet tabular dumps (named columns)
//!
//! All adapters share:
//! - **Streaming**: one record at a time, constant memory
//! - **Positions**: every record carries its 1-based line/row number
//! - **Error split**: I/O and decoding failures are fatal [`FormatError`]s,
//!   while a line that cannot be split is a [`RecordContent::Malformed`]
//!   record and reading goes on
//!
//! # Module Organization
//!
//! - [`primitives`]: shared infrastructure
//!   - Tab-delimited reader, column layouts, error and record types

pub mod bed;
pub mod gff;
pub mod parquet;
pub mod primitives;

// Re-export commonly used types
pub use primitives::{ColumnLayout, FormatError, RecordContent, SourceRecord};

/// A boxed stream of source records.
pub type RecordStream = Box<dyn Iterator<Item = primitives::Result<SourceRecord>>>;
