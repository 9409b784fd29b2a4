//! Error types for annoval
//!
//! Only fatal conditions are errors. Records that fail validation are data
//! findings and end up in the [`AggregateReport`](crate::runner::AggregateReport).
//!
//! Messages never repeat their [`source`](std::error::Error::source); print
//! the whole chain with `{:#}` (anyhow) to see the cause.

use crate::formats::FormatError;
use crate::schema::SchemaError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for annoval operations
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal errors that abort a validation run
#[derive(Debug, Error)]
pub enum Error {
    /// Input path does not exist or is not a file
    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// Input file name does not match the selected file type
    #[error("{file_type} file with {expected} extension expected: {}", .path.display())]
    UnexpectedExtension {
        /// Input path
        path: PathBuf,
        /// Selected file type
        file_type: &'static str,
        /// Accepted extensions
        expected: String,
    },

    /// Source could not be read or split into records
    #[error("Error reading file")]
    Format(#[from] FormatError),

    /// A schema declaration is invalid
    #[error("Invalid schema")]
    Schema(#[from] SchemaError),

    /// Report could not be written
    #[error("Cannot write report to {}", .path.display())]
    Report {
        /// Report path or output directory
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },
}
