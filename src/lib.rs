//! annoval: schema validation for Ensembl genome annotation files
//!
//! # Overview
//!
//! annoval checks that every record of a GFF3, BED or Parquet file conforms
//! to a declarative schema: typed fields, value constraints, cross-field
//! rules and nested sub-records. Files are streamed one record at a time and
//! every rejected record is reported with all of its failures.
//!
//! ## Quick Start
//!
//! ```no_run
//! use annoval::models::FileType;
//! use annoval::runner::{validate_file, ValidationConfig};
//!
//! # fn main() -> annoval::Result<()> {
//! let config = ValidationConfig::lax();
//! let report = validate_file("Homo_sapiens.GRCh38.gff3.gz".as_ref(), FileType::EnsemblGenomeGff3, &config)?;
//!
//! for rejection in &report.rejections {
//!     for failure in &rejection.failures {
//!         println!("Line {}: {}", rejection.position, failure);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`schema`]: Fields, constraints, validators and record schemas
//! - [`formats`]: File-type adapters (BED, GFF3, Parquet) yielding raw records
//! - [`models`]: Concrete schemas per file type
//! - [`runner`]: Applies a model to a whole file
//! - [`report`]: Renders and writes validation reports

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod formats;
pub mod models;
pub mod report;
pub mod runner;
pub mod schema;

// Re-export commonly used types
pub use error::{Error, Result};
pub use models::FileType;
pub use runner::{validate_file, AggregateReport, Rejection, ValidationConfig};
pub use schema::{Field, FieldFailure, Mode, RawRecord, RawValue, Record, RecordSchema, Value};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
