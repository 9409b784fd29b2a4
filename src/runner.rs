//! Validation runner.
//!
//! A run reads one file front to back:
//!
//! ```text
//! INIT ──> READING ──> VALIDATING ──┬─> ACCEPTED ─┐
//!              ^                    └─> REJECTED ─┤
//!              └──────────────────────────────────┘
//!          (source exhausted) ──> DONE(AggregateReport)
//! ```
//!
//! A rejected record is recorded and reading continues; nothing is retried.
//! Only a fatal [`Error`] (missing file, unexpected extension, unreadable
//! source) ends a run early, and then no report is produced.

use crate::error::{Error, Result};
use crate::formats::{self, RecordContent, SourceRecord};
use crate::models::{FileType, Model};
use crate::schema::{FieldFailure, Mode};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Default cap on failure details rendered in a report.
pub const DEFAULT_MAX_REPORTED_FAILURES: usize = 100;

/// Per-run configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationConfig {
    /// Coercion policy
    pub mode: Mode,
    /// Maximum number of rejected records kept and detailed in the report
    pub max_reported_failures: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        ValidationConfig {
            mode: Mode::Lax,
            max_reported_failures: DEFAULT_MAX_REPORTED_FAILURES,
        }
    }
}

impl ValidationConfig {
    /// Lenient coercion, default cap.
    pub fn lax() -> Self {
        Self::default()
    }

    /// Strict mode, default cap.
    pub fn strict() -> Self {
        ValidationConfig {
            mode: Mode::Strict,
            ..Self::default()
        }
    }
}

/// A record that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// 1-based line or row number
    pub position: usize,
    /// Schema the record was validated against (`None` if malformed)
    pub schema: Option<&'static str>,
    /// Every reason the record was rejected
    pub failures: Vec<FieldFailure>,
}

/// Outcome of one run.
///
/// Counts cover every record. Only the first `max_reported_failures`
/// rejections are kept, in source order, so memory stays bounded however
/// many records fail.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateReport {
    /// Validated file
    pub source: PathBuf,
    /// File type it was validated as
    pub file_type: FileType,
    /// Coercion policy used
    pub mode: Mode,
    /// Records read
    pub total: usize,
    /// Records accepted
    pub accepted: usize,
    /// Records rejected
    pub rejected: usize,
    /// Leading rejected records, in source order
    pub rejections: Vec<Rejection>,
}

impl AggregateReport {
    fn new(source: &Path, file_type: FileType, mode: Mode) -> Self {
        AggregateReport {
            source: source.to_path_buf(),
            file_type,
            mode,
            total: 0,
            accepted: 0,
            rejected: 0,
            rejections: Vec::new(),
        }
    }

    /// True if every record was accepted.
    pub fn is_clean(&self) -> bool {
        self.rejected == 0
    }
}

/// Applies one model to a stream of records.
pub struct Runner {
    file_type: FileType,
    model: Model,
    mode: Mode,
    max_kept: usize,
}

impl Runner {
    /// Builds the model for `file_type`.
    ///
    /// # Errors
    ///
    /// Returns an error if a schema declaration is invalid.
    pub fn new(file_type: FileType, config: &ValidationConfig) -> Result<Self> {
        Ok(Runner {
            file_type,
            model: file_type.model()?,
            mode: config.mode,
            max_kept: config.max_reported_failures,
        })
    }

    /// Validates every record of `records`, which were read from `source`.
    ///
    /// # Errors
    ///
    /// Returns the first fatal read error; no partial report is returned.
    pub fn run<I>(&self, source: &Path, records: I) -> Result<AggregateReport>
    where
        I: IntoIterator<Item = formats::primitives::Result<SourceRecord>>,
    {
        let mut report = AggregateReport::new(source, self.file_type, self.mode);

        for record in records {
            let record = record?;
            report.total += 1;

            if let Some(rejection) = self.check(record) {
                debug!(
                    position = rejection.position,
                    failures = rejection.failures.len(),
                    "record rejected"
                );
                report.rejected += 1;
                if report.rejections.len() < self.max_kept {
                    report.rejections.push(rejection);
                }
            } else {
                report.accepted += 1;
            }
        }

        Ok(report)
    }

    fn check(&self, record: SourceRecord) -> Option<Rejection> {
        match record.content {
            RecordContent::Malformed(reason) => Some(Rejection {
                position: record.position,
                schema: None,
                failures: vec![FieldFailure::new("", reason)],
            }),
            RecordContent::Raw(raw) => {
                let schema = self.model.schema_for(&raw);
                schema
                    .validate(&raw, self.mode)
                    .err()
                    .map(|failures| Rejection {
                        position: record.position,
                        schema: Some(schema.name()),
                        failures,
                    })
            }
        }
    }
}

/// Validates the file at `path` as `file_type`.
///
/// # Errors
///
/// Returns a fatal error if the file is missing, has an unexpected
/// extension, or cannot be read.
///
/// # Example
///
/// ```no_run
/// use annoval::models::FileType;
/// use annoval::runner::{validate_file, ValidationConfig};
///
/// # fn main() -> annoval::Result<()> {
/// let report = validate_file("tss.bed".as_ref(), FileType::TssBed, &ValidationConfig::lax())?;
/// println!("{} of {} records rejected", report.rejected, report.total);
/// # Ok(())
/// # }
/// ```
pub fn validate_file(
    path: &Path,
    file_type: FileType,
    config: &ValidationConfig,
) -> Result<AggregateReport> {
    if !path.is_file() {
        return Err(Error::InputNotFound(path.to_path_buf()));
    }
    if !file_type.accepts(path) {
        return Err(Error::UnexpectedExtension {
            path: path.to_path_buf(),
            file_type: file_type.name(),
            expected: file_type.extensions().join(" or "),
        });
    }

    let runner = Runner::new(file_type, config)?;
    info!(file = %path.display(), %file_type, mode = %config.mode, "validating");

    let records = file_type.open(path)?;
    let report = runner.run(path, records)?;

    info!(
        total = report.total,
        accepted = report.accepted,
        rejected = report.rejected,
        "validation finished"
    );
    if !report.is_clean() {
        warn!(rejected = report.rejected, "records failed validation");
    }
    Ok(report)
}
