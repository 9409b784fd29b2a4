//! Human-readable validation reports.
//!
//! A report starts with a summary block followed by up to
//! `max_reported_failures` rejected records, one line per failure:
//!
//! ```text
//! File: tss.bed
//! File type: tss-bed
//! Mode: lax
//! Records: 10
//! Accepted: 9
//! Rejected: 1
//!
//! Failures (showing 1 of 1):
//! Line 3: location: Start coordinate (100) is greater or equal than end coordinate (100).
//! ```
//!
//! Rendering is deterministic; only the file name written by
//! [`write_report`] carries a timestamp.

use crate::error::{Error, Result};
use crate::runner::AggregateReport;
use std::fmt::Write as _;
use std::fs::{self, OpenOptions};
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use tracing::info;

/// Prefix of report file names.
pub const REPORT_PREFIX: &str = "validation_report_";

/// Renders `report`, detailing at most `max_failures` rejected records.
pub fn render(report: &AggregateReport, max_failures: usize) -> String {
    let mut out = String::new();
    // Writing to a String never fails.
    let _ = writeln!(out, "File: {}", report.source.display());
    let _ = writeln!(out, "File type: {}", report.file_type);
    let _ = writeln!(out, "Mode: {}", report.mode);
    let _ = writeln!(out, "Records: {}", report.total);
    let _ = writeln!(out, "Accepted: {}", report.accepted);
    let _ = writeln!(out, "Rejected: {}", report.rejected);

    if report.is_clean() {
        return out;
    }

    let shown = report.rejections.len().min(max_failures);
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Failures (showing {} of {}):",
        shown,
        report.rejected
    );

    let label = report.file_type.position_label();
    for rejection in report.rejections.iter().take(shown) {
        for failure in &rejection.failures {
            let _ = writeln!(out, "{} {}: {}", label, rejection.position, failure);
        }
    }

    out
}

/// Report file name for the given local time.
pub fn report_file_name(now: chrono::DateTime<chrono::Local>) -> String {
    format!("{}{}.txt", REPORT_PREFIX, now.format("%Y%m%d-%H%M%S"))
}

/// Creates `out_dir` if needed and checks a report can be written there.
///
/// Call before validating so a bad destination fails fast.
///
/// # Errors
///
/// Returns [`Error::Report`] if `out_dir` cannot be created, is not a
/// directory, or is read-only.
pub fn prepare_out_dir(out_dir: &Path) -> Result<()> {
    let report_error = |source| Error::Report {
        path: out_dir.to_path_buf(),
        source,
    };

    fs::create_dir_all(out_dir).map_err(report_error)?;
    let metadata = fs::metadata(out_dir).map_err(report_error)?;
    if !metadata.is_dir() {
        return Err(report_error(io::Error::new(
            io::ErrorKind::AlreadyExists,
            "not a directory",
        )));
    }
    if metadata.permissions().readonly() {
        return Err(report_error(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "directory is read-only",
        )));
    }
    Ok(())
}

/// Writes the rendered report into `out_dir`, creating it if needed.
///
/// An existing report is never overwritten: if the timestamped name is
/// taken, `-1`, `-2`, ... is appended.
///
/// # Errors
///
/// Returns [`Error::Report`] if the directory or file cannot be written.
pub fn write_report(report: &AggregateReport, out_dir: &Path, max_failures: usize) -> Result<PathBuf> {
    write_report_at(report, out_dir, max_failures, chrono::Local::now())
}

fn write_report_at(
    report: &AggregateReport,
    out_dir: &Path,
    max_failures: usize,
    now: chrono::DateTime<chrono::Local>,
) -> Result<PathBuf> {
    prepare_out_dir(out_dir)?;

    let name = report_file_name(now);
    let stem = name.trim_end_matches(".txt");
    let (path, mut file) = (0..)
        .map(|n| match n {
            0 => out_dir.join(&name),
            n => out_dir.join(format!("{}-{}.txt", stem, n)),
        })
        .find_map(|path| {
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => Some(Ok((path, file))),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => None,
                Err(source) => Some(Err(Error::Report { path, source })),
            }
        })
        .ok_or_else(|| Error::Report {
            path: out_dir.to_path_buf(),
            source: io::Error::new(io::ErrorKind::AlreadyExists, "no free report name"),
        })??;

    file.write_all(render(report, max_failures).as_bytes())
        .map_err(|source| Error::Report {
            path: path.clone(),
            source,
        })?;

    info!(report = %path.display(), "report written");
    Ok(path)
}
