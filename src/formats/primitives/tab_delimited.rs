//! Generic tab-delimited file reading.
//!
//! BED and GFF3 share the same physical shape:
//! - Tab-delimited fields
//! - Comment / directive lines (starting with `#`)
//! - Line-based records
//!
//! # Design
//!
//! [`TabDelimitedReader`] streams non-comment lines with their line numbers.
//! [`ColumnLayout`] names each positional column, and [`DelimitedRecords`]
//! combines the two into [`SourceRecord`]s. A line whose column count does
//! not match the layout becomes a malformed record, not an error: reading
//! continues with the next line.
//!
//! # Examples
//!
//! ```
//! use annoval::formats::primitives::{ColumnLayout, DelimitedRecords, RecordContent, Result};
//!
//! let data = "# header\n1\t100\t200\n2\t300\n";
//! let records: Vec<_> = DelimitedRecords::new(
//!     data.as_bytes(),
//!     ColumnLayout::new(&["seqid", "start", "end"]),
//! )
//! .collect::<Result<_>>()
//! .unwrap();
//!
//! assert_eq!(records.len(), 2);
//! assert_eq!(records[0].position, 2);
//! assert!(matches!(records[1].content, RecordContent::Malformed(_)));
//! ```

use crate::formats::primitives::{Result, SourceRecord};
use crate::schema::{RawRecord, RawValue};
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// One data line from a tab-delimited file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabDelimitedLine {
    /// 1-based line number in the source
    pub line_number: usize,
    /// Line content without the trailing newline
    pub text: String,
}

impl TabDelimitedLine {
    /// Splits the line on tabs.
    pub fn fields(&self) -> Vec<&str> {
        self.text.split('\t').collect()
    }
}

/// Streaming reader over the data lines of a tab-delimited file.
///
/// Automatically skips:
/// - Empty lines
/// - Comment lines (starting with `#`)
///
/// Reading stops early at an optional end marker line (GFF3 `##FASTA`).
pub struct TabDelimitedReader<R: Read> {
    reader: BufReader<R>,
    line_buf: String,
    line_number: usize,
    end_marker: Option<&'static str>,
    finished: bool,
}

impl<R: Read> TabDelimitedReader<R> {
    /// Creates a new reader.
    pub fn new(reader: R) -> Self {
        TabDelimitedReader {
            reader: BufReader::new(reader),
            line_buf: String::with_capacity(1024),
            line_number: 0,
            end_marker: None,
            finished: false,
        }
    }

    /// Stops reading at the first line equal to `marker`.
    pub fn with_end_marker(mut self, marker: &'static str) -> Self {
        self.end_marker = Some(marker);
        self
    }

    /// Returns the current line number (1-based).
    pub fn line_number(&self) -> usize {
        self.line_number
    }
}

impl TabDelimitedReader<File> {
    /// Opens an uncompressed file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(file))
    }
}

impl TabDelimitedReader<MultiGzDecoder<File>> {
    /// Opens a gzip/bgzip-compressed file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn from_gzip_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(MultiGzDecoder::new(file)))
    }
}

impl TabDelimitedReader<Box<dyn Read>> {
    /// Opens a file, decompressing transparently when it ends in `.gz`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let reader: Box<dyn Read> = if path.extension().is_some_and(|ext| ext == "gz") {
            Box::new(MultiGzDecoder::new(file))
        } else {
            Box::new(file)
        };
        Ok(Self::new(reader))
    }
}

impl<R: Read> Iterator for TabDelimitedReader<R> {
    type Item = Result<TabDelimitedLine>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            self.line_buf.clear();

            match self.reader.read_line(&mut self.line_buf) {
                Ok(0) => return None, // EOF
                Ok(_) => {
                    self.line_number += 1;

                    let line = self.line_buf.trim_end_matches(&['\n', '\r'][..]);

                    if self.end_marker.is_some_and(|marker| line == marker) {
                        self.finished = true;
                        return None;
                    }

                    if line.trim().is_empty() || line.starts_with('#') {
                        continue;
                    }

                    return Some(Ok(TabDelimitedLine {
                        line_number: self.line_number,
                        text: line.to_string(),
                    }));
                }
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e.into()));
                }
            }
        }
    }
}

/// Logical names of positional columns.
///
/// A dotted name (`location.start`) places the column inside a nested raw
/// record (`location`), so an interval made of two columns reaches the
/// schema as one sub-record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    columns: &'static [&'static str],
}

impl ColumnLayout {
    /// Creates a layout from column names in file order.
    pub const fn new(columns: &'static [&'static str]) -> Self {
        ColumnLayout { columns }
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// True if the layout has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column names in file order.
    pub fn columns(&self) -> &'static [&'static str] {
        self.columns
    }

    /// Builds a raw record from positional fields.
    ///
    /// Extra fields beyond the layout are ignored; callers check the count.
    pub fn to_raw(&self, fields: &[&str]) -> RawRecord {
        let mut raw = RawRecord::new();
        for (name, value) in self.columns.iter().zip(fields) {
            match name.split_once('.') {
                Some((group, leaf)) => match raw.get_mut(group) {
                    Some(RawValue::Record(nested)) => nested.insert(leaf, *value),
                    _ => raw.insert(group, RawRecord::new().with(leaf, *value)),
                },
                None => raw.insert(*name, *value),
            }
        }
        raw
    }
}

/// Positional records from a tab-delimited source.
pub struct DelimitedRecords<R: Read> {
    lines: TabDelimitedReader<R>,
    layout: ColumnLayout,
}

impl<R: Read> DelimitedRecords<R> {
    /// Creates records from a reader.
    pub fn new(reader: R, layout: ColumnLayout) -> Self {
        Self::from_lines(TabDelimitedReader::new(reader), layout)
    }

    /// Creates records from an already configured line reader.
    pub fn from_lines(lines: TabDelimitedReader<R>, layout: ColumnLayout) -> Self {
        DelimitedRecords { lines, layout }
    }
}

impl<R: Read> Iterator for DelimitedRecords<R> {
    type Item = Result<SourceRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        let line = match self.lines.next()? {
            Ok(line) => line,
            Err(e) => return Some(Err(e)),
        };

        let fields = line.fields();
        if fields.len() != self.layout.len() {
            return Some(Ok(SourceRecord::malformed(
                line.line_number,
                format!(
                    "Incorrect number of columns. Expected {}, found {}.",
                    self.layout.len(),
                    fields.len()
                ),
            )));
        }

        Some(Ok(SourceRecord::raw(
            line.line_number,
            self.layout.to_raw(&fields),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::primitives::RecordContent;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    const LAYOUT: ColumnLayout = ColumnLayout::new(&["seqid", "location.start", "location.end"]);

    #[test]
    fn test_skip_comments_and_empty_lines() {
        let data = "# Header\n\n1\t100\t200\n# Comment\n\n2\t300\t400\n\n# Trailer\n";
        let lines: Vec<_> = TabDelimitedReader::new(data.as_bytes())
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].line_number, 3);
        assert_eq!(lines[0].fields(), vec!["1", "100", "200"]);
        assert_eq!(lines[1].line_number, 6);
    }

    #[test]
    fn test_crlf_line_endings() {
        let data = "1\t100\t200\r\n";
        let lines: Vec<_> = TabDelimitedReader::new(data.as_bytes())
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(lines[0].fields(), vec!["1", "100", "200"]);
    }

    #[test]
    fn test_end_marker_stops_reading() {
        let data = "1\t100\t200\n##FASTA\n>seq\nACGT\n";
        let mut reader = TabDelimitedReader::new(data.as_bytes()).with_end_marker("##FASTA");
        assert!(reader.next().is_some());
        assert!(reader.next().is_none());
        assert!(reader.next().is_none());
        assert_eq!(reader.line_number(), 2);
    }

    #[test]
    fn test_layout_groups_dotted_columns() {
        let raw = LAYOUT.to_raw(&["1", "100", "200"]);
        assert_eq!(raw.len(), 2);
        let location = RawRecord::new().with("start", "100").with("end", "200");
        assert_eq!(raw.get("location"), Some(&RawValue::Record(location)));
    }

    #[test]
    fn test_wrong_column_count_is_malformed() {
        let data = "1\t100\t200\n1\t100\n1\t100\t200\textra\n";
        let records: Vec<_> = DelimitedRecords::new(data.as_bytes(), LAYOUT)
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(records.len(), 3);
        assert!(matches!(records[0].content, RecordContent::Raw(_)));
        assert_eq!(
            records[1],
            SourceRecord::malformed(2, "Incorrect number of columns. Expected 3, found 2.")
        );
        assert_eq!(records[2].position, 3);
        assert!(matches!(records[2].content, RecordContent::Malformed(_)));
    }

    #[test]
    fn test_open_detects_gzip() {
        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().join("plain.bed");
        let gz = dir.path().join("packed.bed.gz");
        std::fs::write(&plain, "1\t100\t200\n").unwrap();

        let mut encoder = GzEncoder::new(std::fs::File::create(&gz).unwrap(), Compression::default());
        encoder.write_all(b"1\t100\t200\n2\t300\t400\n").unwrap();
        encoder.finish().unwrap();

        assert_eq!(TabDelimitedReader::open(&plain).unwrap().count(), 1);
        assert_eq!(TabDelimitedReader::open(&gz).unwrap().count(), 2);
        assert_eq!(TabDelimitedReader::from_gzip_path(&gz).unwrap().count(), 2);
    }

    #[test]
    fn test_open_missing_file() {
        assert!(TabDelimitedReader::from_path("/nonexistent/file.bed").is_err());
    }
}
