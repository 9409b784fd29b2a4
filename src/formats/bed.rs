//! BED adapters (tab-delimited, positional columns).
//!
//! Ensembl Regulation feature files are six-column BED:
//!
//! 1. **seqid**: Ensembl sequence name (no `chr` prefix)
//! 2. **start**: 0-based start
//! 3. **end**: exclusive end
//! 4. **name**: feature name
//! 5. **score**: score or placeholder
//! 6. **strand**: `+` or `-`
//!
//! The two layouts differ only in how start/end reach the schema: TSS files
//! group them into a nested `location` interval, CDS counts keep them flat.
//!
//! # Example
//!
//! ```
//! use annoval::formats::bed::{BedRecords, TSS_LAYOUT};
//! use annoval::formats::primitives::{RecordContent, Result};
//!
//! let data = "1\t11868\t11869\tENSG00000290825(+)\t*\t+\n";
//! let records: Vec<_> = BedRecords::new(data.as_bytes(), TSS_LAYOUT)
//!     .collect::<Result<_>>()
//!     .unwrap();
//!
//! assert_eq!(records.len(), 1);
//! assert!(matches!(records[0].content, RecordContent::Raw(_)));
//! ```

use crate::formats::primitives::{ColumnLayout, DelimitedRecords, Result, TabDelimitedReader};
use std::io::Read;
use std::path::Path;

/// TSS BED: start/end grouped as `location`.
pub const TSS_LAYOUT: ColumnLayout = ColumnLayout::new(&[
    "seqid",
    "location.start",
    "location.end",
    "name",
    "score",
    "strand",
]);

/// CDS counts BED: flat columns.
pub const CDS_COUNTS_LAYOUT: ColumnLayout =
    ColumnLayout::new(&["seqid", "start", "end", "name", "score", "strand"]);

/// Streaming BED records.
pub type BedRecords<R> = DelimitedRecords<R>;

/// Opens a BED file (optionally gzip-compressed) with the given layout.
///
/// # Errors
///
/// Returns an error if the file cannot be opened.
pub fn open(path: impl AsRef<Path>, layout: ColumnLayout) -> Result<BedRecords<Box<dyn Read>>> {
    Ok(DelimitedRecords::from_lines(
        TabDelimitedReader::open(path)?,
        layout,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::primitives::RecordContent;
    use crate::schema::{RawRecord, RawValue};
    use std::io::Write;

    #[test]
    fn test_tss_layout_nests_location() {
        let data = "1\t100\t101\tENSG00000000001(+)\t*\t+\n";
        let record = BedRecords::new(data.as_bytes(), TSS_LAYOUT)
            .next()
            .unwrap()
            .unwrap();

        let raw = match record.content {
            RecordContent::Raw(raw) => raw,
            other => panic!("unexpected {:?}", other),
        };
        let keys: Vec<_> = raw.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["seqid", "location", "name", "score", "strand"]);
        assert_eq!(
            raw.get("location"),
            Some(&RawValue::Record(
                RawRecord::new().with("start", "100").with("end", "101")
            ))
        );
    }

    #[test]
    fn test_cds_counts_layout_is_flat() {
        let data = "1\t100\t400\tENST00000000001\t3\t-\n";
        let record = BedRecords::new(data.as_bytes(), CDS_COUNTS_LAYOUT)
            .next()
            .unwrap()
            .unwrap();

        match record.content {
            RecordContent::Raw(raw) => {
                assert_eq!(raw.len(), 6);
                assert_eq!(raw.get("end"), Some(&RawValue::from("400")));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_open_from_path() {
        let mut file = tempfile::Builder::new().suffix(".bed").tempfile().unwrap();
        writeln!(file, "#track name=tss").unwrap();
        writeln!(file, "1\t100\t101\tENSG00000000001(+)\t*\t+").unwrap();
        writeln!(file, "1\t200\t201\tENSG00000000002(-)\t*\t-").unwrap();
        file.flush().unwrap();

        let records: Vec<_> = open(file.path(), TSS_LAYOUT)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].position, 2);
        assert_eq!(records[1].position, 3);
    }
}
