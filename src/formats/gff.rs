//! GFF3 adapter.
//!
//! GFF3 uses 9 tab-delimited columns:
//! 1. **seqid**: Sequence name
//! 2. **source**: Annotation source (e.g. ensembl, havana)
//! 3. **type**: Feature type (gene, mRNA, exon, CDS, ...)
//! 4. **start**: Start position (1-based, inclusive)
//! 5. **end**: End position (1-based, inclusive)
//! 6. **score**: Score or `.`
//! 7. **strand**: `+`, `-`, `.` or `?`
//! 8. **phase**: CDS phase (0, 1, 2) or `.`
//! 9. **attributes**: `key=value;key2=v1,v2`
//!
//! `#` lines (`##gff-version 3`, `##sequence-region`, `#!genome-build`, `###`)
//! are skipped, and reading stops at the `##FASTA` directive since everything
//! after it is sequence data. Ensembl releases ship as `.gff3.gz`, which is
//! decompressed transparently.

use crate::formats::primitives::{ColumnLayout, DelimitedRecords, Result, TabDelimitedReader};
use std::io::Read;
use std::path::Path;

/// GFF3 column layout; start/end are grouped as `location`.
pub const GFF3_LAYOUT: ColumnLayout = ColumnLayout::new(&[
    "seqid",
    "source",
    "type",
    "location.start",
    "location.end",
    "score",
    "strand",
    "phase",
    "attributes",
]);

/// Directive after which a GFF3 file holds FASTA sequences.
pub const FASTA_DIRECTIVE: &str = "##FASTA";

/// Streaming GFF3 records.
pub type GffRecords<R> = DelimitedRecords<R>;

/// Opens a GFF3 file (optionally gzip-compressed).
///
/// # Errors
///
/// Returns an error if the file cannot be opened.
pub fn open(path: impl AsRef<Path>) -> Result<GffRecords<Box<dyn Read>>> {
    let lines = TabDelimitedReader::open(path)?.with_end_marker(FASTA_DIRECTIVE);
    Ok(DelimitedRecords::from_lines(lines, GFF3_LAYOUT))
}

/// Creates GFF3 records from any reader.
pub fn from_reader<R: Read>(reader: R) -> GffRecords<R> {
    DelimitedRecords::from_lines(
        TabDelimitedReader::new(reader).with_end_marker(FASTA_DIRECTIVE),
        GFF3_LAYOUT,
    )
}

/// Splits a GFF3 attribute column into `(key, values)` pairs.
///
/// Pairs are separated by `;`, key and value by a single `=`, and multiple
/// values by `,`. Empty pairs (a trailing `;`) are ignored.
///
/// # Errors
///
/// Returns a reason string naming the offending pair if it has no `=` or
/// more than one.
///
/// # Example
///
/// ```
/// use annoval::formats::gff::parse_attributes;
///
/// let attrs = parse_attributes("ID=gene:ENSG1;tag=basic,Ensembl_canonical").unwrap();
/// assert_eq!(attrs[0], ("ID".to_string(), vec!["gene:ENSG1".to_string()]));
/// assert_eq!(attrs[1].1.len(), 2);
/// ```
pub fn parse_attributes(column: &str) -> std::result::Result<Vec<(String, Vec<String>)>, String> {
    let mut attributes = Vec::new();

    for pair in column.split(';') {
        if pair.is_empty() {
            continue;
        }

        let mut parts = pair.split('=');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(key), Some(value), None) => {
                let values = value.split(',').map(str::to_string).collect();
                attributes.push((key.to_string(), values));
            }
            _ => {
                return Err(format!(
                    "Malformed attribute '{}', expected a single 'key=value' pair.",
                    pair
                ))
            }
        }
    }

    Ok(attributes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::primitives::RecordContent;
    use crate::schema::RawValue;

    const GENE: &str = "1\tensembl_havana\tgene\t3069168\t3438621\t.\t+\t.\tID=gene:ENSG00000142611;Name=PRDM16;biotype=protein_coding;version=17";

    #[test]
    fn test_gff3_layout() {
        let data = format!("##gff-version 3\n##sequence-region 1 1 248956422\n{}\n###\n", GENE);
        let records: Vec<_> = from_reader(data.as_bytes()).collect::<Result<_>>().unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].position, 3);
        match &records[0].content {
            RecordContent::Raw(raw) => {
                assert_eq!(raw.get("type"), Some(&RawValue::from("gene")));
                assert!(matches!(raw.get("location"), Some(RawValue::Record(_))));
                assert_eq!(raw.get("phase"), Some(&RawValue::from(".")));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_stops_at_fasta_directive() {
        let data = format!("{}\n##FASTA\n>1\nACGT\n", GENE);
        let records: Vec<_> = from_reader(data.as_bytes()).collect::<Result<_>>().unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_parse_attributes() {
        let attrs =
            parse_attributes("ID=transcript:ENST1;Parent=gene:ENSG1;tag=gencode_basic,Ensembl_canonical")
                .unwrap();
        assert_eq!(attrs.len(), 3);
        assert_eq!(attrs[1], ("Parent".to_string(), vec!["gene:ENSG1".to_string()]));
        assert_eq!(
            attrs[2].1,
            vec!["gencode_basic".to_string(), "Ensembl_canonical".to_string()]
        );
    }

    #[test]
    fn test_parse_attributes_trailing_semicolon() {
        assert_eq!(parse_attributes("ID=a;").unwrap().len(), 1);
        assert!(parse_attributes("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_attributes_malformed() {
        let reason = parse_attributes("ID=a;broken").unwrap_err();
        assert!(reason.contains("'broken'"));
        assert!(parse_attributes("ID=a=b").is_err());
    }
}
