//! TSS BED: one single-base transcription start site per line.
//!
//! ```text
//! 1	11868	11869	ENSG00000290825(+)	*	+
//! ```

use crate::schema::{rules, Field, RecordSchema, SchemaError};

/// Ensembl gene accession, optionally suffixed with its strand.
pub const GENE_NAME_PATTERN: &str = r"^ENSG\d{11}(\([+-]\))?$";

/// A BED interval: 0-based start, exclusive end, `start < end`.
pub fn bed_range(name: &'static str) -> RecordSchema {
    RecordSchema::new(name)
        .field(Field::int("start").ge(0))
        .field(Field::int("end").ge(1))
        .rule("start_before_end", rules::start_before_end)
}

/// A BED interval that must span exactly one base.
pub fn tss_bed_range() -> RecordSchema {
    bed_range("TssBedRange").rule("single_base", rules::single_base)
}

/// Row schema for TSS BED files.
///
/// # Errors
///
/// Returns an error if a pattern constraint fails to compile.
pub fn schema() -> Result<RecordSchema, SchemaError> {
    Ok(RecordSchema::new("TssRow")
        .field(Field::str("seqid"))
        .field(Field::record("location", tss_bed_range()))
        .field(Field::str("name").pattern(GENE_NAME_PATTERN)?)
        .field(Field::literal("score", &["*"]))
        .field(Field::literal("strand", &["+", "-"]))
        .after("seqid", rules::no_chr_prefix))
}
