//! TSS Parquet dumps (1-based, closed coordinates, camelCase columns).

use crate::formats::parquet::ColumnMapping;
use crate::schema::{rules, Field, RecordSchema};

/// Parquet column → field name.
pub const COLUMNS: ColumnMapping = &[
    ("referenceName", "reference_name"),
    ("tssStart", "start"),
    ("tssEnd", "end"),
    ("geneId", "gene_id"),
    ("strand", "strand"),
];

/// Row schema for TSS Parquet files.
pub fn schema() -> RecordSchema {
    RecordSchema::new("TssParquetRow")
        .field(Field::str("reference_name"))
        .field(Field::int("start").gt(0))
        .field(Field::int("end").gt(0))
        .field(Field::str("gene_id"))
        .field(Field::literal("strand", &["FORWARD", "REVERSE"]))
        .rule("start_not_after_end", rules::start_not_after_end)
}
