//! CDS counts BED: per-transcript coding sequence counts.

use crate::schema::{Field, RecordSchema};

/// Row schema for CDS counts BED files.
pub fn schema() -> RecordSchema {
    RecordSchema::new("CdsCountsRow")
        .field(Field::str("seqid"))
        .field(Field::int("start"))
        .field(Field::int("end"))
        .field(Field::str("name"))
        .field(Field::str("score"))
        .field(Field::str("strand"))
}
