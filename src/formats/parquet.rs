//! Parquet adapter (columnar, named columns).
//!
//! Columns are matched by name, so their order in the file does not matter.
//! Each mapped source column is renamed to its logical field name; columns
//! not in the mapping are ignored. Values keep their native Parquet type
//! (integers stay integers), which is what strict mode checks against.

use crate::formats::primitives::{FormatError, Result, SourceRecord};
use crate::schema::{RawRecord, RawValue};
use parquet::file::reader::{FileReader, SerializedFileReader};
use parquet::record::reader::RowIter;
use parquet::record::Field;
use std::fs::File;
use std::path::Path;

/// Source column name → logical field name.
pub type ColumnMapping = &'static [(&'static str, &'static str)];

/// Streaming Parquet rows as raw records.
pub struct ParquetRecords {
    rows: RowIter<'static>,
    mapping: ColumnMapping,
    row_number: usize,
}

impl ParquetRecords {
    /// Opens a Parquet file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or decoded, or
    /// [`FormatError::MissingColumns`] if a mapped column is absent.
    pub fn open(path: impl AsRef<Path>, mapping: ColumnMapping) -> Result<Self> {
        let file = File::open(path)?;
        let reader = SerializedFileReader::new(file)?;

        let present: Vec<String> = reader
            .metadata()
            .file_metadata()
            .schema()
            .get_fields()
            .iter()
            .map(|field| field.name().to_string())
            .collect();
        let missing: Vec<String> = mapping
            .iter()
            .filter(|(source, _)| !present.iter().any(|name| name == source))
            .map(|(source, _)| source.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(FormatError::MissingColumns { missing });
        }

        Ok(ParquetRecords {
            rows: reader.into_iter(),
            mapping,
            row_number: 0,
        })
    }
}

impl Iterator for ParquetRecords {
    type Item = Result<SourceRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = match self.rows.next()? {
            Ok(row) => row,
            Err(e) => return Some(Err(e.into())),
        };
        self.row_number += 1;

        let mut raw = RawRecord::new();
        for (source, logical) in self.mapping {
            if let Some((_, field)) = row.get_column_iter().find(|(name, _)| name == source) {
                raw.insert(*logical, to_raw(field));
            }
        }

        Some(Ok(SourceRecord::raw(self.row_number, raw)))
    }
}

fn to_raw(field: &Field) -> RawValue {
    match field {
        Field::Null => RawValue::Null,
        Field::Bool(b) => RawValue::Bool(*b),
        Field::Byte(v) => RawValue::Int(i64::from(*v)),
        Field::Short(v) => RawValue::Int(i64::from(*v)),
        Field::Int(v) => RawValue::Int(i64::from(*v)),
        Field::Long(v) => RawValue::Int(*v),
        Field::UByte(v) => RawValue::Int(i64::from(*v)),
        Field::UShort(v) => RawValue::Int(i64::from(*v)),
        Field::UInt(v) => RawValue::Int(i64::from(*v)),
        Field::ULong(v) => match i64::try_from(*v) {
            Ok(v) => RawValue::Int(v),
            Err(_) => RawValue::Float(*v as f64),
        },
        Field::Float(v) => RawValue::Float(f64::from(*v)),
        Field::Double(v) => RawValue::Float(*v),
        Field::Str(s) => RawValue::Text(s.clone()),
        Field::ListInternal(list) => RawValue::List(list.elements().iter().map(to_raw).collect()),
        other => RawValue::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::primitives::RecordContent;
    use parquet::data_type::{ByteArray, ByteArrayType, Int32Type, Int64Type};
    use parquet::file::properties::WriterProperties;
    use parquet::file::writer::SerializedFileWriter;
    use parquet::schema::parser::parse_message_type;
    use std::sync::Arc;

    const MAPPING: ColumnMapping = &[("geneId", "gene_id"), ("tssStart", "start")];

    fn write_file(path: &Path) {
        let schema = Arc::new(
            parse_message_type(
                "message schema {
                    REQUIRED INT32 tssStart;
                    REQUIRED BYTE_ARRAY geneId (UTF8);
                    REQUIRED INT64 extra;
                }",
            )
            .unwrap(),
        );
        let file = File::create(path).unwrap();
        let props = Arc::new(WriterProperties::builder().build());
        let mut writer = SerializedFileWriter::new(file, schema, props).unwrap();
        let mut row_group = writer.next_row_group().unwrap();

        let mut column = row_group.next_column().unwrap().unwrap();
        column.typed::<Int32Type>().write_batch(&[10, 20], None, None).unwrap();
        column.close().unwrap();

        let mut column = row_group.next_column().unwrap().unwrap();
        column
            .typed::<ByteArrayType>()
            .write_batch(&[ByteArray::from("ENSG1"), ByteArray::from("ENSG2")], None, None)
            .unwrap();
        column.close().unwrap();

        let mut column = row_group.next_column().unwrap().unwrap();
        column.typed::<Int64Type>().write_batch(&[0, 0], None, None).unwrap();
        column.close().unwrap();

        row_group.close().unwrap();
        writer.close().unwrap();
    }

    #[test]
    fn test_maps_columns_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tss.parquet");
        write_file(&path);

        let records: Vec<_> = ParquetRecords::open(&path, MAPPING)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[1].position, 2);
        let expected = RawRecord::new().with("gene_id", "ENSG2").with("start", 20i64);
        assert_eq!(records[1].content, RecordContent::Raw(expected));
    }

    #[test]
    fn test_missing_columns_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tss.parquet");
        write_file(&path);

        let mapping: ColumnMapping = &[("geneId", "gene_id"), ("tssEnd", "end"), ("strand", "strand")];
        match ParquetRecords::open(&path, mapping) {
            Err(FormatError::MissingColumns { missing }) => {
                assert_eq!(missing, vec!["tssEnd".to_string(), "strand".to_string()]);
            }
            Err(other) => panic!("unexpected error {}", other),
            Ok(_) => panic!("expected missing columns"),
        }
    }

    #[test]
    fn test_not_a_parquet_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.parquet");
        std::fs::write(&path, b"definitely not parquet").unwrap();
        assert!(matches!(
            ParquetRecords::open(&path, MAPPING),
            Err(FormatError::Parquet(_))
        ));
    }
}
