//! Reusable validators shared by the file-type models.
//!
//! Record rules assume the fields they read have already been coerced; they
//! are only registered on schemas that declare `start`/`end` integers.

use crate::schema::{RawValue, Record, Value};

fn coordinates(record: &Record) -> Result<(i64, i64), String> {
    match (record.int("start"), record.int("end")) {
        (Some(start), Some(end)) => Ok((start, end)),
        _ => Err("Record has no integer start/end coordinates.".to_string()),
    }
}

/// Half-open intervals (BED): `start < end`.
pub fn start_before_end(record: &Record) -> Result<(), String> {
    let (start, end) = coordinates(record)?;
    if start >= end {
        return Err(format!(
            "Start coordinate ({}) is greater or equal than end coordinate ({}).",
            start, end
        ));
    }
    Ok(())
}

/// Closed intervals (GFF3, 1-based dumps): `start <= end`.
pub fn start_not_after_end(record: &Record) -> Result<(), String> {
    let (start, end) = coordinates(record)?;
    if start > end {
        return Err(format!(
            "Start coordinate ({}) is greater than end coordinate ({}).",
            start, end
        ));
    }
    Ok(())
}

/// Single-base features: `end - start == 1`.
pub fn single_base(record: &Record) -> Result<(), String> {
    let (start, end) = coordinates(record)?;
    if end - start != 1 {
        return Err(format!(
            "TSSs should be a one base feature. (end ({}) - start ({})) != 1.",
            end, start
        ));
    }
    Ok(())
}

/// Ensembl sequence names never carry the UCSC `chr` prefix.
pub fn no_chr_prefix(value: &Value) -> Result<(), String> {
    match value {
        Value::Str(s) if s.to_lowercase().starts_with("chr") => Err(format!(
            "Seqid value ('{}') from an Ensembl generated file not expected to start with 'chr'.",
            s
        )),
        _ => Ok(()),
    }
}

/// GFF3 uses `.` for an empty column.
pub fn dot_as_null(raw: RawValue) -> Result<RawValue, String> {
    match raw {
        RawValue::Text(ref s) if s == "." => Ok(RawValue::Null),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Field, Mode, RawRecord, RecordSchema};

    fn interval(start: i64, end: i64) -> Record {
        RecordSchema::new("Interval")
            .field(Field::int("start"))
            .field(Field::int("end"))
            .validate(
                &RawRecord::new().with("start", start).with("end", end),
                Mode::Strict,
            )
            .unwrap()
    }

    #[test]
    fn test_start_before_end() {
        assert!(start_before_end(&interval(1, 2)).is_ok());
        let reason = start_before_end(&interval(100, 100)).unwrap_err();
        assert!(reason.contains("greater or equal"));
        assert!(start_before_end(&interval(5, 1)).is_err());
    }

    #[test]
    fn test_start_not_after_end() {
        assert!(start_not_after_end(&interval(100, 100)).is_ok());
        let reason = start_not_after_end(&interval(101, 100)).unwrap_err();
        assert_eq!(
            reason,
            "Start coordinate (101) is greater than end coordinate (100)."
        );
    }

    #[test]
    fn test_single_base() {
        assert!(single_base(&interval(9, 10)).is_ok());
        assert!(single_base(&interval(9, 11)).unwrap_err().contains("one base"));
    }

    #[test]
    fn test_rules_without_coordinates() {
        assert!(start_before_end(&Record::default()).is_err());
    }

    #[test]
    fn test_no_chr_prefix_case_insensitive() {
        for seqid in ["chr1", "CHR1", "ChrX", "chrUn_KI270302v1"] {
            let reason = no_chr_prefix(&Value::Str(seqid.to_string())).unwrap_err();
            assert!(reason.contains(seqid));
        }
        assert!(no_chr_prefix(&Value::Str("1".to_string())).is_ok());
        assert!(no_chr_prefix(&Value::Str("KI270302.1".to_string())).is_ok());
    }

    #[test]
    fn test_dot_as_null() {
        assert_eq!(dot_as_null(".".into()).unwrap(), RawValue::Null);
        assert_eq!(dot_as_null("0".into()).unwrap(), RawValue::from("0"));
    }
}
