//! Declarative record schemas.
//!
//! A [`RecordSchema`] is a fixed, ordered list of [`Field`]s plus three
//! explicit, inspectable validator registries:
//!
//! - **before validators** `(field, fn(RawValue) -> RawValue)`: raw-to-raw
//!   transforms run before coercion (e.g. `"."` → null, attribute parsing)
//! - **after validators** `(field, fn(&Value))`: checks on a coerced field
//! - **record validators** `(rule, fn(&Record))`: cross-field rules run once
//!   every field has passed
//!
//! # Evaluation order
//!
//! 1. For each field, in declaration order: lookup (by alias if set), before
//!    validators, coercion, constraints, after validators. All field
//!    failures are collected.
//! 2. If any field failed the record is rejected and no record validator
//!    runs.
//! 3. Record validators run in registration order; the first failure
//!    rejects the record and short-circuits the rest.
//!
//! Nested sub-schemas ([`Field::record`]) follow the same order internally,
//! so an interval's ordering rule only runs once both coordinates coerced.
//!
//! # Example
//!
//! ```
//! use annoval::schema::{rules, Field, Mode, RawRecord, RecordSchema};
//!
//! let schema = RecordSchema::new("Interval")
//!     .field(Field::int("start").ge(0))
//!     .field(Field::int("end").ge(1))
//!     .rule("start_before_end", rules::start_before_end);
//!
//! let ok = RawRecord::new().with("start", "10").with("end", "20");
//! let record = schema.validate(&ok, Mode::Lax).unwrap();
//! assert_eq!(record.int("start"), Some(10));
//!
//! let bad = RawRecord::new().with("start", "20").with("end", "20");
//! assert!(schema.validate(&bad, Mode::Lax).is_err());
//! ```

use std::fmt;
use thiserror::Error;

pub mod field;
pub mod rules;
pub mod value;

pub use field::{Constraint, Field, FieldType};
pub use value::{RawRecord, RawValue, Record, Value};

/// Raw-to-raw transform applied before coercion.
pub type BeforeValidator = fn(RawValue) -> std::result::Result<RawValue, String>;

/// Check on a single coerced field.
pub type AfterValidator = fn(&Value) -> std::result::Result<(), String>;

/// Cross-field rule over a fully coerced record.
pub type RecordValidator = fn(&Record) -> std::result::Result<(), String>;

/// Coercion policy passed to every validation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Attempt type coercion before failing (default)
    #[default]
    Lax,
    /// No coercion: raw values must already have the declared type
    Strict,
}

impl Mode {
    /// `Strict` if `strict`, else `Lax`.
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            Mode::Strict
        } else {
            Mode::Lax
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Lax => write!(f, "lax"),
            Mode::Strict => write!(f, "strict"),
        }
    }
}

/// One reason a record was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFailure {
    /// Dotted field path (`location.start`); empty for record-wide failures
    pub path: String,
    /// Human-readable reason, echoing the offending value
    pub reason: String,
}

impl FieldFailure {
    /// Creates a failure at `path`.
    pub fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        FieldFailure {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for FieldFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.reason)
        } else {
            write!(f, "{}: {}", self.path, self.reason)
        }
    }
}

/// Outcome of validating one record.
pub type Outcome = std::result::Result<Record, Vec<FieldFailure>>;

/// Errors raised while declaring a schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A pattern constraint does not compile.
    #[error("Invalid pattern for field '{field}'")]
    InvalidPattern {
        /// Field the pattern belongs to
        field: &'static str,
        /// Underlying regex error
        source: regex::Error,
    },
}

/// A record shape: ordered fields plus registered validators.
#[derive(Debug, Clone)]
pub struct RecordSchema {
    name: &'static str,
    fields: Vec<Field>,
    before: Vec<(&'static str, BeforeValidator)>,
    after: Vec<(&'static str, AfterValidator)>,
    rules: Vec<(&'static str, RecordValidator)>,
}

impl RecordSchema {
    /// Creates an empty schema.
    pub fn new(name: &'static str) -> Self {
        RecordSchema {
            name,
            fields: Vec::new(),
            before: Vec::new(),
            after: Vec::new(),
            rules: Vec::new(),
        }
    }

    /// Appends a field.
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Registers a before validator for `field`.
    pub fn before(mut self, field: &'static str, validator: BeforeValidator) -> Self {
        self.before.push((field, validator));
        self
    }

    /// Registers an after validator for `field`.
    pub fn after(mut self, field: &'static str, validator: AfterValidator) -> Self {
        self.after.push((field, validator));
        self
    }

    /// Registers a cross-field rule.
    pub fn rule(mut self, name: &'static str, validator: RecordValidator) -> Self {
        self.rules.push((name, validator));
        self
    }

    /// Schema name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Declared fields, in order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Registered before validators.
    pub fn before_validators(&self) -> &[(&'static str, BeforeValidator)] {
        &self.before
    }

    /// Registered after validators.
    pub fn after_validators(&self) -> &[(&'static str, AfterValidator)] {
        &self.after
    }

    /// Registered cross-field rules, in evaluation order.
    pub fn rules(&self) -> &[(&'static str, RecordValidator)] {
        &self.rules
    }

    /// Validates one raw record.
    ///
    /// Returns the typed record, or every failure found. See the module docs
    /// for the evaluation order.
    pub fn validate(&self, raw: &RawRecord, mode: Mode) -> Outcome {
        self.validate_at(raw, "", mode)
    }

    pub(crate) fn validate_at(&self, raw: &RawRecord, prefix: &str, mode: Mode) -> Outcome {
        let mut record = Record::with_capacity(self.fields.len());
        let mut failures = Vec::new();

        for field in &self.fields {
            let path = join_path(prefix, field.name);
            match self.validate_field(field, raw.get(field.key()), &path, mode) {
                Ok(value) => record.push(field.name, value),
                Err(mut field_failures) => failures.append(&mut field_failures),
            }
        }

        if !failures.is_empty() {
            return Err(failures);
        }

        for (_, rule) in &self.rules {
            if let Err(reason) = rule(&record) {
                return Err(vec![FieldFailure::new(prefix, reason)]);
            }
        }

        Ok(record)
    }

    fn validate_field(
        &self,
        field: &Field,
        raw: Option<&RawValue>,
        path: &str,
        mode: Mode,
    ) -> std::result::Result<Value, Vec<FieldFailure>> {
        let mut raw = match raw {
            Some(raw) => raw.clone(),
            None if field.optional => RawValue::Null,
            None => return Err(vec![FieldFailure::new(path, "Field required")]),
        };

        for (_, before) in self.before.iter().filter(|(name, _)| *name == field.name) {
            raw = before(raw).map_err(|reason| vec![FieldFailure::new(path, reason)])?;
        }

        let value = field.validate(raw, path, mode)?;

        for (_, after) in self.after.iter().filter(|(name, _)| *name == field.name) {
            after(&value).map_err(|reason| vec![FieldFailure::new(path, reason)])?;
        }

        Ok(value)
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

impl fmt::Display for RecordSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name)?;
        for field in &self.fields {
            writeln!(f, "  {}", field)?;
        }
        for (field, _) in &self.before {
            writeln!(f, "  before({})", field)?;
        }
        for (field, _) in &self.after {
            writeln!(f, "  after({})", field)?;
        }
        for (rule, _) in &self.rules {
            writeln!(f, "  rule {}", rule)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interval() -> RecordSchema {
        RecordSchema::new("Interval")
            .field(Field::int("start").ge(0))
            .field(Field::int("end").ge(1))
            .rule("start_before_end", rules::start_before_end)
    }

    fn row() -> RecordSchema {
        RecordSchema::new("Row")
            .field(Field::str("seqid"))
            .field(Field::record("location", interval()))
            .field(Field::float("score").optional())
            .before("score", rules::dot_as_null)
            .after("seqid", rules::no_chr_prefix)
            .rule("always_fails", |_| Err("record rule ran".to_string()))
    }

    fn raw_row(seqid: &str, start: &str, end: &str, score: &str) -> RawRecord {
        RawRecord::new()
            .with("seqid", seqid)
            .with(
                "location",
                RawRecord::new().with("start", start).with("end", end),
            )
            .with("score", score)
    }

    #[test]
    fn test_accepts_and_coerces() {
        let schema = interval();
        let raw = RawRecord::new().with("start", "5").with("end", "9");
        let record = schema.validate(&raw, Mode::Lax).unwrap();
        assert_eq!(record.int("start"), Some(5));
        assert_eq!(record.int("end"), Some(9));
    }

    #[test]
    fn test_missing_field_is_required() {
        let raw = RawRecord::new().with("start", "5");
        let failures = interval().validate(&raw, Mode::Lax).unwrap_err();
        assert_eq!(failures, vec![FieldFailure::new("end", "Field required")]);
    }

    #[test]
    fn test_field_failures_skip_rules() {
        // start fails its bound; ordering rule must not run
        let raw = RawRecord::new().with("start", "-1").with("end", "-5");
        let failures = interval().validate(&raw, Mode::Lax).unwrap_err();
        assert_eq!(failures.len(), 2);
        assert!(failures.iter().all(|f| f.reason.contains("greater than or equal")));
    }

    #[test]
    fn test_all_field_failures_collected() {
        let failures = row()
            .validate(&raw_row("chr1", "x", "10", "abc"), Mode::Lax)
            .unwrap_err();
        let paths: Vec<_> = failures.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["seqid", "location.start", "score"]);
    }

    #[test]
    fn test_nested_rule_failure_path() {
        let failures = row()
            .validate(&raw_row("1", "10", "10", "."), Mode::Lax)
            .unwrap_err();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].path, "location");
    }

    #[test]
    fn test_record_rule_runs_last() {
        let failures = row()
            .validate(&raw_row("1", "10", "20", "."), Mode::Lax)
            .unwrap_err();
        assert_eq!(failures, vec![FieldFailure::new("", "record rule ran")]);
    }

    #[test]
    fn test_first_rule_failure_short_circuits() {
        let schema = RecordSchema::new("Rules")
            .field(Field::int("x"))
            .rule("first", |_| Err("first".to_string()))
            .rule("second", |_| Err("second".to_string()));
        let failures = schema
            .validate(&RawRecord::new().with("x", "1"), Mode::Lax)
            .unwrap_err();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].reason, "first");
    }

    #[test]
    fn test_alias_lookup() {
        let schema = RecordSchema::new("Aliased").field(Field::str("gene_id").alias("geneId"));
        let record = schema
            .validate(&RawRecord::new().with("geneId", "ENSG1"), Mode::Lax)
            .unwrap();
        assert_eq!(record.str("gene_id"), Some("ENSG1"));

        let failures = schema
            .validate(&RawRecord::new().with("gene_id", "ENSG1"), Mode::Lax)
            .unwrap_err();
        assert_eq!(failures[0].path, "gene_id");
    }

    #[test]
    fn test_strict_mode_is_per_call() {
        let schema = interval();
        let raw = RawRecord::new().with("start", "5").with("end", "9");
        assert!(schema.validate(&raw, Mode::Lax).is_ok());
        assert!(schema.validate(&raw, Mode::Strict).is_err());

        let native = RawRecord::new().with("start", 5i64).with("end", 9i64);
        assert!(schema.validate(&native, Mode::Strict).is_ok());
    }

    #[test]
    fn test_registries_are_inspectable() {
        let schema = row();
        assert_eq!(schema.fields().len(), 3);
        assert_eq!(schema.before_validators()[0].0, "score");
        assert_eq!(schema.after_validators()[0].0, "seqid");
        assert_eq!(schema.rules()[0].0, "always_fails");
        assert!(schema.to_string().contains("rule always_fails"));
    }

    #[test]
    fn test_failure_display() {
        assert_eq!(FieldFailure::new("a.b", "bad").to_string(), "a.b: bad");
        assert_eq!(FieldFailure::new("", "bad").to_string(), "bad");
    }
}
