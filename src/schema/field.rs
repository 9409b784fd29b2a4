//! Field declarations: type, constraints, coercion.
//!
//! A [`Field`] describes one named column of a record: the type it is
//! coerced to, whether it may be missing, the key it is read from and the
//! [`Constraint`]s checked once coercion succeeded.
//!
//! # Coercion
//!
//! | declared  | lax mode accepts                          | strict mode accepts |
//! |-----------|-------------------------------------------|---------------------|
//! | `Int`     | int, integral float, integer string       | int                 |
//! | `Float`   | float, int, numeric string                | float, int          |
//! | `Str`     | str                                       | str                 |
//! | `List`    | list of str                               | list of str         |
//! | `Map`     | record whose values are lists of str      | same                |
//! | `Record`  | record                                    | record              |

use crate::schema::value::{RawRecord, RawValue, Value};
use crate::schema::{FieldFailure, Mode, RecordSchema, SchemaError};
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Declared type of a field.
#[derive(Debug, Clone)]
pub enum FieldType {
    /// 64-bit signed integer
    Int,
    /// 64-bit float
    Float,
    /// String
    Str,
    /// List of strings
    List,
    /// Map of string key to list of strings
    Map,
    /// Nested sub-schema validated as a unit
    Record(Arc<RecordSchema>),
}

impl FieldType {
    fn name(&self) -> &'static str {
        match self {
            FieldType::Int => "integer",
            FieldType::Float => "number",
            FieldType::Str => "string",
            FieldType::List => "list",
            FieldType::Map => "mapping",
            FieldType::Record(_) => "record",
        }
    }
}

/// A single-field constraint checked after coercion.
#[derive(Debug, Clone)]
pub enum Constraint {
    /// Numeric value must be `>=` the bound
    Ge(i64),
    /// Numeric value must be `>` the bound
    Gt(i64),
    /// String must match the regular expression
    Pattern(Regex),
    /// String (or each list element) must be one of the literals
    OneOf(&'static [&'static str]),
}

impl Constraint {
    /// Checks a scalar value. Lists are checked element-wise by the caller.
    fn check(&self, value: &Value) -> std::result::Result<(), String> {
        match (self, value) {
            (Constraint::Ge(bound), Value::Int(v)) if v < bound => Err(format!(
                "Input should be greater than or equal to {} [input_value={}]",
                bound, v
            )),
            (Constraint::Gt(bound), Value::Int(v)) if v <= bound => Err(format!(
                "Input should be greater than {} [input_value={}]",
                bound, v
            )),
            (Constraint::Ge(bound), Value::Float(v)) if *v < *bound as f64 => Err(format!(
                "Input should be greater than or equal to {} [input_value={}]",
                bound, v
            )),
            (Constraint::Gt(bound), Value::Float(v)) if *v <= *bound as f64 => Err(format!(
                "Input should be greater than {} [input_value={}]",
                bound, v
            )),
            (Constraint::Pattern(re), Value::Str(s)) if !re.is_match(s) => Err(format!(
                "String should match pattern '{}' [input_value='{}']",
                re.as_str(),
                s
            )),
            (Constraint::OneOf(allowed), Value::Str(s))
                if !allowed.iter().any(|literal| *literal == s.as_str()) =>
            {
                Err(format!(
                    "Input should be {} [input_value='{}']",
                    describe_literals(allowed),
                    s
                ))
            }
            _ => Ok(()),
        }
    }
}

/// `'a'`, `'a' or 'b'`, `'a', 'b' or 'c'`
fn describe_literals(allowed: &[&str]) -> String {
    match allowed {
        [] => "nothing".to_string(),
        [only] => format!("'{}'", only),
        [init @ .., last] => {
            let head = init
                .iter()
                .map(|s| format!("'{}'", s))
                .collect::<Vec<_>>()
                .join(", ");
            format!("{} or '{}'", head, last)
        }
    }
}

/// Declaration of one record field.
#[derive(Debug, Clone)]
pub struct Field {
    /// Logical field name, used in typed records and failure paths
    pub name: &'static str,
    /// Key the raw value is read from, if different from `name`
    pub alias: Option<&'static str>,
    /// Declared type
    pub ty: FieldType,
    /// Constraints checked after coercion, in order
    pub constraints: Vec<Constraint>,
    /// Missing or null input yields [`Value::Null`] instead of a failure
    pub optional: bool,
}

impl Field {
    fn new(name: &'static str, ty: FieldType) -> Self {
        Field {
            name,
            alias: None,
            ty,
            constraints: Vec::new(),
            optional: false,
        }
    }

    /// Integer field.
    pub fn int(name: &'static str) -> Self {
        Self::new(name, FieldType::Int)
    }

    /// Float field.
    pub fn float(name: &'static str) -> Self {
        Self::new(name, FieldType::Float)
    }

    /// String field.
    pub fn str(name: &'static str) -> Self {
        Self::new(name, FieldType::Str)
    }

    /// String field restricted to a fixed set of literals.
    pub fn literal(name: &'static str, allowed: &'static [&'static str]) -> Self {
        Self::str(name).one_of(allowed)
    }

    /// List-of-strings field.
    pub fn list(name: &'static str) -> Self {
        Self::new(name, FieldType::List)
    }

    /// Map-of-lists field.
    pub fn map(name: &'static str) -> Self {
        Self::new(name, FieldType::Map)
    }

    /// Nested sub-schema field.
    pub fn record(name: &'static str, schema: RecordSchema) -> Self {
        Self::new(name, FieldType::Record(Arc::new(schema)))
    }

    /// Reads the raw value from `alias` instead of the field name.
    pub fn alias(mut self, alias: &'static str) -> Self {
        self.alias = Some(alias);
        self
    }

    /// Allows the field to be missing or null.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// `value >= bound`
    pub fn ge(mut self, bound: i64) -> Self {
        self.constraints.push(Constraint::Ge(bound));
        self
    }

    /// `value > bound`
    pub fn gt(mut self, bound: i64) -> Self {
        self.constraints.push(Constraint::Gt(bound));
        self
    }

    /// Restricts a string (or each list element) to the given literals.
    pub fn one_of(mut self, allowed: &'static [&'static str]) -> Self {
        self.constraints.push(Constraint::OneOf(allowed));
        self
    }

    /// Requires the string to match `pattern`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::InvalidPattern`] if the pattern does not compile.
    pub fn pattern(mut self, pattern: &str) -> Result<Self, SchemaError> {
        let re = Regex::new(pattern).map_err(|source| SchemaError::InvalidPattern {
            field: self.name,
            source,
        })?;
        self.constraints.push(Constraint::Pattern(re));
        Ok(self)
    }

    /// Key used to look the field up in a raw record.
    pub fn key(&self) -> &'static str {
        self.alias.unwrap_or(self.name)
    }

    /// Coerces `raw` to the declared type and checks constraints.
    ///
    /// `path` is the dotted path of this field, used for failures. On error
    /// every failure found for this field (and, for nested records, its
    /// leaves) is returned.
    pub(crate) fn validate(
        &self,
        raw: RawValue,
        path: &str,
        mode: Mode,
    ) -> std::result::Result<Value, Vec<FieldFailure>> {
        if matches!(raw, RawValue::Null) {
            return if self.optional {
                Ok(Value::Null)
            } else {
                Err(vec![FieldFailure::new(
                    path,
                    format!("Input should be a valid {} [input_value=None]", self.ty.name()),
                )])
            };
        }

        let value = match &self.ty {
            FieldType::Record(schema) => match raw {
                RawValue::Record(inner) => {
                    return schema.validate_at(&inner, path, mode).map(Value::Record)
                }
                other => return Err(vec![type_failure(path, "record", &other)]),
            },
            FieldType::Int => coerce_int(raw, mode),
            FieldType::Float => coerce_float(raw, mode),
            FieldType::Str => coerce_str(raw),
            FieldType::List => coerce_list(raw),
            FieldType::Map => coerce_map(raw),
        }
        .map_err(|reason| vec![FieldFailure::new(path, reason)])?;

        let mut failures = Vec::new();
        for constraint in &self.constraints {
            match &value {
                Value::List(items) => {
                    for (i, item) in items.iter().enumerate() {
                        if let Err(reason) = constraint.check(&Value::Str(item.clone())) {
                            failures.push(FieldFailure::new(format!("{}.{}", path, i), reason));
                        }
                    }
                }
                scalar => {
                    if let Err(reason) = constraint.check(scalar) {
                        failures.push(FieldFailure::new(path, reason));
                    }
                }
            }
        }

        if failures.is_empty() {
            Ok(value)
        } else {
            Err(failures)
        }
    }
}

fn type_failure(path: &str, expected: &str, raw: &RawValue) -> FieldFailure {
    FieldFailure::new(
        path,
        format!("Input should be a valid {} [input_value={}]", expected, raw),
    )
}

fn coerce_int(raw: RawValue, mode: Mode) -> std::result::Result<Value, String> {
    match (raw, mode) {
        (RawValue::Int(i), _) => Ok(Value::Int(i)),
        (RawValue::Float(x), Mode::Lax) if x.fract() == 0.0 && x.is_finite() => {
            Ok(Value::Int(x as i64))
        }
        (RawValue::Float(x), Mode::Lax) => Err(format!(
            "Input should be a valid integer, got a number with a fractional part [input_value={}]",
            x
        )),
        (RawValue::Text(s), Mode::Lax) => s.trim().parse::<i64>().map(Value::Int).map_err(|_| {
            format!(
                "Input should be a valid integer, unable to parse string as an integer [input_value='{}']",
                s
            )
        }),
        (other, _) => Err(format!(
            "Input should be a valid integer [input_value={}]",
            other
        )),
    }
}

fn coerce_float(raw: RawValue, mode: Mode) -> std::result::Result<Value, String> {
    match (raw, mode) {
        (RawValue::Float(x), _) => Ok(Value::Float(x)),
        (RawValue::Int(i), _) => Ok(Value::Float(i as f64)),
        (RawValue::Text(s), Mode::Lax) => s.trim().parse::<f64>().map(Value::Float).map_err(|_| {
            format!(
                "Input should be a valid number, unable to parse string as a number [input_value='{}']",
                s
            )
        }),
        (other, _) => Err(format!(
            "Input should be a valid number [input_value={}]",
            other
        )),
    }
}

fn coerce_str(raw: RawValue) -> std::result::Result<Value, String> {
    match raw {
        RawValue::Text(s) => Ok(Value::Str(s)),
        other => Err(format!(
            "Input should be a valid string [input_value={}]",
            other
        )),
    }
}

fn text_items(items: Vec<RawValue>) -> std::result::Result<Vec<String>, String> {
    items
        .into_iter()
        .map(|item| match item {
            RawValue::Text(s) => Ok(s),
            other => Err(format!(
                "List items should be valid strings [input_value={}]",
                other
            )),
        })
        .collect()
}

fn coerce_list(raw: RawValue) -> std::result::Result<Value, String> {
    match raw {
        RawValue::List(items) => text_items(items).map(Value::List),
        other => Err(format!(
            "Input should be a valid list [input_value={}]",
            other
        )),
    }
}

fn coerce_map(raw: RawValue) -> std::result::Result<Value, String> {
    let record: RawRecord = match raw {
        RawValue::Record(record) => record,
        other => {
            return Err(format!(
                "Input should be a valid dictionary [input_value={}]",
                other
            ))
        }
    };

    let mut map = BTreeMap::new();
    for (key, value) in record {
        let items = match value {
            RawValue::List(items) => text_items(items)?,
            other => {
                return Err(format!(
                    "Values of '{}' should be a valid list [input_value={}]",
                    key, other
                ))
            }
        };
        map.insert(key, items);
    }
    Ok(Value::Map(map))
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.ty.name())?;
        if self.optional {
            write!(f, " | None")?;
        }
        if let Some(alias) = self.alias {
            write!(f, " (from '{}')", alias)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(field: &Field, raw: RawValue, mode: Mode) -> std::result::Result<Value, Vec<FieldFailure>> {
        field.validate(raw, field.name, mode)
    }

    #[test]
    fn test_int_lax_coercion() {
        let field = Field::int("start");
        assert_eq!(check(&field, "100".into(), Mode::Lax).unwrap(), Value::Int(100));
        assert_eq!(check(&field, " 7 ".into(), Mode::Lax).unwrap(), Value::Int(7));
        assert_eq!(check(&field, RawValue::Float(3.0), Mode::Lax).unwrap(), Value::Int(3));
        assert_eq!(check(&field, RawValue::Int(-4), Mode::Lax).unwrap(), Value::Int(-4));
    }

    #[test]
    fn test_int_lax_failures_echo_value() {
        let field = Field::int("start");
        let failures = check(&field, "12a".into(), Mode::Lax).unwrap_err();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].path, "start");
        assert!(failures[0].reason.contains("'12a'"));

        let failures = check(&field, RawValue::Float(2.5), Mode::Lax).unwrap_err();
        assert!(failures[0].reason.contains("fractional"));
    }

    #[test]
    fn test_int_strict_rejects_text() {
        let field = Field::int("start");
        assert!(check(&field, "100".into(), Mode::Strict).is_err());
        assert!(check(&field, RawValue::Float(3.0), Mode::Strict).is_err());
        assert_eq!(check(&field, RawValue::Int(100), Mode::Strict).unwrap(), Value::Int(100));
    }

    #[test]
    fn test_float_accepts_int_in_both_modes() {
        let field = Field::float("score");
        assert_eq!(check(&field, RawValue::Int(2), Mode::Strict).unwrap(), Value::Float(2.0));
        assert_eq!(check(&field, "0.5".into(), Mode::Lax).unwrap(), Value::Float(0.5));
        assert!(check(&field, "0.5".into(), Mode::Strict).is_err());
    }

    #[test]
    fn test_str_never_stringifies_numbers() {
        let field = Field::str("seqid");
        assert!(check(&field, RawValue::Int(1), Mode::Lax).is_err());
        assert_eq!(check(&field, "1".into(), Mode::Lax).unwrap(), Value::Str("1".to_string()));
    }

    #[test]
    fn test_optional_and_required_null() {
        assert_eq!(
            check(&Field::float("score").optional(), RawValue::Null, Mode::Lax).unwrap(),
            Value::Null
        );
        assert!(check(&Field::float("score"), RawValue::Null, Mode::Lax).is_err());
    }

    #[test]
    fn test_bounds() {
        let field = Field::int("start").ge(0);
        assert!(check(&field, "0".into(), Mode::Lax).is_ok());
        let failures = check(&field, "-1".into(), Mode::Lax).unwrap_err();
        assert!(failures[0].reason.contains("greater than or equal to 0"));
        assert!(failures[0].reason.contains("-1"));

        let field = Field::int("start").gt(0);
        assert!(check(&field, RawValue::Int(0), Mode::Strict).is_err());
        assert!(check(&field, RawValue::Int(1), Mode::Strict).is_ok());
    }

    #[test]
    fn test_literal_is_case_sensitive() {
        let field = Field::literal("strand", &["FORWARD", "REVERSE"]);
        assert!(check(&field, "FORWARD".into(), Mode::Lax).is_ok());
        let failures = check(&field, "forward".into(), Mode::Lax).unwrap_err();
        assert_eq!(
            failures[0].reason,
            "Input should be 'FORWARD' or 'REVERSE' [input_value='forward']"
        );
    }

    #[test]
    fn test_pattern() {
        let field = Field::str("name").pattern(r"^ENSG\d{11}$").unwrap();
        assert!(check(&field, "ENSG00000000001".into(), Mode::Lax).is_ok());
        let failures = check(&field, "ENSG1".into(), Mode::Lax).unwrap_err();
        assert!(failures[0].reason.contains("'ENSG1'"));
    }

    #[test]
    fn test_invalid_pattern_is_schema_error() {
        let result = Field::str("name").pattern("(unclosed");
        assert!(matches!(result, Err(SchemaError::InvalidPattern { field: "name", .. })));
    }

    #[test]
    fn test_list_elements_checked_individually() {
        let field = Field::list("tags").one_of(&["a", "b"]);
        let raw = RawValue::List(vec!["a".into(), "x".into(), "b".into(), "y".into()]);
        let failures = check(&field, raw, Mode::Lax).unwrap_err();
        let paths: Vec<_> = failures.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["tags.1", "tags.3"]);
    }

    #[test]
    fn test_map_coercion() {
        let raw = RawRecord::new()
            .with("ID", RawValue::List(vec!["gene:1".into()]))
            .with("tag", RawValue::List(vec!["a".into(), "b".into()]));
        let value = check(&Field::map("attributes"), RawValue::Record(raw), Mode::Lax).unwrap();
        match value {
            Value::Map(map) => {
                assert_eq!(map["ID"], vec!["gene:1".to_string()]);
                assert_eq!(map["tag"].len(), 2);
            }
            other => panic!("expected map, got {:?}", other),
        }
    }

    #[test]
    fn test_describe_literals() {
        assert_eq!(describe_literals(&["*"]), "'*'");
        assert_eq!(describe_literals(&["+", "-", "."]), "'+', '-' or '.'");
    }
}
