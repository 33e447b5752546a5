//! # Payload Validation
//!
//! Checks an untyped JSON value against a [`SchemaDescriptor`] and coerces
//! scalar fields to their declared kinds.
//!
//! ## Rules
//!
//! - The value (and every nested value) must be a JSON object.
//! - Each declared field is looked up by name and coerced. Scalars follow
//!   the permissive table below; nested schemas recurse.
//! - A missing required field is a `MissingField` failure. A `null` required
//!   field is a type mismatch. Optional fields validate to `null`.
//! - Undeclared fields are dropped from the result, not rejected.
//! - Failures are collected across the whole value and returned together.
//!   No partially validated value is ever returned.
//!
//! | Kind    | Accepted input |
//! |---------|----------------|
//! | integer | integers, integral floats, strings parsing as integers; all within `i64` |
//! | float   | numbers, strings parsing as finite floats |
//! | string  | strings, numbers (rendered as JSON text) |
//! | boolean | booleans, `0`/`1`, `0 off f false n no` / `1 on t true y yes` |
//!
//! Booleans are rejected for integer and string fields, unlike validators
//! that turn `true` into `1` or `"True"`.

use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::{Map, Number, Value};

use crate::descriptor::{FieldType, ScalarKind, SchemaDescriptor};

/// Location used for failures of the top-level value itself.
const ROOT_LOC: &str = "__root__";

/// A value that passed validation: exactly the declared fields, coerced.
#[derive(Debug, Clone, PartialEq)]
pub struct Validated(Map<String, Value>);

impl Validated {
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Deserialize into the Rust type the schema describes.
    pub fn deserialize<T: DeserializeOwned>(self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.into_value())
    }
}

/// What a value was expected to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    Scalar(ScalarKind),
    Object,
    NonNull,
}

/// Why a single field failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    MissingField,
    TypeMismatch(Expected),
}

impl FailureKind {
    pub fn message(&self) -> &'static str {
        match self {
            Self::MissingField => "field required",
            Self::TypeMismatch(Expected::Scalar(ScalarKind::Integer)) => {
                "value is not a valid integer"
            }
            Self::TypeMismatch(Expected::Scalar(ScalarKind::Float)) => "value is not a valid float",
            Self::TypeMismatch(Expected::Scalar(ScalarKind::String)) => "str type expected",
            Self::TypeMismatch(Expected::Scalar(ScalarKind::Boolean)) => {
                "value could not be parsed to a boolean"
            }
            Self::TypeMismatch(Expected::Object) => "value is not a valid dict",
            Self::TypeMismatch(Expected::NonNull) => "none is not an allowed value",
        }
    }
}

/// One failing location within the validated value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Path of field names from the root; empty for the root value.
    pub loc: Vec<String>,
    pub kind: FailureKind,
}

impl FieldError {
    /// Dotted field path, or `__root__` for the value itself.
    pub fn location(&self) -> String {
        if self.loc.is_empty() {
            ROOT_LOC.to_string()
        } else {
            self.loc.join(".")
        }
    }

    /// Name of the innermost failing field.
    pub fn field(&self) -> Option<&str> {
        self.loc.last().map(String::as_str)
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n  {}", self.location(), self.kind.message())
    }
}

/// A value did not conform to its schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    schema: String,
    errors: Vec<FieldError>,
}

impl ValidationFailure {
    /// Name of the schema the value was validated against.
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Every failing location, in field declaration order. Never empty.
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Whether any failure is a missing `field` at any depth.
    pub fn is_missing(&self, field: &str) -> bool {
        self.errors
            .iter()
            .any(|e| e.kind == FailureKind::MissingField && e.field() == Some(field))
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.errors.len();
        write!(
            f,
            "{n} validation error{} for {}",
            if n == 1 { "" } else { "s" },
            self.schema
        )?;
        for err in &self.errors {
            write!(f, "\n{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationFailure {}

/// Validate `raw` against `descriptor`.
pub fn validate(descriptor: &SchemaDescriptor, raw: &Value) -> Result<Validated, ValidationFailure> {
    let mut errors = Vec::new();
    let validated = match raw.as_object() {
        Some(object) => validate_object(descriptor, object, &mut Vec::new(), &mut errors),
        None => {
            errors.push(FieldError {
                loc: Vec::new(),
                kind: FailureKind::TypeMismatch(Expected::Object),
            });
            Map::new()
        }
    };

    if errors.is_empty() {
        Ok(Validated(validated))
    } else {
        Err(ValidationFailure {
            schema: descriptor.name().to_string(),
            errors,
        })
    }
}

fn validate_object(
    descriptor: &SchemaDescriptor,
    object: &Map<String, Value>,
    loc: &mut Vec<String>,
    errors: &mut Vec<FieldError>,
) -> Map<String, Value> {
    let mut out = Map::new();
    for field in descriptor.fields() {
        loc.push(field.name().to_string());
        let failure = match object.get(field.name()) {
            None | Some(Value::Null) if !field.is_required() => {
                out.insert(field.name().to_string(), Value::Null);
                None
            }
            None => Some(FailureKind::MissingField),
            Some(Value::Null) => Some(FailureKind::TypeMismatch(Expected::NonNull)),
            Some(raw) => match field.ty() {
                FieldType::Scalar(kind) => match coerce(*kind, raw) {
                    Some(value) => {
                        out.insert(field.name().to_string(), value);
                        None
                    }
                    None => Some(FailureKind::TypeMismatch(Expected::Scalar(*kind))),
                },
                FieldType::Schema(nested) => match raw.as_object() {
                    Some(inner) => {
                        let value = validate_object(nested, inner, loc, errors);
                        out.insert(field.name().to_string(), Value::Object(value));
                        None
                    }
                    None => Some(FailureKind::TypeMismatch(Expected::Object)),
                },
            },
        };
        if let Some(kind) = failure {
            errors.push(FieldError {
                loc: loc.clone(),
                kind,
            });
        }
        loc.pop();
    }
    out
}

/// Coerce a non-null JSON value to `kind`, or `None` if impossible.
pub fn coerce(kind: ScalarKind, raw: &Value) -> Option<Value> {
    match kind {
        ScalarKind::Integer => coerce_integer(raw),
        ScalarKind::Float => coerce_float(raw),
        ScalarKind::String => match raw {
            Value::String(s) => Some(Value::String(s.clone())),
            Value::Number(n) => Some(Value::String(n.to_string())),
            _ => None,
        },
        ScalarKind::Boolean => coerce_boolean(raw),
    }
}

fn coerce_integer(raw: &Value) -> Option<Value> {
    match raw {
        Value::Number(n) if n.is_i64() => Some(Value::Number(n.clone())),
        Value::Number(n) if n.is_u64() => None,
        Value::Number(n) => n
            .as_f64()
            .filter(|f| f.is_finite() && f.fract() == 0.0)
            .filter(|f| *f >= i64::MIN as f64 && *f < i64::MAX as f64)
            .map(|f| Value::from(f as i64)),
        Value::String(s) => s.trim().parse::<i64>().map(Value::from).ok(),
        _ => None,
    }
}

fn coerce_float(raw: &Value) -> Option<Value> {
    let f = match raw {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    Number::from_f64(f).map(Value::Number)
}

fn coerce_boolean(raw: &Value) -> Option<Value> {
    let b = match raw {
        Value::Bool(b) => *b,
        Value::Number(n) => match n.as_i64()? {
            0 => false,
            1 => true,
            _ => return None,
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "0" | "off" | "f" | "false" | "n" | "no" => false,
            "1" | "on" | "t" | "true" | "y" | "yes" => true,
            _ => return None,
        },
        _ => return None,
    };
    Some(Value::Bool(b))
}
