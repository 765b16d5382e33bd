//! Purpose: Model the value kinds a gate rule can expect and coerce JSON into them.
//! Exports: `ValueKind`, `TypedValue`, `Observed`, `GateValue`.
//! Role: Replaces dynamic casts with an explicit, checked coercion step.
//! Invariants: Coercion never panics; anything not convertible is `Observed::Mismatch`.
//! Invariants: JSON `null` is reported as `Observed::Null` for every kind.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde_json::{Number, Value};

use crate::core::error::{Error, ErrorKind};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ValueKind {
    Integer,
    Float,
    Boolean,
    String,
    /// Objects and arrays.
    Composite,
}

impl ValueKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::String => "string",
            Self::Composite => "composite",
        }
    }

    /// Coerce a resolved JSON value (or its absence) into this kind.
    pub fn observe(self, value: Option<&Value>) -> Observed {
        let Some(value) = value else {
            return Observed::Absent;
        };
        if value.is_null() {
            return Observed::Null;
        }
        match self.coerce(value) {
            Some(typed) => Observed::Value(typed),
            None => Observed::Mismatch(value.clone()),
        }
    }

    pub fn coerce(self, value: &Value) -> Option<TypedValue> {
        match (self, value) {
            (_, Value::Null) => None,
            (Self::Integer, Value::Number(n)) => integer_from_number(n).map(TypedValue::Integer),
            (Self::Integer, Value::String(s)) => s.trim().parse::<i64>().ok().map(TypedValue::Integer),
            (Self::Float, Value::Number(n)) => n.as_f64().map(TypedValue::Float),
            (Self::Float, Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(TypedValue::Float),
            (Self::Boolean, Value::Bool(b)) => Some(TypedValue::Boolean(*b)),
            (Self::Boolean, Value::String(s)) => {
                if s.eq_ignore_ascii_case("true") {
                    Some(TypedValue::Boolean(true))
                } else if s.eq_ignore_ascii_case("false") {
                    Some(TypedValue::Boolean(false))
                } else {
                    None
                }
            }
            (Self::String, Value::String(s)) => Some(TypedValue::String(s.clone())),
            (Self::String, Value::Number(n)) => Some(TypedValue::String(n.to_string())),
            (Self::String, Value::Bool(b)) => Some(TypedValue::String(b.to_string())),
            (Self::Composite, Value::Object(_) | Value::Array(_)) => {
                Some(TypedValue::Composite(value.clone()))
            }
            _ => None,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "int" | "integer" => Ok(Self::Integer),
            "float" | "number" => Ok(Self::Float),
            "bool" | "boolean" => Ok(Self::Boolean),
            "str" | "string" => Ok(Self::String),
            "composite" | "json" => Ok(Self::Composite),
            other => Err(Error::new(ErrorKind::Usage)
                .with_message(format!("unknown value kind `{other}`"))
                .with_hint("Expected one of: int, float, bool, string, composite.")),
        }
    }
}

fn integer_from_number(n: &Number) -> Option<i64> {
    if let Some(i) = n.as_i64() {
        return Some(i);
    }
    if n.is_u64() {
        return None;
    }
    let f = n.as_f64()?;
    // i64::MAX is not exactly representable; the bound below is 2^63.
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TypedValue {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    String(String),
    Composite(Value),
}

impl TypedValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Integer(_) => ValueKind::Integer,
            Self::Float(_) => ValueKind::Float,
            Self::Boolean(_) => ValueKind::Boolean,
            Self::String(_) => ValueKind::String,
            Self::Composite(_) => ValueKind::Composite,
        }
    }

    /// Order two values of the same kind. Booleans and composites only
    /// compare for equality; mixed kinds do not compare.
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => Some(a.cmp(b)),
            (Self::Float(a), Self::Float(b)) => a.partial_cmp(b),
            (Self::String(a), Self::String(b)) => Some(a.cmp(b)),
            (Self::Boolean(a), Self::Boolean(b)) => (a == b).then_some(Ordering::Equal),
            (Self::Composite(a), Self::Composite(b)) => (a == b).then_some(Ordering::Equal),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Integer(i) => Value::from(*i),
            Self::Float(f) => Value::from(*f),
            Self::Boolean(b) => Value::Bool(*b),
            Self::String(s) => Value::String(s.clone()),
            Self::Composite(v) => v.clone(),
        }
    }
}

/// What a rule actually found at its path.
#[derive(Clone, Debug, PartialEq)]
pub enum Observed {
    /// The path did not resolve.
    Absent,
    /// The path resolved to JSON `null`.
    Null,
    /// The path resolved to a value that does not coerce to the expected kind.
    Mismatch(Value),
    Value(TypedValue),
}

impl Observed {
    pub fn typed(&self) -> Option<&TypedValue> {
        match self {
            Self::Value(typed) => Some(typed),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// The value as JSON; `None` only when the path was absent.
    pub fn to_json(&self) -> Option<Value> {
        match self {
            Self::Absent => None,
            Self::Null => Some(Value::Null),
            Self::Mismatch(raw) => Some(raw.clone()),
            Self::Value(typed) => Some(typed.to_json()),
        }
    }
}

/// Rust types a rule predicate or failure callback can be written against.
pub trait GateValue: Sized {
    const KIND: ValueKind;

    fn from_typed(value: &TypedValue) -> Option<Self>;
}

impl GateValue for i64 {
    const KIND: ValueKind = ValueKind::Integer;

    fn from_typed(value: &TypedValue) -> Option<Self> {
        match value {
            TypedValue::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

impl GateValue for i32 {
    const KIND: ValueKind = ValueKind::Integer;

    fn from_typed(value: &TypedValue) -> Option<Self> {
        i64::from_typed(value).and_then(|i| i32::try_from(i).ok())
    }
}

impl GateValue for u64 {
    const KIND: ValueKind = ValueKind::Integer;

    fn from_typed(value: &TypedValue) -> Option<Self> {
        i64::from_typed(value).and_then(|i| u64::try_from(i).ok())
    }
}

impl GateValue for f64 {
    const KIND: ValueKind = ValueKind::Float;

    fn from_typed(value: &TypedValue) -> Option<Self> {
        match value {
            TypedValue::Float(f) => Some(*f),
            _ => None,
        }
    }
}

impl GateValue for bool {
    const KIND: ValueKind = ValueKind::Boolean;

    fn from_typed(value: &TypedValue) -> Option<Self> {
        match value {
            TypedValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl GateValue for String {
    const KIND: ValueKind = ValueKind::String;

    fn from_typed(value: &TypedValue) -> Option<Self> {
        match value {
            TypedValue::String(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl GateValue for Value {
    const KIND: ValueKind = ValueKind::Composite;

    fn from_typed(value: &TypedValue) -> Option<Self> {
        match value {
            TypedValue::Composite(v) => Some(v.clone()),
            _ => None,
        }
    }
}
