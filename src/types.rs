//! Value types shared by every layer: declared field types, resolved values,
//! raw source candidates, field identity and provenance.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::coerce::format_duration;

/// Identity of a declared field: `(field_set_key, field_key)`.
///
/// Displays as `set.field`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FieldId {
    pub field_set: String,
    pub field: String,
}

impl FieldId {
    pub fn new(field_set: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            field_set: field_set.into(),
            field: field.into(),
        }
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.field_set, self.field)
    }
}

/// The closed set of types a field can be declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
    Bool,
    Int,
    Float,
    Duration,
    Strings,
    Bools,
    Ints,
    Floats,
    Durations,
}

impl FieldType {
    pub fn is_list(self) -> bool {
        matches!(
            self,
            FieldType::Strings
                | FieldType::Bools
                | FieldType::Ints
                | FieldType::Floats
                | FieldType::Durations
        )
    }

    /// The value used when no default, generator or source supplies one.
    pub fn zero_value(self) -> Value {
        match self {
            FieldType::String => Value::String(String::new()),
            FieldType::Bool => Value::Bool(false),
            FieldType::Int => Value::Int(0),
            FieldType::Float => Value::Float(0.0),
            FieldType::Duration => Value::Duration(Duration::ZERO),
            FieldType::Strings => Value::Strings(Vec::new()),
            FieldType::Bools => Value::Bools(Vec::new()),
            FieldType::Ints => Value::Ints(Vec::new()),
            FieldType::Floats => Value::Floats(Vec::new()),
            FieldType::Durations => Value::Durations(Vec::new()),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::String => "string",
            FieldType::Bool => "bool",
            FieldType::Int => "int",
            FieldType::Float => "float",
            FieldType::Duration => "duration",
            FieldType::Strings => "[]string",
            FieldType::Bools => "[]bool",
            FieldType::Ints => "[]int",
            FieldType::Floats => "[]float",
            FieldType::Durations => "[]duration",
        };
        f.write_str(name)
    }
}

/// A typed, resolved configuration value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Bool(bool),
    Int(i64),
    Float(f64),
    Duration(Duration),
    Strings(Vec<String>),
    Bools(Vec<bool>),
    Ints(Vec<i64>),
    Floats(Vec<f64>),
    Durations(Vec<Duration>),
}

impl Value {
    pub fn field_type(&self) -> FieldType {
        match self {
            Value::String(_) => FieldType::String,
            Value::Bool(_) => FieldType::Bool,
            Value::Int(_) => FieldType::Int,
            Value::Float(_) => FieldType::Float,
            Value::Duration(_) => FieldType::Duration,
            Value::Strings(_) => FieldType::Strings,
            Value::Bools(_) => FieldType::Bools,
            Value::Ints(_) => FieldType::Ints,
            Value::Floats(_) => FieldType::Floats,
            Value::Durations(_) => FieldType::Durations,
        }
    }

    /// Empty strings and empty lists count as "no usable value" for required fields.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::String(s) => s.is_empty(),
            Value::Strings(v) => v.is_empty(),
            Value::Bools(v) => v.is_empty(),
            Value::Ints(v) => v.is_empty(),
            Value::Floats(v) => v.is_empty(),
            Value::Durations(v) => v.is_empty(),
            Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::Duration(_) => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            Value::Duration(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_strings(&self) -> Option<&[String]> {
        match self {
            Value::Strings(v) => Some(v),
            _ => None,
        }
    }
}

fn join<T>(items: &[T], f: &mut fmt::Formatter<'_>, each: fn(&T) -> String) -> fmt::Result {
    let parts: Vec<String> = items.iter().map(each).collect();
    write!(f, "[{}]", parts.join(", "))
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Duration(d) => f.write_str(&format_duration(*d)),
            Value::Strings(v) => join(v, f, |s| s.clone()),
            Value::Bools(v) => join(v, f, |b| b.to_string()),
            Value::Ints(v) => join(v, f, |i| i.to_string()),
            Value::Floats(v) => join(v, f, |x| x.to_string()),
            Value::Durations(v) => join(v, f, |d| format_duration(*d)),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<u16> for Value {
    fn from(i: u16) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<Duration> for Value {
    fn from(d: Duration) -> Self {
        Value::Duration(d)
    }
}

impl From<Vec<String>> for Value {
    fn from(v: Vec<String>) -> Self {
        Value::Strings(v)
    }
}

impl From<Vec<&str>> for Value {
    fn from(v: Vec<&str>) -> Self {
        Value::Strings(v.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<bool>> for Value {
    fn from(v: Vec<bool>) -> Self {
        Value::Bools(v)
    }
}

impl From<Vec<i64>> for Value {
    fn from(v: Vec<i64>) -> Self {
        Value::Ints(v)
    }
}

impl From<Vec<f64>> for Value {
    fn from(v: Vec<f64>) -> Self {
        Value::Floats(v)
    }
}

impl From<Vec<Duration>> for Value {
    fn from(v: Vec<Duration>) -> Self {
        Value::Durations(v)
    }
}

/// Rust types that can be read back out of a resolved [`Value`].
///
/// Backs the typed accessors on [`AppConfig`](crate::AppConfig): the
/// declared [`FieldType`] of the field must equal `FIELD_TYPE`.
pub trait FromValue: Sized {
    const FIELD_TYPE: FieldType;

    fn from_value(value: Value) -> Option<Self>;
}

macro_rules! from_value {
    ($ty:ty, $field_type:ident) => {
        impl FromValue for $ty {
            const FIELD_TYPE: FieldType = FieldType::$field_type;

            fn from_value(value: Value) -> Option<Self> {
                match value {
                    Value::$field_type(inner) => Some(inner),
                    _ => None,
                }
            }
        }
    };
}

from_value!(String, String);
from_value!(bool, Bool);
from_value!(i64, Int);
from_value!(f64, Float);
from_value!(Duration, Duration);
from_value!(Vec<String>, Strings);
from_value!(Vec<bool>, Bools);
from_value!(Vec<i64>, Ints);
from_value!(Vec<f64>, Floats);
from_value!(Vec<Duration>, Durations);

/// An untyped candidate value as reported by a [`ValueSource`](crate::ValueSource).
///
/// Environment variables and flags only ever produce `Text`; structured
/// sources such as TOML files report native scalars and lists.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Text(String),
    Bool(bool),
    Int(i64),
    Float(f64),
    List(Vec<RawValue>),
}

impl RawValue {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            RawValue::Text(_) => "text",
            RawValue::Bool(_) => "bool",
            RawValue::Int(_) => "int",
            RawValue::Float(_) => "float",
            RawValue::List(_) => "list",
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Text(s) => f.write_str(s),
            RawValue::Bool(b) => write!(f, "{b}"),
            RawValue::Int(i) => write!(f, "{i}"),
            RawValue::Float(x) => write!(f, "{x}"),
            RawValue::List(items) => {
                let parts: Vec<String> = items.iter().map(ToString::to_string).collect();
                f.write_str(&parts.join(","))
            }
        }
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        RawValue::Text(s)
    }
}

impl From<bool> for RawValue {
    fn from(b: bool) -> Self {
        RawValue::Bool(b)
    }
}

impl From<i64> for RawValue {
    fn from(i: i64) -> Self {
        RawValue::Int(i)
    }
}

impl From<f64> for RawValue {
    fn from(x: f64) -> Self {
        RawValue::Float(x)
    }
}

impl From<Value> for RawValue {
    fn from(value: Value) -> Self {
        fn list<T>(items: Vec<T>, each: fn(T) -> RawValue) -> RawValue {
            RawValue::List(items.into_iter().map(each).collect())
        }
        match value {
            Value::String(s) => RawValue::Text(s),
            Value::Bool(b) => RawValue::Bool(b),
            Value::Int(i) => RawValue::Int(i),
            Value::Float(x) => RawValue::Float(x),
            Value::Duration(d) => RawValue::Text(format_duration(d)),
            Value::Strings(v) => list(v, RawValue::Text),
            Value::Bools(v) => list(v, RawValue::Bool),
            Value::Ints(v) => list(v, RawValue::Int),
            Value::Floats(v) => list(v, RawValue::Float),
            Value::Durations(v) => list(v, |d| RawValue::Text(format_duration(d))),
        }
    }
}

/// Where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// Nothing supplied a value; the type's zero value was stored.
    Zero,
    Default,
    Generated,
    /// Reported by the named value source.
    Source(String),
    /// Set after registration through [`AppConfig::set_override`](crate::AppConfig::set_override).
    Override,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Zero => f.write_str("unset"),
            Origin::Default => f.write_str("default"),
            Origin::Generated => f.write_str("generated"),
            Origin::Source(name) => f.write_str(name),
            Origin::Override => f.write_str("override"),
        }
    }
}
