//! Coercion of raw source candidates into declared field types.
//!
//! Text is parsed per type: `true`/`false`/`1`/`0`/`t`/`f` for bools, base-10
//! for integers, Go-style unit strings (`1h30m`, `250ms`) for durations.
//! List fields accept either a structured list or comma-separated text;
//! blank text is an empty list. Integers widen to floats; nothing else is
//! converted implicitly.
//!
//! Error reasons never echo the input, so callers can redact sensitive values.

use std::time::Duration;

use crate::types::{FieldType, RawValue, Value};

/// Coerce `raw` to `field_type`, returning a human-readable reason on failure.
pub fn coerce(raw: &RawValue, field_type: FieldType) -> Result<Value, String> {
    match field_type {
        FieldType::String => to_string(raw).map(Value::String),
        FieldType::Bool => to_bool(raw).map(Value::Bool),
        FieldType::Int => to_int(raw).map(Value::Int),
        FieldType::Float => to_float(raw).map(Value::Float),
        FieldType::Duration => to_duration(raw).map(Value::Duration),
        FieldType::Strings => to_list(raw, to_string).map(Value::Strings),
        FieldType::Bools => to_list(raw, to_bool).map(Value::Bools),
        FieldType::Ints => to_list(raw, to_int).map(Value::Ints),
        FieldType::Floats => to_list(raw, to_float).map(Value::Floats),
        FieldType::Durations => to_list(raw, to_duration).map(Value::Durations),
    }
}

fn mismatch(expected: &str, raw: &RawValue) -> String {
    format!("expected {expected}, found {}", raw.kind())
}

fn to_string(raw: &RawValue) -> Result<String, String> {
    match raw {
        RawValue::Text(s) => Ok(s.clone()),
        other => Err(mismatch("a string", other)),
    }
}

fn to_bool(raw: &RawValue) -> Result<bool, String> {
    match raw {
        RawValue::Bool(b) => Ok(*b),
        RawValue::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "t" | "1" => Ok(true),
            "false" | "f" | "0" => Ok(false),
            _ => Err("expected a boolean (true/false)".into()),
        },
        other => Err(mismatch("a boolean", other)),
    }
}

fn to_int(raw: &RawValue) -> Result<i64, String> {
    match raw {
        RawValue::Int(i) => Ok(*i),
        RawValue::Text(s) => s.trim().parse::<i64>().map_err(|e| e.to_string()),
        other => Err(mismatch("an integer", other)),
    }
}

fn to_float(raw: &RawValue) -> Result<f64, String> {
    match raw {
        RawValue::Float(x) => Ok(*x),
        RawValue::Int(i) => Ok(*i as f64),
        RawValue::Text(s) => s.trim().parse::<f64>().map_err(|e| e.to_string()),
        other => Err(mismatch("a float", other)),
    }
}

fn to_duration(raw: &RawValue) -> Result<Duration, String> {
    match raw {
        RawValue::Text(s) => parse_duration(s),
        other => Err(mismatch("a duration string", other)),
    }
}

fn to_list<T>(raw: &RawValue, element: fn(&RawValue) -> Result<T, String>) -> Result<Vec<T>, String> {
    match raw {
        RawValue::List(items) => items.iter().map(element).collect(),
        RawValue::Text(text) if text.trim().is_empty() => Ok(Vec::new()),
        RawValue::Text(text) => text
            .split(',')
            .map(|part| element(&RawValue::Text(part.trim().to_string())))
            .collect(),
        other => Err(mismatch("a list", other)),
    }
}

/// Parse a duration such as `30s`, `1h30m`, `1.5h` or `250ms`.
///
/// Units: `ns`, `us` (or `µs`), `ms`, `s`, `m`, `h`. A bare `0` is accepted.
pub fn parse_duration(text: &str) -> Result<Duration, String> {
    let s = text.trim();
    if s.is_empty() {
        return Err("empty duration".into());
    }
    if s == "0" {
        return Ok(Duration::ZERO);
    }

    let is_number = |c: char| c.is_ascii_digit() || c == '.';
    let mut rest = s;
    let mut nanos = 0f64;

    while !rest.is_empty() {
        let number_end = rest.find(|c: char| !is_number(c)).unwrap_or(rest.len());
        if number_end == 0 {
            return Err("expected a number before each unit".into());
        }
        let number: f64 = rest[..number_end]
            .parse()
            .map_err(|_| "invalid number in duration".to_string())?;
        rest = &rest[number_end..];

        let unit_end = rest.find(is_number).unwrap_or(rest.len());
        let scale = match &rest[..unit_end] {
            "ns" => 1.0,
            "us" | "µs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            "" => return Err("missing unit in duration (e.g. 30s, 5m)".into()),
            unit => return Err(format!("unknown duration unit '{unit}'")),
        };
        nanos += number * scale;
        rest = &rest[unit_end..];
    }

    let nanos = nanos.round();
    if !nanos.is_finite() || nanos >= u64::MAX as f64 {
        return Err("duration out of range".into());
    }
    Ok(Duration::from_nanos(nanos as u64))
}

/// Render a duration with the largest units first, e.g. `1h30m`, `1s500ms`.
pub fn format_duration(d: Duration) -> String {
    if d.is_zero() {
        return "0s".into();
    }
    let total = d.as_nanos();
    let units: [(u128, &str); 6] = [
        (3_600_000_000_000, "h"),
        (60_000_000_000, "m"),
        (1_000_000_000, "s"),
        (1_000_000, "ms"),
        (1_000, "us"),
        (1, "ns"),
    ];

    let mut out = String::new();
    let mut remaining = total;
    for (size, suffix) in units {
        let count = remaining / size;
        if count > 0 {
            out.push_str(&format!("{count}{suffix}"));
            remaining %= size;
        }
    }
    out
}
