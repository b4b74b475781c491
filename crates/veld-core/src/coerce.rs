//! Coercion layer: best-effort conversion before the primitive check.
//!
//! One `coerce_*` variant exists per ambiguous primitive. Conversion is
//! skipped when the raw input already satisfies the target type, and a
//! failed conversion is reported as a schema-kind issue at this boundary;
//! coercion never panics out of the validator.
//!
//! The conversion grammars are deliberately narrower than source-language
//! truthiness where the looser rule would be lossy (see the boolean and
//! number policies); the bigint policy follows the source exactly,
//! including the display-string fallback for composite inputs.

use chrono::{DateTime, NaiveDate, Utc};

use crate::config::ParseConfig;
use crate::dataset::{Dataset, Status};
use crate::issue::IssueKind;
use crate::schema::{issue_for, CoerceTarget, Schema, SchemaNode};
use crate::value::{fmt_number, Value};

/// Coerces common alternate representations to a string.
pub fn coerce_string() -> Schema {
    Schema::from_node(SchemaNode::Coerce(CoerceTarget::String))
}

/// Coerces common alternate representations to a number.
pub fn coerce_number() -> Schema {
    Schema::from_node(SchemaNode::Coerce(CoerceTarget::Number))
}

/// Coerces `"true"/"false"/"1"/"0"` strings and `0`/`1` numbers to a
/// boolean.
pub fn coerce_boolean() -> Schema {
    Schema::from_node(SchemaNode::Coerce(CoerceTarget::Boolean))
}

/// Coerces numbers, numeric strings and booleans to a bigint. `null` and
/// `undefined` are rejected outright; any other value converts via its
/// display string before integer parsing.
pub fn coerce_bigint() -> Schema {
    Schema::from_node(SchemaNode::Coerce(CoerceTarget::BigInt))
}

/// Coerces epoch-millisecond numbers and RFC 3339 / `YYYY-MM-DD` strings
/// to a date.
pub fn coerce_date() -> Schema {
    Schema::from_node(SchemaNode::Coerce(CoerceTarget::Date))
}

pub(crate) fn run_coerce(
    schema: &Schema,
    target: CoerceTarget,
    dataset: &mut Dataset,
    config: &ParseConfig,
) {
    let converted = convert(target, &dataset.value);
    match converted {
        Some(value) => {
            dataset.value = value;
            dataset.status = Status::Success;
        }
        None => {
            let issue = issue_for(
                schema,
                IssueKind::Schema,
                schema.node_type(),
                schema.expects(),
                Some(dataset.value.received()),
                config,
            );
            dataset.fail(issue);
        }
    }
}

/// Attempt conversion; `None` means not coercible. Inputs already of the
/// target type pass through untouched.
fn convert(target: CoerceTarget, value: &Value) -> Option<Value> {
    match target {
        CoerceTarget::String => to_string(value),
        CoerceTarget::Number => to_number(value),
        CoerceTarget::Boolean => to_boolean(value),
        CoerceTarget::BigInt => to_bigint(value),
        CoerceTarget::Date => to_date(value),
    }
}

fn to_string(value: &Value) -> Option<Value> {
    match value {
        Value::String(_) => Some(value.clone()),
        Value::Number(n) => Some(Value::String(fmt_number(*n))),
        Value::BigInt(i) => Some(Value::String(i.to_string())),
        Value::Bool(b) => Some(Value::String(b.to_string())),
        Value::Date(d) => Some(Value::String(d.to_rfc3339())),
        Value::Symbol(name) => Some(Value::String(format!("Symbol({name})"))),
        _ => None,
    }
}

fn to_number(value: &Value) -> Option<Value> {
    match value {
        Value::Number(_) => Some(value.clone()),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok().map(Value::Number)
        }
        Value::Bool(b) => Some(Value::Number(if *b { 1.0 } else { 0.0 })),
        Value::BigInt(i) => Some(Value::Number(*i as f64)),
        Value::Date(d) => Some(Value::Number(d.timestamp_millis() as f64)),
        _ => None,
    }
}

fn to_boolean(value: &Value) -> Option<Value> {
    match value {
        Value::Bool(_) => Some(value.clone()),
        Value::String(s) => match s.as_str() {
            "true" | "1" => Some(Value::Bool(true)),
            "false" | "0" => Some(Value::Bool(false)),
            _ => None,
        },
        Value::Number(n) if *n == 1.0 => Some(Value::Bool(true)),
        Value::Number(n) if *n == 0.0 => Some(Value::Bool(false)),
        _ => None,
    }
}

fn to_bigint(value: &Value) -> Option<Value> {
    match value {
        Value::BigInt(_) => Some(value.clone()),
        Value::Number(n) => {
            if n.is_finite() && n.fract() == 0.0 && n.abs() < i128::MAX as f64 {
                Some(Value::BigInt(*n as i128))
            } else {
                None
            }
        }
        Value::String(s) => parse_bigint(s),
        Value::Bool(b) => Some(Value::BigInt(i128::from(*b))),
        // Rejected outright: not coercible even via display strings.
        Value::Null | Value::Undefined => None,
        // Everything else converts via its display string before the
        // integer parse; a failing parse is the conversion error caught
        // at this boundary.
        other => parse_bigint(&other.display_string()),
    }
}

fn parse_bigint(s: &str) -> Option<Value> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<i128>().ok().map(Value::BigInt)
}

fn to_date(value: &Value) -> Option<Value> {
    match value {
        Value::Date(_) => Some(value.clone()),
        Value::Number(n) => {
            if !n.is_finite() || n.fract() != 0.0 {
                return None;
            }
            DateTime::<Utc>::from_timestamp_millis(*n as i64).map(Value::Date)
        }
        Value::BigInt(i) => i64::try_from(*i)
            .ok()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(Value::Date),
        Value::String(s) => parse_date(s),
        _ => None,
    }
}

fn parse_date(s: &str) -> Option<Value> {
    let trimmed = s.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(Value::Date(parsed.with_timezone(&Utc)));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| Value::Date(DateTime::from_naive_utc_and_offset(dt, Utc)))
}
