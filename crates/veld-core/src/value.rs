//! Dynamic value model validated by the engine.
//!
//! [`Value`] is a closed algebraic representation of the runtime values a
//! schema can receive: the JSON scalars plus the richer shapes the source
//! data model carries (undefined, bigint, dates, symbols, maps with
//! arbitrary keys, sets). Collections preserve insertion/membership order
//! where the semantics require it; `Map` entries sit behind an `Arc` so the
//! copy-on-write discipline of map validation is observable through pointer
//! identity.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

/// A dynamic runtime value.
///
/// `PartialEq` is structural; `Map` compares entry lists in order. Floats
/// follow IEEE equality (`NaN != NaN`), which is also what strict literal
/// matching wants.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    BigInt(i128),
    String(String),
    Date(DateTime<Utc>),
    Symbol(String),
    Array(Vec<Value>),
    Object(BTreeMap<String, Value>),
    /// Ordered entries with arbitrary keys. Kept behind `Arc` so a
    /// validation pass that coerces nothing can hand back the original
    /// allocation.
    Map(Arc<Vec<(Value, Value)>>),
    /// Ordered membership.
    Set(Vec<Value>),
}

impl Value {
    /// The type tag reported in issues (`received`-style), matching the
    /// source data model's vocabulary.
    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::BigInt(_) => "bigint",
            Value::String(_) => "string",
            Value::Date(_) => "Date",
            Value::Symbol(_) => "symbol",
            Value::Array(_) => "Array",
            Value::Object(_) => "Object",
            Value::Map(_) => "Map",
            Value::Set(_) => "Set",
        }
    }

    /// A short rendering of the actual value for issue `received` fields:
    /// scalars print their literal form, composites just their tag.
    pub fn received(&self) -> String {
        match self {
            Value::Undefined => "undefined".to_string(),
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => fmt_number(*n),
            Value::BigInt(i) => i.to_string(),
            Value::String(s) => format!("\"{s}\""),
            Value::Date(_) => "Date".to_string(),
            Value::Symbol(_) => "symbol".to_string(),
            Value::Array(_) => "Array".to_string(),
            Value::Object(_) => "Object".to_string(),
            Value::Map(_) => "Map".to_string(),
            Value::Set(_) => "Set".to_string(),
        }
    }

    /// Plain display form used by string/bigint coercion. Unlike
    /// [`Value::received`], strings are unquoted.
    pub fn display_string(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Date(d) => d.to_rfc3339(),
            Value::Symbol(name) => format!("Symbol({name})"),
            Value::Array(items) => items
                .iter()
                .map(Value::display_string)
                .collect::<Vec<_>>()
                .join(","),
            other => other.received(),
        }
    }

    /// Number of elements for length-constrained shapes, `None` when the
    /// value has no length.
    pub fn length(&self) -> Option<usize> {
        match self {
            Value::String(s) => Some(s.chars().count()),
            Value::Array(items) => Some(items.len()),
            Value::Set(items) => Some(items.len()),
            Value::Map(entries) => Some(entries.len()),
            Value::Object(map) => Some(map.len()),
            _ => None,
        }
    }

    /// Convert to a `serde_json::Value` where a faithful mapping exists.
    ///
    /// `Undefined`, symbols, maps and sets have no JSON form and return
    /// `None`, as do non-finite numbers. Bigints become JSON integers when
    /// they fit in `i64`; dates serialize as RFC 3339 strings.
    pub fn to_json(&self) -> Option<serde_json::Value> {
        match self {
            Value::Null => Some(serde_json::Value::Null),
            Value::Bool(b) => Some(serde_json::Value::Bool(*b)),
            Value::Number(n) => {
                // Integral values go back as JSON integers, mirroring
                // fmt_number, so json!(1) survives a round trip.
                if n.is_finite() && n.fract() == 0.0 && *n >= i64::MIN as f64 && *n < i64::MAX as f64
                {
                    Some(serde_json::Value::Number(serde_json::Number::from(*n as i64)))
                } else {
                    serde_json::Number::from_f64(*n).map(serde_json::Value::Number)
                }
            }
            Value::BigInt(i) => i64::try_from(*i)
                .ok()
                .map(|i| serde_json::Value::Number(serde_json::Number::from(i))),
            Value::String(s) => Some(serde_json::Value::String(s.clone())),
            Value::Date(d) => Some(serde_json::Value::String(d.to_rfc3339())),
            Value::Array(items) => items
                .iter()
                .map(Value::to_json)
                .collect::<Option<Vec<_>>>()
                .map(serde_json::Value::Array),
            Value::Object(map) => {
                let mut out = serde_json::Map::new();
                for (k, v) in map {
                    out.insert(k.clone(), v.to_json()?);
                }
                Some(serde_json::Value::Object(out))
            }
            Value::Undefined | Value::Symbol(_) | Value::Map(_) | Value::Set(_) => None,
        }
    }
}

/// Format a float the way the source language prints numbers: integral
/// values drop the fraction.
pub(crate) fn fmt_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
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

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i128> for Value {
    fn from(n: i128) -> Self {
        Value::BigInt(n)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(d: DateTime<Utc>) -> Self {
        Value::Date(d)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn type_tags() {
        assert_eq!(Value::Undefined.type_of(), "undefined");
        assert_eq!(Value::from("x").type_of(), "string");
        assert_eq!(Value::Map(Arc::new(vec![])).type_of(), "Map");
    }

    #[test]
    fn received_renders_scalars_literally() {
        assert_eq!(Value::from("abc").received(), "\"abc\"");
        assert_eq!(Value::from(42).received(), "42");
        assert_eq!(Value::from(1.5).received(), "1.5");
        assert_eq!(Value::Array(vec![]).received(), "Array");
    }

    #[test]
    fn json_round_trip() {
        let original = json!({"a": [1, "two", true, null], "b": {"c": 2.5}});
        let value = Value::from(original.clone());
        assert_eq!(value.to_json(), Some(original));
    }

    #[test]
    fn json_integers_stay_integers() {
        assert_eq!(Value::Number(1.0).to_json(), Some(json!(1)));
        assert_eq!(Value::Number(-7.0).to_json(), Some(json!(-7)));
        assert_eq!(Value::Number(2.5).to_json(), Some(json!(2.5)));
        assert_eq!(Value::from(json!(1)).to_json(), Some(json!(1)));
    }

    #[test]
    fn json_rejects_unrepresentable() {
        assert_eq!(Value::Undefined.to_json(), None);
        assert_eq!(Value::Number(f64::NAN).to_json(), None);
        assert_eq!(Value::Set(vec![]).to_json(), None);
    }

    #[test]
    fn length_of_shapes() {
        assert_eq!(Value::from("héllo").length(), Some(5));
        assert_eq!(Value::Array(vec![Value::Null]).length(), Some(1));
        assert_eq!(Value::Number(3.0).length(), None);
    }
}
