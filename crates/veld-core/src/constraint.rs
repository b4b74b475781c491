//! Constraint combinators layered over a base schema.
//!
//! A constraint runs its base schema first. A base that failed its type
//! check propagates unchanged; constraints never run against an invalid
//! value. On a typed value the check applies: a failing check appends one
//! validation-kind issue and leaves the dataset Partial so the rest of the
//! chain still runs. Two things cut the chain short: a `refine` built with
//! `abort`, and `abort_early` on the call config. Both set Failure so
//! every outer constraint propagates without re-checking.
//!
//! `overwrite` is the one check that rewrites instead of judging: a pure
//! post-success value transform that cannot fail.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use regex::Regex;

use crate::config::ParseConfig;
use crate::dataset::{Dataset, Status};
use crate::issue::IssueKind;
use crate::schema::{issue_for, Schema, SchemaNode};
use crate::value::Value;

/// A user-supplied refinement predicate.
#[derive(Clone)]
pub struct Predicate(Arc<dyn Fn(&Value) -> bool + Send + Sync>);

impl Predicate {
    pub fn new(f: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        Predicate(Arc::new(f))
    }

    pub fn test(&self, value: &Value) -> bool {
        (self.0)(value)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Predicate").field(&"<fn>").finish()
    }
}

/// A pure value rewrite applied after a successful base run.
#[derive(Clone)]
pub struct Rewrite(Arc<dyn Fn(Value) -> Value + Send + Sync>);

impl Rewrite {
    pub fn new(f: impl Fn(Value) -> Value + Send + Sync + 'static) -> Self {
        Rewrite(Arc::new(f))
    }

    pub fn apply(&self, value: Value) -> Value {
        (self.0)(value)
    }
}

impl fmt::Debug for Rewrite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Rewrite").field(&"<fn>").finish()
    }
}

/// The closed set of constraint checks.
#[derive(Debug, Clone)]
pub enum Check {
    MinLength(usize),
    MaxLength(usize),
    Length(usize),
    MinValue(Value),
    MaxValue(Value),
    Pattern(Regex),
    Includes(String),
    StartsWith(String),
    EndsWith(String),
    Lowercase,
    Uppercase,
    Refine { pred: Predicate, abort: bool },
    Overwrite(Rewrite),
}

impl Check {
    pub(crate) fn node_type(&self) -> &'static str {
        match self {
            Check::MinLength(_) => "min_length",
            Check::MaxLength(_) => "max_length",
            Check::Length(_) => "length",
            Check::MinValue(_) => "min_value",
            Check::MaxValue(_) => "max_value",
            Check::Pattern(_) => "pattern",
            Check::Includes(_) => "includes",
            Check::StartsWith(_) => "starts_with",
            Check::EndsWith(_) => "ends_with",
            Check::Lowercase => "lowercase",
            Check::Uppercase => "uppercase",
            Check::Refine { .. } => "refine",
            Check::Overwrite(_) => "overwrite",
        }
    }
}

pub(crate) enum CheckOutcome {
    Pass,
    Rewritten(Value),
    Fail {
        expects: String,
        received: Option<String>,
    },
}

fn check_length(value: &Value, expects: String, ok: impl Fn(usize) -> bool) -> CheckOutcome {
    match value.length() {
        Some(len) if ok(len) => CheckOutcome::Pass,
        Some(len) => CheckOutcome::Fail {
            expects,
            received: Some(len.to_string()),
        },
        None => CheckOutcome::Fail {
            expects,
            received: Some(value.received()),
        },
    }
}

/// Same-variant ordering for value bounds; cross-variant comparisons have
/// no defined order and fail the constraint.
fn compare(value: &Value, bound: &Value) -> Option<Ordering> {
    match (value, bound) {
        (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
        (Value::BigInt(a), Value::BigInt(b)) => Some(a.cmp(b)),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn check_bound(
    value: &Value,
    bound: &Value,
    expects: String,
    ok: impl Fn(Ordering) -> bool,
) -> CheckOutcome {
    match compare(value, bound) {
        Some(ordering) if ok(ordering) => CheckOutcome::Pass,
        _ => CheckOutcome::Fail {
            expects,
            received: Some(value.received()),
        },
    }
}

fn check_string(value: &Value, expects: String, ok: impl Fn(&str) -> bool) -> CheckOutcome {
    match value {
        Value::String(s) if ok(s) => CheckOutcome::Pass,
        _ => CheckOutcome::Fail {
            expects,
            received: Some(value.received()),
        },
    }
}

impl Check {
    pub(crate) fn apply(&self, value: &Value) -> CheckOutcome {
        match self {
            Check::MinLength(n) => check_length(value, format!(">={n}"), |len| len >= *n),
            Check::MaxLength(n) => check_length(value, format!("<={n}"), |len| len <= *n),
            Check::Length(n) => check_length(value, n.to_string(), |len| len == *n),
            Check::MinValue(bound) => check_bound(value, bound, format!(">={}", bound.received()), |o| {
                o != Ordering::Less
            }),
            Check::MaxValue(bound) => check_bound(value, bound, format!("<={}", bound.received()), |o| {
                o != Ordering::Greater
            }),
            Check::Pattern(re) => {
                check_string(value, format!("/{}/", re.as_str()), |s| re.is_match(s))
            }
            Check::Includes(sub) => {
                check_string(value, format!("\"{sub}\""), |s| s.contains(sub.as_str()))
            }
            Check::StartsWith(prefix) => check_string(value, format!("\"{prefix}\""), |s| {
                s.starts_with(prefix.as_str())
            }),
            Check::EndsWith(suffix) => check_string(value, format!("\"{suffix}\""), |s| {
                s.ends_with(suffix.as_str())
            }),
            Check::Lowercase => check_string(value, "lowercase".to_string(), |s| {
                s == s.to_lowercase()
            }),
            Check::Uppercase => check_string(value, "uppercase".to_string(), |s| {
                s == s.to_uppercase()
            }),
            Check::Refine { pred, .. } => {
                if pred.test(value) {
                    CheckOutcome::Pass
                } else {
                    CheckOutcome::Fail {
                        expects: String::new(),
                        received: Some(value.received()),
                    }
                }
            }
            Check::Overwrite(rewrite) => CheckOutcome::Rewritten(rewrite.apply(value.clone())),
        }
    }
}

fn constrain(base: Schema, check: Check) -> Schema {
    Schema::from_node(SchemaNode::Constraint {
        base: Arc::new(base),
        check,
    })
}

/// Require at least `n` elements (string chars, array/set items, map/object
/// entries).
pub fn min_length(base: Schema, n: usize) -> Schema {
    constrain(base, Check::MinLength(n))
}

/// Require at most `n` elements.
pub fn max_length(base: Schema, n: usize) -> Schema {
    constrain(base, Check::MaxLength(n))
}

/// Require exactly `n` elements.
pub fn length(base: Schema, n: usize) -> Schema {
    constrain(base, Check::Length(n))
}

/// Require the value to be at least `bound` (same-variant comparison).
pub fn min_value(base: Schema, bound: impl Into<Value>) -> Schema {
    constrain(base, Check::MinValue(bound.into()))
}

/// Require the value to be at most `bound`.
pub fn max_value(base: Schema, bound: impl Into<Value>) -> Schema {
    constrain(base, Check::MaxValue(bound.into()))
}

/// Require a string matching the regex.
pub fn pattern(base: Schema, re: Regex) -> Schema {
    constrain(base, Check::Pattern(re))
}

/// Require a string containing `sub`.
pub fn includes(base: Schema, sub: impl Into<String>) -> Schema {
    constrain(base, Check::Includes(sub.into()))
}

/// Require a string starting with `prefix`.
pub fn starts_with(base: Schema, prefix: impl Into<String>) -> Schema {
    constrain(base, Check::StartsWith(prefix.into()))
}

/// Require a string ending with `suffix`.
pub fn ends_with(base: Schema, suffix: impl Into<String>) -> Schema {
    constrain(base, Check::EndsWith(suffix.into()))
}

/// Require an all-lowercase string.
pub fn lowercase(base: Schema) -> Schema {
    constrain(base, Check::Lowercase)
}

/// Require an all-uppercase string.
pub fn uppercase(base: Schema) -> Schema {
    constrain(base, Check::Uppercase)
}

/// Attach a refinement predicate. A failing predicate records one
/// validation issue and leaves the rest of the chain running.
pub fn refine(base: Schema, pred: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Schema {
    constrain(
        base,
        Check::Refine {
            pred: Predicate::new(pred),
            abort: false,
        },
    )
}

/// Like [`refine`], but a failure short-circuits the remaining refinement
/// chain for this schema (independent of `abort_early`).
pub fn refine_abort(base: Schema, pred: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Schema {
    constrain(
        base,
        Check::Refine {
            pred: Predicate::new(pred),
            abort: true,
        },
    )
}

/// Apply a pure value transform after a successful base run. Cannot fail.
pub fn overwrite(base: Schema, f: impl Fn(Value) -> Value + Send + Sync + 'static) -> Schema {
    constrain(base, Check::Overwrite(Rewrite::new(f)))
}

pub(crate) fn run_constraint(
    schema: &Schema,
    base: &Schema,
    check: &Check,
    dataset: &mut Dataset,
    config: &ParseConfig,
) {
    base.run(dataset, config);
    if dataset.status == Status::Failure {
        return;
    }
    match check.apply(&dataset.value) {
        CheckOutcome::Pass => {}
        CheckOutcome::Rewritten(value) => dataset.value = value,
        CheckOutcome::Fail { expects, received } => {
            let issue = issue_for(
                schema,
                IssueKind::Validation,
                check.node_type(),
                expects,
                received,
                config,
            );
            let aborts = config.abort_early || matches!(check, Check::Refine { abort: true, .. });
            if aborts {
                dataset.fail(issue);
            } else {
                dataset.flag(issue);
            }
        }
    }
}
