//! Map schemas with copy-on-write output.
//!
//! Each `[key, value]` entry is checked through a compact per-entry signal
//! (valid / coerced / invalid) rather than surfacing a dataset per entry.
//! The output stays the original shared entry list until the first
//! detected coercion; only then is it cloned into an owned copy, so the
//! no-coercion case pays zero extra allocation and hands back the original
//! `Arc`. Key coercion deletes the old key and re-inserts under the new
//! one; when both key and value coerce, the value is attached under the
//! new key directly.
//!
//! Per-entry failures aggregate as `"Key: <msg>"` / `"Value: <msg>"`
//! issues on the map node, since arbitrary map keys have no path segment
//! representation. Refinements registered outside the map run against the
//! final, possibly copied, map.

use std::sync::Arc;

use crate::config::ParseConfig;
use crate::dataset::{Dataset, Status};
use crate::issue::{Issue, IssueKind};
use crate::object::type_issue;
use crate::schema::{Schema, SchemaNode};
use crate::value::Value;

/// A map whose keys and values validate against `key` and `value`.
pub fn map(key: Schema, value: Schema) -> Schema {
    Schema::from_node(SchemaNode::Map {
        key: Arc::new(key),
        value: Arc::new(value),
    })
}

/// Per-entry result used inside map validation to avoid a dataset per
/// entry.
enum Signal {
    /// Valid as-is.
    Valid,
    /// Valid after coercion; replace with this value.
    Coerced(Value),
    /// Invalid; the child's issues.
    Invalid(Vec<Issue>),
}

fn check(schema: &Schema, value: &Value, config: &ParseConfig) -> Signal {
    let mut child = Dataset::unknown(value.clone());
    schema.run(&mut child, config);
    if child.status == Status::Success {
        if child.value == *value {
            Signal::Valid
        } else {
            Signal::Coerced(child.value)
        }
    } else {
        Signal::Invalid(child.into_issues())
    }
}

/// The owned/shared split backing copy-on-write mutation.
enum Entries {
    Shared(Arc<Vec<(Value, Value)>>),
    Owned(Vec<(Value, Value)>),
}

impl Entries {
    fn make_owned(&mut self) -> &mut Vec<(Value, Value)> {
        if let Entries::Shared(shared) = self {
            *self = Entries::Owned(shared.as_ref().clone());
        }
        match self {
            Entries::Owned(owned) => owned,
            Entries::Shared(_) => unreachable!(),
        }
    }

    fn into_value(self) -> Value {
        match self {
            Entries::Shared(shared) => Value::Map(shared),
            Entries::Owned(owned) => Value::Map(Arc::new(owned)),
        }
    }
}

fn remove_key(entries: &mut Vec<(Value, Value)>, key: &Value) {
    entries.retain(|(k, _)| k != key);
}

fn insert(entries: &mut Vec<(Value, Value)>, key: Value, value: Value) {
    if let Some(slot) = entries.iter_mut().find(|(k, _)| *k == key) {
        slot.1 = value;
    } else {
        entries.push((key, value));
    }
}

/// Wrap a child issue into the map-level aggregate form.
fn entry_issue(prefix: &str, issue: Issue) -> Issue {
    Issue {
        message: format!("{prefix}: {}", issue.message),
        path: Vec::new(),
        node: "map",
        ..issue
    }
}

fn absorb(dataset: &mut Dataset, prefix: &str, issues: Vec<Issue>) {
    for issue in issues {
        let wrapped = entry_issue(prefix, issue);
        match wrapped.kind {
            IssueKind::Schema => dataset.fail(wrapped),
            IssueKind::Validation => dataset.flag(wrapped),
        }
    }
}

pub(crate) fn run_map(
    schema: &Schema,
    key_schema: &Schema,
    value_schema: &Schema,
    dataset: &mut Dataset,
    config: &ParseConfig,
) {
    let shared = match &dataset.value {
        Value::Map(entries) => Arc::clone(entries),
        other => {
            let issue = type_issue(schema, other, config);
            dataset.fail(issue);
            return;
        }
    };

    let mut entries = Entries::Shared(Arc::clone(&shared));
    for (key, value) in shared.iter() {
        if config.abort_early && dataset.has_issues() {
            break;
        }

        let key_signal = match check(key_schema, key, config) {
            Signal::Invalid(issues) => {
                absorb(dataset, "Key", issues);
                continue;
            }
            ok => ok,
        };
        let value_signal = match check(value_schema, value, config) {
            Signal::Invalid(issues) => {
                absorb(dataset, "Value", issues);
                continue;
            }
            ok => ok,
        };

        match (key_signal, value_signal) {
            (Signal::Valid, Signal::Valid) => {}
            (Signal::Coerced(new_key), value_signal) => {
                // Old key out, new key in; a coerced value rides along in
                // the same insert rather than a second write.
                let final_value = match value_signal {
                    Signal::Coerced(new_value) => new_value,
                    _ => value.clone(),
                };
                let owned = entries.make_owned();
                remove_key(owned, key);
                insert(owned, new_key, final_value);
            }
            (Signal::Valid, Signal::Coerced(new_value)) => {
                let owned = entries.make_owned();
                insert(owned, key.clone(), new_value);
            }
            // Invalid signals exited above.
            (Signal::Invalid(_), _) | (_, Signal::Invalid(_)) => unreachable!(),
        }
    }

    dataset.conclude(entries.into_value());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coerce::coerce_number;
    use crate::primitive::{number, string};

    fn map_value(entries: Vec<(Value, Value)>) -> Value {
        Value::Map(Arc::new(entries))
    }

    fn run(schema: &Schema, value: Value) -> Dataset {
        let mut ds = Dataset::unknown(value);
        schema.run(&mut ds, &ParseConfig::default());
        ds
    }

    #[test]
    fn untouched_map_keeps_its_allocation() {
        let schema = map(number(), string());
        let input = Arc::new(vec![(Value::from(1), Value::from("one"))]);
        let ds = run(&schema, Value::Map(Arc::clone(&input)));
        assert_eq!(ds.status, Status::Success);
        let Value::Map(output) = ds.value else { panic!() };
        assert!(Arc::ptr_eq(&input, &output));
    }

    #[test]
    fn key_coercion_forces_a_copy_and_rekeys() {
        let schema = map(coerce_number(), string());
        let input = Arc::new(vec![
            (Value::from("1"), Value::from("one")),
            (Value::from(2), Value::from("two")),
        ]);
        let ds = run(&schema, Value::Map(Arc::clone(&input)));
        assert_eq!(ds.status, Status::Success);
        let Value::Map(output) = ds.value else { panic!() };
        assert!(!Arc::ptr_eq(&input, &output));
        assert!(output.contains(&(Value::Number(1.0), Value::from("one"))));
        assert!(!output.iter().any(|(k, _)| *k == Value::from("1")));
    }

    #[test]
    fn both_coerce_writes_once_under_new_key() {
        let schema = map(coerce_number(), coerce_number());
        let input = map_value(vec![(Value::from("1"), Value::from("10"))]);
        let ds = run(&schema, input);
        let Value::Map(output) = ds.value else { panic!() };
        assert_eq!(output.as_ref(), &vec![(Value::Number(1.0), Value::Number(10.0))]);
    }

    #[test]
    fn entry_failures_aggregate_with_prefixes() {
        let schema = map(number(), string());
        let input = map_value(vec![
            (Value::from("bad"), Value::from("ok")),
            (Value::from(1), Value::from(2)),
        ]);
        let ds = run(&schema, input);
        assert_eq!(ds.status, Status::Failure);
        assert!(ds.issues()[0].message.starts_with("Key: "));
        assert!(ds.issues()[1].message.starts_with("Value: "));
    }

    #[test]
    fn non_map_input() {
        let ds = run(&map(number(), string()), Value::from(1));
        assert_eq!(ds.issues()[0].expects, "Map");
    }
}
