//! Array, tuple, record and set schemas.
//!
//! All four verify their base structural type before descending, validate
//! children with index- or key-prefixed paths, and rebuild a fresh output
//! collection preserving order. Arrays check their optional length bounds
//! before any per-element work so oversized inputs fail cheaply.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::ParseConfig;
use crate::dataset::Dataset;
use crate::issue::{IssueKind, PathSegment};
use crate::object::type_issue;
use crate::schema::{issue_for, Schema, SchemaNode};
use crate::value::Value;

/// An array of `item`.
pub fn array(item: Schema) -> Schema {
    Schema::from_node(SchemaNode::Array {
        item: Arc::new(item),
        min: None,
        max: None,
    })
}

/// An array of `item` with length bounds checked before any per-element
/// validation.
pub fn bounded_array(item: Schema, min: Option<usize>, max: Option<usize>) -> Schema {
    Schema::from_node(SchemaNode::Array {
        item: Arc::new(item),
        min,
        max,
    })
}

/// A fixed-arity tuple with one schema per position. Without a rest
/// schema the input length must match exactly.
pub fn tuple(items: Vec<Schema>) -> Schema {
    Schema::from_node(SchemaNode::Tuple {
        items: items.into_iter().map(Arc::new).collect(),
        rest: None,
    })
}

/// A tuple with a trailing rest schema validating every index past the
/// fixed positions.
pub fn tuple_with_rest(items: Vec<Schema>, rest: Schema) -> Schema {
    Schema::from_node(SchemaNode::Tuple {
        items: items.into_iter().map(Arc::new).collect(),
        rest: Some(Arc::new(rest)),
    })
}

/// An open key set with a uniform value schema.
pub fn record(value: Schema) -> Schema {
    Schema::from_node(SchemaNode::Record {
        key: None,
        value: Arc::new(value),
    })
}

/// A record whose keys are validated (and possibly coerced) by `key`.
pub fn record_with_key(key: Schema, value: Schema) -> Schema {
    Schema::from_node(SchemaNode::Record {
        key: Some(Arc::new(key)),
        value: Arc::new(value),
    })
}

/// A set of `item`, membership order preserved.
pub fn set(item: Schema) -> Schema {
    Schema::from_node(SchemaNode::Set {
        item: Arc::new(item),
    })
}

pub(crate) fn run_array(
    schema: &Schema,
    item: &Schema,
    min: Option<usize>,
    max: Option<usize>,
    dataset: &mut Dataset,
    config: &ParseConfig,
) {
    let Value::Array(_) = &dataset.value else {
        let issue = type_issue(schema, &dataset.value, config);
        dataset.fail(issue);
        return;
    };
    let len = dataset.value.length().unwrap_or(0);

    // Length bounds come first: failing them skips the per-element work
    // entirely, which keeps huge invalid inputs cheap.
    let bound_issue = match (min, max) {
        (Some(min), _) if len < min => Some((format!(">={min}"), len)),
        (_, Some(max)) if len > max => Some((format!("<={max}"), len)),
        _ => None,
    };
    if let Some((expects, len)) = bound_issue {
        let issue = issue_for(
            schema,
            IssueKind::Validation,
            "array",
            expects,
            Some(len.to_string()),
            config,
        );
        if config.abort_early {
            dataset.fail(issue);
        } else {
            dataset.flag(issue);
        }
        return;
    }

    let Value::Array(input) = std::mem::replace(&mut dataset.value, Value::Undefined) else {
        unreachable!()
    };
    let mut output = Vec::with_capacity(input.len());
    for (index, value) in input.into_iter().enumerate() {
        if config.abort_early && dataset.has_issues() {
            break;
        }
        let mut child = Dataset::unknown(value);
        item.run(&mut child, config);
        output.push(dataset.merge_child(child, Some(PathSegment::Index(index))));
    }
    dataset.conclude(Value::Array(output));
}

pub(crate) fn run_tuple(
    schema: &Schema,
    items: &[Arc<Schema>],
    rest: Option<&Arc<Schema>>,
    dataset: &mut Dataset,
    config: &ParseConfig,
) {
    let Value::Array(input) = &dataset.value else {
        let issue = type_issue(schema, &dataset.value, config);
        dataset.fail(issue);
        return;
    };

    let arity_ok = match rest {
        Some(_) => input.len() >= items.len(),
        None => input.len() == items.len(),
    };
    if !arity_ok {
        let expects = match rest {
            Some(_) => format!("Array of length >={}", items.len()),
            None => format!("Array of length {}", items.len()),
        };
        let issue = issue_for(
            schema,
            IssueKind::Schema,
            "tuple",
            expects,
            Some(format!("Array of length {}", input.len())),
            config,
        );
        dataset.fail(issue);
        return;
    }

    let Value::Array(input) = std::mem::replace(&mut dataset.value, Value::Undefined) else {
        unreachable!()
    };
    let mut output = Vec::with_capacity(input.len());
    for (index, value) in input.into_iter().enumerate() {
        if config.abort_early && dataset.has_issues() {
            break;
        }
        let position = items.get(index).or(rest);
        let Some(position) = position else {
            unreachable!()
        };
        let mut child = Dataset::unknown(value);
        position.run(&mut child, config);
        output.push(dataset.merge_child(child, Some(PathSegment::Index(index))));
    }
    dataset.conclude(Value::Array(output));
}

pub(crate) fn run_record(
    schema: &Schema,
    key_schema: Option<&Arc<Schema>>,
    value_schema: &Schema,
    dataset: &mut Dataset,
    config: &ParseConfig,
) {
    if !matches!(dataset.value, Value::Object(_)) {
        let issue = type_issue(schema, &dataset.value, config);
        dataset.fail(issue);
        return;
    }
    let Value::Object(input) = std::mem::replace(&mut dataset.value, Value::Undefined) else {
        unreachable!()
    };

    let mut output = BTreeMap::new();
    for (key, value) in input {
        if config.abort_early && dataset.has_issues() {
            break;
        }

        // Key validation may coerce, which re-keys the output entry.
        let mut final_key = key.clone();
        if let Some(key_schema) = key_schema {
            let mut child = Dataset::unknown(Value::String(key.clone()));
            key_schema.run(&mut child, config);
            if child.has_issues() {
                dataset.merge_child(child, Some(PathSegment::Key(key.clone())));
                continue;
            }
            match child.value {
                Value::String(coerced) => final_key = coerced,
                other => {
                    let issue = issue_for(
                        schema,
                        IssueKind::Schema,
                        "record",
                        "string key",
                        Some(other.received()),
                        config,
                    )
                    .prefixed(PathSegment::Key(key.clone()));
                    dataset.fail(issue);
                    continue;
                }
            }
        }

        let mut child = Dataset::unknown(value);
        value_schema.run(&mut child, config);
        let value = dataset.merge_child(child, Some(PathSegment::Key(key)));
        output.insert(final_key, value);
    }
    dataset.conclude(Value::Object(output));
}

pub(crate) fn run_set(
    schema: &Schema,
    item: &Schema,
    dataset: &mut Dataset,
    config: &ParseConfig,
) {
    if !matches!(dataset.value, Value::Set(_)) {
        let issue = type_issue(schema, &dataset.value, config);
        dataset.fail(issue);
        return;
    }
    let Value::Set(input) = std::mem::replace(&mut dataset.value, Value::Undefined) else {
        unreachable!()
    };
    let mut output = Vec::with_capacity(input.len());
    for (index, value) in input.into_iter().enumerate() {
        if config.abort_early && dataset.has_issues() {
            break;
        }
        let mut child = Dataset::unknown(value);
        item.run(&mut child, config);
        output.push(dataset.merge_child(child, Some(PathSegment::Index(index))));
    }
    dataset.conclude(Value::Set(output));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coerce::coerce_number;
    use crate::dataset::Status;
    use crate::primitive::{number, string};

    fn run(schema: &Schema, value: Value) -> Dataset {
        let mut ds = Dataset::unknown(value);
        schema.run(&mut ds, &ParseConfig::default());
        ds
    }

    #[test]
    fn array_preserves_order() {
        let schema = array(coerce_number());
        let ds = run(
            &schema,
            Value::Array(vec![Value::from("1"), Value::from(2), Value::from("3")]),
        );
        assert_eq!(ds.status, Status::Success);
        assert_eq!(
            ds.value,
            Value::Array(vec![
                Value::Number(1.0),
                Value::Number(2.0),
                Value::Number(3.0)
            ])
        );
    }

    #[test]
    fn array_prefixes_index() {
        let schema = array(number());
        let ds = run(
            &schema,
            Value::Array(vec![Value::from(1), Value::from("x"), Value::from(3)]),
        );
        assert_eq!(ds.issues().len(), 1);
        assert_eq!(ds.issues()[0].path_string(), "1");
    }

    #[test]
    fn array_bounds_skip_element_work() {
        let schema = bounded_array(number(), Some(3), None);
        let ds = run(&schema, Value::Array(vec![Value::from("x")]));
        // One length issue only; the invalid element was never visited.
        assert_eq!(ds.issues().len(), 1);
        assert_eq!(ds.issues()[0].node, "array");
        assert_eq!(ds.issues()[0].expects, ">=3");
    }

    #[test]
    fn tuple_exact_arity_without_rest() {
        let schema = tuple(vec![string(), number()]);
        let ds = run(&schema, Value::Array(vec![Value::from("a"), Value::from(1)]));
        assert_eq!(ds.status, Status::Success);

        let ds = run(
            &schema,
            Value::Array(vec![Value::from("a"), Value::from(1), Value::from(2)]),
        );
        assert_eq!(ds.status, Status::Failure);
        assert_eq!(ds.issues()[0].expects, "Array of length 2");
    }

    #[test]
    fn tuple_rest_covers_tail() {
        let schema = tuple_with_rest(vec![string()], number());
        let ds = run(
            &schema,
            Value::Array(vec![Value::from("a"), Value::from(1), Value::from("no")]),
        );
        assert_eq!(ds.status, Status::Failure);
        assert_eq!(ds.issues()[0].path_string(), "2");
    }

    #[test]
    fn record_validates_values_per_key() {
        let schema = record(number());
        let mut input = BTreeMap::new();
        input.insert("a".to_string(), Value::from(1));
        input.insert("b".to_string(), Value::from("x"));
        let ds = run(&schema, Value::Object(input));
        assert_eq!(ds.status, Status::Failure);
        assert_eq!(ds.issues()[0].path_string(), "b");
    }

    #[test]
    fn record_key_schema_rejects_bad_keys() {
        let schema = record_with_key(
            crate::constraint::min_length(string(), 2),
            number(),
        );
        let mut input = BTreeMap::new();
        input.insert("a".to_string(), Value::from(1));
        let ds = run(&schema, Value::Object(input));
        assert_eq!(ds.issues()[0].path_string(), "a");
        assert_eq!(ds.issues()[0].node, "min_length");
    }

    #[test]
    fn set_mirrors_array() {
        let schema = set(number());
        let ds = run(&schema, Value::Set(vec![Value::from(1), Value::from("x")]));
        assert_eq!(ds.status, Status::Failure);
        assert_eq!(ds.issues()[0].path_string(), "1");

        let ds = run(&schema, Value::Array(vec![]));
        assert_eq!(ds.issues()[0].expects, "Set");
    }
}
