//! Union and intersection over sibling schemas.
//!
//! Union tries members in declaration order against a fresh copy of the
//! input; the first full success wins, with no best-match heuristic, so
//! results stay deterministic. Intersection requires every member to
//! succeed independently, then folds the outputs: objects merge
//! structurally with the right-most member winning key collisions,
//! anything else must agree exactly.

use std::sync::Arc;

use crate::config::ParseConfig;
use crate::dataset::{Dataset, Status};
use crate::issue::IssueKind;
use crate::schema::{issue_for, Schema, SchemaNode};
use crate::value::Value;

/// A union of two or more variants, tried in declaration order.
///
/// # Panics
///
/// Panics when fewer than two variants are given: a malformed schema is
/// a programmer error, not a validation failure.
pub fn union_of(variants: Vec<Schema>) -> Schema {
    assert!(
        variants.len() >= 2,
        "union_of requires at least two variants"
    );
    Schema::from_node(SchemaNode::Union {
        variants: variants.into_iter().map(Arc::new).collect(),
    })
}

/// An intersection of two or more members, all of which must accept the
/// input.
///
/// # Panics
///
/// Panics when fewer than two members are given.
pub fn intersection(members: Vec<Schema>) -> Schema {
    assert!(
        members.len() >= 2,
        "intersection requires at least two members"
    );
    Schema::from_node(SchemaNode::Intersection {
        members: members.into_iter().map(Arc::new).collect(),
    })
}

pub(crate) fn run_union(
    schema: &Schema,
    variants: &[Arc<Schema>],
    dataset: &mut Dataset,
    config: &ParseConfig,
) {
    for (index, variant) in variants.iter().enumerate() {
        let mut trial = Dataset::unknown(dataset.value.clone());
        variant.run(&mut trial, config);
        if trial.status == Status::Success {
            tracing::trace!(variant = index, "union matched");
            dataset.value = trial.value;
            dataset.status = Status::Success;
            return;
        }
    }
    // All variants failed: one aggregate issue listing every attempted
    // type, rather than replaying each member's issues.
    let issue = issue_for(
        schema,
        IssueKind::Schema,
        "union",
        schema.expects(),
        Some(dataset.value.received()),
        config,
    );
    dataset.fail(issue);
}

/// Fold two successful member outputs into one. `None` signals a
/// conflict.
fn merge_values(left: Value, right: Value) -> Option<Value> {
    match (left, right) {
        (Value::Object(mut left), Value::Object(right)) => {
            // Right-most member wins key collisions.
            left.extend(right);
            Some(Value::Object(left))
        }
        (left, right) if left == right => Some(left),
        _ => None,
    }
}

pub(crate) fn run_intersection(
    schema: &Schema,
    members: &[Arc<Schema>],
    dataset: &mut Dataset,
    config: &ParseConfig,
) {
    let mut outputs = Vec::with_capacity(members.len());
    for member in members {
        if config.abort_early && dataset.has_issues() {
            break;
        }
        let mut trial = Dataset::unknown(dataset.value.clone());
        member.run(&mut trial, config);
        if trial.status == Status::Success {
            outputs.push(trial.value);
        } else {
            // The failing member's issues surface in member order.
            dataset.merge_child(trial, None);
        }
    }
    if dataset.has_issues() {
        return;
    }

    let mut outputs = outputs.into_iter();
    let Some(mut merged) = outputs.next() else {
        unreachable!()
    };
    for output in outputs {
        let received = format!("{} and {}", merged.received(), output.received());
        match merge_values(merged, output) {
            Some(value) => merged = value,
            None => {
                let issue = issue_for(
                    schema,
                    IssueKind::Schema,
                    "intersection",
                    "matching intersection members",
                    Some(received),
                    config,
                );
                dataset.fail(issue);
                return;
            }
        }
    }
    dataset.conclude(merged);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::object;
    use crate::primitive::{literal, number, string};

    fn run(schema: &Schema, value: Value) -> Dataset {
        let mut ds = Dataset::unknown(value);
        schema.run(&mut ds, &ParseConfig::default());
        ds
    }

    #[test]
    fn union_declaration_order_wins() {
        // "5" satisfies the string member; no implicit numeric coercion.
        let schema = union_of(vec![string(), number()]);
        let ds = run(&schema, Value::from("5"));
        assert_eq!(ds.status, Status::Success);
        assert_eq!(ds.value, Value::from("5"));
    }

    #[test]
    fn union_all_fail_aggregates() {
        let schema = union_of(vec![string(), number()]);
        let ds = run(&schema, Value::Bool(true));
        assert_eq!(ds.issues().len(), 1);
        assert_eq!(ds.issues()[0].expects, "string | number");
        assert_eq!(ds.issues()[0].received.as_deref(), Some("true"));
    }

    #[test]
    fn intersection_merges_objects_rightmost_wins() {
        let schema = intersection(vec![
            object([("a", number()), ("shared", literal("left"))]),
            object([("b", string()), ("shared", crate::primitive::any())]),
        ]);
        let mut input = std::collections::BTreeMap::new();
        input.insert("a".to_string(), Value::from(1));
        input.insert("b".to_string(), Value::from("x"));
        input.insert("shared".to_string(), Value::from("left"));
        let ds = run(&schema, Value::Object(input));
        assert_eq!(ds.status, Status::Success);
        let Value::Object(out) = ds.value else { panic!() };
        assert_eq!(out.len(), 3);
        assert_eq!(out["shared"], Value::from("left"));
    }

    #[test]
    fn intersection_scalar_conflict() {
        // Both members accept, but coercion makes the outputs disagree.
        let schema = intersection(vec![crate::coerce::coerce_number(), crate::primitive::any()]);
        let ds = run(&schema, Value::from("42"));
        assert_eq!(ds.status, Status::Failure);
        assert_eq!(ds.issues()[0].node, "intersection");
    }

    #[test]
    fn intersection_surfaces_member_issues() {
        let schema = intersection(vec![string(), number()]);
        let ds = run(&schema, Value::from("x"));
        // The number member fails; its issue comes through unprefixed.
        assert_eq!(ds.issues().len(), 1);
        assert_eq!(ds.issues()[0].node, "number");
    }

    #[test]
    #[should_panic(expected = "at least two")]
    fn union_needs_two_variants() {
        union_of(vec![string()]);
    }
}
