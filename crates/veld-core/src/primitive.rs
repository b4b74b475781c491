//! Primitive schemas: intrinsic type tags, literals, and enums.
//!
//! The algorithm is a tag check: mismatch raises one schema-kind issue
//! with the type name in `expects` and the actual tag in `received`; match
//! upgrades the dataset to Success with the value unchanged.

use crate::config::ParseConfig;
use crate::dataset::{Dataset, Status};
use crate::issue::IssueKind;
use crate::schema::{issue_for, Schema, SchemaNode};
use crate::value::Value;

/// Accepts any value unchanged.
pub fn any() -> Schema {
    Schema::from_node(SchemaNode::Any)
}

/// Accepts exactly `null`.
pub fn null() -> Schema {
    Schema::from_node(SchemaNode::Null)
}

/// Accepts exactly `undefined`.
pub fn undefined() -> Schema {
    Schema::from_node(SchemaNode::Undefined)
}

/// Accepts booleans.
pub fn boolean() -> Schema {
    Schema::from_node(SchemaNode::Boolean)
}

/// Accepts numbers.
pub fn number() -> Schema {
    Schema::from_node(SchemaNode::Number)
}

/// Accepts bigints.
pub fn bigint() -> Schema {
    Schema::from_node(SchemaNode::BigInt)
}

/// Accepts strings.
pub fn string() -> Schema {
    Schema::from_node(SchemaNode::String)
}

/// Accepts dates.
pub fn date() -> Schema {
    Schema::from_node(SchemaNode::Date)
}

/// Accepts symbols.
pub fn symbol() -> Schema {
    Schema::from_node(SchemaNode::Symbol)
}

/// Accepts exactly the given value (strict equality).
pub fn literal(value: impl Into<Value>) -> Schema {
    Schema::from_node(SchemaNode::Literal(value.into()))
}

/// Accepts any member of a fixed literal set. String, number, boolean and
/// mixed enums all go through here.
pub fn enum_of<I, V>(values: I) -> Schema
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    Schema::from_node(SchemaNode::Enum(values.into_iter().map(Into::into).collect()))
}

pub(crate) fn run_typecheck(schema: &Schema, dataset: &mut Dataset, config: &ParseConfig) {
    let ok = matches!(
        (schema.node(), &dataset.value),
        (SchemaNode::Null, Value::Null)
            | (SchemaNode::Undefined, Value::Undefined)
            | (SchemaNode::Boolean, Value::Bool(_))
            | (SchemaNode::Number, Value::Number(_))
            | (SchemaNode::BigInt, Value::BigInt(_))
            | (SchemaNode::String, Value::String(_))
            | (SchemaNode::Date, Value::Date(_))
            | (SchemaNode::Symbol, Value::Symbol(_))
    );
    if ok {
        dataset.status = Status::Success;
    } else {
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

pub(crate) fn run_literal(
    schema: &Schema,
    expected: &Value,
    dataset: &mut Dataset,
    config: &ParseConfig,
) {
    if dataset.value == *expected {
        dataset.status = Status::Success;
    } else {
        let issue = issue_for(
            schema,
            IssueKind::Schema,
            "literal",
            expected.received(),
            Some(dataset.value.received()),
            config,
        );
        dataset.fail(issue);
    }
}

pub(crate) fn run_enum(
    schema: &Schema,
    values: &[Value],
    dataset: &mut Dataset,
    config: &ParseConfig,
) {
    if values.contains(&dataset.value) {
        dataset.status = Status::Success;
    } else {
        let issue = issue_for(
            schema,
            IssueKind::Schema,
            "enum",
            schema.expects(),
            Some(dataset.value.received()),
            config,
        );
        dataset.fail(issue);
    }
}
