//! Schema nodes: immutable descriptions plus their validators.
//!
//! A [`Schema`] is a closed tagged-variant set dispatched by pattern match
//! in [`Schema::run`]. Schemas are built once by the factory functions in
//! the sibling modules, then treated as immutable, shareable, long-lived
//! values: children are held as `Arc<Schema>`, and validation never
//! mutates a schema. The core is synchronous by design; `run` never
//! suspends and performs no I/O.

use std::sync::Arc;

use crate::config::{Message, ParseConfig};
use crate::constraint::Check;
use crate::dataset::{Dataset, Status};
use crate::issue::{Issue, IssueKind};
use crate::object::UnknownKeys;
use crate::value::Value;
use crate::wrapper::{DefaultValue, LazyThunk};
use crate::{coerce, collection, constraint, map, object, operator, primitive, wrapper};

/// An immutable schema: a node describing the expected shape plus an
/// optional message override applied to issues this node raises.
#[derive(Debug, Clone)]
pub struct Schema {
    node: SchemaNode,
    message: Option<Message>,
}

/// The closed set of schema nodes.
#[derive(Debug, Clone)]
pub enum SchemaNode {
    // Primitives
    Any,
    Null,
    Undefined,
    Boolean,
    Number,
    BigInt,
    String,
    Date,
    Symbol,
    /// Strict value equality against a fixed literal.
    Literal(Value),
    /// Membership in a fixed literal set.
    Enum(Vec<Value>),

    /// Best-effort conversion before the primitive check.
    Coerce(CoerceTarget),

    /// A constraint layered over a base schema.
    Constraint { base: Arc<Schema>, check: Check },

    // Composites
    Object {
        entries: Vec<(String, Arc<Schema>)>,
        unknown_keys: UnknownKeys,
    },
    Array {
        item: Arc<Schema>,
        min: Option<usize>,
        max: Option<usize>,
    },
    Tuple {
        items: Vec<Arc<Schema>>,
        rest: Option<Arc<Schema>>,
    },
    Record {
        key: Option<Arc<Schema>>,
        value: Arc<Schema>,
    },
    Map {
        key: Arc<Schema>,
        value: Arc<Schema>,
    },
    Set { item: Arc<Schema> },

    // Operators
    Union { variants: Vec<Arc<Schema>> },
    Intersection { members: Vec<Arc<Schema>> },

    // Wrappers
    Optional(Arc<Schema>),
    Nullable(Arc<Schema>),
    Default {
        inner: Arc<Schema>,
        default: DefaultValue,
    },
    Readonly(Arc<Schema>),
    Lazy(LazyThunk),
}

/// Target type of a coercion schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoerceTarget {
    String,
    Number,
    Boolean,
    BigInt,
    Date,
}

impl Schema {
    pub(crate) fn from_node(node: SchemaNode) -> Self {
        Schema {
            node,
            message: None,
        }
    }

    /// The node describing this schema.
    pub fn node(&self) -> &SchemaNode {
        &self.node
    }

    /// The message override attached to this node, if any.
    pub fn message(&self) -> Option<&Message> {
        self.message.as_ref()
    }

    /// Attach a message override (literal text or a function of the
    /// issue) applied to issues this node raises.
    pub fn with_message(mut self, message: impl Into<Message>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// The node discriminant recorded in issues.
    pub fn node_type(&self) -> &'static str {
        match &self.node {
            SchemaNode::Any => "any",
            SchemaNode::Null => "null",
            SchemaNode::Undefined => "undefined",
            SchemaNode::Boolean => "boolean",
            SchemaNode::Number => "number",
            SchemaNode::BigInt => "bigint",
            SchemaNode::String => "string",
            SchemaNode::Date => "date",
            SchemaNode::Symbol => "symbol",
            SchemaNode::Literal(_) => "literal",
            SchemaNode::Enum(_) => "enum",
            SchemaNode::Coerce(target) => match target {
                CoerceTarget::String => "coerce_string",
                CoerceTarget::Number => "coerce_number",
                CoerceTarget::Boolean => "coerce_boolean",
                CoerceTarget::BigInt => "coerce_bigint",
                CoerceTarget::Date => "coerce_date",
            },
            SchemaNode::Constraint { check, .. } => check.node_type(),
            SchemaNode::Object { unknown_keys, .. } => match unknown_keys {
                UnknownKeys::Strip => "object",
                UnknownKeys::Strict => "strict_object",
                UnknownKeys::Loose => "loose_object",
            },
            SchemaNode::Array { .. } => "array",
            SchemaNode::Tuple { .. } => "tuple",
            SchemaNode::Record { .. } => "record",
            SchemaNode::Map { .. } => "map",
            SchemaNode::Set { .. } => "set",
            SchemaNode::Union { .. } => "union",
            SchemaNode::Intersection { .. } => "intersection",
            SchemaNode::Optional(_) => "optional",
            SchemaNode::Nullable(_) => "nullable",
            SchemaNode::Default { .. } => "default",
            SchemaNode::Readonly(_) => "readonly",
            SchemaNode::Lazy(_) => "lazy",
        }
    }

    /// Human description of what this schema expects, as used in issues
    /// and in union aggregation.
    pub fn expects(&self) -> String {
        match &self.node {
            SchemaNode::Any => "unknown".to_string(),
            SchemaNode::Null => "null".to_string(),
            SchemaNode::Undefined => "undefined".to_string(),
            SchemaNode::Boolean => "boolean".to_string(),
            SchemaNode::Number => "number".to_string(),
            SchemaNode::BigInt => "bigint".to_string(),
            SchemaNode::String => "string".to_string(),
            SchemaNode::Date => "Date".to_string(),
            SchemaNode::Symbol => "symbol".to_string(),
            SchemaNode::Literal(value) => value.received(),
            SchemaNode::Enum(values) => values
                .iter()
                .map(Value::received)
                .collect::<Vec<_>>()
                .join(" | "),
            SchemaNode::Coerce(target) => match target {
                CoerceTarget::String => "string".to_string(),
                CoerceTarget::Number => "number".to_string(),
                CoerceTarget::Boolean => "boolean".to_string(),
                CoerceTarget::BigInt => "bigint".to_string(),
                CoerceTarget::Date => "Date".to_string(),
            },
            SchemaNode::Constraint { base, .. } => base.expects(),
            SchemaNode::Object { .. } => "Object".to_string(),
            SchemaNode::Array { .. } => "Array".to_string(),
            SchemaNode::Tuple { .. } => "Array".to_string(),
            SchemaNode::Record { .. } => "Object".to_string(),
            SchemaNode::Map { .. } => "Map".to_string(),
            SchemaNode::Set { .. } => "Set".to_string(),
            SchemaNode::Union { variants } => variants
                .iter()
                .map(|v| v.expects())
                .collect::<Vec<_>>()
                .join(" | "),
            SchemaNode::Intersection { members } => members
                .iter()
                .map(|m| m.expects())
                .collect::<Vec<_>>()
                .join(" & "),
            SchemaNode::Optional(inner) => format!("({} | undefined)", inner.expects()),
            SchemaNode::Nullable(inner) => format!("({} | null)", inner.expects()),
            SchemaNode::Default { inner, .. } => inner.expects(),
            SchemaNode::Readonly(inner) => inner.expects(),
            // Evaluating the thunk here could recurse forever on
            // self-referential schemas.
            SchemaNode::Lazy(_) => "lazy".to_string(),
        }
    }

    /// Validate `dataset.value` in place.
    ///
    /// Upgrades the dataset to Success (possibly rewriting the value),
    /// downgrades it with appended issues, or both (Partial). Never panics
    /// for user-data problems.
    pub fn run(&self, dataset: &mut Dataset, config: &ParseConfig) {
        match &self.node {
            SchemaNode::Any => dataset.status = Status::Success,
            SchemaNode::Null
            | SchemaNode::Undefined
            | SchemaNode::Boolean
            | SchemaNode::Number
            | SchemaNode::BigInt
            | SchemaNode::String
            | SchemaNode::Date
            | SchemaNode::Symbol => primitive::run_typecheck(self, dataset, config),
            SchemaNode::Literal(value) => primitive::run_literal(self, value, dataset, config),
            SchemaNode::Enum(values) => primitive::run_enum(self, values, dataset, config),
            SchemaNode::Coerce(target) => coerce::run_coerce(self, *target, dataset, config),
            SchemaNode::Constraint { base, check } => {
                constraint::run_constraint(self, base, check, dataset, config)
            }
            SchemaNode::Object {
                entries,
                unknown_keys,
            } => object::run_object(self, entries, *unknown_keys, dataset, config),
            SchemaNode::Array { item, min, max } => {
                collection::run_array(self, item, *min, *max, dataset, config)
            }
            SchemaNode::Tuple { items, rest } => {
                collection::run_tuple(self, items, rest.as_ref(), dataset, config)
            }
            SchemaNode::Record { key, value } => {
                collection::run_record(self, key.as_ref(), value, dataset, config)
            }
            SchemaNode::Map { key, value } => map::run_map(self, key, value, dataset, config),
            SchemaNode::Set { item } => collection::run_set(self, item, dataset, config),
            SchemaNode::Union { variants } => operator::run_union(self, variants, dataset, config),
            SchemaNode::Intersection { members } => {
                operator::run_intersection(self, members, dataset, config)
            }
            SchemaNode::Optional(inner) => wrapper::run_optional(inner, dataset, config),
            SchemaNode::Nullable(inner) => wrapper::run_nullable(inner, dataset, config),
            SchemaNode::Default { inner, default } => {
                wrapper::run_default(inner, default, dataset, config)
            }
            SchemaNode::Readonly(inner) => inner.run(dataset, config),
            SchemaNode::Lazy(thunk) => wrapper::run_lazy(thunk, dataset, config),
        }
    }
}

/// Build an issue for `schema`, applying its message override (falling
/// back to the config-level message, then the default catalog).
pub(crate) fn issue_for(
    schema: &Schema,
    kind: IssueKind,
    node: &'static str,
    expects: impl Into<String>,
    received: Option<String>,
    config: &ParseConfig,
) -> Issue {
    let mut issue = Issue::new(kind, node, expects, received);
    if let Some(message) = schema.message().or(config.message.as_ref()) {
        issue.message = message.resolve(&issue);
    }
    issue
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::union_of;
    use crate::primitive::{number, string};
    use crate::wrapper::optional;

    #[test]
    fn expects_composition() {
        assert_eq!(string().expects(), "string");
        assert_eq!(optional(string()).expects(), "(string | undefined)");
        assert_eq!(union_of(vec![string(), number()]).expects(), "string | number");
    }

    #[test]
    fn custom_message_wins_over_config() {
        let schema = string().with_message("need text");
        let config = ParseConfig {
            message: Some(Message::from("config says no")),
            ..ParseConfig::default()
        };
        let issue = issue_for(
            &schema,
            IssueKind::Schema,
            "string",
            "string",
            Some("1".to_string()),
            &config,
        );
        assert_eq!(issue.message, "need text");
    }
}
