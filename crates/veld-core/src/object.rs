//! Object schemas: declared entries plus an unknown-key policy.
//!
//! Validation walks the declared entries in declaration order, validating
//! the corresponding input property and prefixing the entry key onto any
//! child issue. Missing keys follow the entry's wrapper chain: optional
//! entries are skipped, defaulted entries validate their default, anything
//! else raises a missing-key issue. Unknown input keys are stripped,
//! passed through verbatim, or flagged, depending on the policy.
//!
//! The helpers at the bottom ([`type_issue`], [`missing_key_issue`],
//! [`unknown_key_issue`], [`finish_unknown_keys`], [`missing_mode`]) are
//! public so a compiled fast-path validator can replicate this behavior
//! exactly instead of re-deriving it.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::ParseConfig;
use crate::dataset::Dataset;
use crate::issue::{Issue, IssueKind, PathSegment};
use crate::schema::{issue_for, Schema, SchemaNode};
use crate::value::Value;

/// What an object schema does with input keys it does not declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownKeys {
    /// Drop them from the output (the plain `object` behavior).
    Strip,
    /// Flag each one as a schema issue.
    Strict,
    /// Copy them through to the output verbatim.
    Loose,
}

/// How an object entry behaves when its key is absent from the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingMode {
    /// Optional entry: skip it, the output has no such key.
    Skip,
    /// Defaulted entry: run the schema against `undefined` so the default
    /// is substituted and validated.
    FillDefault,
    /// Anything else: a missing-key issue.
    Required,
}

/// Classify an entry schema's missing-key behavior by walking its wrapper
/// chain. Constraints and readonly wrappers are transparent; a lazy
/// schema is evaluated.
pub fn missing_mode(schema: &Schema) -> MissingMode {
    match schema.node() {
        SchemaNode::Optional(_) => MissingMode::Skip,
        SchemaNode::Default { .. } => MissingMode::FillDefault,
        SchemaNode::Readonly(inner) => missing_mode(inner),
        SchemaNode::Constraint { base, .. } => missing_mode(base),
        SchemaNode::Lazy(thunk) => missing_mode(&thunk.evaluate()),
        _ => MissingMode::Required,
    }
}

fn build_object<I, K>(entries: I, unknown_keys: UnknownKeys) -> Schema
where
    I: IntoIterator<Item = (K, Schema)>,
    K: Into<String>,
{
    Schema::from_node(SchemaNode::Object {
        entries: entries
            .into_iter()
            .map(|(k, s)| (k.into(), Arc::new(s)))
            .collect(),
        unknown_keys,
    })
}

/// An object schema that strips unknown keys from its output.
pub fn object<I, K>(entries: I) -> Schema
where
    I: IntoIterator<Item = (K, Schema)>,
    K: Into<String>,
{
    build_object(entries, UnknownKeys::Strip)
}

/// An object schema that flags unknown keys as issues.
pub fn strict_object<I, K>(entries: I) -> Schema
where
    I: IntoIterator<Item = (K, Schema)>,
    K: Into<String>,
{
    build_object(entries, UnknownKeys::Strict)
}

/// An object schema that passes unknown keys through verbatim.
pub fn loose_object<I, K>(entries: I) -> Schema
where
    I: IntoIterator<Item = (K, Schema)>,
    K: Into<String>,
{
    build_object(entries, UnknownKeys::Loose)
}

pub(crate) fn run_object(
    schema: &Schema,
    entries: &[(String, Arc<Schema>)],
    unknown_keys: UnknownKeys,
    dataset: &mut Dataset,
    config: &ParseConfig,
) {
    if !matches!(dataset.value, Value::Object(_)) {
        let issue = type_issue(schema, &dataset.value, config);
        dataset.fail(issue);
        return;
    }
    let Value::Object(mut input) = std::mem::replace(&mut dataset.value, Value::Undefined) else {
        unreachable!()
    };

    let mut output = BTreeMap::new();
    for (key, entry) in entries {
        if config.abort_early && dataset.has_issues() {
            break;
        }
        match input.remove(key) {
            Some(value) => {
                let mut child = Dataset::unknown(value);
                entry.run(&mut child, config);
                let value = dataset.merge_child(child, Some(PathSegment::Key(key.clone())));
                output.insert(key.clone(), value);
            }
            None => match missing_mode(entry) {
                MissingMode::Skip => {}
                MissingMode::FillDefault => {
                    let mut child = Dataset::unknown(Value::Undefined);
                    entry.run(&mut child, config);
                    let value = dataset.merge_child(child, Some(PathSegment::Key(key.clone())));
                    output.insert(key.clone(), value);
                }
                MissingMode::Required => {
                    let issue = missing_key_issue(schema, key, config);
                    dataset.fail(issue);
                }
            },
        }
    }

    finish_unknown_keys(schema, unknown_keys, input, &mut output, dataset, config);
    dataset.conclude(Value::Object(output));
}

/// Apply the unknown-key policy to whatever input keys the entry loop did
/// not consume.
pub fn finish_unknown_keys(
    schema: &Schema,
    unknown_keys: UnknownKeys,
    remaining: BTreeMap<String, Value>,
    output: &mut BTreeMap<String, Value>,
    dataset: &mut Dataset,
    config: &ParseConfig,
) {
    match unknown_keys {
        UnknownKeys::Strip => {}
        UnknownKeys::Loose => output.extend(remaining),
        UnknownKeys::Strict => {
            for (key, _) in remaining {
                if config.abort_early && dataset.has_issues() {
                    break;
                }
                let issue = unknown_key_issue(schema, &key, config);
                dataset.fail(issue);
            }
        }
    }
}

/// The structural-mismatch issue raised before any descent.
pub fn type_issue(schema: &Schema, value: &Value, config: &ParseConfig) -> Issue {
    issue_for(
        schema,
        IssueKind::Schema,
        schema.node_type(),
        schema.expects(),
        Some(value.received()),
        config,
    )
}

/// The issue for a required key absent from the input. Its path already
/// names the key.
pub fn missing_key_issue(schema: &Schema, key: &str, config: &ParseConfig) -> Issue {
    issue_for(
        schema,
        IssueKind::Schema,
        schema.node_type(),
        format!("\"{key}\""),
        Some("undefined".to_string()),
        config,
    )
    .prefixed(PathSegment::Key(key.to_string()))
}

/// The issue a strict object raises for an undeclared input key.
pub fn unknown_key_issue(schema: &Schema, key: &str, config: &ParseConfig) -> Issue {
    issue_for(
        schema,
        IssueKind::Schema,
        schema.node_type(),
        "never",
        Some(format!("\"{key}\"")),
        config,
    )
    .prefixed(PathSegment::Key(key.to_string()))
}
