//! Specializing a schema into a pre-bound validator closure.
//!
//! Compilation hoists the per-call schema walk of object validation to
//! build time: entry keys, path segments, missing-key behavior and child
//! validators are resolved once, so the compiled closure only moves
//! values. Every node kind without a specialized form falls back to a
//! closure over the interpreter, so compiled and interpreted validation
//! are observably identical in output value, status and issue list.

use std::collections::BTreeMap;
use std::sync::Arc;

use veld_core::config::ParseConfig;
use veld_core::dataset::Dataset;
use veld_core::issue::PathSegment;
use veld_core::object::{
    finish_unknown_keys, missing_key_issue, missing_mode, type_issue, MissingMode, UnknownKeys,
};
use veld_core::schema::{Schema, SchemaNode};
use veld_core::value::Value;

/// A compiled validator: same contract as `Schema::run`.
pub type CompiledRun = Arc<dyn Fn(&mut Dataset, &ParseConfig) + Send + Sync>;

/// Everything object validation needs per declared entry, resolved once.
struct EntryPlan {
    key: String,
    segment: PathSegment,
    run: CompiledRun,
    missing: MissingMode,
}

/// Compile `schema` into a validator closure.
pub fn compile(schema: &Arc<Schema>) -> CompiledRun {
    match schema.node() {
        SchemaNode::Object {
            entries,
            unknown_keys,
        } => compile_object(schema, entries, *unknown_keys),
        _ => fallback(schema),
    }
}

fn fallback(schema: &Arc<Schema>) -> CompiledRun {
    let schema = Arc::clone(schema);
    Arc::new(move |dataset, config| schema.run(dataset, config))
}

fn compile_object(
    schema: &Arc<Schema>,
    entries: &[(String, Arc<Schema>)],
    unknown_keys: UnknownKeys,
) -> CompiledRun {
    let plans: Vec<EntryPlan> = entries
        .iter()
        .map(|(key, entry)| EntryPlan {
            key: key.clone(),
            segment: PathSegment::Key(key.clone()),
            run: compile(entry),
            missing: missing_mode(entry),
        })
        .collect();
    let schema = Arc::clone(schema);
    tracing::trace!(entries = plans.len(), "compiled object validator");

    Arc::new(move |dataset, config| {
        if !matches!(dataset.value, Value::Object(_)) {
            let issue = type_issue(&schema, &dataset.value, config);
            dataset.fail(issue);
            return;
        }
        let Value::Object(mut input) = std::mem::replace(&mut dataset.value, Value::Undefined)
        else {
            unreachable!()
        };

        let mut output = BTreeMap::new();
        for plan in &plans {
            if config.abort_early && dataset.has_issues() {
                break;
            }
            match input.remove(&plan.key) {
                Some(value) => {
                    let mut child = Dataset::unknown(value);
                    (plan.run)(&mut child, config);
                    let value = dataset.merge_child(child, Some(plan.segment.clone()));
                    output.insert(plan.key.clone(), value);
                }
                None => match plan.missing {
                    MissingMode::Skip => {}
                    MissingMode::FillDefault => {
                        let mut child = Dataset::unknown(Value::Undefined);
                        (plan.run)(&mut child, config);
                        let value = dataset.merge_child(child, Some(plan.segment.clone()));
                        output.insert(plan.key.clone(), value);
                    }
                    MissingMode::Required => {
                        let issue = missing_key_issue(&schema, &plan.key, config);
                        dataset.fail(issue);
                    }
                },
            }
        }

        finish_unknown_keys(&schema, unknown_keys, input, &mut output, dataset, config);
        dataset.conclude(Value::Object(output));
    })
}
