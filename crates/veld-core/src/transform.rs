//! Transforms deriving new object schemas from an existing one's entries.
//!
//! All of these operate on object schemas and share children by `Arc`
//! reference; no entry schema is rebuilt. Applying them to a non-object
//! schema is a malformed-schema programmer error and panics, per the
//! engine's error-handling contract.

use std::sync::Arc;

use crate::primitive::enum_of;
use crate::schema::{Schema, SchemaNode};

fn entries_of<'a>(
    schema: &'a Schema,
    caller: &str,
) -> (&'a [(String, Arc<Schema>)], crate::object::UnknownKeys) {
    match schema.node() {
        SchemaNode::Object {
            entries,
            unknown_keys,
        } => (entries, *unknown_keys),
        _ => panic!("{caller}() requires an object schema, got {}", schema.node_type()),
    }
}

fn rebuild(
    schema: &Schema,
    entries: Vec<(String, Arc<Schema>)>,
    unknown_keys: crate::object::UnknownKeys,
) -> Schema {
    let rebuilt = Schema::from_node(SchemaNode::Object {
        entries,
        unknown_keys,
    });
    match schema.message() {
        Some(message) => rebuilt.with_message(message.clone()),
        None => rebuilt,
    }
}

/// Every entry becomes optional: absent keys are skipped, not validated
/// as `undefined`. Idempotent.
///
/// # Panics
///
/// Panics when `schema` is not an object schema.
pub fn partial(schema: &Schema) -> Schema {
    let (entries, unknown_keys) = entries_of(schema, "partial");
    let entries = entries
        .iter()
        .map(|(key, entry)| {
            let entry = match entry.node() {
                SchemaNode::Optional(_) => Arc::clone(entry),
                _ => Arc::new(Schema::from_node(SchemaNode::Optional(Arc::clone(entry)))),
            };
            (key.clone(), entry)
        })
        .collect();
    rebuild(schema, entries, unknown_keys)
}

/// The inverse of [`partial`]: optional wrappers are peeled so absent
/// keys fail even if the original entry was optional.
///
/// # Panics
///
/// Panics when `schema` is not an object schema.
pub fn required(schema: &Schema) -> Schema {
    let (entries, unknown_keys) = entries_of(schema, "required");
    let entries = entries
        .iter()
        .map(|(key, entry)| {
            let mut entry = Arc::clone(entry);
            while let SchemaNode::Optional(inner) = entry.node() {
                entry = Arc::clone(inner);
            }
            (key.clone(), entry)
        })
        .collect();
    rebuild(schema, entries, unknown_keys)
}

/// The subset of entries named by `keys`, children shared by reference.
///
/// # Panics
///
/// Panics when `schema` is not an object schema or a key is not declared.
pub fn pick(schema: &Schema, keys: &[&str]) -> Schema {
    let (entries, unknown_keys) = entries_of(schema, "pick");
    for key in keys {
        assert!(
            entries.iter().any(|(k, _)| k == key),
            "pick() key \"{key}\" is not declared on the object schema"
        );
    }
    let entries = entries
        .iter()
        .filter(|(key, _)| keys.contains(&key.as_str()))
        .map(|(key, entry)| (key.clone(), Arc::clone(entry)))
        .collect();
    rebuild(schema, entries, unknown_keys)
}

/// The complement of [`pick`]: every entry except those named.
///
/// # Panics
///
/// Panics when `schema` is not an object schema or a key is not declared.
pub fn omit(schema: &Schema, keys: &[&str]) -> Schema {
    let (entries, unknown_keys) = entries_of(schema, "omit");
    for key in keys {
        assert!(
            entries.iter().any(|(k, _)| k == key),
            "omit() key \"{key}\" is not declared on the object schema"
        );
    }
    let entries = entries
        .iter()
        .filter(|(key, _)| !keys.contains(&key.as_str()))
        .map(|(key, entry)| (key.clone(), Arc::clone(entry)))
        .collect();
    rebuild(schema, entries, unknown_keys)
}

/// An enum schema over the object's declared keys.
///
/// # Panics
///
/// Panics when `schema` is not an object schema.
pub fn keyof(schema: &Schema) -> Schema {
    let (entries, _) = entries_of(schema, "keyof");
    enum_of(entries.iter().map(|(key, _)| key.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParseConfig;
    use crate::dataset::{Dataset, Status};
    use crate::object::object;
    use crate::primitive::{number, string};
    use crate::value::Value;
    use crate::wrapper::optional;

    fn base() -> Schema {
        object([("a", string()), ("b", optional(number()))])
    }

    fn run(schema: &Schema, value: Value) -> Status {
        let mut ds = Dataset::unknown(value);
        schema.run(&mut ds, &ParseConfig::default());
        ds.status
    }

    fn obj(pairs: &[(&str, Value)]) -> Value {
        Value::Object(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        )
    }

    #[test]
    fn partial_skips_absent_keys() {
        assert_eq!(run(&base(), obj(&[])), Status::Failure);
        assert_eq!(run(&partial(&base()), obj(&[])), Status::Success);
        // Present keys still validate.
        assert_eq!(
            run(&partial(&base()), obj(&[("a", Value::from(1))])),
            Status::Failure
        );
    }

    #[test]
    fn required_fails_absent_optional_keys() {
        let schema = required(&base());
        assert_eq!(run(&schema, obj(&[("a", Value::from("x"))])), Status::Failure);
        assert_eq!(
            run(
                &schema,
                obj(&[("a", Value::from("x")), ("b", Value::from(1))])
            ),
            Status::Success
        );
    }

    #[test]
    fn required_inverts_partial() {
        let schema = required(&partial(&base()));
        assert_eq!(run(&schema, obj(&[("a", Value::from("x"))])), Status::Failure);
    }

    #[test]
    fn pick_and_omit_partition_entries() {
        let picked = pick(&base(), &["a"]);
        let omitted = omit(&base(), &["a"]);
        assert_eq!(run(&picked, obj(&[("a", Value::from("x"))])), Status::Success);
        assert_eq!(run(&omitted, obj(&[])), Status::Success);
        assert_eq!(run(&omitted, obj(&[("b", Value::from("no"))])), Status::Failure);
    }

    #[test]
    fn keyof_accepts_declared_keys() {
        let schema = keyof(&base());
        assert_eq!(run(&schema, Value::from("a")), Status::Success);
        assert_eq!(run(&schema, Value::from("b")), Status::Success);
        assert_eq!(run(&schema, Value::from("c")), Status::Failure);
    }

    #[test]
    #[should_panic(expected = "requires an object schema")]
    fn transforms_reject_non_objects() {
        partial(&string());
    }
}
