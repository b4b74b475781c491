//! Differential testing: the compiled fast path must be observably
//! identical to the interpreter for any input, matching on the output
//! value, the error message and the full issue list.

use std::sync::Arc;

use proptest::prelude::*;

use veld_compile::Engine;
use veld_core::{
    array, coerce_number, default_to, min_length, number, object, optional, parse_with,
    strict_object, string, union_of, ParseConfig, Schema, Value,
};

fn schemas() -> Vec<Arc<Schema>> {
    vec![
        Arc::new(object([
            ("name", string()),
            ("age", number()),
            ("nick", optional(string())),
            ("lang", default_to(string(), "en")),
        ])),
        Arc::new(strict_object([("only", number())])),
        Arc::new(object([(
            "inner",
            object([("items", array(coerce_number()))]),
        )])),
        Arc::new(object([(
            "field",
            union_of(vec![min_length(string(), 2), number()]),
        )])),
        Arc::new(array(object([("x", number())]))),
        Arc::new(string()),
    ]
}

fn value_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Undefined),
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-1000i32..1000).prop_map(|n| Value::Number(f64::from(n))),
        "[a-z]{0,8}".prop_map(Value::from),
    ];
    leaf.prop_recursive(3, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,6}", inner, 0..4)
                .prop_map(Value::Object),
        ]
    })
}

fn assert_equivalent(engine: &Engine, schema: &Arc<Schema>, input: Value, config: &ParseConfig) {
    let interpreted = parse_with(schema, input.clone(), config);
    let compiled = engine.parse_with(schema, input, config);
    match (interpreted, compiled) {
        (Ok(a), Ok(b)) => assert_eq!(a, b),
        (Err(a), Err(b)) => {
            assert_eq!(a.message, b.message);
            assert_eq!(a.issues, b.issues);
        }
        (a, b) => panic!("fast path diverged: interpreter {a:?}, compiled {b:?}"),
    }
}

proptest! {
    #[test]
    fn fast_path_matches_interpreter(input in value_strategy()) {
        let engine = Engine::new();
        let config = ParseConfig::default();
        for schema in schemas() {
            assert_equivalent(&engine, &schema, input.clone(), &config);
        }
    }

    #[test]
    fn fast_path_matches_under_abort_early(input in value_strategy()) {
        let engine = Engine::new();
        let config = ParseConfig::aborting_early();
        for schema in schemas() {
            assert_equivalent(&engine, &schema, input.clone(), &config);
        }
    }
}

#[test]
fn cache_survives_repeated_bulk_use() {
    let engine = Engine::new();
    let schema = Arc::new(object([("a", number())]));
    let inputs: Vec<Value> = (0..100)
        .map(|i| Value::from(serde_json::json!({"a": i})))
        .collect();

    let first = engine.parse_bulk(&schema, inputs.clone(), &ParseConfig::default());
    let second = engine.parse_bulk(&schema, inputs, &ParseConfig::default());
    assert_eq!(engine.cached_validators(), 1);
    assert!(first.iter().all(Result::is_ok));
    assert_eq!(first, second);
}
