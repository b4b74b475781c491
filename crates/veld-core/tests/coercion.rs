//! Coercion behavior observed through the public parse surface, plus
//! property checks for idempotence and passthrough.

use proptest::prelude::*;

use veld_core::{
    array, coerce_bigint, coerce_boolean, coerce_date, coerce_number, coerce_string, map, object,
    parse, record_with_key, Value,
};

#[test]
fn coerced_values_land_in_composite_output() {
    let schema = object([("count", coerce_number()), ("active", coerce_boolean())]);
    let input: Value = serde_json::json!({"count": "12", "active": "true"}).into();
    let output = parse(&schema, input).unwrap();
    assert_eq!(
        output,
        Value::from(serde_json::json!({"count": 12.0, "active": true}))
    );
}

#[test]
fn array_of_coercions_preserves_positions() {
    let schema = array(coerce_bigint());
    let output = parse(
        &schema,
        Value::Array(vec![Value::from("1"), Value::from(2), Value::Bool(true)]),
    )
    .unwrap();
    assert_eq!(
        output,
        Value::Array(vec![Value::BigInt(1), Value::BigInt(2), Value::BigInt(1)])
    );
}

#[test]
fn record_key_coercion_rekeys_output() {
    // String keys validated through a string coercion stay strings; the
    // round trip through the key schema must not drop entries.
    let schema = record_with_key(coerce_string(), coerce_number());
    let input: Value = serde_json::json!({"a": "1", "b": 2}).into();
    let output = parse(&schema, input).unwrap();
    assert_eq!(output, Value::from(serde_json::json!({"a": 1.0, "b": 2.0})));
}

#[test]
fn map_value_coercion_copies_on_write() {
    let schema = map(coerce_number(), coerce_number());
    let entries = vec![(Value::from("3"), Value::from("30"))];
    let output = parse(&schema, Value::Map(entries.into())).unwrap();
    let Value::Map(out) = output else { panic!() };
    assert_eq!(
        out.as_ref(),
        &vec![(Value::Number(3.0), Value::Number(30.0))]
    );
}

#[test]
fn date_strings_and_millis_agree() {
    let schema = coerce_date();
    let from_string = parse(&schema, "1970-01-01T00:00:10Z").unwrap();
    let from_millis = parse(&schema, 10_000.0).unwrap();
    assert_eq!(from_string, from_millis);
}

proptest! {
    /// Coercion is idempotent: feeding a coerced output back through the
    /// same schema returns it unchanged.
    #[test]
    fn number_coercion_idempotent(n in -1_000_000i64..1_000_000) {
        let schema = coerce_number();
        let once = parse(&schema, n.to_string().as_str()).unwrap();
        let twice = parse(&schema, once.clone()).unwrap();
        prop_assert_eq!(once, twice);
    }

    /// Inputs already of the target type pass through untouched.
    #[test]
    fn typed_input_passes_through(n in proptest::num::f64::NORMAL) {
        let out = parse(&coerce_number(), n).unwrap();
        prop_assert_eq!(out, Value::Number(n));
    }

    #[test]
    fn integral_strings_coerce_to_bigint(n in proptest::num::i64::ANY) {
        let out = parse(&coerce_bigint(), n.to_string().as_str()).unwrap();
        prop_assert_eq!(out, Value::BigInt(i128::from(n)));
    }

    /// String coercion of a number renders integral values without a
    /// fractional part.
    #[test]
    fn integral_numbers_stringify_cleanly(n in -1_000_000i64..1_000_000) {
        let out = parse(&coerce_string(), n as f64).unwrap();
        prop_assert_eq!(out, Value::from(n.to_string()));
    }
}
