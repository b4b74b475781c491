//! Top-level entry points: run a schema against a value and turn the
//! resulting dataset into a `Result`.
//!
//! `Ok` is returned only for a fully successful dataset; a partial one
//! (typed, but with constraint issues) is still an `Err`, carrying every
//! recorded issue. Bulk parsing shares one schema across inputs but keeps
//! a fully independent dataset per element, so a failure in one input can
//! never contaminate another.

use thiserror::Error;

use crate::config::ParseConfig;
use crate::dataset::{Dataset, Status};
use crate::issue::Issue;
use crate::schema::Schema;
use crate::value::Value;

/// Validation failure carrying every recorded issue.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct ParseError {
    /// The first issue's message, annotated with the count of the rest.
    pub message: String,
    /// All recorded issues, in discovery order.
    pub issues: Vec<Issue>,
}

impl ParseError {
    /// Build from a non-empty issue list, in discovery order.
    pub fn from_issues(issues: Vec<Issue>) -> Self {
        debug_assert!(!issues.is_empty());
        let message = match issues.len() {
            0 => "validation failed".to_string(),
            1 => issues[0].message.clone(),
            2 => format!("{} (and 1 more issue)", issues[0].message),
            n => format!("{} (and {} more issues)", issues[0].message, n - 1),
        };
        ParseError { message, issues }
    }
}

/// Validate `input` against `schema` with the default configuration.
pub fn parse(schema: &Schema, input: impl Into<Value>) -> Result<Value, ParseError> {
    parse_with(schema, input.into(), &ParseConfig::default())
}

/// Validate `input` against `schema` under `config`.
///
/// Returns the (possibly coerced) output value on full success, or a
/// [`ParseError`] with every issue otherwise.
pub fn parse_with(
    schema: &Schema,
    input: Value,
    config: &ParseConfig,
) -> Result<Value, ParseError> {
    let mut dataset = Dataset::unknown(input);
    schema.run(&mut dataset, config);
    if dataset.status == Status::Success {
        Ok(dataset.value)
    } else {
        tracing::debug!(
            node = schema.node_type(),
            issues = dataset.issues().len(),
            "validation failed"
        );
        Err(ParseError::from_issues(dataset.into_issues()))
    }
}

/// Validate each input independently against one shared schema.
///
/// Output order matches input order; every element gets its own dataset,
/// so issues and coercions never leak across elements.
pub fn parse_bulk(
    schema: &Schema,
    inputs: Vec<Value>,
    config: &ParseConfig,
) -> Vec<Result<Value, ParseError>> {
    inputs
        .into_iter()
        .map(|input| parse_with(schema, input, config))
        .collect()
}

/// Boolean shorthand: does `input` fully satisfy `schema`?
pub fn is_valid(schema: &Schema, input: &Value) -> bool {
    let mut dataset = Dataset::unknown(input.clone());
    schema.run(&mut dataset, &ParseConfig::default());
    dataset.status == Status::Success
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::min_length;
    use crate::primitive::string;

    #[test]
    fn parse_rejects_partial_datasets() {
        // Typed but too short: Partial, which is still an Err.
        let schema = min_length(string(), 5);
        let err = parse(&schema, "abc").unwrap_err();
        assert_eq!(err.issues.len(), 1);
        assert_eq!(err.issues[0].node, "min_length");
    }

    #[test]
    fn error_message_counts_remaining_issues() {
        let schema = min_length(crate::constraint::uppercase(string()), 5);
        let err = parse(&schema, "abc").unwrap_err();
        assert_eq!(err.issues.len(), 2);
        assert!(err.message.ends_with("(and 1 more issue)"));

        let schema = min_length(
            crate::constraint::includes(crate::constraint::uppercase(string()), "zz"),
            5,
        );
        let err = parse(&schema, "abc").unwrap_err();
        assert_eq!(err.issues.len(), 3);
        assert!(err.message.ends_with("(and 2 more issues)"));
    }

    #[test]
    fn bulk_elements_are_isolated() {
        let schema = string();
        let results = parse_bulk(
            &schema,
            vec![Value::from("ok"), Value::from(1), Value::from("also ok")],
            &ParseConfig::default(),
        );
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert!(results[2].is_ok());
    }

    #[test]
    fn is_valid_shorthand() {
        assert!(is_valid(&string(), &Value::from("x")));
        assert!(!is_valid(&string(), &Value::Null));
    }
}
