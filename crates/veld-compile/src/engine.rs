//! The fast-path engine: a validator cache keyed by schema identity.
//!
//! Schemas are immutable once built, so the `Arc` pointer is a sound
//! cache key: the same `Arc<Schema>` always means the same validator, and
//! a rebuilt schema gets a fresh pointer and a fresh compile. The cache
//! grows with the number of distinct live schemas, which in practice is
//! the application's fixed set of declarations.
//!
//! Reads take the lock shared, so concurrent validation against cached
//! schemas never serializes. Two threads racing to compile the same
//! schema both produce a correct validator; the insert is guarded so one
//! wins and the other's work is discarded.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use veld_core::config::ParseConfig;
use veld_core::dataset::{Dataset, Status};
use veld_core::parse::ParseError;
use veld_core::schema::Schema;
use veld_core::value::Value;

use crate::compile::{compile, CompiledRun};

/// Caching validation engine. Cheap to share behind an `Arc`.
pub struct Engine {
    enabled: bool,
    cache: RwLock<HashMap<usize, CompiledRun>>,
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new()
    }
}

impl Engine {
    /// An engine that compiles and caches validators.
    pub fn new() -> Self {
        Engine {
            enabled: true,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// An engine that always runs the interpreter. Useful as a kill
    /// switch and for differential testing against the fast path.
    pub fn disabled() -> Self {
        Engine {
            enabled: false,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Validate `input` against `schema` with the default configuration.
    pub fn parse(
        &self,
        schema: &Arc<Schema>,
        input: impl Into<Value>,
    ) -> Result<Value, ParseError> {
        self.parse_with(schema, input.into(), &ParseConfig::default())
    }

    /// Validate `input` against `schema` under `config`, through the
    /// cached compiled validator when enabled.
    pub fn parse_with(
        &self,
        schema: &Arc<Schema>,
        input: Value,
        config: &ParseConfig,
    ) -> Result<Value, ParseError> {
        let mut dataset = Dataset::unknown(input);
        if self.enabled {
            let run = self.validator(schema);
            run(&mut dataset, config);
        } else {
            schema.run(&mut dataset, config);
        }
        if dataset.status == Status::Success {
            Ok(dataset.value)
        } else {
            Err(ParseError::from_issues(dataset.into_issues()))
        }
    }

    /// Validate each input independently, resolving the validator once.
    pub fn parse_bulk(
        &self,
        schema: &Arc<Schema>,
        inputs: Vec<Value>,
        config: &ParseConfig,
    ) -> Vec<Result<Value, ParseError>> {
        if !self.enabled {
            return inputs
                .into_iter()
                .map(|input| self.parse_with(schema, input, config))
                .collect();
        }
        let run = self.validator(schema);
        inputs
            .into_iter()
            .map(|input| {
                let mut dataset = Dataset::unknown(input);
                run(&mut dataset, config);
                if dataset.status == Status::Success {
                    Ok(dataset.value)
                } else {
                    Err(ParseError::from_issues(dataset.into_issues()))
                }
            })
            .collect()
    }

    /// Number of distinct schemas compiled so far.
    pub fn cached_validators(&self) -> usize {
        self.lock_read().len()
    }

    fn validator(&self, schema: &Arc<Schema>) -> CompiledRun {
        let key = Arc::as_ptr(schema) as usize;
        if let Some(run) = self.lock_read().get(&key) {
            tracing::trace!(key, "validator cache hit");
            return Arc::clone(run);
        }

        // Compiled outside the write lock; a concurrent compile of the
        // same schema is harmless since or_insert keeps the first one.
        let run = compile(schema);
        tracing::debug!(key, node = schema.node_type(), "compiled validator");
        let mut cache = self
            .cache
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(cache.entry(key).or_insert(run))
    }

    fn lock_read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<usize, CompiledRun>> {
        self.cache
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veld_core::{number, object, string};

    #[test]
    fn caches_by_schema_identity() {
        let engine = Engine::new();
        let schema = Arc::new(object([("a", number())]));
        let input = serde_json::json!({"a": 1});

        assert!(engine.parse(&schema, Value::from(input.clone())).is_ok());
        assert_eq!(engine.cached_validators(), 1);
        assert!(engine.parse(&schema, Value::from(input.clone())).is_ok());
        assert_eq!(engine.cached_validators(), 1);

        // Same shape, new allocation: a distinct cache entry.
        let rebuilt = Arc::new(object([("a", number())]));
        assert!(engine.parse(&rebuilt, Value::from(input)).is_ok());
        assert_eq!(engine.cached_validators(), 2);
    }

    #[test]
    fn disabled_engine_skips_the_cache() {
        let engine = Engine::disabled();
        let schema = Arc::new(string());
        assert!(engine.parse(&schema, "x").is_ok());
        assert_eq!(engine.cached_validators(), 0);
    }

    #[test]
    fn bulk_results_match_element_order() {
        let engine = Engine::new();
        let schema = Arc::new(number());
        let results = engine.parse_bulk(
            &schema,
            vec![Value::from(1), Value::from("x"), Value::from(3)],
            &ParseConfig::default(),
        );
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert!(results[2].is_ok());
    }
}
