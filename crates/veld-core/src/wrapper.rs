//! Wrappers: optional, nullable, default, readonly, lazy.
//!
//! Each wrapper owns exactly one inner schema and modifies how it meets
//! the input. Optional and nullable short-circuit their sentinel value to
//! success without running the inner schema; a default substitutes for
//! `undefined` and *does* run through the inner schema, so an invalid
//! default fails validation. Readonly is an output-type marker only.
//! Lazy defers schema construction to first use, enabling recursive
//! schemas; the thunk runs once per validation call.

use std::fmt;
use std::sync::Arc;

use crate::config::ParseConfig;
use crate::dataset::{Dataset, Status};
use crate::schema::{Schema, SchemaNode};
use crate::value::Value;

/// The default substituted for `undefined`: a fixed value or a thunk
/// computed at validation time.
#[derive(Clone)]
pub enum DefaultValue {
    Value(Value),
    Thunk(Arc<dyn Fn() -> Value + Send + Sync>),
}

impl DefaultValue {
    pub fn get(&self) -> Value {
        match self {
            DefaultValue::Value(value) => value.clone(),
            DefaultValue::Thunk(f) => f(),
        }
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Value(value) => f.debug_tuple("Value").field(value).finish(),
            DefaultValue::Thunk(_) => f.debug_tuple("Thunk").field(&"<fn>").finish(),
        }
    }
}

/// Deferred schema construction for recursive schemas.
#[derive(Clone)]
pub struct LazyThunk(Arc<dyn Fn() -> Arc<Schema> + Send + Sync>);

impl LazyThunk {
    pub fn new(f: impl Fn() -> Arc<Schema> + Send + Sync + 'static) -> Self {
        LazyThunk(Arc::new(f))
    }

    /// Evaluate the thunk. Called once per validation call so captured
    /// mutable state cannot leak between calls; callers may memoize the
    /// returned schema themselves since schemas are immutable.
    pub fn evaluate(&self) -> Arc<Schema> {
        (self.0)()
    }
}

impl fmt::Debug for LazyThunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LazyThunk").field(&"<fn>").finish()
    }
}

/// Accepts `undefined` without consulting the inner schema.
pub fn optional(inner: Schema) -> Schema {
    Schema::from_node(SchemaNode::Optional(Arc::new(inner)))
}

/// Accepts `null` without consulting the inner schema.
pub fn nullable(inner: Schema) -> Schema {
    Schema::from_node(SchemaNode::Nullable(Arc::new(inner)))
}

/// Replaces `undefined` with a fixed default, which is then validated by
/// the inner schema.
pub fn default_to(inner: Schema, default: impl Into<Value>) -> Schema {
    Schema::from_node(SchemaNode::Default {
        inner: Arc::new(inner),
        default: DefaultValue::Value(default.into()),
    })
}

/// Replaces `undefined` with a lazily computed default.
pub fn default_with(inner: Schema, f: impl Fn() -> Value + Send + Sync + 'static) -> Schema {
    Schema::from_node(SchemaNode::Default {
        inner: Arc::new(inner),
        default: DefaultValue::Thunk(Arc::new(f)),
    })
}

/// Validation-transparent output marker.
pub fn readonly(inner: Schema) -> Schema {
    Schema::from_node(SchemaNode::Readonly(Arc::new(inner)))
}

/// Defers schema construction to first use, enabling recursive schemas.
pub fn lazy(f: impl Fn() -> Arc<Schema> + Send + Sync + 'static) -> Schema {
    Schema::from_node(SchemaNode::Lazy(LazyThunk::new(f)))
}

pub(crate) fn run_optional(inner: &Schema, dataset: &mut Dataset, config: &ParseConfig) {
    if dataset.value == Value::Undefined {
        dataset.status = Status::Success;
    } else {
        inner.run(dataset, config);
    }
}

pub(crate) fn run_nullable(inner: &Schema, dataset: &mut Dataset, config: &ParseConfig) {
    if dataset.value == Value::Null {
        dataset.status = Status::Success;
    } else {
        inner.run(dataset, config);
    }
}

pub(crate) fn run_default(
    inner: &Schema,
    default: &DefaultValue,
    dataset: &mut Dataset,
    config: &ParseConfig,
) {
    if dataset.value == Value::Undefined {
        dataset.value = default.get();
    }
    inner.run(dataset, config);
}

pub(crate) fn run_lazy(thunk: &LazyThunk, dataset: &mut Dataset, config: &ParseConfig) {
    thunk.evaluate().run(dataset, config);
}
