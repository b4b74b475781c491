//! Runtime schema validation and type coercion for dynamic values.
//!
//! Schemas are built with the factory functions re-exported at the crate
//! root, then run against [`Value`] inputs through [`parse`] and friends.
//! Validation never panics on user data; malformed schemas (for example a
//! single-variant union) are programmer errors and panic at construction.

pub mod coerce;
pub mod collection;
pub mod config;
pub mod constraint;
pub mod dataset;
pub mod issue;
pub mod map;
pub mod object;
pub mod operator;
pub mod parse;
pub mod primitive;
pub mod schema;
pub mod transform;
pub mod value;
pub mod wrapper;

pub use coerce::{coerce_bigint, coerce_boolean, coerce_date, coerce_number, coerce_string};
pub use collection::{array, bounded_array, record, record_with_key, set, tuple, tuple_with_rest};
pub use config::{Message, ParseConfig};
pub use constraint::{
    ends_with, includes, length, lowercase, max_length, max_value, min_length, min_value, overwrite,
    pattern, refine, refine_abort, starts_with, uppercase, Check,
};
pub use dataset::{Dataset, Status};
pub use issue::{Issue, IssueKind, PathSegment};
pub use map::map;
pub use object::{loose_object, object, strict_object, UnknownKeys};
pub use operator::{intersection, union_of};
pub use parse::{is_valid, parse, parse_bulk, parse_with, ParseError};
pub use primitive::{
    any, bigint, boolean, date, enum_of, literal, null, number, string, symbol, undefined,
};
pub use schema::{CoerceTarget, Schema, SchemaNode};
pub use transform::{keyof, omit, partial, pick, required};
pub use value::Value;
pub use wrapper::{default_to, default_with, lazy, nullable, optional, readonly};
