//! Compiled fast-path validation for veld schemas.
//!
//! [`Engine`] caches a specialized validator per schema, keyed by the
//! schema's `Arc` identity, and guarantees output identical to the
//! `veld-core` interpreter.

pub mod compile;
pub mod engine;

pub use compile::{compile, CompiledRun};
pub use engine::Engine;
