//! Call-scoped validation configuration.
//!
//! A [`ParseConfig`] is constructed once per top-level `parse` /
//! `parse_bulk` call and never mutated mid-call. It is not global state:
//! two concurrent calls can run with different configs against the same
//! schema.

use std::fmt;
use std::sync::Arc;

use crate::issue::Issue;

/// An issue message: either literal text or a function of the issue being
/// raised.
#[derive(Clone)]
pub enum Message {
    /// Fixed message text.
    Text(String),
    /// Computed from the issue (its `expects`, `received`, path, …).
    With(Arc<dyn Fn(&Issue) -> String + Send + Sync>),
}

impl Message {
    /// Resolve against a concrete issue. For [`Message::With`] the closure
    /// sees the issue with its default message still in place.
    pub fn resolve(&self, issue: &Issue) -> String {
        match self {
            Message::Text(text) => text.clone(),
            Message::With(f) => f(issue),
        }
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Message::With(_) => f.debug_tuple("With").field(&"<fn>").finish(),
        }
    }
}

impl From<&str> for Message {
    fn from(text: &str) -> Self {
        Message::Text(text.to_string())
    }
}

impl From<String> for Message {
    fn from(text: String) -> Self {
        Message::Text(text)
    }
}

impl<F> From<F> for Message
where
    F: Fn(&Issue) -> String + Send + Sync + 'static,
{
    fn from(f: F) -> Self {
        Message::With(Arc::new(f))
    }
}

/// Per-call validation configuration.
#[derive(Debug, Clone, Default)]
pub struct ParseConfig {
    /// Message catalog language. Only the built-in English catalog ships;
    /// unknown languages fall back to it.
    pub lang: Option<String>,
    /// Permit the engine to stop collecting issues after the first one.
    /// Bounds how much is collected, never whether a result is returned.
    pub abort_early: bool,
    /// Call-level default message, used when a schema carries none.
    pub message: Option<Message>,
}

impl ParseConfig {
    /// Config that stops collecting issues after the first.
    pub fn aborting_early() -> Self {
        ParseConfig {
            abort_early: true,
            ..ParseConfig::default()
        }
    }
}
