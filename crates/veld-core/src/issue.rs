//! Structured validation failures.
//!
//! An [`Issue`] records one failure with enough context to locate and
//! explain it: the kind (shape mismatch vs constraint failure), the schema
//! node that raised it, what was expected, what was received, a resolved
//! human message, and the path from the root value to the failure site.
//!
//! Issues are immutable once created. When an issue crosses a composite
//! boundary the composite copies it and prefixes its own key or index via
//! [`Issue::prefixed`]; by the time the root sees an issue its path is
//! complete.

use std::fmt;

use serde::Serialize;

/// Whether the failure is a fundamental shape mismatch or a constraint on
/// an otherwise well-shaped value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueKind {
    /// Wrong fundamental type or shape.
    Schema,
    /// Right shape, failed constraint or refinement.
    Validation,
}

/// One step of the path from the root value to the failure site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// Object or record key.
    Key(String),
    /// Array, tuple or set index.
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(k) => write!(f, "{k}"),
            PathSegment::Index(i) => write!(f, "{i}"),
        }
    }
}

/// A single structured validation failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    /// Failure classification.
    pub kind: IssueKind,
    /// Discriminant of the schema node that raised the issue.
    pub node: &'static str,
    /// Human description of what the node expected.
    pub expects: String,
    /// Short rendering of the actual value, when known.
    pub received: Option<String>,
    /// Resolved message (schema message > config message > default catalog).
    pub message: String,
    /// Ordered keys/indices from the root to the failure site; empty at
    /// the root.
    pub path: Vec<PathSegment>,
}

impl Issue {
    /// Create an issue carrying the default catalog message. Schema- and
    /// config-level overrides are applied afterwards by the validator that
    /// raises the issue.
    pub fn new(
        kind: IssueKind,
        node: &'static str,
        expects: impl Into<String>,
        received: Option<String>,
    ) -> Self {
        let expects = expects.into();
        let message = default_message(node, &expects, received.as_deref());
        Issue {
            kind,
            node,
            expects,
            received,
            message,
            path: Vec::new(),
        }
    }

    /// Copy-and-extend: return this issue with `segment` prefixed onto the
    /// path. Composites call this when translating a child's path to be
    /// relative to their own position.
    pub fn prefixed(mut self, segment: PathSegment) -> Self {
        self.path.insert(0, segment);
        self
    }

    /// Dotted rendering of the path, `(root)` when empty.
    pub fn path_string(&self) -> String {
        if self.path.is_empty() {
            return "(root)".to_string();
        }
        self.path
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path_string(), self.message)
    }
}

/// The aspect a node's default message speaks about.
fn reason(node: &'static str) -> &'static str {
    match node {
        "min_length" | "max_length" | "length" => "length",
        "min_value" | "max_value" => "value",
        "pattern" => "format",
        "includes" => "content",
        "starts_with" => "start",
        "ends_with" => "end",
        "lowercase" | "uppercase" => "case",
        "refine" => "input",
        _ => "type",
    }
}

/// The built-in English message catalog. The `lang` config knob selects a
/// catalog; only English ships, so every language falls back here.
fn default_message(node: &'static str, expects: &str, received: Option<&str>) -> String {
    let reason = reason(node);
    match (expects.is_empty(), received) {
        (true, Some(r)) => format!("Invalid {reason}: Received {r}"),
        (true, None) => format!("Invalid {reason}"),
        (false, Some(r)) => format!("Invalid {reason}: Expected {expects} but received {r}"),
        (false, None) => format!("Invalid {reason}: Expected {expects}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_message_shapes() {
        let issue = Issue::new(
            IssueKind::Schema,
            "string",
            "string",
            Some("123".to_string()),
        );
        assert_eq!(
            issue.message,
            "Invalid type: Expected string but received 123"
        );

        let issue = Issue::new(IssueKind::Validation, "refine", "", Some("\"x\"".to_string()));
        assert_eq!(issue.message, "Invalid input: Received \"x\"");

        let issue = Issue::new(IssueKind::Validation, "min_length", ">=3", Some("2".to_string()));
        assert_eq!(issue.message, "Invalid length: Expected >=3 but received 2");
    }

    #[test]
    fn prefixed_extends_front() {
        let issue = Issue::new(IssueKind::Schema, "number", "number", None)
            .prefixed(PathSegment::Index(1))
            .prefixed(PathSegment::Key("b".to_string()))
            .prefixed(PathSegment::Key("a".to_string()));
        assert_eq!(issue.path_string(), "a.b.1");
    }

    #[test]
    fn serializes_structurally() {
        let issue = Issue::new(IssueKind::Schema, "string", "string", None)
            .prefixed(PathSegment::Index(0));
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["kind"], "schema");
        assert_eq!(json["path"][0], 0);
    }
}
