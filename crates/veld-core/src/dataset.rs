//! The value+status+issues carrier threaded through every validator call.
//!
//! A [`Dataset`] is created once per top-level call as `Unknown` and
//! mutated in place by each validator layer for efficiency; conceptually
//! each `run` is a pure dataset-to-dataset function. The issue list is
//! private so the invariant *issues non-empty iff status is Partial or
//! Failure* holds by construction: every mutator that appends an issue also
//! downgrades the status, and [`Dataset::conclude`] only upgrades to
//! Success when no issue was recorded.

use crate::issue::{Issue, PathSegment};
use crate::value::Value;

/// Validation progress of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Not yet validated.
    Unknown,
    /// Fully valid; `value` is the (possibly coerced) output.
    Success,
    /// Well-typed but at least one constraint failed. Constraint chains
    /// keep running against a partial dataset.
    Partial,
    /// Fundamental type/shape mismatch, or an aborting refinement fired.
    Failure,
}

/// The unit passed through every `run` call.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Current validation status.
    pub status: Status,
    /// Current, possibly coerced value.
    pub value: Value,
    issues: Vec<Issue>,
}

impl Dataset {
    /// A fresh, unvalidated dataset.
    pub fn unknown(value: Value) -> Self {
        Dataset {
            status: Status::Unknown,
            value,
            issues: Vec::new(),
        }
    }

    /// An already-successful dataset.
    pub fn success(value: Value) -> Self {
        Dataset {
            status: Status::Success,
            value,
            issues: Vec::new(),
        }
    }

    /// A failed dataset. The separate `first` argument makes an empty
    /// issue list unrepresentable at this constructor.
    pub fn failure(value: Value, first: Issue, rest: Vec<Issue>) -> Self {
        let mut issues = Vec::with_capacity(1 + rest.len());
        issues.push(first);
        issues.extend(rest);
        Dataset {
            status: Status::Failure,
            value,
            issues,
        }
    }

    /// Record a shape-level issue and mark the dataset failed.
    pub fn fail(&mut self, issue: Issue) {
        self.issues.push(issue);
        self.status = Status::Failure;
    }

    /// Record a constraint-level issue. The dataset stays typed (Partial)
    /// so later constraints in the chain still run; an existing Failure is
    /// never upgraded.
    pub fn flag(&mut self, issue: Issue) {
        self.issues.push(issue);
        if self.status != Status::Failure {
            self.status = Status::Partial;
        }
    }

    /// Fold a child dataset into this one: child issues are copied with
    /// `segment` prefixed onto their paths, the child's severity is merged,
    /// and the child's (possibly coerced) value is returned to the caller
    /// for placement in the composite output.
    pub fn merge_child(&mut self, child: Dataset, segment: Option<PathSegment>) -> Value {
        match child.status {
            Status::Failure => self.status = Status::Failure,
            Status::Partial => {
                if self.status != Status::Failure {
                    self.status = Status::Partial;
                }
            }
            Status::Unknown | Status::Success => {}
        }
        for issue in child.issues {
            self.issues.push(match &segment {
                Some(segment) => issue.prefixed(segment.clone()),
                None => issue,
            });
        }
        child.value
    }

    /// Install the final value and upgrade to Success when nothing went
    /// wrong. Composites call this exactly once, after their children.
    pub fn conclude(&mut self, value: Value) {
        self.value = value;
        if self.issues.is_empty() {
            self.status = Status::Success;
        }
    }

    /// True once any issue has been recorded. Composites consult this
    /// between siblings to honor `abort_early`.
    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    /// The issues recorded so far.
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// Consume the dataset, yielding its issues.
    pub fn into_issues(self) -> Vec<Issue> {
        self.issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::IssueKind;

    fn issue() -> Issue {
        Issue::new(IssueKind::Schema, "string", "string", Some("1".to_string()))
    }

    #[test]
    fn conclude_upgrades_only_clean_datasets() {
        let mut ds = Dataset::unknown(Value::Null);
        ds.conclude(Value::Bool(true));
        assert_eq!(ds.status, Status::Success);

        let mut ds = Dataset::unknown(Value::Null);
        ds.flag(issue());
        ds.conclude(Value::Bool(true));
        assert_eq!(ds.status, Status::Partial);
    }

    #[test]
    fn flag_never_upgrades_failure() {
        let mut ds = Dataset::unknown(Value::Null);
        ds.fail(issue());
        ds.flag(issue());
        assert_eq!(ds.status, Status::Failure);
        assert_eq!(ds.issues().len(), 2);
    }

    #[test]
    fn merge_child_prefixes_paths() {
        let mut parent = Dataset::unknown(Value::Null);
        let mut child = Dataset::unknown(Value::from(1));
        child.fail(issue());
        let value = parent.merge_child(child, Some(PathSegment::Key("a".to_string())));
        assert_eq!(value, Value::from(1));
        assert_eq!(parent.status, Status::Failure);
        assert_eq!(parent.issues()[0].path_string(), "a");
    }
}
