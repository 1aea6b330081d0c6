//! Violation reporting for form validation

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Severity level of a violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Warning,
    Error,
}

/// Scope of a violation (whole record or a single field)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationScope {
    /// Record-level violation, usually a cross-field rule
    Record,
    /// Field-level violation, carrying the field id
    Field(String),
}

impl ViolationScope {
    pub fn field(id: impl Into<String>) -> Self {
        ViolationScope::Field(id.into())
    }

    /// Get the field id if this is a field scope
    pub fn field_id(&self) -> Option<&str> {
        match self {
            ViolationScope::Record => None,
            ViolationScope::Field(id) => Some(id),
        }
    }
}

impl PartialOrd for ViolationScope {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ViolationScope {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (ViolationScope::Field(a), ViolationScope::Field(b)) => a.cmp(b),
            (ViolationScope::Field(_), ViolationScope::Record) => Ordering::Less,
            (ViolationScope::Record, ViolationScope::Field(_)) => Ordering::Greater,
            (ViolationScope::Record, ViolationScope::Record) => Ordering::Equal,
        }
    }
}

impl std::fmt::Display for ViolationScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViolationScope::Record => write!(f, "record"),
            ViolationScope::Field(id) => write!(f, "{}", id),
        }
    }
}

/// A rule violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Rule ID (e.g., "SEL001")
    pub rule_id: String,
    /// Scope of the violation
    pub scope: ViolationScope,
    /// Human-readable message
    pub message: String,
    /// Severity level
    pub severity: Severity,
}

impl Violation {
    pub fn new(
        rule_id: impl Into<String>,
        scope: ViolationScope,
        message: impl Into<String>,
        severity: Severity,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            scope,
            message: message.into(),
            severity,
        }
    }

    /// Whether this violation blocks a submission
    pub fn is_blocking(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl PartialOrd for Violation {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Rule, then scope; the remaining fields keep the order consistent with `Eq`
impl Ord for Violation {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rule_id
            .cmp(&other.rule_id)
            .then_with(|| self.scope.cmp(&other.scope))
            .then_with(|| self.severity.cmp(&other.severity))
            .then_with(|| self.message.cmp(&other.message))
    }
}
