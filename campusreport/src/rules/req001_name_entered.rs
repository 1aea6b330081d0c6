//! REQ001: Submitter name must be entered

use super::{FormRule, RuleCategory};
use crate::form::{FormState, fields};
use crate::violation::{Severity, Violation, ViolationScope};

pub struct NameEnteredRule;

impl FormRule for NameEnteredRule {
    fn id(&self) -> &str {
        "REQ001"
    }

    fn name(&self) -> &str {
        "Name entered"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Required
    }

    fn check(&self, state: &FormState) -> Vec<Violation> {
        if !state.name().trim().is_empty() {
            return Vec::new();
        }
        vec![Violation::new(
            self.id(),
            ViolationScope::field(fields::NAME),
            "Enter your Name.",
            Severity::Error,
        )]
    }
}
