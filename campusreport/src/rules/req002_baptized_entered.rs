//! REQ002: Number baptized must be entered
//!
//! Zero cannot be told apart from "not entered", so it is rejected.

use super::{FormRule, RuleCategory};
use crate::form::{FormState, fields};
use crate::violation::{Severity, Violation, ViolationScope};

pub struct BaptizedEnteredRule;

impl FormRule for BaptizedEnteredRule {
    fn id(&self) -> &str {
        "REQ002"
    }

    fn name(&self) -> &str {
        "Baptized count entered"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Required
    }

    fn check(&self, state: &FormState) -> Vec<Violation> {
        if state.count(fields::BAPTIZED) != 0 {
            return Vec::new();
        }
        vec![Violation::new(
            self.id(),
            ViolationScope::field(fields::BAPTIZED),
            "Enter the number baptized.",
            Severity::Error,
        )]
    }
}
