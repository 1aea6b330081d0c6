//! SEL002: Campus must be selected

use super::{FormRule, RuleCategory};
use crate::form::{FormState, fields};
use crate::violation::{Severity, Violation, ViolationScope};

pub struct CampusSelectedRule;

impl FormRule for CampusSelectedRule {
    fn id(&self) -> &str {
        "SEL002"
    }

    fn name(&self) -> &str {
        "Campus selected"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Selection
    }

    fn check(&self, state: &FormState) -> Vec<Violation> {
        if !state.is_unset(fields::CAMPUS) {
            return Vec::new();
        }
        vec![Violation::new(
            self.id(),
            ViolationScope::field(fields::CAMPUS),
            "Select a Campus.",
            Severity::Error,
        )]
    }
}
