//! SEL001: Region must be selected

use super::{FormRule, RuleCategory};
use crate::form::{FormState, fields};
use crate::violation::{Severity, Violation, ViolationScope};

pub struct RegionSelectedRule;

impl FormRule for RegionSelectedRule {
    fn id(&self) -> &str {
        "SEL001"
    }

    fn name(&self) -> &str {
        "Region selected"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Selection
    }

    fn check(&self, state: &FormState) -> Vec<Violation> {
        if !state.is_unset(fields::REGION) {
            return Vec::new();
        }
        vec![Violation::new(
            self.id(),
            ViolationScope::field(fields::REGION),
            "Select a Region.",
            Severity::Error,
        )]
    }
}
