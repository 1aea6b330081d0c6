//! XF001: Low-week attendance cannot exceed high-week attendance

use super::{FormRule, RuleCategory};
use crate::form::{FormState, fields};
use crate::violation::{Severity, Violation, ViolationScope};

pub struct LowWeekWithinHighWeekRule;

impl FormRule for LowWeekWithinHighWeekRule {
    fn id(&self) -> &str {
        "XF001"
    }

    fn name(&self) -> &str {
        "Low week within high week"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::CrossField
    }

    fn check(&self, state: &FormState) -> Vec<Violation> {
        let high = state.total(&fields::HIGH_WEEK);
        let low = state.total(&fields::LOW_WEEK);
        if low <= high {
            return Vec::new();
        }
        vec![Violation::new(
            self.id(),
            ViolationScope::Record,
            format!(
                "Low-week attendance ({}) is greater than high-week attendance ({}).",
                low, high
            ),
            Severity::Error,
        )]
    }
}
