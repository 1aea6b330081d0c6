//! XF002: High and low week together cannot exceed the month total

use super::{FormRule, RuleCategory};
use crate::form::{FormState, fields};
use crate::violation::{Severity, Violation, ViolationScope};

pub struct WeeklyTotalsWithinMonthRule;

impl FormRule for WeeklyTotalsWithinMonthRule {
    fn id(&self) -> &str {
        "XF002"
    }

    fn name(&self) -> &str {
        "Weekly totals within month"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::CrossField
    }

    fn check(&self, state: &FormState) -> Vec<Violation> {
        let weeks = state.total(&fields::HIGH_WEEK) + state.total(&fields::LOW_WEEK);
        let overall = state.total(&fields::OVERALL);
        if weeks <= overall {
            return Vec::new();
        }
        vec![Violation::new(
            self.id(),
            ViolationScope::Record,
            format!(
                "High and low week attendance ({}) is greater than the month total ({}).",
                weeks, overall
            ),
            Severity::Error,
        )]
    }
}
