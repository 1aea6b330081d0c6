//! SEL003: Reporting period must be selected

use super::{FormRule, RuleCategory};
use crate::form::{FormKind, FormState, fields};
use crate::violation::{Severity, Violation, ViolationScope};

pub struct PeriodSelectedRule;

impl FormRule for PeriodSelectedRule {
    fn id(&self) -> &str {
        "SEL003"
    }

    fn name(&self) -> &str {
        "Period selected"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Selection
    }

    fn check(&self, state: &FormState) -> Vec<Violation> {
        if !state.is_unset(fields::PERIOD) {
            return Vec::new();
        }
        let message = match state.kind() {
            FormKind::Attendance => "Select the month.",
            FormKind::Membership => "Select the period.",
        };
        vec![Violation::new(
            self.id(),
            ViolationScope::field(fields::PERIOD),
            message,
            Severity::Error,
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::*;

    #[test]
    fn test_message_follows_form() {
        let (spec, mut state) = valid_attendance();
        set(&spec, &mut state, fields::PERIOD, "Select");
        assert_eq!(PeriodSelectedRule.check(&state)[0].message, "Select the month.");

        let (spec, mut state) = valid_membership();
        assert!(PeriodSelectedRule.check(&state).is_empty());
        set(&spec, &mut state, fields::PERIOD, "Select");
        assert_eq!(PeriodSelectedRule.check(&state)[0].message, "Select the period.");
    }
}
