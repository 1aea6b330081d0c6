//! REQ003: Offering amount must be entered

use super::{FormRule, RuleCategory};
use crate::form::{FormState, fields};
use crate::violation::{Severity, Violation, ViolationScope};

pub struct OfferingEnteredRule;

impl FormRule for OfferingEnteredRule {
    fn id(&self) -> &str {
        "REQ003"
    }

    fn name(&self) -> &str {
        "Offering entered"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Required
    }

    fn check(&self, state: &FormState) -> Vec<Violation> {
        if !state.amount(fields::OFFERING).is_zero() {
            return Vec::new();
        }
        vec![Violation::new(
            self.id(),
            ViolationScope::field(fields::OFFERING),
            "Enter the offering amount.",
            Severity::Error,
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::*;

    #[test]
    fn test_zero_offering() {
        let (spec, mut state) = valid_attendance();
        assert!(OfferingEnteredRule.check(&state).is_empty());

        set(&spec, &mut state, fields::OFFERING, "0.00");
        assert_eq!(OfferingEnteredRule.check(&state).len(), 1);

        set(&spec, &mut state, fields::OFFERING, "0.5");
        assert!(OfferingEnteredRule.check(&state).is_empty());
    }
}
