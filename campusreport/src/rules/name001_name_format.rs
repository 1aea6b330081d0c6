//! NAME001: Names contain only letters, spaces and hyphens
//!
//! Non-blocking. The stored name keeps its last well-formed value.

use super::{FormRule, RuleCategory};
use crate::form::{FormState, fields, name};
use crate::violation::{Severity, Violation, ViolationScope};

pub struct NameFormatRule;

impl NameFormatRule {
    pub const ID: &'static str = "NAME001";

    /// The warning raised for a badly formatted name
    pub fn warning() -> Violation {
        Violation::new(
            Self::ID,
            ViolationScope::field(fields::NAME),
            "Names should only contain letters, spaces, or hyphens (-).",
            Severity::Warning,
        )
    }
}

impl FormRule for NameFormatRule {
    fn id(&self) -> &str {
        Self::ID
    }

    fn name(&self) -> &str {
        "Name format"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Format
    }

    fn check(&self, state: &FormState) -> Vec<Violation> {
        let raw = state.raw_name();
        if raw.is_empty() || name::is_well_formed(&name::normalize(raw)) {
            return Vec::new();
        }
        vec![Self::warning()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::*;

    #[test]
    fn test_latest_input_is_checked() {
        let (spec, mut state) = valid_membership();
        assert!(NameFormatRule.check(&state).is_empty());

        set(&spec, &mut state, fields::NAME, "kofi 2");
        let violations = NameFormatRule.check(&state);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].severity, Severity::Warning);
        assert_eq!(state.name(), "Kofi");

        set(&spec, &mut state, fields::NAME, "kofi annan");
        assert!(NameFormatRule.check(&state).is_empty());
        assert_eq!(state.name(), "Kofi Annan");
    }
}
