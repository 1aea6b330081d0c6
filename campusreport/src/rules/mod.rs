//! Submission rule system

pub mod registry;

// Rule implementations
pub mod name001_name_format;
pub mod req001_name_entered;
pub mod req002_baptized_entered;
pub mod req003_offering_entered;
pub mod sel001_region_selected;
pub mod sel002_campus_selected;
pub mod sel003_period_selected;
pub mod xf001_low_week_within_high_week;
pub mod xf002_weekly_totals_within_month;

use crate::config::ReportConfig;
use crate::error::ValidationError;
use crate::form::{FormSpec, FormState};
use crate::violation::Violation;

/// Trait that all submission rules must implement
pub trait FormRule: Send + Sync {
    /// Unique rule identifier (e.g., "SEL001")
    fn id(&self) -> &str;

    /// Human-readable rule name
    fn name(&self) -> &str;

    /// Rule category
    fn category(&self) -> RuleCategory;

    /// Check the entered values for violations
    fn check(&self, state: &FormState) -> Vec<Violation>;
}

/// Rule categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleCategory {
    Selection,
    Required,
    CrossField,
    Format,
}

impl RuleCategory {
    pub fn as_str(&self) -> &str {
        match self {
            RuleCategory::Selection => "Selection",
            RuleCategory::Required => "Required",
            RuleCategory::CrossField => "Cross-field",
            RuleCategory::Format => "Format",
        }
    }

    /// Rule id prefix of the category
    pub fn prefix(&self) -> &'static str {
        match self {
            RuleCategory::Selection => "SEL",
            RuleCategory::Required => "REQ",
            RuleCategory::CrossField => "XF",
            RuleCategory::Format => "NAME",
        }
    }
}

/// Runs every enabled rule of one form
pub struct Validator {
    rules: Vec<Box<dyn FormRule>>,
}

impl Validator {
    /// Validator with the rules of `spec` that `config` leaves enabled
    pub fn for_form(spec: &FormSpec, config: &ReportConfig) -> Self {
        Self {
            rules: registry::create_enabled_rules(spec, config),
        }
    }

    pub fn rule_ids(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.id()).collect()
    }

    /// Every violation of every rule; rules never short-circuit each other
    pub fn check(&self, state: &FormState) -> Vec<Violation> {
        let mut violations: Vec<Violation> = self
            .rules
            .iter()
            .flat_map(|rule| rule.check(state))
            .collect();
        violations.sort();
        violations
    }

    /// Ok with the non-blocking warnings, or every violation when any blocks
    pub fn validate(&self, state: &FormState) -> Result<Vec<Violation>, ValidationError> {
        let violations = self.check(state);
        if violations.iter().any(Violation::is_blocking) {
            Err(ValidationError(violations))
        } else {
            Ok(violations)
        }
    }
}
