//! Rule registry for managing and creating rule instances

use super::*;
use crate::config::ReportConfig;
use std::collections::HashSet;

/// Get all valid configuration tokens (Rule IDs, Category Prefixes, "ALL")
pub fn get_all_valid_tokens() -> HashSet<String> {
    let mut tokens = HashSet::new();
    tokens.insert("ALL".to_string());

    for rule in create_all_rules() {
        tokens.insert(rule.category().prefix().to_string());
        tokens.insert(rule.id().to_string());
    }

    tokens
}

/// Create the rules of a form that configuration leaves enabled
pub fn create_enabled_rules(spec: &FormSpec, config: &ReportConfig) -> Vec<Box<dyn FormRule>> {
    create_all_rules()
        .into_iter()
        .filter(|rule| spec.has_rule(rule.id()))
        .filter(|rule| config.is_rule_enabled_for_form(rule.id(), spec.kind))
        .collect()
}

/// Create instances of all available rules
pub fn create_all_rules() -> Vec<Box<dyn FormRule>> {
    vec![
        Box::new(sel001_region_selected::RegionSelectedRule),
        Box::new(sel002_campus_selected::CampusSelectedRule),
        Box::new(sel003_period_selected::PeriodSelectedRule),
        Box::new(req001_name_entered::NameEnteredRule),
        Box::new(req002_baptized_entered::BaptizedEnteredRule),
        Box::new(req003_offering_entered::OfferingEnteredRule),
        Box::new(xf001_low_week_within_high_week::LowWeekWithinHighWeekRule),
        Box::new(xf002_weekly_totals_within_month::WeeklyTotalsWithinMonthRule),
        Box::new(name001_name_format::NameFormatRule),
    ]
}
