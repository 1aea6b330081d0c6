//! Row assembly and the single append per submit action

use crate::error::WriteError;
use crate::form::{Column, FieldValue, FormSpec, FormState};
use crate::rules::Validator;
use crate::store::{CellValue, Worksheet};
use crate::violation::Violation;
use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

/// Timestamp layout of the first column, seconds precision
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Result of one submit action
#[derive(Debug)]
pub enum SubmitOutcome {
    /// The row was appended and the form state reset
    Submitted {
        row: Vec<CellValue>,
        warnings: Vec<Violation>,
    },
    /// Validation failed; nothing was appended
    Blocked(Vec<Violation>),
    /// The append call failed; the form state is kept for a retry
    Failed(WriteError),
}

impl SubmitOutcome {
    pub fn is_submitted(&self) -> bool {
        matches!(self, SubmitOutcome::Submitted { .. })
    }
}

/// Validates and appends the records of one form
pub struct Submitter<'a> {
    spec: &'a FormSpec,
    validator: &'a Validator,
}

impl<'a> Submitter<'a> {
    pub fn new(spec: &'a FormSpec, validator: &'a Validator) -> Self {
        Self { spec, validator }
    }

    /// Validate, append exactly once, and reset the state on success.
    ///
    /// There is no retry and no idempotency key: resubmitting after a write
    /// failure that actually reached the store produces a duplicate row.
    pub fn submit(&self, state: &mut FormState, sheet: &dyn Worksheet, now: NaiveDateTime) -> SubmitOutcome {
        let warnings = match self.validator.validate(state) {
            Ok(warnings) => warnings,
            Err(err) => {
                debug!(form = state.kind().key(), violations = err.0.len(), "submission blocked");
                return SubmitOutcome::Blocked(err.0);
            }
        };

        let row = preview(self.spec, state, now);
        match sheet.append_row(&row) {
            Ok(()) => {
                info!(form = state.kind().key(), worksheet = sheet.title(), "row appended");
                state.reset(self.spec);
                SubmitOutcome::Submitted { row, warnings }
            }
            Err(err) => {
                warn!(form = state.kind().key(), error = %err, "append failed");
                SubmitOutcome::Failed(err)
            }
        }
    }
}

/// Build the row in worksheet column order without validating it
pub fn preview(spec: &FormSpec, state: &FormState, now: NaiveDateTime) -> Vec<CellValue> {
    spec.columns
        .iter()
        .map(|column| match column {
            Column::Timestamp => CellValue::Text(now.format(TIMESTAMP_FORMAT).to_string()),
            Column::Field(id) => match state.value(id) {
                Some(FieldValue::Choice(s)) | Some(FieldValue::Text(s)) => CellValue::Text(s.clone()),
                Some(FieldValue::Count(n)) => CellValue::Int(i64::from(*n)),
                Some(FieldValue::Amount(a)) => CellValue::Amount(*a),
                None => CellValue::Text(String::new()),
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReportConfig;
    use crate::form::fields;
    use crate::rules::test_support::*;
    use crate::store::{MemoryStore, RemoteStore};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 31)
            .unwrap()
            .and_hms_opt(18, 5, 9)
            .unwrap()
    }

    fn store() -> MemoryStore {
        MemoryStore::new()
            .with_worksheet("campus_data", "atten")
            .with_worksheet("campus_data", "mem")
    }

    #[test]
    fn test_membership_row_order() {
        let (spec, state) = valid_membership();
        let row = preview(&spec, &state, now());
        assert_eq!(
            row,
            vec![
                CellValue::text("2025-03-31T18:05:09"),
                CellValue::text("South"),
                CellValue::text("Gamma"),
                CellValue::text("Q1 2025"),
                CellValue::Int(10),
                CellValue::Int(0),
                CellValue::Int(0),
                CellValue::Int(0),
                CellValue::Int(0),
                CellValue::Int(3),
                CellValue::text("Kofi"),
            ]
        );
    }

    #[test]
    fn test_submit_appends_once_and_resets() {
        let (spec, mut state) = valid_attendance();
        let validator = Validator::for_form(&spec, &ReportConfig::default());
        let store = store();
        let sheet = store.open("campus_data", "atten").unwrap();

        let outcome = Submitter::new(&spec, &validator).submit(&mut state, sheet.as_ref(), now());
        assert!(outcome.is_submitted());
        assert!(state.is_pristine(&spec));

        let rows = store.rows("campus_data", "atten");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), spec.columns.len());
        assert_eq!(rows[0][1], CellValue::text("North"));
        assert_eq!(rows[0][19], CellValue::Amount(Decimal::new(500, 1)));
        assert_eq!(rows[0][20], CellValue::text("Ama Mensah"));
    }

    #[test]
    fn test_blocked_submit_keeps_state() {
        let (spec, mut state) = valid_attendance();
        set(&spec, &mut state, fields::LOW_BROTHERS, "100");
        let before = state.clone();
        let validator = Validator::for_form(&spec, &ReportConfig::default());
        let store = store();
        let sheet = store.open("campus_data", "atten").unwrap();

        let outcome = Submitter::new(&spec, &validator).submit(&mut state, sheet.as_ref(), now());
        match outcome {
            SubmitOutcome::Blocked(violations) => {
                let ids: Vec<_> = violations.iter().map(|v| v.rule_id.as_str()).collect();
                assert_eq!(ids, ["XF001", "XF002"]);
            }
            other => panic!("expected blocked, got {other:?}"),
        }
        assert_eq!(state, before);
        assert!(store.rows("campus_data", "atten").is_empty());
    }

    #[test]
    fn test_failed_write_keeps_state() {
        let (spec, mut state) = valid_membership();
        let before = state.clone();
        let validator = Validator::for_form(&spec, &ReportConfig::default());
        let store = store();
        let sheet = store.open("campus_data", "mem").unwrap();
        store.fail_next_append("backend unavailable");

        let submitter = Submitter::new(&spec, &validator);
        let outcome = submitter.submit(&mut state, sheet.as_ref(), now());
        assert!(matches!(outcome, SubmitOutcome::Failed(WriteError::Transport(_))));
        assert_eq!(state, before);
        assert!(store.rows("campus_data", "mem").is_empty());

        // Retry with the retained values
        assert!(submitter.submit(&mut state, sheet.as_ref(), now()).is_submitted());
        assert_eq!(store.rows("campus_data", "mem").len(), 1);
    }

    #[test]
    fn test_warnings_are_reported_on_success() {
        let (spec, mut state) = valid_membership();
        set(&spec, &mut state, fields::NAME, "k0fi");
        let validator = Validator::for_form(&spec, &ReportConfig::default());
        let store = store();
        let sheet = store.open("campus_data", "mem").unwrap();

        match Submitter::new(&spec, &validator).submit(&mut state, sheet.as_ref(), now()) {
            SubmitOutcome::Submitted { row, warnings } => {
                assert_eq!(warnings.len(), 1);
                assert_eq!(row.last(), Some(&CellValue::text("Kofi")));
            }
            other => panic!("expected submitted, got {other:?}"),
        }
    }
}
