//! Transient form state and the input step that updates it

use super::{FieldKind, FieldSpec, FormKind, FormSpec, fields, name};
use crate::error::FormError;
use crate::reference::{RegionIndex, UNSET};
use crate::rules::name001_name_format::NameFormatRule;
use crate::violation::Violation;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::warn;

/// Current value of one field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Choice(String),
    Text(String),
    Count(u32),
    Amount(Decimal),
}

impl FieldValue {
    fn default_for(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Region | FieldKind::Campus | FieldKind::Period => {
                FieldValue::Choice(UNSET.to_string())
            }
            FieldKind::Name => FieldValue::Text(String::new()),
            FieldKind::Count => FieldValue::Count(0),
            FieldKind::Amount => FieldValue::Amount(Decimal::ZERO),
        }
    }
}

/// One user interaction with the form
#[derive(Debug, Clone, PartialEq)]
pub enum FieldInput {
    Select { field: String, option: String },
    Text { field: String, value: String },
    Count { field: String, value: u32 },
    Amount { field: String, value: Decimal },
}

impl FieldInput {
    pub fn select(field: impl Into<String>, option: impl Into<String>) -> Self {
        FieldInput::Select {
            field: field.into(),
            option: option.into(),
        }
    }

    pub fn text(field: impl Into<String>, value: impl Into<String>) -> Self {
        FieldInput::Text {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn count(field: impl Into<String>, value: u32) -> Self {
        FieldInput::Count {
            field: field.into(),
            value,
        }
    }

    pub fn amount(field: impl Into<String>, value: Decimal) -> Self {
        FieldInput::Amount {
            field: field.into(),
            value,
        }
    }

    pub fn field(&self) -> &str {
        match self {
            FieldInput::Select { field, .. }
            | FieldInput::Text { field, .. }
            | FieldInput::Count { field, .. }
            | FieldInput::Amount { field, .. } => field,
        }
    }
}

/// Values entered into one form during one submission attempt
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormState {
    kind: FormKind,
    values: BTreeMap<&'static str, FieldValue>,
    /// Last name text exactly as entered
    raw_name: String,
}

impl FormState {
    /// Fresh state with every field at its default
    pub fn new(spec: &FormSpec) -> Self {
        let values = spec
            .fields
            .iter()
            .map(|f| (f.id, FieldValue::default_for(f.kind)))
            .collect();
        Self {
            kind: spec.kind,
            values,
            raw_name: String::new(),
        }
    }

    pub fn kind(&self) -> FormKind {
        self.kind
    }

    pub fn value(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    /// Selected option, or the placeholder when unset or not a select
    pub fn choice(&self, field: &str) -> &str {
        match self.values.get(field) {
            Some(FieldValue::Choice(c)) => c,
            _ => UNSET,
        }
    }

    pub fn is_unset(&self, field: &str) -> bool {
        self.choice(field) == UNSET
    }

    pub fn count(&self, field: &str) -> u32 {
        match self.values.get(field) {
            Some(FieldValue::Count(n)) => *n,
            _ => 0,
        }
    }

    pub fn amount(&self, field: &str) -> Decimal {
        match self.values.get(field) {
            Some(FieldValue::Amount(a)) => *a,
            _ => Decimal::ZERO,
        }
    }

    /// Stored normalized name
    pub fn name(&self) -> &str {
        match self.values.get(fields::NAME) {
            Some(FieldValue::Text(t)) => t,
            _ => "",
        }
    }

    pub fn raw_name(&self) -> &str {
        &self.raw_name
    }

    /// Sum of the given count fields
    pub fn total(&self, ids: &[&str]) -> u64 {
        ids.iter().map(|id| u64::from(self.count(id))).sum()
    }

    /// Whether every field is back at its default
    pub fn is_pristine(&self, spec: &FormSpec) -> bool {
        *self == FormState::new(spec)
    }

    /// Return every field to its default
    pub fn reset(&mut self, spec: &FormSpec) {
        *self = FormState::new(spec);
    }

    fn set(&mut self, field: &'static str, value: FieldValue) {
        self.values.insert(field, value);
    }
}

/// Outcome of one input step
#[must_use]
#[derive(Debug)]
pub struct Step {
    pub state: FormState,
    /// Non-blocking feedback, such as a badly formatted name
    pub warnings: Vec<Violation>,
    /// Set when the input was rejected; the state is then unchanged
    pub error: Option<FormError>,
}

/// A form spec bound to the reference data of the current render
#[derive(Debug, Clone, Copy)]
pub struct Form<'a> {
    pub spec: &'a FormSpec,
    pub index: &'a RegionIndex,
}

impl<'a> Form<'a> {
    pub fn new(spec: &'a FormSpec, index: &'a RegionIndex) -> Self {
        Self { spec, index }
    }

    /// Fresh state for this form
    pub fn blank(&self) -> FormState {
        FormState::new(self.spec)
    }

    /// Options of a select field given the current state, placeholder first
    pub fn options(&self, state: &FormState, field: &str) -> Vec<String> {
        match self.spec.field(field).map(|f| f.kind) {
            Some(FieldKind::Region) => self.index.region_options(),
            Some(FieldKind::Campus) => self.index.campus_options(state.choice(fields::REGION)),
            Some(FieldKind::Period) => {
                let mut options = vec![UNSET.to_string()];
                options.extend(self.spec.periods.iter().cloned());
                options
            }
            _ => Vec::new(),
        }
    }

    /// Apply one input and hand the state back with any feedback
    pub fn step(&self, mut state: FormState, input: FieldInput) -> Step {
        match self.apply(&mut state, input) {
            Ok(warnings) => Step {
                state,
                warnings,
                error: None,
            },
            Err(error) => Step {
                state,
                warnings: Vec::new(),
                error: Some(error),
            },
        }
    }

    /// Apply one input in place. On error the state is left untouched.
    pub fn apply(&self, state: &mut FormState, input: FieldInput) -> Result<Vec<Violation>, FormError> {
        let spec = self.field_spec(input.field())?;

        match (spec.kind, input) {
            (kind, FieldInput::Select { option, .. }) if kind.is_select() => {
                let options = self.options(state, spec.id);
                if !options.contains(&option) {
                    return Err(FormError::NotAnOption {
                        field: spec.id.to_string(),
                        value: option,
                    });
                }
                if kind == FieldKind::Region && state.choice(fields::REGION) != option {
                    state.set(fields::CAMPUS, FieldValue::Choice(UNSET.to_string()));
                }
                state.set(spec.id, FieldValue::Choice(option));
                Ok(Vec::new())
            }
            (FieldKind::Name, FieldInput::Text { value, .. }) => Ok(self.apply_name(state, value)),
            (FieldKind::Count, FieldInput::Count { value, .. }) => {
                state.set(spec.id, FieldValue::Count(value));
                Ok(Vec::new())
            }
            (FieldKind::Amount, FieldInput::Amount { value, .. }) => {
                if value < Decimal::ZERO {
                    return Err(FormError::InvalidNumber {
                        field: spec.id.to_string(),
                        value: value.to_string(),
                    });
                }
                state.set(spec.id, FieldValue::Amount(value));
                Ok(Vec::new())
            }
            _ => Err(FormError::WrongKind {
                field: spec.id.to_string(),
            }),
        }
    }

    /// Apply text typed by a user, parsed according to the field kind
    pub fn apply_raw(&self, state: &mut FormState, field: &str, raw: &str) -> Result<Vec<Violation>, FormError> {
        let input = self.parse_input(field, raw)?;
        self.apply(state, input)
    }

    /// Turn typed text into an input for the given field
    pub fn parse_input(&self, field: &str, raw: &str) -> Result<FieldInput, FormError> {
        let spec = self.field_spec(field)?;
        let invalid = || FormError::InvalidNumber {
            field: spec.id.to_string(),
            value: raw.to_string(),
        };

        match spec.kind {
            FieldKind::Region | FieldKind::Campus | FieldKind::Period => {
                Ok(FieldInput::select(spec.id, raw.trim()))
            }
            FieldKind::Name => Ok(FieldInput::text(spec.id, raw)),
            FieldKind::Count => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Ok(FieldInput::count(spec.id, 0));
                }
                trimmed
                    .parse::<u32>()
                    .map(|n| FieldInput::count(spec.id, n))
                    .map_err(|_| invalid())
            }
            FieldKind::Amount => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Ok(FieldInput::amount(spec.id, Decimal::ZERO));
                }
                match trimmed.parse::<Decimal>() {
                    Ok(v) if v >= Decimal::ZERO => Ok(FieldInput::amount(spec.id, v)),
                    _ => Err(invalid()),
                }
            }
        }
    }

    fn field_spec(&self, field: &str) -> Result<&'a FieldSpec, FormError> {
        self.spec
            .field(field)
            .ok_or_else(|| FormError::UnknownField(field.to_string()))
    }

    // A badly formatted name warns and keeps the previously stored name.
    fn apply_name(&self, state: &mut FormState, raw: String) -> Vec<Violation> {
        if raw.is_empty() {
            state.raw_name = raw;
            return Vec::new();
        }

        let normalized = name::normalize(&raw);
        state.raw_name = raw;
        if name::is_well_formed(&normalized) {
            state.set(fields::NAME, FieldValue::Text(normalized));
            Vec::new()
        } else {
            warn!(form = state.kind().key(), "badly formatted name, keeping the previous one");
            vec![NameFormatRule::warning()]
        }
    }
}

/// All form states of one user session
#[derive(Debug, Clone)]
pub struct Session {
    /// Form currently picked in the chooser
    pub chooser: FormKind,
    forms: HashMap<FormKind, FormState>,
}

impl Session {
    pub fn new(chooser: FormKind) -> Self {
        Self {
            chooser,
            forms: HashMap::new(),
        }
    }

    /// State of the given form, created on first use
    pub fn state(&mut self, spec: &FormSpec) -> &mut FormState {
        self.forms
            .entry(spec.kind)
            .or_insert_with(|| FormState::new(spec))
    }

    /// Take the state out for a render cycle
    pub fn take(&mut self, spec: &FormSpec) -> FormState {
        self.forms
            .remove(&spec.kind)
            .unwrap_or_else(|| FormState::new(spec))
    }

    /// Put the state back after a render cycle
    pub fn put(&mut self, state: FormState) {
        self.forms.insert(state.kind(), state);
    }

    /// Run one input step against the stored state of the form
    pub fn step(&mut self, form: &Form<'_>, input: FieldInput) -> (Vec<Violation>, Option<FormError>) {
        let state = self.take(form.spec);
        let step = form.step(state, input);
        self.put(step.state);
        (step.warnings, step.error)
    }

    /// Reset only the given form
    pub fn reset(&mut self, spec: &FormSpec) {
        self.forms.insert(spec.kind, FormState::new(spec));
    }
}
