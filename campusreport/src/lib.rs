//! campusreport: Core library for campus attendance and membership reporting
//!
//! This library loads the region/campus reference table, collects and validates
//! report forms, and appends each accepted record as one row of a remote worksheet.

pub mod config;
pub mod connection;
pub mod error;
pub mod form;
pub mod reference;
pub mod rules;
pub mod store;
pub mod submit;
pub mod violation;

use chrono::NaiveDateTime;
use std::sync::Arc;

pub use config::ReportConfig;
pub use connection::ConnectionProvider;
pub use error::{ConnectionError, FormError, ReferenceError, ValidationError, WriteError};
pub use form::{FieldInput, Form, FormKind, FormSpec, FormState, Session};
pub use reference::{Encoding, RegionIndex};
pub use rules::{FormRule, Validator};
pub use store::{CellValue, RemoteStore, Worksheet};
pub use submit::{SubmitOutcome, Submitter};
pub use violation::{Severity, Violation, ViolationScope};

/// Main reporting interface
pub struct Reporter {
    config: ReportConfig,
    connections: Option<ConnectionProvider>,
}

impl Reporter {
    /// Create a reporter with default configuration
    pub fn new() -> Self {
        Self::with_config(ReportConfig::default())
    }

    /// Create a reporter whose store is built from configuration on first use
    pub fn with_config(config: ReportConfig) -> Self {
        Self {
            config,
            connections: None,
        }
    }

    /// Create a reporter on an already constructed store
    pub fn with_store(config: ReportConfig, store: Box<dyn RemoteStore>) -> Self {
        let connections = ConnectionProvider::new(store, &config.store);
        Self {
            config,
            connections: Some(connections),
        }
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Load the region/campus table named in configuration
    pub fn load_reference(&self) -> Result<RegionIndex, ReferenceError> {
        let encoding = Encoding::parse(&self.config.reference.encoding)?;
        reference::load(&self.config.reference.path, encoding)
    }

    /// Form description for the given year, honoring form options
    pub fn form_spec(&self, kind: FormKind, year: i32) -> FormSpec {
        FormSpec::new(kind, year, self.config.weekly_breakdown())
    }

    pub fn validator(&self, spec: &FormSpec) -> Validator {
        Validator::for_form(spec, &self.config)
    }

    /// Worksheet handle of a form, connecting on first use
    pub fn connect(&mut self, kind: FormKind) -> Result<Arc<dyn Worksheet>, ConnectionError> {
        let connections = match self.connections.take() {
            Some(connections) => connections,
            None => {
                let store = store::from_config(&self.config.store)?;
                ConnectionProvider::new(store, &self.config.store)
            }
        };
        self.connections.insert(connections).get(kind)
    }

    /// Forget the cached handle of a form
    pub fn invalidate(&mut self, kind: FormKind) {
        if let Some(connections) = self.connections.as_mut() {
            connections.invalidate(kind);
        }
    }

    /// Validate, connect and append one record.
    ///
    /// Blocked records never connect; a connection failure leaves the state untouched.
    pub fn submit(
        &mut self,
        spec: &FormSpec,
        state: &mut FormState,
        now: NaiveDateTime,
    ) -> Result<SubmitOutcome, ConnectionError> {
        let validator = self.validator(spec);
        if let Err(err) = validator.validate(state) {
            return Ok(SubmitOutcome::Blocked(err.0));
        }

        let sheet = self.connect(spec.kind)?;
        Ok(Submitter::new(spec, &validator).submit(state, sheet.as_ref(), now))
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new()
    }
}
