//! Memoized worksheet connections, one per form kind

use crate::config::StoreConfig;
use crate::error::ConnectionError;
use crate::form::FormKind;
use crate::store::{RemoteStore, Worksheet};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Owns the store and caches at most one handle per form kind.
///
/// Failed connections are not cached; the next `get` tries again.
pub struct ConnectionProvider {
    store: Box<dyn RemoteStore>,
    spreadsheet: String,
    worksheets: HashMap<FormKind, String>,
    cache: HashMap<FormKind, Arc<dyn Worksheet>>,
}

impl ConnectionProvider {
    pub fn new(store: Box<dyn RemoteStore>, config: &StoreConfig) -> Self {
        let worksheets = FormKind::ALL
            .into_iter()
            .map(|kind| (kind, config.worksheet_for(kind).to_string()))
            .collect();
        Self {
            store,
            spreadsheet: config.spreadsheet.clone(),
            worksheets,
            cache: HashMap::new(),
        }
    }

    /// Handle for the worksheet of `kind`, connecting on first use
    pub fn get(&mut self, kind: FormKind) -> Result<Arc<dyn Worksheet>, ConnectionError> {
        if let Some(handle) = self.cache.get(&kind) {
            return Ok(Arc::clone(handle));
        }

        let worksheet = self.worksheet_name(kind);
        match self.store.open(&self.spreadsheet, worksheet) {
            Ok(handle) => {
                info!(spreadsheet = %self.spreadsheet, worksheet, "network active");
                self.cache.insert(kind, Arc::clone(&handle));
                Ok(handle)
            }
            Err(err) => {
                warn!(spreadsheet = %self.spreadsheet, worksheet, error = %err, "connection failed");
                Err(err)
            }
        }
    }

    /// Drop the cached handle so the next `get` reconnects
    pub fn invalidate(&mut self, kind: FormKind) {
        self.cache.remove(&kind);
    }

    pub fn is_connected(&self, kind: FormKind) -> bool {
        self.cache.contains_key(&kind)
    }

    pub fn worksheet_name(&self, kind: FormKind) -> &str {
        self.worksheets.get(&kind).map(String::as_str).unwrap_or_default()
    }
}
