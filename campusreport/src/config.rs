//! Configuration for forms, rules, reference data and the remote store

use crate::form::FormKind;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the configuration file picked up from the working directory
pub const DEFAULT_CONFIG_FILE: &str = "campusreport.toml";

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub global: GlobalConfig,
    /// Per-form overrides keyed by form key ("attendance", "membership")
    #[serde(default)]
    pub forms: HashMap<String, FormConfig>,
    #[serde(default)]
    pub reference: ReferenceConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

impl ReportConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: ReportConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load the given file, or the default file if it exists, or defaults
    pub fn discover(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(&default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Check if a rule is enabled globally
    pub fn is_rule_enabled(&self, rule_id: &str) -> bool {
        if self
            .global
            .disabled_rules
            .iter()
            .any(|selector| matches_rule_selector(selector, rule_id))
        {
            return false;
        }

        if self.global.enabled_rules.is_empty() {
            return true;
        }

        self.global
            .enabled_rules
            .iter()
            .any(|selector| matches_rule_selector(selector, rule_id))
    }

    /// Check if a rule is enabled for a specific form
    pub fn is_rule_enabled_for_form(&self, rule_id: &str, kind: FormKind) -> bool {
        if !self.is_rule_enabled(rule_id) {
            return false;
        }

        if let Some(form_config) = self.forms.get(kind.key()) {
            if form_config
                .disabled_rules
                .iter()
                .any(|selector| matches_rule_selector(selector, rule_id))
            {
                return false;
            }
        }

        true
    }

    /// Validate rule selectors against a set of valid tokens
    pub fn validate_rules(&self, valid_tokens: &HashSet<String>) -> Result<()> {
        for rule in &self.global.disabled_rules {
            if rule == "ALL" {
                anyhow::bail!("Configuration error: 'ALL' is not allowed in global disabled_rules");
            }
            if !valid_tokens.contains(rule) {
                anyhow::bail!(
                    "Configuration error: Unknown rule or category '{}' in global disabled_rules",
                    rule
                );
            }
        }

        for rule in &self.global.enabled_rules {
            if !valid_tokens.contains(rule) {
                anyhow::bail!(
                    "Configuration error: Unknown rule or category '{}' in global enabled_rules",
                    rule
                );
            }
        }

        for (form_key, form_config) in &self.forms {
            if FormKind::from_key(form_key).is_none() {
                anyhow::bail!("Configuration error: Unknown form '{}'", form_key);
            }
            for rule in &form_config.disabled_rules {
                if !valid_tokens.contains(rule) {
                    anyhow::bail!(
                        "Configuration error: Unknown rule or category '{}' in form '{}' disabled_rules",
                        rule,
                        form_key
                    );
                }
            }
        }

        Ok(())
    }

    /// Get a parameter value as boolean with fallback chain: form -> global
    pub fn get_param_bool(&self, key: &str, kind: Option<FormKind>) -> Option<bool> {
        if let Some(form) = kind.and_then(|k| self.forms.get(k.key())) {
            if let Some(value) = form.params.get(key).and_then(|v| v.as_bool()) {
                return Some(value);
            }
        }

        self.global.params.get(key).and_then(|v| v.as_bool())
    }

    /// Whether the attendance form collects the high/low week breakdown
    pub fn weekly_breakdown(&self) -> bool {
        self.get_param_bool("weekly_breakdown", Some(FormKind::Attendance))
            .unwrap_or(true)
    }
}

/// Global configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// List of enabled rules (empty means all enabled)
    #[serde(default)]
    pub enabled_rules: HashSet<String>,
    /// List of disabled rules
    #[serde(default)]
    pub disabled_rules: HashSet<String>,
    #[serde(flatten)]
    pub params: HashMap<String, toml::Value>,
}

/// Form-specific configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormConfig {
    /// Rules disabled for this form
    #[serde(default)]
    pub disabled_rules: HashSet<String>,
    #[serde(flatten)]
    pub params: HashMap<String, toml::Value>,
}

/// Location and encoding of the region/campus table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceConfig {
    #[serde(default = "default_reference_path")]
    pub path: PathBuf,
    #[serde(default = "default_encoding")]
    pub encoding: String,
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            path: default_reference_path(),
            encoding: default_encoding(),
        }
    }
}

fn default_reference_path() -> PathBuf {
    PathBuf::from("data/campus.csv")
}

fn default_encoding() -> String {
    "latin1".to_string()
}

/// Which remote store implementation to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Spreadsheet service over HTTP
    #[default]
    Sheets,
    /// Local directory of CSV worksheets
    Csv,
}

/// Remote store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    #[serde(default = "default_spreadsheet")]
    pub spreadsheet: String,
    #[serde(default = "default_attendance_worksheet")]
    pub attendance_worksheet: String,
    #[serde(default = "default_membership_worksheet")]
    pub membership_worksheet: String,
    /// Environment variable holding the bearer token
    #[serde(default = "default_token_env")]
    pub token_env: String,
    #[serde(default = "default_csv_dir")]
    pub csv_dir: PathBuf,
    /// Request timeout; the transport default applies when unset
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub sheets_base_url: Option<String>,
    #[serde(default)]
    pub drive_base_url: Option<String>,
}

impl StoreConfig {
    pub fn worksheet_for(&self, kind: FormKind) -> &str {
        match kind {
            FormKind::Attendance => &self.attendance_worksheet,
            FormKind::Membership => &self.membership_worksheet,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            spreadsheet: default_spreadsheet(),
            attendance_worksheet: default_attendance_worksheet(),
            membership_worksheet: default_membership_worksheet(),
            token_env: default_token_env(),
            csv_dir: default_csv_dir(),
            timeout_secs: None,
            sheets_base_url: None,
            drive_base_url: None,
        }
    }
}

fn default_spreadsheet() -> String {
    "campus_data".to_string()
}

fn default_attendance_worksheet() -> String {
    "atten".to_string()
}

fn default_membership_worksheet() -> String {
    "mem".to_string()
}

fn default_token_env() -> String {
    "SHEETS_ACCESS_TOKEN".to_string()
}

fn default_csv_dir() -> PathBuf {
    PathBuf::from("sheets")
}

fn matches_rule_selector(selector: &str, rule_id: &str) -> bool {
    if selector == "ALL" {
        return true;
    }
    rule_id == selector || rule_id.starts_with(selector)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_matching() {
        assert!(matches_rule_selector("ALL", "SEL001"));
        assert!(matches_rule_selector("XF", "XF002"));
        assert!(matches_rule_selector("REQ002", "REQ002"));
        assert!(!matches_rule_selector("XF", "SEL001"));
        assert!(!matches_rule_selector("REQ003", "REQ002"));
    }

    #[test]
    fn test_rule_activation() {
        let mut config = ReportConfig::default();
        assert!(config.is_rule_enabled("XF001"));

        config.global.disabled_rules.insert("XF".to_string());
        assert!(!config.is_rule_enabled("XF001"));
        assert!(!config.is_rule_enabled("XF002"));
        assert!(config.is_rule_enabled("SEL001"));

        config.global.disabled_rules.clear();
        config.global.enabled_rules.insert("SEL".to_string());
        assert!(config.is_rule_enabled("SEL003"));
        assert!(!config.is_rule_enabled("REQ001"));
    }

    #[test]
    fn test_form_override() {
        let toml = r#"
            [forms.attendance]
            disabled_rules = ["REQ003"]
            weekly_breakdown = false
        "#;
        let config: ReportConfig = toml::from_str(toml).unwrap();
        assert!(!config.is_rule_enabled_for_form("REQ003", FormKind::Attendance));
        assert!(config.is_rule_enabled_for_form("REQ003", FormKind::Membership));
        assert!(!config.weekly_breakdown());
    }

    #[test]
    fn test_validation() {
        let config = ReportConfig::default();
        let mut tokens = HashSet::new();
        tokens.insert("ALL".to_string());
        tokens.insert("SEL".to_string());
        tokens.insert("SEL001".to_string());

        assert!(config.validate_rules(&tokens).is_ok());

        let mut bad_config = config.clone();
        bad_config.global.disabled_rules.insert("ALL".to_string());
        assert!(bad_config.validate_rules(&tokens).is_err());

        let mut bad_config = config.clone();
        bad_config.global.enabled_rules.insert("XYZ".to_string());
        assert!(bad_config.validate_rules(&tokens).is_err());

        let mut bad_config = config.clone();
        bad_config
            .forms
            .insert("payroll".to_string(), FormConfig::default());
        assert!(bad_config.validate_rules(&tokens).is_err());
    }

    #[test]
    fn test_store_defaults() {
        let config: ReportConfig = toml::from_str("[store]\nbackend = \"csv\"\n").unwrap();
        assert_eq!(config.store.backend, StoreBackend::Csv);
        assert_eq!(config.store.spreadsheet, "campus_data");
        assert_eq!(config.store.worksheet_for(FormKind::Attendance), "atten");
        assert_eq!(config.store.worksheet_for(FormKind::Membership), "mem");
        assert_eq!(config.reference.encoding, "latin1");
    }
}
