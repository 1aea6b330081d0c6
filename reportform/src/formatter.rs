//! Output formatters for submission reports

use anyhow::Result;
use clap::ValueEnum;
use campusreport::{CellValue, FormSpec, Severity, SubmitOutcome, Violation, ViolationScope};
use colored::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON output for scripting
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Submitted,
    Blocked,
    Failed,
    Preview,
}

/// Result of one submit attempt, ready to print
#[derive(Debug, Serialize)]
pub struct Report {
    pub form: &'static str,
    pub status: Status,
    pub headers: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<Vec<CellValue>>,
    pub violations: Vec<Violation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip)]
    labels: BTreeMap<&'static str, &'static str>,
}

impl Report {
    fn new(spec: &FormSpec, status: Status) -> Self {
        Self {
            form: spec.kind.key(),
            status,
            headers: spec.headers(),
            row: None,
            violations: Vec::new(),
            error: None,
            labels: spec.fields.iter().map(|f| (f.id, f.label)).collect(),
        }
    }

    pub fn from_outcome(spec: &FormSpec, outcome: SubmitOutcome) -> Self {
        match outcome {
            SubmitOutcome::Submitted { row, warnings } => Self {
                row: Some(row),
                violations: warnings,
                ..Self::new(spec, Status::Submitted)
            },
            SubmitOutcome::Blocked(violations) => Self {
                violations,
                ..Self::new(spec, Status::Blocked)
            },
            SubmitOutcome::Failed(err) => Self {
                error: Some(err.to_string()),
                ..Self::new(spec, Status::Failed)
            },
        }
    }

    /// The worksheet could not be opened
    pub fn unreachable(spec: &FormSpec, error: &anyhow::Error) -> Self {
        Self {
            error: Some(format!("{:#}", error)),
            ..Self::new(spec, Status::Failed)
        }
    }

    /// Dry run: the row that would be appended and every violation
    pub fn preview(spec: &FormSpec, row: Vec<CellValue>, violations: Vec<Violation>) -> Self {
        let status = if violations.iter().any(Violation::is_blocking) {
            Status::Blocked
        } else {
            Status::Preview
        };
        Self {
            row: Some(row),
            violations,
            ..Self::new(spec, status)
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, Status::Submitted | Status::Preview)
    }

    fn label(&self, scope: &ViolationScope) -> String {
        match scope.field_id() {
            Some(id) => self.labels.get(id).copied().unwrap_or(id).to_string(),
            None => "Record".to_string(),
        }
    }
}

pub fn write_report<W: Write>(out: &mut W, report: &Report, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Human => write_human(out, report),
        OutputFormat::Json => write_json(out, report),
    }
}

/// Write a report in human-readable format with colors
pub fn write_human<W: Write>(out: &mut W, report: &Report) -> Result<()> {
    let title = format!("Form: {}", report.form);
    writeln!(out, "{}", title.bold())?;

    match report.status {
        Status::Submitted => writeln!(out, "{}", "✓ Row appended".green().bold())?,
        Status::Preview => writeln!(out, "{}", "✓ Row is ready (dry run, nothing appended)".green().bold())?,
        Status::Blocked => writeln!(out, "{}", "✗ Submission blocked".red().bold())?,
        Status::Failed => writeln!(out, "{}", "✗ Submission failed, your entries were kept".red().bold())?,
    }
    if let Some(error) = &report.error {
        writeln!(out, "  {}", error.red())?;
    }

    if let Some(row) = &report.row {
        writeln!(out)?;
        for (header, cell) in report.headers.iter().zip(row) {
            writeln!(out, "  {} {}", format!("{:<16}", header).bright_black(), cell)?;
        }
    }

    if report.violations.is_empty() {
        return Ok(());
    }

    // Field violations grouped under their label, record-level ones last
    let mut grouped: BTreeMap<&ViolationScope, Vec<&Violation>> = BTreeMap::new();
    for violation in &report.violations {
        grouped.entry(&violation.scope).or_default().push(violation);
    }

    writeln!(out)?;
    for (scope, violations) in &grouped {
        writeln!(out, "{} {}", "Field:".bold(), report.label(scope).cyan().bold())?;
        for violation in violations {
            write_violation(out, violation, 1)?;
        }
    }

    let error_count = report
        .violations
        .iter()
        .filter(|v| v.severity == Severity::Error)
        .count();
    let warning_count = report
        .violations
        .iter()
        .filter(|v| v.severity == Severity::Warning)
        .count();

    writeln!(out, "{}", "Summary:".bold().underline())?;
    if error_count > 0 {
        writeln!(out, "  {} {}", "Errors:".red().bold(), error_count)?;
    }
    if warning_count > 0 {
        writeln!(out, "  {} {}", "Warnings:".yellow().bold(), warning_count)?;
    }
    Ok(())
}

/// Write one violation, used for inline feedback while filling the form
pub fn write_violation<W: Write>(out: &mut W, violation: &Violation, indent: usize) -> Result<()> {
    let indent_str = "  ".repeat(indent);
    let severity_str = match violation.severity {
        Severity::Error => "ERROR".red().bold(),
        Severity::Warning => "WARN".yellow().bold(),
    };

    writeln!(
        out,
        "{}{} [{}] {}",
        indent_str,
        severity_str,
        violation.rule_id.bright_black(),
        violation.message
    )?;
    Ok(())
}

/// Write a report in JSON format
pub fn write_json<W: Write>(out: &mut W, report: &Report) -> Result<()> {
    let output = serde_json::json!({
        "report": report,
        "summary": {
            "errors": report.violations.iter().filter(|v| v.severity == Severity::Error).count(),
            "warnings": report.violations.iter().filter(|v| v.severity == Severity::Warning).count(),
        }
    });

    writeln!(out, "{}", serde_json::to_string_pretty(&output)?)?;
    Ok(())
}
