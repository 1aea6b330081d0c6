//! Interactive prompt loop over any line reader and writer

use crate::formatter::{self, OutputFormat, Report, Status};
use anyhow::{Context, Result};
use campusreport::form::{FieldKind, FieldSpec, FieldValue};
use campusreport::{Form, FormKind, FormState, Reporter, Session, submit};
use chrono::NaiveDateTime;
use colored::*;
use std::io::{BufRead, Write};

/// What the user picked in the menu after filling the form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Submit,
    /// Index into the form's field list
    Edit(usize),
    Quit,
}

/// How an interactive session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    Submitted,
    Previewed,
    /// Quit before a successful submit; `failed` when an attempt was rejected
    Abandoned { failed: bool },
}

impl SessionEnd {
    pub fn is_failure(&self) -> bool {
        matches!(self, SessionEnd::Abandoned { failed: true })
    }
}

pub struct RunOptions {
    pub dry_run: bool,
    pub format: OutputFormat,
}

pub struct Prompter<R, W> {
    input: R,
    out: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, out: W) -> Self {
        Self { input, out }
    }

    // None at end of input
    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.out, "{}: ", prompt)?;
        self.out.flush()?;
        self.read_line()
    }

    /// The form chooser. None when input ends.
    pub fn choose_form(&mut self) -> Result<Option<FormKind>> {
        writeln!(self.out, "{}", "Select a form".bold())?;
        for (i, kind) in FormKind::ALL.iter().enumerate() {
            writeln!(self.out, "  {}) {}", i + 1, kind.title())?;
        }

        loop {
            let Some(answer) = self.ask("Form")? else {
                return Ok(None);
            };
            let answer = answer.trim();
            let picked = pick_number(answer, FormKind::ALL.len())
                .map(|i| FormKind::ALL[i])
                .or_else(|| FormKind::from_key(answer));
            match picked {
                Some(kind) => return Ok(Some(kind)),
                None => writeln!(self.out, "Choose 1-{}", FormKind::ALL.len())?,
            }
        }
    }

    /// Prompt every field in form order. Returns false when input ends.
    pub fn fill(&mut self, form: &Form<'_>, state: &mut FormState) -> Result<bool> {
        writeln!(self.out, "{}", form.spec.kind.title().bold().underline())?;

        let mut section = None;
        let mut summary_shown = false;
        for field in &form.spec.fields {
            if !summary_shown && matches!(field.kind, FieldKind::Count | FieldKind::Amount) {
                writeln!(self.out, "{}", form.spec.summary_heading.bold())?;
                summary_shown = true;
            }
            if field.section != section {
                if let Some(heading) = field.section {
                    writeln!(self.out, "{}", heading.cyan())?;
                }
                section = field.section;
            }
            if !self.prompt_field(form, state, field)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Prompt one field until it is accepted. An empty answer keeps the current value.
    pub fn prompt_field(&mut self, form: &Form<'_>, state: &mut FormState, field: &FieldSpec) -> Result<bool> {
        loop {
            let options = form.options(state, field.id);
            if field.kind.is_select() {
                // Only the placeholder
                if options.len() < 2 {
                    writeln!(self.out, "{}: no options yet, choose a Region first", field.label)?;
                    return Ok(true);
                }
                for (i, option) in options.iter().enumerate().skip(1) {
                    writeln!(self.out, "  {}) {}", i, option)?;
                }
            }

            let prompt = format!("{} [{}]", field.label, current_value(state, field));
            let Some(answer) = self.ask(&prompt)? else {
                return Ok(false);
            };
            if answer.trim().is_empty() {
                return Ok(true);
            }

            let raw = if field.kind.is_select() {
                match pick_number(answer.trim(), options.len() - 1) {
                    Some(i) => options[i + 1].clone(),
                    None => answer.trim().to_string(),
                }
            } else {
                answer
            };

            match form.apply_raw(state, field.id, &raw) {
                Ok(warnings) => {
                    for warning in &warnings {
                        formatter::write_violation(&mut self.out, warning, 1)?;
                    }
                    return Ok(true);
                }
                Err(err) => writeln!(self.out, "  {}", err.to_string().red())?,
            }
        }
    }

    pub fn menu(&mut self, form: &Form<'_>) -> Result<Action> {
        loop {
            let Some(answer) = self.ask("[s]ubmit, [e]dit a field, [q]uit")? else {
                return Ok(Action::Quit);
            };
            match answer.trim().to_ascii_lowercase().as_str() {
                "s" | "submit" => return Ok(Action::Submit),
                "q" | "quit" => return Ok(Action::Quit),
                "e" | "edit" => {
                    for (i, field) in form.spec.fields.iter().enumerate() {
                        writeln!(self.out, "  {}) {}", i + 1, field_title(field))?;
                    }
                    let Some(choice) = self.ask("Field")? else {
                        return Ok(Action::Quit);
                    };
                    match pick_number(choice.trim(), form.spec.fields.len()) {
                        Some(i) => return Ok(Action::Edit(i)),
                        None => writeln!(self.out, "No such field")?,
                    }
                }
                _ => writeln!(self.out, "Please answer s, e or q")?,
            }
        }
    }
}

/// Fill, review and submit one form until it is appended or the user quits.
///
/// The worksheet is opened before the first prompt unless this is a dry run.
/// Prompts go to the prompter's writer and submit reports to `report_out`.
/// The state lives in `session` between attempts, so a rejected or failed
/// submit never loses what was entered.
pub fn run<R: BufRead, W: Write, O: Write>(
    prompter: &mut Prompter<R, W>,
    report_out: &mut O,
    reporter: &mut Reporter,
    form: &Form<'_>,
    session: &mut Session,
    options: &RunOptions,
    clock: impl Fn() -> NaiveDateTime,
) -> Result<SessionEnd> {
    if !options.dry_run {
        let kind = form.spec.kind;
        reporter
            .connect(kind)
            .with_context(|| format!("Failed to open the {} worksheet", kind.key()))?;
    }

    let mut state = session.take(form.spec);
    let end = drive(prompter, report_out, reporter, form, &mut state, options, clock);
    session.put(state);
    end
}

fn drive<R: BufRead, W: Write, O: Write>(
    prompter: &mut Prompter<R, W>,
    report_out: &mut O,
    reporter: &mut Reporter,
    form: &Form<'_>,
    state: &mut FormState,
    options: &RunOptions,
    clock: impl Fn() -> NaiveDateTime,
) -> Result<SessionEnd> {
    if !prompter.fill(form, state)? {
        return Ok(SessionEnd::Abandoned { failed: false });
    }

    let mut failed = false;
    loop {
        match prompter.menu(form)? {
            Action::Quit => return Ok(SessionEnd::Abandoned { failed }),
            Action::Edit(i) => {
                if let Some(field) = form.spec.fields.get(i) {
                    if !prompter.prompt_field(form, state, field)? {
                        return Ok(SessionEnd::Abandoned { failed });
                    }
                }
            }
            Action::Submit => {
                let report = if options.dry_run {
                    let violations = reporter.validator(form.spec).check(state);
                    Report::preview(form.spec, submit::preview(form.spec, state, clock()), violations)
                } else {
                    match reporter.submit(form.spec, state, clock()) {
                        Ok(outcome) => Report::from_outcome(form.spec, outcome),
                        Err(err) => {
                            let err = anyhow::Error::new(err);
                            Report::unreachable(form.spec, &err.context("Failed to open the worksheet"))
                        }
                    }
                };
                formatter::write_report(report_out, &report, options.format)
                    .context("Failed to write the report")?;
                report_out.flush()?;

                if report.is_success() {
                    return Ok(if options.dry_run {
                        SessionEnd::Previewed
                    } else {
                        SessionEnd::Submitted
                    });
                }
                failed = true;
                if report.status == Status::Failed {
                    reporter.invalidate(form.spec.kind);
                    writeln!(prompter.out, "Choose submit to retry.")?;
                }
            }
        }
    }
}

// 1-based answer to a 0-based index below `len`
fn pick_number(answer: &str, len: usize) -> Option<usize> {
    answer
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .filter(|&i| i < len)
}

fn current_value(state: &FormState, field: &FieldSpec) -> String {
    match state.value(field.id) {
        Some(FieldValue::Choice(s)) | Some(FieldValue::Text(s)) => s.clone(),
        Some(FieldValue::Count(n)) => n.to_string(),
        Some(FieldValue::Amount(a)) => a.to_string(),
        None => String::new(),
    }
}

fn field_title(field: &FieldSpec) -> String {
    match field.section {
        Some(section) => format!("{} / {}", section, field.label),
        None => field.label.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campusreport::form::fields;
    use campusreport::store::MemoryStore;
    use campusreport::{CellValue, FormSpec, RegionIndex, ReportConfig};
    use chrono::NaiveDate;
    use std::io::Cursor;

    fn index() -> RegionIndex {
        RegionIndex::from_pairs([("North", "Alpha"), ("North", "Beta"), ("South", "Gamma")])
    }

    fn clock() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 4, 2)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    fn options() -> RunOptions {
        RunOptions {
            dry_run: false,
            format: OutputFormat::Human,
        }
    }

    fn store() -> MemoryStore {
        MemoryStore::new().with_worksheet("campus_data", "mem")
    }

    // region, campus, period, name, then six counts
    const MEMBERSHIP_ANSWERS: &str = "1\n2\n1\nkofi\n10\n\n\n\n\n3\n";

    struct Transcript {
        end: Result<SessionEnd>,
        session: Session,
        prompts: String,
        report: String,
    }

    fn transcript(input: &str, store: &MemoryStore, options: RunOptions) -> Transcript {
        let spec = FormSpec::membership(2025);
        let index = index();
        let form = Form::new(&spec, &index);
        let mut reporter = Reporter::with_store(ReportConfig::default(), Box::new(store.clone()));
        let mut session = Session::new(FormKind::Membership);

        let mut prompts = Vec::new();
        let mut report = Vec::new();
        let mut prompter = Prompter::new(Cursor::new(input.to_string()), &mut prompts);
        let end = run(&mut prompter, &mut report, &mut reporter, &form, &mut session, &options, clock);
        drop(prompter);
        Transcript {
            end,
            session,
            prompts: String::from_utf8(prompts).unwrap(),
            report: String::from_utf8(report).unwrap(),
        }
    }

    // Prompts followed by reports
    fn session_run(input: &str, store: &MemoryStore, options: RunOptions) -> (SessionEnd, Session, String) {
        let t = transcript(input, store, options);
        (t.end.unwrap(), t.session, t.prompts + &t.report)
    }

    #[test]
    fn test_fill_and_submit() {
        let store = store();
        let input = format!("{}s\n", MEMBERSHIP_ANSWERS);
        let (end, mut session, out) = session_run(&input, &store, options());

        assert_eq!(end, SessionEnd::Submitted);
        let rows = store.rows("campus_data", "mem");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][1], CellValue::text("North"));
        assert_eq!(rows[0][2], CellValue::text("Beta"));
        assert_eq!(rows[0][3], CellValue::text("Q1 2025"));
        assert_eq!(rows[0][4], CellValue::Int(10));
        assert_eq!(rows[0][9], CellValue::Int(3));
        assert_eq!(rows[0][10], CellValue::text("Kofi"));
        assert!(out.contains("Row appended"));

        let spec = FormSpec::membership(2025);
        assert!(session.state(&spec).is_pristine(&spec));
    }

    #[test]
    fn test_blocked_then_edit_and_resubmit() {
        let store = store();
        // Skip the region, so the campus has no options either
        let input = "\n1\nkofi\n\n\n\n\n\n\ns\ne\n1\n2\ne\n2\n1\ns\n";
        let (end, _, out) = session_run(input, &store, options());

        assert!(out.contains("Submission blocked"));
        assert!(out.contains("SEL001"));
        assert!(out.contains("choose a Region first"));
        assert_eq!(end, SessionEnd::Submitted);
        let rows = store.rows("campus_data", "mem");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][1], CellValue::text("South"));
        assert_eq!(rows[0][2], CellValue::text("Gamma"));
    }

    #[test]
    fn test_failed_write_keeps_values_for_retry() {
        let store = store();
        store.fail_next_append("backend unavailable");
        let input = format!("{}s\ns\n", MEMBERSHIP_ANSWERS);
        let (end, _, out) = session_run(&input, &store, options());

        assert!(out.contains("backend unavailable"));
        assert!(out.contains("retry"));
        assert_eq!(end, SessionEnd::Submitted);
        assert_eq!(store.rows("campus_data", "mem").len(), 1);
    }

    #[test]
    fn test_quit_after_failure_is_reported() {
        let store = store();
        // The campus is skipped while no region is chosen
        let input = "\n\n\n\n\n\n\n\n\ns\nq\n";
        let (end, mut session, _) = session_run(input, &store, options());

        assert!(end.is_failure());
        assert!(store.rows("campus_data", "mem").is_empty());
        let spec = FormSpec::membership(2025);
        assert!(session.state(&spec).is_pristine(&spec));
    }

    #[test]
    fn test_invalid_answers_are_asked_again() {
        let store = store();
        let input = format!("9\nEast\n{}q\n", MEMBERSHIP_ANSWERS);
        let (end, mut session, out) = session_run(&input, &store, options());

        assert!(out.contains("not an option"));
        assert_eq!(end, SessionEnd::Abandoned { failed: false });
        let spec = FormSpec::membership(2025);
        let state = session.state(&spec);
        assert_eq!(state.choice(fields::REGION), "North");
        assert_eq!(state.count(fields::BROTHERS), 10);
    }

    #[test]
    fn test_name_warning_is_shown_inline() {
        let store = store();
        let input = format!("{}e\n4\nk0fi\nq\n", MEMBERSHIP_ANSWERS);
        let (end, mut session, out) = session_run(&input, &store, options());

        assert!(out.contains("NAME001"));
        assert_eq!(end, SessionEnd::Abandoned { failed: false });
        let spec = FormSpec::membership(2025);
        assert_eq!(session.state(&spec).name(), "Kofi");
    }

    #[test]
    fn test_dry_run_does_not_connect() {
        let store = store();
        let input = format!("{}s\n", MEMBERSHIP_ANSWERS);
        let dry_run = RunOptions {
            dry_run: true,
            format: OutputFormat::Json,
        };
        let (end, _, out) = session_run(&input, &store, dry_run);

        assert_eq!(end, SessionEnd::Previewed);
        assert_eq!(store.open_count(), 0);
        assert!(out.contains("\"status\": \"preview\""));
    }

    #[test]
    fn test_json_report_is_separate_from_prompts() {
        let store = store();
        let input = format!("{}s\n", MEMBERSHIP_ANSWERS);
        let json = RunOptions {
            dry_run: false,
            format: OutputFormat::Json,
        };
        let t = transcript(&input, &store, json);

        assert_eq!(t.end.unwrap(), SessionEnd::Submitted);
        assert!(t.prompts.contains("Region ["));
        assert!(!t.prompts.contains("\"status\""));
        let report: serde_json::Value = serde_json::from_str(&t.report).unwrap();
        assert_eq!(report["report"]["status"], "submitted");
    }

    #[test]
    fn test_missing_worksheet_fails_before_prompting() {
        let store = MemoryStore::new().with_worksheet("campus_data", "atten");
        let input = format!("{}s\n", MEMBERSHIP_ANSWERS);
        let t = transcript(&input, &store, options());

        let err = t.end.unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to open the membership worksheet"));
        assert!(t.prompts.is_empty());
        assert!(t.report.is_empty());
    }

    #[test]
    fn test_choose_form() {
        let mut out = Vec::new();
        let mut prompter = Prompter::new(Cursor::new("3\nattendance\n"), &mut out);
        assert_eq!(prompter.choose_form().unwrap(), Some(FormKind::Attendance));

        let mut prompter = Prompter::new(Cursor::new("1\n"), &mut out);
        assert_eq!(prompter.choose_form().unwrap(), Some(FormKind::Membership));

        let mut prompter = Prompter::new(Cursor::new(""), &mut out);
        assert_eq!(prompter.choose_form().unwrap(), None);
    }
}
