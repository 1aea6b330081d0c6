use anyhow::{Context, Result};
use campusreport::rules::registry;
use campusreport::{Form, FormKind, ReportConfig, Reporter, Session, submit};
use chrono::{Datelike, Local, NaiveDateTime};
use clap::{Parser, ValueEnum};
use formatter::{OutputFormat, Report};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod formatter;
mod interactive;
mod values;

#[derive(Parser)]
#[command(name = "reportform")]
#[command(about = "Fill in and submit campus attendance and membership reports", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to configuration file (TOML)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Form to fill in; the chooser is shown when omitted
    #[arg(long, value_enum)]
    form: Option<FormArg>,

    /// Fill the form from a JSON object of field id to value and submit once
    #[arg(long, value_name = "FILE", requires = "form")]
    values: Option<PathBuf>,

    /// Validate and preview the row without connecting
    #[arg(long)]
    dry_run: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "human")]
    format: OutputFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormArg {
    /// Quarterly membership counts
    Membership,
    /// Monthly attendance
    Attendance,
}

impl From<FormArg> for FormKind {
    fn from(arg: FormArg) -> Self {
        match arg {
            FormArg::Membership => FormKind::Membership,
            FormArg::Attendance => FormKind::Attendance,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    // Load configuration
    let config = ReportConfig::discover(cli.config.as_deref()).context("Failed to load configuration")?;

    // Validate configuration
    let valid_tokens = registry::get_all_valid_tokens();
    config
        .validate_rules(&valid_tokens)
        .context("Invalid configuration")?;

    let reference_path = config.reference.path.clone();
    let mut reporter = Reporter::with_config(config);
    let index = reporter
        .load_reference()
        .with_context(|| format!("Failed to load reference data from {}", reference_path.display()))?;

    let success = match &cli.values {
        Some(path) => {
            let kind = cli.form.map(FormKind::from).context("--values requires --form")?;
            run_values(&mut reporter, &index, kind, path, &cli)?
        }
        None => {
            let stdin = io::stdin();
            let mut prompter = interactive::Prompter::new(stdin.lock(), prompt_writer(cli.format));
            let kind = match cli.form {
                Some(form) => FormKind::from(form),
                None => match prompter.choose_form()? {
                    Some(kind) => kind,
                    None => return Ok(()),
                },
            };

            let spec = reporter.form_spec(kind, Local::now().year());
            let form = Form::new(&spec, &index);
            let mut session = Session::new(kind);
            let options = interactive::RunOptions {
                dry_run: cli.dry_run,
                format: cli.format,
            };
            let end = interactive::run(
                &mut prompter,
                &mut io::stdout(),
                &mut reporter,
                &form,
                &mut session,
                &options,
                now,
            )?;
            debug!(?end, "session finished");
            !end.is_failure()
        }
    };

    // Exit with appropriate code
    std::process::exit(if success { 0 } else { 1 });
}

fn run_values(
    reporter: &mut Reporter,
    index: &campusreport::RegionIndex,
    kind: FormKind,
    path: &Path,
    cli: &Cli,
) -> Result<bool> {
    let spec = reporter.form_spec(kind, Local::now().year());
    let form = Form::new(&spec, index);
    let values = values::load(path)?;

    let mut state = form.blank();
    let warnings = values::apply(&form, &mut state, &values)?;
    debug!(form = kind.key(), warnings = warnings.len(), "values applied");

    let report = if cli.dry_run {
        let violations = reporter.validator(&spec).check(&state);
        Report::preview(&spec, submit::preview(&spec, &state, now()), violations)
    } else {
        let outcome = reporter
            .submit(&spec, &mut state, now())
            .with_context(|| format!("Failed to open the {} worksheet", kind.key()))?;
        Report::from_outcome(&spec, outcome)
    };

    formatter::write_report(&mut io::stdout(), &report, cli.format)?;
    Ok(report.is_success())
}

// JSON reports own stdout, so prompts move to stderr
fn prompt_writer(format: OutputFormat) -> Box<dyn Write> {
    match format {
        OutputFormat::Human => Box::new(io::stdout()),
        OutputFormat::Json => Box::new(io::stderr()),
    }
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

// Logs go to stderr so that JSON on stdout stays parseable
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_values_requires_form() {
        assert!(Cli::try_parse_from(["reportform", "--values", "v.json"]).is_err());
        let cli = Cli::try_parse_from(["reportform", "--form", "membership", "--values", "v.json", "-f", "json"])
            .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
    }
}
