use crate::errors::Result;
use crate::host::Registry;
use crate::suite::Suite;
use crate::unit::{Outcome, Phase};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::io::{self, Write};
use std::panic::{self, PanicHookInfo};
use std::process::ExitCode;
use tracing::{info, Level};

/// How a report is written out.
///
/// Same values as libtest's `--format`, so `cargo test -- --format terse`
/// reaches every target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Format {
    #[default]
    Pretty,
    /// Summary line only
    Terse,
    Json,
}

/// Command line of a `harness = false` test target.
#[derive(Parser, Debug, Clone)]
#[command(about = "Run a context suite")]
pub struct RunArgs {
    /// Only run tests whose name contains this string
    pub filter: Option<String>,
    /// Match the filter and skip patterns against the whole name
    #[arg(long)]
    pub exact: bool,
    /// Leave out tests whose name contains this string (repeatable)
    #[arg(long, value_name = "PATTERN")]
    pub skip: Vec<String>,
    /// List test names instead of running them
    #[arg(long)]
    pub list: bool,
    /// Output format of the report
    #[arg(long, value_enum, default_value_t = Format::Pretty)]
    pub format: Format,
    /// Most verbose log level written to stderr
    #[arg(long, default_value = "warn")]
    pub log_level: Level,
    /// Only print the summary line
    #[arg(short, long)]
    pub quiet: bool,
    /// Let panic messages of failing tests through to stderr
    #[arg(long)]
    pub nocapture: bool,

    // libtest flags that `cargo test -- ...` forwards to every target. They
    // are accepted and have no effect: units run one after another, pending
    // tests never run, and output is not coloured.
    #[arg(long, hide = true)]
    pub test_threads: Option<usize>,
    #[arg(long, hide = true)]
    pub ignored: bool,
    #[arg(long, hide = true)]
    pub include_ignored: bool,
    #[arg(long, hide = true)]
    pub show_output: bool,
    #[arg(long, hide = true, value_name = "WHEN")]
    pub color: Option<String>,
}

/// Which units a run selects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunConfig {
    pub filter: Option<String>,
    pub skip: Vec<String>,
    pub exact: bool,
}

impl From<&RunArgs> for RunConfig {
    fn from(args: &RunArgs) -> Self {
        Self {
            filter: args.filter.clone(),
            skip: args.skip.clone(),
            exact: args.exact,
        }
    }
}

impl RunConfig {
    pub fn selects(&self, name: &str) -> bool {
        let included = match &self.filter {
            None => true,
            Some(filter) => self.matches(name, filter),
        };
        included && !self.skip.iter().any(|pattern| self.matches(name, pattern))
    }

    fn matches(&self, name: &str, pattern: &str) -> bool {
        if self.exact {
            name == pattern
        } else {
            name.contains(pattern)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    pub name: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

/// Outcome of every selected unit, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    pub entries: Vec<ReportEntry>,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub filtered_out: usize,
}

impl Report {
    fn record(&mut self, name: &str, outcome: Outcome) {
        match outcome {
            Outcome::Passed => self.passed += 1,
            Outcome::Failed { .. } => self.failed += 1,
            Outcome::Skipped { .. } => self.skipped += 1,
        }
        self.entries.push(ReportEntry {
            name: name.to_string(),
            outcome,
        });
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    pub fn outcome(&self, name: &str) -> Option<&Outcome> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| &entry.outcome)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn write_pretty(&self, out: &mut dyn Write, quiet: bool) -> io::Result<()> {
        if !quiet {
            for entry in &self.entries {
                match &entry.outcome {
                    Outcome::Passed => writeln!(out, "{} ... ok", entry.name)?,
                    Outcome::Skipped { reason } => {
                        writeln!(out, "{} ... skipped, {reason}", entry.name)?
                    }
                    Outcome::Failed { phase, message } => writeln!(
                        out,
                        "{} ... FAILED in {}: {message}",
                        entry.name,
                        phase_label(*phase)
                    )?,
                }
            }
            writeln!(out)?;
        }
        let status = if self.is_success() { "ok" } else { "FAILED" };
        writeln!(
            out,
            "test result: {status}. {} passed; {} failed; {} skipped; {} filtered out",
            self.passed, self.failed, self.skipped, self.filtered_out
        )
    }
}

fn phase_label(phase: Phase) -> &'static str {
    match phase {
        Phase::Setup => "setup",
        Phase::Body => "body",
        Phase::Teardown => "teardown",
    }
}

/// Executes registered units, one fresh scope per unit.
pub struct Runner<S> {
    config: RunConfig,
    factory: Box<dyn Fn() -> S>,
}

impl<S: Default + 'static> Default for Runner<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Default + 'static> Runner<S> {
    pub fn new() -> Self {
        Self::with_factory(S::default)
    }
}

impl<S> Runner<S> {
    pub fn with_factory<F>(factory: F) -> Self
    where
        F: Fn() -> S + 'static,
    {
        Self {
            config: RunConfig::default(),
            factory: Box::new(factory),
        }
    }

    pub fn with_config(mut self, config: RunConfig) -> Self {
        self.config = config;
        self
    }

    pub fn run(&self, registry: &Registry<S>) -> Report {
        let mut report = Report::default();
        for unit in registry.iter() {
            if !self.config.selects(unit.name()) {
                report.filtered_out += 1;
                continue;
            }
            let mut scope = (self.factory)();
            let outcome = unit.execute(&mut scope);
            report.record(unit.name(), outcome);
        }
        info!(
            passed = report.passed,
            failed = report.failed,
            skipped = report.skipped,
            filtered_out = report.filtered_out,
            "suite run finished"
        );
        report
    }
}

/// Swaps in a silent panic hook until dropped.
///
/// Failures are already carried in each [`Outcome`]; without this every
/// failing assertion would also print a panic block into the report. The
/// hook is process-wide, so only single-threaded entry points install it.
pub struct SilencedPanics {
    previous: Option<Box<dyn Fn(&PanicHookInfo<'_>) + Sync + Send + 'static>>,
}

impl SilencedPanics {
    pub fn install() -> Self {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(|_| {}));
        Self {
            previous: Some(previous),
        }
    }
}

impl Drop for SilencedPanics {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            panic::set_hook(previous);
        }
    }
}

/// Run `registry` as `args` asks and write the result to `out`.
///
/// Returns whether the run succeeded.
pub fn run_with_args<S: Default + 'static>(
    registry: &Registry<S>,
    args: &RunArgs,
    out: &mut dyn Write,
) -> io::Result<bool> {
    let config = RunConfig::from(args);
    if args.list {
        for name in registry.names().into_iter().filter(|name| config.selects(name)) {
            writeln!(out, "{name}")?;
        }
        return Ok(true);
    }

    let report = Runner::new().with_config(config).run(registry);
    match args.format {
        Format::Pretty => report.write_pretty(out, args.quiet)?,
        Format::Terse => report.write_pretty(out, true)?,
        Format::Json => {
            let json = report.to_json().map_err(io::Error::other)?;
            writeln!(out, "{json}")?;
        }
    }
    Ok(report.is_success())
}

/// Entry point for a `harness = false` test target.
///
/// ```no_run
/// use std::process::ExitCode;
///
/// #[derive(Default)]
/// struct World;
///
/// fn main() -> ExitCode {
///     context_suite::harness_main::<World, _>(|s| {
///         s.test("runs", |_| {});
///         Ok(())
///     })
/// }
/// ```
pub fn harness_main<S, F>(declare: F) -> ExitCode
where
    S: Default + 'static,
    F: FnOnce(&mut Suite<S>) -> Result<()>,
{
    let args = RunArgs::parse();
    let _ = tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();

    let registry = match Suite::build(declare) {
        Ok(registry) => registry,
        Err(err) => {
            eprintln!("failed to load suite: {err}");
            return ExitCode::FAILURE;
        }
    };

    let silenced = (!args.nocapture).then(SilencedPanics::install);
    let stdout = io::stdout();
    let result = run_with_args(&registry, &args, &mut stdout.lock());
    drop(silenced);

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("failed to write report: {err}");
            ExitCode::FAILURE
        }
    }
}
