// crates/petstore-cli/src/main.rs
// ============================================================================
// Module: Pet Store Contract CLI Entry Point
// Description: Command dispatcher for running and listing contract suites.
// Purpose: Load configuration, run suites, and write run artifacts.
// Dependencies: clap, petstore-harness, thiserror, tokio, tracing-subscriber
// ============================================================================

//! ## Overview
//! `petstore-contract run` executes the selected resource suites against the
//! configured pet-store deployment, prints one line per scenario, and writes
//! `summary.json`, `summary.md`, and `transcript.json` under the run root.
//! `petstore-contract plan` lists each scenario's steps without sending any
//! request.
//!
//! Exit codes: `0` when every scenario passed, `1` when a scenario failed or
//! the run could not complete, `2` for configuration errors.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use petstore_harness::HarnessClient;
use petstore_harness::HarnessConfig;
use petstore_harness::Scenario;
use petstore_harness::ScenarioRunner;
use petstore_harness::SuiteName;
use petstore_harness::SuiteOptions;
use petstore_harness::SuiteReport;
use petstore_harness::config::parse_base_url;
use petstore_harness::report::RunArtifacts;
use petstore_harness::report::default_run_root;
use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Log filter used when `RUST_LOG` is unset or invalid.
const DEFAULT_LOG_FILTER: &str = "petstore_harness=info";

/// Exit code for configuration errors.
const EXIT_CONFIG: u8 = 2;

/// Exit code for failed scenarios and runtime errors.
const EXIT_FAILURE: u8 = 1;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "petstore-contract", disable_help_subcommand = true, version)]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run contract suites against a pet-store deployment.
    Run(RunCommand),
    /// List the steps of each suite without sending requests.
    Plan(PlanCommand),
}

/// Arguments for `run`.
#[derive(Args, Debug)]
struct RunCommand {
    /// TOML config file (env vars override it; flags override both).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Base URL of the pet-store API (e.g. `https://petstore.swagger.io/v2`).
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,
    /// Suite to run; repeat to select several. Defaults to all suites.
    #[arg(long = "suite", value_name = "SUITE", value_parser = parse_suite, action = ArgAction::Append)]
    suites: Vec<SuiteName>,
    /// Run suites on separate tasks instead of one after another.
    #[arg(long, action = ArgAction::SetTrue)]
    concurrent: bool,
    /// Directory for run artifacts.
    #[arg(long, value_name = "DIR")]
    run_root: Option<PathBuf>,
}

/// Arguments for `plan`.
#[derive(Args, Debug)]
struct PlanCommand {
    /// Suite to list; repeat to select several. Defaults to all suites.
    #[arg(long = "suite", value_name = "SUITE", value_parser = parse_suite, action = ArgAction::Append)]
    suites: Vec<SuiteName>,
}

/// Parses a suite name for clap.
fn parse_suite(raw: &str) -> Result<SuiteName, String> {
    raw.parse::<SuiteName>().map_err(|err| err.to_string())
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error carrying the process exit code.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
    /// Process exit code.
    exit: u8,
}

impl CliError {
    /// Configuration error (exit code 2).
    fn config(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            exit: EXIT_CONFIG,
        }
    }

    /// Runtime error (exit code 1).
    fn runtime(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            exit: EXIT_FAILURE,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run(command) => command_run(command).await,
        Commands::Plan(command) => command_plan(&command),
    };
    match result {
        Ok(code) => code,
        Err(err) => {
            let _ = write_stderr_line(&format!("error: {err}"));
            ExitCode::from(err.exit)
        }
    }
}

/// Installs the stderr log subscriber, filtered by `RUST_LOG`.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Executes `run`.
async fn command_run(command: RunCommand) -> CliResult<ExitCode> {
    let config = resolve_config(&command)?;
    let suites = selected_suites(&command.suites);
    let scenarios = build_scenarios(&suites, &SuiteOptions::from_config(&config))?;
    let client = HarnessClient::from_config(&config).map_err(|err| CliError::runtime(err.to_string()))?;
    let runner = ScenarioRunner::new(client.clone());

    tracing::info!(
        base_url = %config.base_url,
        suites = suites.len(),
        concurrent = command.concurrent,
        "contract run started"
    );
    let reports = if command.concurrent {
        runner.run_concurrently(scenarios).await
    } else {
        runner.run_all(&scenarios).await
    };
    for report in &reports {
        write_stdout_line(&report.summary_line())?;
    }
    let report = SuiteReport::from_reports(reports);

    let root = config.run_root.clone().unwrap_or_else(default_run_root);
    let artifacts = RunArtifacts::create(root).map_err(|err| CliError::runtime(err.to_string()))?;
    artifacts
        .write_run(&report, &client.transcript())
        .map_err(|err| CliError::runtime(err.to_string()))?;
    write_stdout_line(&format!(
        "{} passed, {} failed; artifacts in {}",
        report.passed,
        report.failed,
        artifacts.root().display()
    ))?;

    Ok(if report.is_success() { ExitCode::SUCCESS } else { ExitCode::from(EXIT_FAILURE) })
}

/// Executes `plan`.
fn command_plan(command: &PlanCommand) -> CliResult<ExitCode> {
    let suites = selected_suites(&command.suites);
    let scenarios = build_scenarios(&suites, &SuiteOptions::default())?;
    write_stdout_line(render_plan(&scenarios).trim_end())?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Loads file and env config, then applies command-line overrides.
fn resolve_config(command: &RunCommand) -> CliResult<HarnessConfig> {
    let mut config =
        HarnessConfig::load(command.config.as_deref()).map_err(|err| CliError::config(err.to_string()))?;
    if let Some(raw) = &command.base_url {
        config.base_url =
            parse_base_url("--base-url", raw).map_err(|err| CliError::config(err.to_string()))?;
    }
    if let Some(run_root) = &command.run_root {
        config.run_root = Some(run_root.clone());
    }
    Ok(config)
}

/// Returns the requested suites in run order without duplicates.
fn selected_suites(requested: &[SuiteName]) -> Vec<SuiteName> {
    if requested.is_empty() {
        return SuiteName::ALL.to_vec();
    }
    SuiteName::ALL.into_iter().filter(|suite| requested.contains(suite)).collect()
}

/// Builds one scenario per suite.
fn build_scenarios(suites: &[SuiteName], options: &SuiteOptions) -> CliResult<Vec<Scenario>> {
    suites
        .iter()
        .map(|suite| suite.scenario(options).map_err(|err| CliError::runtime(err.to_string())))
        .collect()
}

/// Renders numbered steps for each scenario.
fn render_plan(scenarios: &[Scenario]) -> String {
    let mut out = String::new();
    for scenario in scenarios {
        out.push_str(&format!("{}\n", scenario.name));
        for (index, step) in scenario.steps.iter().enumerate() {
            out.push_str(&format!("  {index}. {} [{}]\n", step.description, step.call_label()));
        }
    }
    out
}

/// Writes a line to stdout.
fn write_stdout_line(message: &str) -> CliResult<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}").map_err(|err| CliError::runtime(format!("stdout write failed: {err}")))
}

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}
