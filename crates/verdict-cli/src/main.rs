// crates/verdict-cli/src/main.rs
// ============================================================================
// Module: Verdict CLI Entry Point
// Description: Command dispatcher for contract test, lint, and coverage runs.
// Purpose: Provide the `verdict` binary over the engine and contract crates.
// Dependencies: clap, serde_json, thiserror, verdict-contract, verdict-core,
//               verdict-executors
// ============================================================================

//! ## Overview
//! The Verdict CLI discovers contract documents under a path, resolves
//! their `extends` chains, and dispatches them to the run orchestrator,
//! the lint gate, or the coverage reporter. Exit codes follow the default
//! posture: a run fails when any test fails or errors, lint fails on
//! errors (and on warnings under `--strict`), and coverage fails only
//! under `--strict` with uncovered requirements.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::ArgAction;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;
use verdict_contract::LintOptions;
use verdict_contract::collect_contract_files;
use verdict_contract::compute_coverage;
use verdict_contract::lint_path;
use verdict_contract::load::is_contract_document;
use verdict_contract::load::load_raw;
use verdict_contract::resolve_contract;
use verdict_core::Diagnostic;
use verdict_core::MatrixBinding;
use verdict_core::MatrixOptions;
use verdict_core::MatrixSpec;
use verdict_core::REPORT_SCHEMA_VERSION;
use verdict_core::ResolvedContract;
use verdict_core::RunId;
use verdict_core::RunOrchestrator;
use verdict_core::RunReport;
use verdict_core::RunSummary;
use verdict_core::RunnerOptions;
use verdict_core::TestId;
use verdict_core::TestRecord;
use verdict_core::TestStatus;
use verdict_core::core::time::elapsed_ms;
use verdict_core::core::time::now_rfc3339;
use verdict_core::runtime::matrix::expand_bindings;
use verdict_core::runtime::matrix::run_matrix;
use verdict_core::runtime::report::build_matrix_report;
use verdict_core::runtime::report::write_matrix;
use verdict_core::runtime::report::write_single;
use verdict_executors::ExecutorRegistry;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "verdict", version, about = "Contract-driven test execution engine")]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the tests declared by contract documents.
    Test(TestCommand),
    /// Check contract documents for structural and coverage problems.
    Lint(LintCommand),
    /// Report requirement-to-test coverage.
    Coverage(CoverageCommand),
}

/// Arguments for `test`.
#[derive(Args, Debug)]
struct TestCommand {
    /// Contract file or directory of contracts to run.
    #[arg(value_name = "PATH", default_value = ".")]
    path: PathBuf,
    /// Emit full reports as JSON on stdout.
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,
    /// Root directory for per-run artifacts.
    #[arg(long, value_name = "DIR", default_value = "artifacts")]
    artifacts: PathBuf,
    /// Inject a variable override (repeatable).
    #[arg(long = "var", value_name = "KEY=VALUE", action = ArgAction::Append)]
    vars: Vec<String>,
    /// Run only the named test (repeatable).
    #[arg(long = "only", value_name = "TEST_ID", action = ArgAction::Append)]
    only: Vec<String>,
    /// Stop a run after its first failing or erroring test.
    #[arg(long, action = ArgAction::SetTrue)]
    fail_fast: bool,
    /// Stop a matrix after its first failing binding.
    #[arg(long, action = ArgAction::SetTrue)]
    matrix_fail_fast: bool,
    /// Maximum concurrently running matrix bindings.
    #[arg(long, value_name = "N", default_value_t = 1)]
    jobs: usize,
}

/// Arguments for `lint`.
#[derive(Args, Debug)]
struct LintCommand {
    /// Contract file or directory of contracts to check.
    #[arg(value_name = "PATH", default_value = ".")]
    path: PathBuf,
    /// Emit the lint report as JSON on stdout.
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,
    /// Treat warnings as failures.
    #[arg(long, action = ArgAction::SetTrue)]
    strict: bool,
}

/// Arguments for `coverage`.
#[derive(Args, Debug)]
struct CoverageCommand {
    /// Contract file or directory of contracts to measure.
    #[arg(value_name = "PATH", default_value = ".")]
    path: PathBuf,
    /// Emit the coverage report as JSON on stdout.
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,
    /// Fail when any requirement has no linked test.
    #[arg(long, action = ArgAction::SetTrue)]
    strict: bool,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper carrying a rendered message.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Test(command) => command_test(&command),
        Commands::Lint(command) => command_lint(&command),
        Commands::Coverage(command) => command_coverage(&command),
    }
}

// ============================================================================
// SECTION: Test Command
// ============================================================================

/// Outcome of running one contract document.
struct ContractRun {
    /// Rendered report body for JSON output.
    rendered: Value,
    /// One-line human-readable summary.
    line: String,
    /// Whether the run succeeded under the default posture.
    success: bool,
}

/// Executes the `test` command.
fn command_test(command: &TestCommand) -> CliResult<ExitCode> {
    let injected_vars = parse_var_overrides(&command.vars)?;
    let files = contract_documents(&command.path)?;
    if files.is_empty() {
        return Err(CliError::new(format!(
            "no contract documents under {}",
            command.path.display()
        )));
    }

    let registry = ExecutorRegistry::new();
    let mut runs = Vec::with_capacity(files.len());
    for file in &files {
        runs.push(run_contract_file(command, &registry, &injected_vars, file)?);
    }

    if command.json {
        let body = if let [only] = runs.as_slice() {
            only.rendered.clone()
        } else {
            Value::Array(runs.iter().map(|run| run.rendered.clone()).collect())
        };
        write_stdout_line(&render_json(&body)?)?;
    } else {
        for run in &runs {
            write_stdout_line(&run.line)?;
        }
    }

    if runs.iter().all(|run| run.success) {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

/// Parses `KEY=VALUE` variable overrides into a vars map.
///
/// Values are injected as strings; contracts that need typed values
/// declare them in `vars` and reference the override through defaults.
fn parse_var_overrides(raw: &[String]) -> CliResult<Map<String, Value>> {
    let mut vars = Map::new();
    for item in raw {
        let Some((key, value)) = item.split_once('=') else {
            return Err(CliError::new(format!(
                "variable override must be KEY=VALUE: '{item}'"
            )));
        };
        if key.is_empty() {
            return Err(CliError::new(format!(
                "variable override has an empty key: '{item}'"
            )));
        }
        vars.insert(key.to_string(), Value::String(value.to_string()));
    }
    Ok(vars)
}

/// Collects the contract documents under a path.
///
/// A direct file path passes through untouched so parse errors surface;
/// directory discovery skips workspace manifests and unreadable files,
/// which are lint's concern.
fn contract_documents(path: &Path) -> CliResult<Vec<PathBuf>> {
    let files = collect_contract_files(path).map_err(|err| CliError::new(err.to_string()))?;
    if path.is_file() {
        return Ok(files);
    }
    Ok(files
        .into_iter()
        .filter(|file| load_raw(file).is_ok_and(|raw| is_contract_document(&raw)))
        .collect())
}

/// Resolves and runs one contract document.
fn run_contract_file(
    command: &TestCommand,
    registry: &ExecutorRegistry,
    injected_vars: &Map<String, Value>,
    file: &Path,
) -> CliResult<ContractRun> {
    let resolved = resolve_contract(file).map_err(|err| CliError::new(err.to_string()))?;
    let run_id = RunId::derive(&format!("{}{}", file.display(), now_rfc3339()));
    let options = RunnerOptions {
        artifacts_root: command.artifacts.clone(),
        injected_vars: injected_vars.clone(),
        only_test_ids: command.only.iter().map(|id| TestId::new(id.as_str())).collect(),
        fail_fast: command.fail_fast,
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
    };
    let orchestrator = RunOrchestrator::new(registry, options);

    match &resolved.doc.matrix {
        None => run_single(&orchestrator, &resolved, file, &run_id),
        Some(spec) => run_matrix_contract(command, &orchestrator, &resolved, file, &run_id, spec),
    }
}

/// Runs a contract without a matrix declaration and persists its report.
fn run_single(
    orchestrator: &RunOrchestrator<'_>,
    resolved: &ResolvedContract,
    file: &Path,
    run_id: &RunId,
) -> CliResult<ContractRun> {
    let report = orchestrator
        .run_contract(resolved, file, run_id, None)
        .map_err(|err| CliError::new(err.to_string()))?;
    let report_dir = PathBuf::from(&report.artifacts_dir);
    let report_path =
        write_single(&report, &report_dir).map_err(|err| CliError::new(err.to_string()))?;
    let line = single_line(&report, &report_path);
    let rendered = serde_json::to_value(&report).map_err(|err| CliError::new(err.to_string()))?;
    Ok(ContractRun {
        rendered,
        line,
        success: report.summary.is_success(),
    })
}

/// Runs a matrix contract: one independent run per expanded binding.
///
/// The CLI carries no discovery collaborator; contracts using
/// `matrix.discover` need an embedding host and fail here with an
/// unknown-dimension error.
fn run_matrix_contract(
    command: &TestCommand,
    orchestrator: &RunOrchestrator<'_>,
    resolved: &ResolvedContract,
    file: &Path,
    run_id: &RunId,
    spec: &MatrixSpec,
) -> CliResult<ContractRun> {
    let started_at = now_rfc3339();
    let start = Instant::now();
    let bindings =
        expand_bindings(spec, None, run_id).map_err(|err| CliError::new(err.to_string()))?;
    let matrix_options = MatrixOptions {
        fail_fast: command.matrix_fail_fast,
        jobs: command.jobs,
    };
    let runs = run_matrix(bindings, &matrix_options, |binding| {
        orchestrator
            .run_contract(resolved, file, &binding.run_id, Some((&spec.var, &binding.value)))
            .unwrap_or_else(|err| {
                aborted_run_report(resolved, binding, &err.to_string(), &command.artifacts)
            })
    });

    let matrix_dir = command.artifacts.join(run_id.as_str()).join(resolved.doc.contract_name());
    let report = build_matrix_report(
        resolved.doc.contract_name(),
        run_id,
        env!("CARGO_PKG_VERSION"),
        started_at,
        elapsed_ms(start),
        &runs,
        &matrix_dir,
    );
    let summary_path =
        write_matrix(&report, &runs, &matrix_dir).map_err(|err| CliError::new(err.to_string()))?;
    let line = format!(
        "{} {}: {}/{} targets passed ({})",
        report.contract,
        report.run_id.as_str(),
        report.passed_targets,
        report.total_targets,
        summary_path.display()
    );
    let success = report.failed_targets == 0;
    let rendered = serde_json::to_value(&report).map_err(|err| CliError::new(err.to_string()))?;
    Ok(ContractRun {
        rendered,
        line,
        success,
    })
}

/// Builds the failed report for a binding whose run could not start.
fn aborted_run_report(
    resolved: &ResolvedContract,
    binding: &MatrixBinding,
    message: &str,
    artifacts_root: &Path,
) -> RunReport {
    let results = vec![TestRecord {
        id: TestId::new("RUNNER"),
        name: String::new(),
        requirement: None,
        test_type: None,
        status: TestStatus::Error,
        message: message.to_string(),
        assertions: Vec::new(),
        steps: Vec::new(),
        duration_ms: None,
        files_scanned: None,
    }];
    let summary = RunSummary::tally(&results);
    RunReport {
        schema_version: REPORT_SCHEMA_VERSION.to_string(),
        report_type: "single".to_string(),
        contract: resolved.doc.contract_name().to_string(),
        contract_version: resolved.doc.version.clone(),
        run_id: binding.run_id.clone(),
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
        started_at: now_rfc3339(),
        duration_ms: 0,
        warnings: Vec::new(),
        errors: vec![Diagnostic::new("runner_error", message)],
        summary,
        results,
        artifacts_dir: artifacts_root
            .join(binding.run_id.as_str())
            .join(resolved.doc.contract_name())
            .display()
            .to_string(),
    }
}

/// Renders the one-line human summary for a single run.
fn single_line(report: &RunReport, report_path: &Path) -> String {
    format!(
        "{} {}: {} passed, {} failed, {} skipped, {} errors ({})",
        report.contract,
        report.run_id.as_str(),
        report.summary.passed,
        report.summary.failed,
        report.summary.skipped,
        report.summary.error,
        report_path.display()
    )
}

// ============================================================================
// SECTION: Lint Command
// ============================================================================

/// Executes the `lint` command.
fn command_lint(command: &LintCommand) -> CliResult<ExitCode> {
    let options = LintOptions {
        strict: command.strict,
    };
    let report = lint_path(&command.path, &options);

    if command.json {
        let body = serde_json::to_value(&report).map_err(|err| CliError::new(err.to_string()))?;
        write_stdout_line(&render_json(&body)?)?;
    } else {
        for diagnostic in &report.errors {
            write_stdout_line(&format!("error[{}]: {}", diagnostic.code, diagnostic.message))?;
        }
        for diagnostic in &report.warnings {
            write_stdout_line(&format!("warning[{}]: {}", diagnostic.code, diagnostic.message))?;
        }
        write_stdout_line(&format!(
            "checked {} contracts: {} errors, {} warnings",
            report.contracts_checked,
            report.errors.len(),
            report.warnings.len()
        ))?;
    }

    Ok(if report.ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

// ============================================================================
// SECTION: Coverage Command
// ============================================================================

/// Executes the `coverage` command.
fn command_coverage(command: &CoverageCommand) -> CliResult<ExitCode> {
    let report = compute_coverage(&command.path).map_err(|err| CliError::new(err.to_string()))?;

    if command.json {
        let body = serde_json::to_value(&report).map_err(|err| CliError::new(err.to_string()))?;
        write_stdout_line(&render_json(&body)?)?;
    } else {
        for requirement in &report.requirements {
            write_stdout_line(&format!(
                "{}: {} linked tests",
                requirement.id, requirement.linked_tests
            ))?;
        }
        write_stdout_line(&format!(
            "uncovered: {} of {}",
            report.uncovered_count, report.total_count
        ))?;
    }

    if command.strict && !report.is_covered() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Renders a JSON value as pretty-printed text.
fn render_json(value: &Value) -> CliResult<String> {
    serde_json::to_string_pretty(value).map_err(|err| CliError::new(err.to_string()))
}

/// Writes a line to stdout through an explicit handle.
fn write_stdout_line(message: &str) -> CliResult<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}").map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a line to stderr through an explicit handle.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output stream failure.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
