//! tfimport CLI entrypoint.
//!
//! This is the main entrypoint for the tfimport command-line tool.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use tfimport::azure::{AzureClient, TokenSource};
use tfimport::cli::{Cli, Commands, ImportArgs, OutputFormatter};
use tfimport::config::{ConfigParser, ConfigValidator, ToolConfig};
use tfimport::error::Result;
use tfimport::plan::PlanParser;
use tfimport::reconciler::{ReconcileSettings, Reconciler};
use tfimport::terraform::{execute_all, ProcessRunner};

use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Main entrypoint.
fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    if cli.no_color || !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    // Run async runtime
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Initializes the logging system.
///
/// Logs go to stderr; stdout carries the generated commands.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Main async entry point.
async fn run(cli: Cli) -> Result<()> {
    let formatter = OutputFormatter::new();

    match cli.command {
        Commands::Import(args) => cmd_import(cli.config.as_deref(), args, &formatter).await,
        Commands::List {
            plan,
            resource_type,
        } => cmd_list(&plan, resource_type, &formatter),
    }
}

/// Loads `.env`, the configuration file and environment overrides, then
/// validates the result.
fn load_config(config_path: Option<&Path>) -> Result<ToolConfig> {
    let base_path = config_path
        .and_then(Path::parent)
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);

    let parser = ConfigParser::new().with_base_path(base_path);
    parser.load_dotenv()?;
    let config = parser.load(config_path)?;

    let validation = ConfigValidator::new().validate(&config)?;
    for warning in &validation.warnings {
        warn!("{warning}");
    }

    Ok(config)
}

/// Print (and optionally run) the commands that reconcile a plan.
async fn cmd_import(
    config_path: Option<&Path>,
    args: ImportArgs,
    formatter: &OutputFormatter,
) -> Result<()> {
    let config = load_config(config_path)?;
    let settings = ReconcileSettings::from_args(&args, &config)?;

    let descriptors = PlanParser::new()
        .with_type_filter(args.resource_type.as_deref())
        .load_file(&args.plan)?;
    info!("{} resource changes to reconcile", descriptors.len());

    let source = ConfigParser::get_access_token().map_or(TokenSource::AzureCli, TokenSource::Static);
    let client = AzureClient::new(&config.azure.endpoint, source, config.azure.timeout_secs)?;

    let reconciler = Reconciler::new(&client, &settings);
    let report = reconciler.reconcile(&descriptors).await;
    debug!(
        "{} commands, {} notices, {} skipped",
        report.commands.len(),
        report.notices.len(),
        report.skipped
    );

    print_stdout(&formatter.format_report(&report));

    if settings.apply {
        let summary = execute_all(&ProcessRunner, report.ordered_commands()).await;
        eprint!("{}", formatter.format_execution(&summary));
    }

    Ok(())
}

/// List the resource changes of a plan.
fn cmd_list(plan: &Path, resource_type: Option<String>, formatter: &OutputFormatter) -> Result<()> {
    let descriptors = PlanParser::new()
        .with_type_filter(resource_type)
        .load_file(plan)?;

    print_stdout(&formatter.format_changes(&descriptors));
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_stdout(output: &str) {
    print!("{output}");
}
