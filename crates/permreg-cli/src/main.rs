//! # permreg CLI entry point
//!
//! Parses command-line arguments, resolves configuration, and dispatches
//! to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use permreg_cli::authority::{run_init, run_primary, run_root, InitArgs, PrimaryArgs, RootArgs};
use permreg_cli::check::{run_check, CheckArgs};
use permreg_cli::config::{CliConfig, LogFormat};
use permreg_cli::delegation::{run_delegation, DelegationArgs};
use permreg_cli::log::{run_log, LogArgs};
use permreg_cli::operator::{run_operator, OperatorArgs};
use permreg_cli::scope::{run_scope, ScopeArgs};
use permreg_cli::state::StateFile;

/// Permissions registry administration.
///
/// Manages the root authority, primary accounts, operator keys and scope
/// grants of a registry snapshot, and runs the authorization checks that
/// gate privileged actions.
#[derive(Parser, Debug)]
#[command(name = "permreg", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Registry snapshot file. Overrides PERMREG_STATE.
    #[arg(long, global = true)]
    state: Option<PathBuf>,

    /// Log output format. Overrides PERMREG_LOG_FORMAT.
    #[arg(long, value_enum, global = true)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a registry whose root authority is the caller.
    Init(InitArgs),

    /// Show or rotate the root authority.
    Root(RootArgs),

    /// Register, rotate, list and inspect primary accounts.
    Primary(PrimaryArgs),

    /// Add, remove, rotate and look up operator keys.
    Operator(OperatorArgs),

    /// Grant, revoke and query scopes.
    Scope(ScopeArgs),

    /// Run operator authorization checks.
    Check(CheckArgs),

    /// Sign and verify signed delegations.
    Delegation(DelegationArgs),

    /// Print the mutation log.
    Log(LogArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match CliConfig::from_env() {
        Ok(config) => config.with_overrides(cli.state.clone(), cli.log_format),
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(1);
        }
    };

    init_tracing(cli.verbose, config.log_format);
    tracing::debug!(state = %config.state_path.display(), "permreg starting");

    let state = StateFile::new(config.state_path);
    let result = match &cli.command {
        Commands::Init(args) => run_init(args, &state),
        Commands::Root(args) => run_root(args, &state),
        Commands::Primary(args) => run_primary(args, &state),
        Commands::Operator(args) => run_operator(args, &state),
        Commands::Scope(args) => run_scope(args, &state),
        Commands::Check(args) => run_check(args, &state),
        Commands::Delegation(args) => run_delegation(args, &state),
        Commands::Log(args) => run_log(args, &state),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

/// Install the global subscriber. Logs go to stderr so stdout stays
/// machine-readable.
fn init_tracing(verbose: u8, format: LogFormat) {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}
