//! CLI argument parsing and command dispatch.

pub mod args;
pub mod commands;

use std::process::ExitCode;

use adblock::AdblockError;
use anyhow::Result;
use args::{Cli, Commands};
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::output::OutputFormat;

/// Process exit statuses
pub mod exit {
    /// Any error, including retries running out
    pub const FAILURE: u8 = 1;
    /// Missing or unusable configuration (`EX_CONFIG`)
    pub const CONFIG: u8 = 78;
    /// The desired set exceeded the safety ceiling
    pub const CEILING: u8 = 129;
    /// Stopped by Ctrl-C while waiting to retry
    pub const INTERRUPTED: u8 = 130;
}

/// Errors raised by the CLI itself
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(
        "Cloudflare credentials required.\n\n\
         Set them with one of:\n  \
         1. --api-token <TOKEN> and --account-id <ID>\n  \
         2. CF_API_TOKEN and CF_IDENTIFIER environment variables\n  \
         3. api_token and account_id in the config file"
    )]
    MissingCredentials,

    #[error("teardown needs --yes to confirm")]
    Unconfirmed,
}

/// Run the CLI application.
pub async fn run() -> ExitCode {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }
    init_tracing(cli.verbose);

    match dispatch(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {e:#}", "error:".red().bold());
            ExitCode::from(exit_code(&e))
        }
    }
}

async fn dispatch(cli: Cli) -> Result<ExitCode> {
    let config = Config::load(cli.config.as_deref())?;

    let ctx = commands::Context::new(
        config,
        cli.api_token,
        cli.account_id,
        cli.list_name,
        cli.output.unwrap_or(OutputFormat::Pretty),
    );

    match cli.command.unwrap_or_else(|| Commands::Sync(args::SyncArgs::default())) {
        Commands::Sync(args) => commands::sync::execute(ctx, args).await,
        Commands::Build(args) => commands::build::execute(ctx, args).await,
        Commands::Plan => commands::plan::execute(ctx).await,
        Commands::Status => commands::status::execute(ctx).await,
        Commands::Teardown(args) => commands::teardown::execute(ctx, args).await,
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "info,adblock_cli=debug,adblock_sync=debug,adblock_client=debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Map an error to the process exit status
#[must_use]
pub fn exit_code(err: &anyhow::Error) -> u8 {
    if let Some(cli) = err.downcast_ref::<CliError>() {
        return match cli {
            CliError::MissingCredentials => exit::CONFIG,
            CliError::Unconfirmed => exit::FAILURE,
        };
    }

    match err.downcast_ref::<AdblockError>() {
        Some(AdblockError::CeilingExceeded { .. }) => exit::CEILING,
        Some(AdblockError::Config(_)) => exit::CONFIG,
        _ => exit::FAILURE,
    }
}
