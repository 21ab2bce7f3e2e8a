//! Command-line argument definitions using clap.

use crate::output::OutputFormat;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Keep a Cloudflare Zero Trust Gateway DNS blocklist in sync
///
/// Downloads the block and allow sources, reduces them to a minimal domain
/// set and mirrors it into Gateway lists behind one block policy.
/// Runs `sync` when no command is given.
#[derive(Parser, Debug)]
#[command(name = "cf-adblock")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Cloudflare API token (or set CF_API_TOKEN env var)
    #[arg(short = 't', long, env = "CF_API_TOKEN", global = true, hide_env_values = true)]
    pub api_token: Option<String>,

    /// Cloudflare account id (or set CF_IDENTIFIER env var)
    #[arg(short = 'a', long, env = "CF_IDENTIFIER", global = true)]
    pub account_id: Option<String>,

    /// Path to the config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Name the managed lists and policy are derived from
    #[arg(short = 'n', long, global = true)]
    pub list_name: Option<String>,

    /// Output format
    #[arg(short, long, global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Increase verbosity
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the desired set and reconcile it, retrying until it converges
    Sync(SyncArgs),

    /// Build the desired set and write it out without touching Cloudflare
    Build(BuildArgs),

    /// Show what a sync would change
    Plan,

    /// Show the managed lists and policy currently on the account
    Status,

    /// Delete the managed policy and every managed list
    Teardown(TeardownArgs),
}

#[derive(Args, Debug, Default)]
pub struct SyncArgs {
    /// Stop after this many failed attempts
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Base delay between attempts, in seconds
    #[arg(long)]
    pub retry_interval: Option<u64>,

    /// Make a single attempt and exit
    #[arg(long)]
    pub once: bool,
}

#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Write one domain per line to this file instead of stdout
    #[arg(short = 'f', long = "file")]
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct TeardownArgs {
    /// Do not ask for confirmation
    #[arg(short, long)]
    pub yes: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_command_parses() {
        let cli = Cli::try_parse_from(["cf-adblock"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_sync_flags() {
        let cli = Cli::try_parse_from([
            "cf-adblock",
            "sync",
            "--max-attempts",
            "3",
            "--list-name",
            "Home",
        ])
        .unwrap();

        assert_eq!(cli.list_name.as_deref(), Some("Home"));
        match cli.command {
            Some(Commands::Sync(args)) => assert_eq!(args.max_attempts, Some(3)),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
