//! Sync command implementation.

use std::process::ExitCode;

use adblock::{Controller, Finish, Pipeline};
use anyhow::Result;
use colored::Colorize;
use tracing::info;

use super::Context;
use crate::cli::args::SyncArgs;
use crate::cli::exit;
use crate::output;

pub async fn execute(ctx: Context, args: SyncArgs) -> Result<ExitCode> {
    // Fail on credentials before any download
    let reconciler = ctx.reconciler()?;
    let sources = ctx.sources()?;
    let builder = ctx.set_builder()?;

    let mut config = ctx.controller_config();
    if let Some(secs) = args.retry_interval {
        config.interval = std::time::Duration::from_secs(secs);
    }
    if args.once {
        config.max_attempts = Some(1);
    } else if args.max_attempts.is_some() {
        config.max_attempts = args.max_attempts;
    }

    info!(
        policy = %reconciler.names().policy_name,
        sources = sources.block_urls.len(),
        "Starting sync"
    );
    let controller = Controller::new(Pipeline::new(builder, reconciler, sources), config);

    match controller.run_until(shutdown_signal()).await? {
        Finish::Converged { outcome, attempts } => {
            output::print_outcome(ctx.output_format, &outcome, attempts)?;
            Ok(ExitCode::SUCCESS)
        }
        Finish::Interrupted { attempts } => {
            eprintln!(
                "{} interrupted after {attempts} failed attempt(s)",
                "!".yellow().bold()
            );
            Ok(ExitCode::from(exit::INTERRUPTED))
        }
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}
