//! Teardown command implementation.

use std::process::ExitCode;

use anyhow::Result;
use colored::Colorize;
use serde_json::json;

use super::Context;
use crate::cli::args::TeardownArgs;
use crate::cli::CliError;
use crate::output::OutputFormat;

pub async fn execute(ctx: Context, args: TeardownArgs) -> Result<ExitCode> {
    let reconciler = ctx.reconciler()?;
    if !args.yes {
        return Err(CliError::Unconfirmed.into());
    }

    let removed = reconciler.teardown().await?;

    if ctx.output_format == OutputFormat::Json {
        let value = json!({ "policies": removed.policies, "lists": removed.lists });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!(
            "{} removed {} policy and {} lists under {}",
            "✓".green().bold(),
            removed.policies,
            removed.lists,
            reconciler.names().list_prefix
        );
    }

    Ok(ExitCode::SUCCESS)
}
