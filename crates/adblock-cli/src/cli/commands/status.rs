//! Status command implementation.

use std::process::ExitCode;

use anyhow::Result;
use colored::Colorize;
use serde_json::json;

use super::Context;
use crate::output::OutputFormat;

pub async fn execute(ctx: Context) -> Result<ExitCode> {
    let reconciler = ctx.reconciler()?;
    let state = reconciler.remote_state().await?;

    if ctx.output_format == OutputFormat::Json {
        let value = json!({
            "item_count": state.item_count(),
            "lists": state.lists.iter().map(|l| json!({
                "id": l.id,
                "name": l.name,
                "count": l.count,
            })).collect::<Vec<_>>(),
            "policies": state.policies.iter().map(|p| json!({
                "id": p.id,
                "name": p.name,
                "enabled": p.enabled,
                "lists": p.referenced_lists(),
            })).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(ExitCode::SUCCESS);
    }

    let names = reconciler.names();
    println!(
        "{} {} lists, {} domains",
        names.list_prefix.bold(),
        state.lists.len().to_string().cyan(),
        state.item_count().to_string().cyan()
    );
    for list in &state.lists {
        println!("  {:<40} {:>6}  {}", list.name, list.count, list.id.dimmed());
    }

    match state.policies.as_slice() {
        [] => println!("{} no policy named {}", "!".yellow().bold(), names.policy_name),
        policies => {
            if policies.len() > 1 {
                println!(
                    "{} {} policies share the managed name",
                    "!".red().bold(),
                    policies.len()
                );
            }
            for p in policies {
                let enabled = if p.enabled { "enabled".green() } else { "disabled".red() };
                println!(
                    "  {} {} ({}) -> {} lists",
                    p.name,
                    enabled,
                    p.id.dimmed(),
                    p.referenced_lists().len()
                );
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
