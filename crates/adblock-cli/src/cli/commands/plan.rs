//! Plan command implementation.

use std::process::ExitCode;

use adblock::PolicyAction;
use anyhow::Result;
use colored::Colorize;
use serde_json::json;

use super::Context;
use crate::output::{self, OutputFormat};

pub async fn execute(ctx: Context) -> Result<ExitCode> {
    let reconciler = ctx.reconciler()?;
    let sources = ctx.sources()?;
    let desired = ctx
        .set_builder()?
        .build(&sources.block_urls, &sources.static_allow, &sources.allow_urls)
        .await?;

    let plan = reconciler.plan(&desired.domains).await?;
    let names = reconciler.names();
    let create: Vec<String> = (1..=plan.chunks.len()).map(|i| names.chunk_name(i)).collect();
    let delete: Vec<&str> = plan.lists_to_delete.iter().map(|l| l.name.as_str()).collect();
    let policy = match &plan.policy_action {
        PolicyAction::Create => "create".to_string(),
        PolicyAction::Update { id } => format!("update {id}"),
        PolicyAction::Skip => "none".to_string(),
    };

    if ctx.output_format == OutputFormat::Json {
        let value = json!({
            "desired": desired.len(),
            "remote_count": plan.remote_count,
            "skip": plan.is_skip(),
            "delete_policy": plan.policy_to_delete.as_ref().map(|p| &p.id),
            "delete_lists": delete,
            "create_lists": create,
            "policy": policy,
            "report": output::report_json(&desired.report),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(ExitCode::SUCCESS);
    }

    output::print_report(&desired.report);
    println!();
    if plan.is_skip() {
        println!(
            "{} remote already holds {} domains, nothing to do",
            "✓".green().bold(),
            plan.remote_count.to_string().cyan()
        );
        return Ok(ExitCode::SUCCESS);
    }

    println!(
        "{} {} desired, {} remote",
        "Plan".bold(),
        desired.len().to_string().cyan(),
        plan.remote_count.to_string().cyan()
    );
    if let Some(p) = &plan.policy_to_delete {
        println!("  {} policy {} ({})", "-".red(), p.name, p.id.dimmed());
    }
    for list in &plan.lists_to_delete {
        println!(
            "  {} list {} ({} items)",
            "-".red(),
            list.name,
            list.count
        );
    }
    for (name, chunk) in create.iter().zip(&plan.chunks) {
        println!("  {} list {} ({} items)", "+".green(), name, chunk.len());
    }
    println!("  {} policy {}: {policy}", "~".yellow(), names.policy_name);

    Ok(ExitCode::SUCCESS)
}
