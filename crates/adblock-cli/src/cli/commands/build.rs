//! Build command implementation.

use std::fmt::Write as _;
use std::process::ExitCode;

use anyhow::{Context as _, Result};
use tracing::info;

use super::Context;
use crate::cli::args::BuildArgs;
use crate::output::{self, OutputFormat};

pub async fn execute(ctx: Context, args: BuildArgs) -> Result<ExitCode> {
    let sources = ctx.sources()?;
    let desired = ctx
        .set_builder()?
        .build(&sources.block_urls, &sources.static_allow, &sources.allow_urls)
        .await?;

    let limit = ctx.reconcile_config().max_domains;
    if desired.len() > limit {
        tracing::warn!(size = desired.len(), limit, "Desired set exceeds the safety ceiling");
    }

    if ctx.output_format == OutputFormat::Json && args.file.is_none() {
        let value = serde_json::json!({
            "report": output::report_json(&desired.report),
            "domains": desired.domains,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(ExitCode::SUCCESS);
    }

    let mut text = String::with_capacity(desired.len() * 16);
    for domain in &desired.domains {
        let _ = writeln!(text, "{domain}");
    }

    match &args.file {
        Some(path) => {
            std::fs::write(path, text)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), domains = desired.len(), "Wrote domain list");
            output::print_report(&desired.report);
        }
        None => print!("{text}"),
    }

    Ok(ExitCode::SUCCESS)
}
