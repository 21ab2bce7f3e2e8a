//! Output formatting for different formats.

use adblock::{BuildReport, Outcome};
use clap::ValueEnum;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::str::FromStr;

/// Available output formats.
#[derive(Debug, Clone, Copy, Default, ValueEnum, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable summary with colors
    #[default]
    Pretty,
    /// JSON output
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" | "table" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => anyhow::bail!(
                "Unknown output format: {}\n\
                 Valid formats: pretty, json",
                s
            ),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pretty => write!(f, "pretty"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// JSON view of a build report
pub fn report_json(report: &BuildReport) -> Value {
    let r = &report.rejected;
    json!({
        "block_lines": report.block_lines,
        "allow_lines": report.allow_lines,
        "allow_domains": report.allow_domains,
        "allowed": report.allowed,
        "before_reduction": report.before_reduction,
        "after_reduction": report.after_reduction,
        "rejected": {
            "empty": r.empty,
            "comment": r.comment,
            "encoding": r.encoding,
            "grammar": r.grammar,
            "ip_literal": r.ip_literal,
            "reserved": r.reserved,
        },
    })
}

/// JSON view of a sync outcome
pub fn outcome_json(outcome: &Outcome) -> Value {
    match outcome {
        Outcome::Skipped { remote_count } => json!({
            "result": "skipped",
            "remote_count": remote_count,
        }),
        Outcome::Synced {
            lists_deleted,
            lists_created,
            policy_id,
        } => json!({
            "result": "synced",
            "lists_deleted": lists_deleted,
            "lists_created": lists_created,
            "policy_id": policy_id,
        }),
    }
}

/// Print a build report as a short summary on stderr
pub fn print_report(report: &BuildReport) {
    eprintln!("{}", "Build".bold());
    eprintln!("  {:<18} {}", "block lines:".dimmed(), report.block_lines);
    eprintln!("  {:<18} {}", "allow domains:".dimmed(), report.allow_domains);
    eprintln!("  {:<18} {}", "allow-listed:".dimmed(), report.allowed);
    eprintln!("  {:<18} {}", "invalid:".dimmed(), report.rejected.invalid());
    eprintln!(
        "  {:<18} {} -> {}",
        "reduced:".dimmed(),
        report.before_reduction,
        report.after_reduction.to_string().green()
    );
}

/// Print a sync outcome
pub fn print_outcome(format: OutputFormat, outcome: &Outcome, attempts: u32) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        let mut value = outcome_json(outcome);
        value["attempts"] = json!(attempts);
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    match outcome {
        Outcome::Skipped { remote_count } => println!(
            "{} remote already holds {} domains, nothing to do",
            "✓".green().bold(),
            remote_count.to_string().cyan()
        ),
        Outcome::Synced {
            lists_deleted,
            lists_created,
            policy_id,
        } => {
            println!(
                "{} replaced {} lists with {}",
                "✓".green().bold(),
                lists_deleted.to_string().yellow(),
                lists_created.len().to_string().cyan()
            );
            if let Some(id) = policy_id {
                println!("  {:<10} {id}", "policy:".dimmed());
            }
        }
    }
    if attempts > 1 {
        println!("  {:<10} {attempts}", "attempts:".dimmed());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_format() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("table".parse::<OutputFormat>().unwrap(), OutputFormat::Pretty);
        assert!("yaml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_outcome_json() {
        let synced = outcome_json(&Outcome::Synced {
            lists_deleted: 2,
            lists_created: vec!["a".into(), "b".into()],
            policy_id: Some("p".into()),
        });
        assert_eq!(synced["result"], "synced");
        assert_eq!(synced["lists_created"][1], "b");

        let skipped = outcome_json(&Outcome::Skipped { remote_count: 7 });
        assert_eq!(skipped["remote_count"], 7);
    }
}
