//! Ask command - run the full pipeline and print the final answer.

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Args;
use console::Style;

use super::{Context, print_json, read_history};

/// Arguments for the ask command.
#[derive(Args, Debug)]
pub struct AskArgs {
    /// The question to answer
    #[arg(required = true)]
    pub query: String,

    /// JSON file with prior turns: [{"role": "user", "message": "..."}]
    #[arg(long)]
    pub history: Option<PathBuf>,
}

/// Run the ask command.
pub async fn run(args: AskArgs, ctx: &Context) -> Result<()> {
    let history = read_history(args.history.as_deref())?;
    let runtime = ctx.connect()?;

    let report = runtime
        .engine()
        .run_batch_report(args.query, history)
        .await;

    if ctx.json_output {
        print_json(&report)?;
    }

    if !report.success {
        tracing::warn!(error = ?report.error, "pipeline run failed");
        bail!(report.error.unwrap_or_else(|| "Pipeline failed".to_string()));
    }
    tracing::info!(
        references = report.references.as_ref().map_or(0, Vec::len),
        "pipeline run complete"
    );
    if ctx.json_output {
        return Ok(());
    }

    let dim = Style::new().dim();
    if ctx.verbose
        && let Some(ref trace) = report.steps
    {
        println!("{}", dim.apply_to(trace));
        println!();
    }

    if let Some(answer) = report.answer {
        println!("{}", answer);
    }

    let references = report.references.unwrap_or_default();
    if !references.is_empty() {
        println!();
        println!("{}", Style::new().bold().apply_to("References"));
        for (i, link) in references.iter().enumerate() {
            println!("  [{}] {}", i + 1, link);
        }
    }
    Ok(())
}
