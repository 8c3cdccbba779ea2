//! Step command - run a single named step.

use std::path::PathBuf;

use anyhow::{Context as _, Result, bail};
use clap::Args;

use flowchain_pipeline::StepResults;

use super::{Context, print_json, read_history, read_json};

/// Arguments for the step command.
#[derive(Args, Debug)]
pub struct StepArgs {
    /// Step id from the registry
    #[arg(required = true)]
    pub step: String,

    /// The user's query
    #[arg(required = true)]
    pub query: String,

    /// JSON file with outputs of earlier steps, keyed by step id
    #[arg(long)]
    pub previous: Option<PathBuf>,

    /// JSON file with prior turns
    #[arg(long)]
    pub history: Option<PathBuf>,
}

/// Run the step command.
pub async fn run(args: StepArgs, ctx: &Context) -> Result<()> {
    let history = read_history(args.history.as_deref())?;
    let previous: StepResults = match &args.previous {
        Some(path) => read_json(path).context("Invalid previous results file")?,
        None => StepResults::new(),
    };

    tracing::debug!(step = %args.step, previous = previous.len(), "running single step");
    let runtime = ctx.connect()?;
    let report = runtime
        .engine()
        .run_single_step(args.query, history, &args.step, previous)
        .await?;

    if ctx.json_output {
        return print_json(&report);
    }

    if !report.success {
        bail!(
            "{} failed: {}",
            report.step_name,
            report.error.unwrap_or_default()
        );
    }
    // Step data is only meaningful as JSON
    print_json(&report.data)
}
