//! Stream command - print each step as it completes.

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::Args;
use console::Style;
use futures::StreamExt;

use flowchain_pipeline::StepReport;

use super::{Context, read_history};

/// Arguments for the stream command.
#[derive(Args, Debug)]
pub struct StreamArgs {
    /// The question to answer
    #[arg(required = true)]
    pub query: String,

    /// JSON file with prior turns
    #[arg(long)]
    pub history: Option<PathBuf>,
}

/// Run the stream command.
pub async fn run(args: StreamArgs, ctx: &Context) -> Result<()> {
    let history = read_history(args.history.as_deref())?;
    let runtime = ctx.connect()?;
    let mut stream = runtime.engine().run_streaming(args.query, history)?;

    let mut failure = None;
    while let Some(report) = stream.next().await {
        if ctx.json_output {
            // One report per line
            println!("{}", serde_json::to_string(&report)?);
        } else {
            print_report(&report, ctx.verbose);
        }
        if !report.success {
            tracing::warn!(step_id = %report.step_id, "streaming run stopped");
            failure = report.error;
        }
    }

    match failure {
        Some(error) => Err(anyhow!(error)),
        None => Ok(()),
    }
}

fn print_report(report: &StepReport, verbose: bool) {
    let dim = Style::new().dim();

    if !report.success {
        let red = Style::new().red();
        eprintln!(
            "{} {}",
            red.apply_to(format!("[{}] failed:", report.step_name)),
            report.error.as_deref().unwrap_or("unknown error")
        );
        return;
    }

    println!("{}", dim.apply_to(format!("[{}] done", report.step_name)));
    let Some(data) = &report.data else {
        return;
    };

    if let Some(trace) = &data.trace {
        println!("{}", dim.apply_to(trace));
    }
    if verbose {
        for (name, value) in &data.fields {
            println!("{}", dim.apply_to(format!("  {}: {}", name, value)));
        }
    }
    if let Some(links) = &data.links {
        for link in links {
            println!("  {}", link);
        }
    }
    if let Some(answer) = &data.answer {
        println!();
        println!("{}", answer);
    }
}
