//! Flowchain - run dependent remote workflows from the command line.
//!
//! Main entry point for the flowchain CLI.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::{ask, order, step, stocks, stream};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// Flowchain - run dependent remote workflows
#[derive(Parser)]
#[command(name = "flowchain")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Config file (.toml or .json). Defaults to $FLOWCHAIN_CONFIG, then
    /// ~/.config/flowchain/config.toml
    #[arg(short, long, global = true, env = "FLOWCHAIN_CONFIG_FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the resolved step execution order
    Order(order::OrderArgs),

    /// Run the full pipeline and print the final answer
    Ask(ask::AskArgs),

    /// Run the full pipeline, printing each step as it completes
    Stream(stream::StreamArgs),

    /// Run a single named step
    Step(step::StepArgs),

    /// Stock search, company profiles and comparisons
    Stocks(stocks::StocksArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Console (human-readable) + rotating JSON file
    let filter = if cli.verbose {
        "flowchain=debug,flowchain_pipeline=debug,flowchain_client=debug,flowchain_finance=debug,flowchain_config=debug,info"
    } else {
        "flowchain=info,flowchain_pipeline=warn,flowchain_client=warn,flowchain_finance=warn,warn"
    };

    let log_dir = flowchain_config::xdg_config_dir()
        .map(|d| d.join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"));
    let file_appender = tracing_appender::rolling::daily(&log_dir, "flowchain.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(tracing_subscriber::EnvFilter::new(
                    "flowchain=trace,flowchain_pipeline=trace,flowchain_client=trace,flowchain_finance=trace,flowchain_config=trace,info",
                )),
        )
        .init();

    let ctx = commands::Context {
        config_path: cli.config,
        json_output: cli.json,
        verbose: cli.verbose,
    };

    match cli.command {
        Commands::Order(args) => order::run(args, &ctx).await,
        Commands::Ask(args) => ask::run(args, &ctx).await,
        Commands::Stream(args) => stream::run(args, &ctx).await,
        Commands::Step(args) => step::run(args, &ctx).await,
        Commands::Stocks(args) => stocks::run(args, &ctx).await,
    }
}
