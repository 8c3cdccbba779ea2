//! Stocks commands - search, profiles and comparison.

use anyhow::{Result, anyhow};
use clap::{Args, Subcommand};
use console::Style;

use flowchain_finance::{CompanyProfile, FinanceError, group_by_exchange};

use super::{Context, print_json};

/// Arguments for the stocks command.
#[derive(Args, Debug)]
pub struct StocksArgs {
    #[command(subcommand)]
    pub command: StocksCommand,
}

#[derive(Subcommand, Debug)]
pub enum StocksCommand {
    /// Search symbols by company name or ticker
    Search {
        /// Search text (at least 3 characters)
        query: String,
    },

    /// Show company profiles
    Profiles {
        /// Ticker symbols
        #[arg(required = true)]
        symbols: Vec<String>,
    },

    /// Compare companies side by side
    Compare {
        /// Ticker symbols (at most 5)
        #[arg(required = true)]
        symbols: Vec<String>,
    },
}

/// Run a stocks subcommand.
pub async fn run(args: StocksArgs, ctx: &Context) -> Result<()> {
    let runtime = ctx.connect()?;
    let finance = runtime.finance();

    match args.command {
        StocksCommand::Search { query } => {
            let suggestions = finance.search_stocks(&query).await.map_err(user_error)?;
            if ctx.json_output {
                return print_json(&suggestions);
            }
            if suggestions.is_empty() {
                println!("No matches");
                return Ok(());
            }
            let dim = Style::new().dim();
            for (exchange, stocks) in group_by_exchange(&suggestions) {
                println!("{}", Style::new().bold().apply_to(exchange));
                for stock in stocks {
                    println!(
                        "  {:<8} {} {}",
                        stock.symbol,
                        stock.name,
                        dim.apply_to(format!("{} · {}", stock.currency, stock.exchange_full_name))
                    );
                }
            }
        }
        StocksCommand::Profiles { symbols } => {
            let profiles = finance.company_profiles(&symbols).await.map_err(user_error)?;
            if ctx.json_output {
                return print_json(&profiles);
            }
            for profile in &profiles {
                print_profile(profile, ctx.verbose);
            }
        }
        StocksCommand::Compare { symbols } => {
            let analysis = finance
                .comparative_analysis(&symbols)
                .await
                .map_err(user_error)?;
            if ctx.json_output {
                return print_json(&analysis);
            }
            println!("{}", analysis.analysis);
            if !analysis.charts.is_empty() {
                let dim = Style::new().dim();
                println!();
                println!("{}", Style::new().bold().apply_to("Charts"));
                for chart in &analysis.charts {
                    println!("  {} {}", chart.title, dim.apply_to(&chart.description));
                }
            }
        }
    }
    Ok(())
}

fn user_error(err: FinanceError) -> anyhow::Error {
    anyhow!(err.user_message())
}

fn print_profile(profile: &CompanyProfile, verbose: bool) {
    let dim = Style::new().dim();
    let change = if profile.change >= 0.0 {
        Style::new().green()
    } else {
        Style::new().red()
    };

    println!(
        "{} {}",
        Style::new().bold().apply_to(&profile.symbol),
        profile.company_name
    );
    println!(
        "  {:.2} {} {}",
        profile.price,
        profile.currency,
        change.apply_to(format!(
            "{:+.2} ({:+.2}%)",
            profile.change, profile.change_percentage
        ))
    );
    println!(
        "  {}",
        dim.apply_to(format!(
            "{} · {} · {}",
            profile.exchange, profile.sector, profile.industry
        ))
    );
    if verbose && !profile.description.is_empty() {
        println!("  {}", profile.description);
    }
}
