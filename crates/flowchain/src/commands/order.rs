//! Order command - show the resolved execution order.

use anyhow::Result;
use clap::Args;
use console::Style;
use serde_json::json;

use flowchain_pipeline::{FlowRegistry, dependency_edges, resolve_order};

use super::{Context, print_json};

/// Arguments for the order command.
#[derive(Args, Debug)]
pub struct OrderArgs {}

/// Run the order command.
pub async fn run(_args: OrderArgs, ctx: &Context) -> Result<()> {
    let config = ctx.load_config()?.config;
    let registry = FlowRegistry::from_config(&config)?;
    let order = resolve_order(&registry)?;

    if ctx.json_output {
        let steps: Vec<_> = order
            .iter()
            .filter_map(|id| registry.get(id))
            .map(|flow| {
                json!({
                    "id": flow.id,
                    "name": flow.display_name(),
                    "workflowId": flow.workflow_id,
                    "dependsOn": dependency_edges(flow),
                })
            })
            .collect();
        return print_json(&steps);
    }

    let dim = Style::new().dim();
    let bold = Style::new().bold();
    for (i, id) in order.iter().enumerate() {
        let Some(flow) = registry.get(id) else {
            continue;
        };
        let deps = dependency_edges(flow);
        let after = if deps.is_empty() {
            String::new()
        } else {
            format!(" (after {})", deps.join(", "))
        };
        println!(
            "{}. {} {}{}",
            i + 1,
            bold.apply_to(&flow.id),
            dim.apply_to(flow.display_name()),
            dim.apply_to(after)
        );
    }
    Ok(())
}
