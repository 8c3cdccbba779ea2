//! Finance operations backed by registry flows.

use std::time::Instant;

use flowchain_client::{ResultEnvelope, SharedInvoker};
use flowchain_config::FlowDefinition;
use flowchain_pipeline::SharedRegistry;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use tracing::{debug, info, warn};

use crate::error::{FinanceError, Result};
use crate::types::{ChartSpec, CompanyProfile, ComparativeAnalysis, StockSuggestion};

pub const STOCK_FINDER: &str = "stock_finder";
pub const COMPANY_PROFILER: &str = "company_profiler";
pub const COMPARATIVE_ANALYSIS: &str = "comparative_analysis";

/// Legacy spelling used by existing deployments, for both the flow id and
/// the result field.
const COMPARATIVE_ANALYSIS_LEGACY: &str = "comparitive_analysis";

/// Queries shorter than this return no suggestions without a remote call.
pub const MIN_SEARCH_CHARS: usize = 3;

/// Maximum number of symbols in one comparison.
pub const MAX_COMPARE_SYMBOLS: usize = 5;

/// Finance operations over a flow registry and invoker.
#[derive(Clone)]
pub struct FinanceService {
    registry: SharedRegistry,
    invoker: SharedInvoker,
}

impl FinanceService {
    pub fn new(registry: SharedRegistry, invoker: SharedInvoker) -> Self {
        Self { registry, invoker }
    }

    /// Search symbols matching `query`.
    pub async fn search_stocks(&self, query: &str) -> Result<Vec<StockSuggestion>> {
        if query.chars().count() < MIN_SEARCH_CHARS {
            debug!(query, "Search query too short, skipping");
            return Ok(Vec::new());
        }

        let mut inputs = Map::new();
        inputs.insert("searchQuery".to_string(), json!(query));

        let envelope = self.call(&[STOCK_FINDER], inputs).await?;
        decode_field(&envelope, STOCK_FINDER, "suggestions")
    }

    /// Fetch company profiles for `symbols`.
    pub async fn company_profiles(&self, symbols: &[String]) -> Result<Vec<CompanyProfile>> {
        let symbols = normalize_symbols(symbols)?;
        let envelope = self
            .call(&[COMPANY_PROFILER], companies_input(&symbols))
            .await?;
        decode_field(&envelope, COMPANY_PROFILER, "profiles")
    }

    /// Compare up to [`MAX_COMPARE_SYMBOLS`] companies.
    pub async fn comparative_analysis(&self, symbols: &[String]) -> Result<ComparativeAnalysis> {
        let symbols = normalize_symbols(symbols)?;
        if symbols.len() > MAX_COMPARE_SYMBOLS {
            return Err(FinanceError::TooManySymbols {
                count: symbols.len(),
                max: MAX_COMPARE_SYMBOLS,
            });
        }

        let envelope = self
            .call(
                &[COMPARATIVE_ANALYSIS, COMPARATIVE_ANALYSIS_LEGACY],
                companies_input(&symbols),
            )
            .await?;

        let analysis = envelope
            .field(COMPARATIVE_ANALYSIS)
            .or_else(|| envelope.field(COMPARATIVE_ANALYSIS_LEGACY))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let charts: Vec<ChartSpec> = decode_field(&envelope, COMPARATIVE_ANALYSIS, "charts")?;

        Ok(ComparativeAnalysis { analysis, charts })
    }

    /// First registered flow among `ids`.
    fn flow(&self, ids: &[&str]) -> Result<&FlowDefinition> {
        ids.iter()
            .find_map(|id| self.registry.get(id))
            .ok_or_else(|| FinanceError::FlowNotConfigured(ids[0].to_string()))
    }

    async fn call(&self, ids: &[&str], inputs: Map<String, Value>) -> Result<ResultEnvelope> {
        let flow = self.flow(ids)?;
        let started = Instant::now();

        match self.invoker.execute_flow(&flow.workflow_id, &inputs).await {
            Ok(envelope) => {
                info!(
                    flow = %flow.id,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Finance flow completed"
                );
                Ok(envelope)
            }
            Err(e) => {
                warn!(flow = %flow.id, error = %e, "Finance flow failed");
                Err(e.into())
            }
        }
    }
}

/// Trim, drop empties and duplicates, keeping order.
fn normalize_symbols(symbols: &[String]) -> Result<Vec<String>> {
    let mut out: Vec<String> = Vec::with_capacity(symbols.len());
    for symbol in symbols.iter().map(|s| s.trim()) {
        if !symbol.is_empty() && !out.iter().any(|s| s == symbol) {
            out.push(symbol.to_string());
        }
    }
    if out.is_empty() {
        return Err(FinanceError::NoSymbols);
    }
    Ok(out)
}

fn companies_input(symbols: &[String]) -> Map<String, Value> {
    let mut inputs = Map::new();
    inputs.insert("companies".to_string(), json!(symbols));
    inputs
}

/// Decode a result field; absent means the type's default.
fn decode_field<T>(envelope: &ResultEnvelope, flow: &str, field: &str) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    match envelope.field(field) {
        None | Some(Value::Null) => Ok(T::default()),
        Some(value) => {
            serde_json::from_value(value.clone()).map_err(|source| FinanceError::InvalidResponse {
                flow: flow.to_string(),
                field: field.to_string(),
                source,
            })
        }
    }
}
