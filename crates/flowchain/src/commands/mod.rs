//! CLI command handlers.

pub mod ask;
pub mod order;
pub mod step;
pub mod stocks;
pub mod stream;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result, anyhow};
use console::Style;
use serde::Serialize;

use flowchain_client::{FlowClient, SharedInvoker};
use flowchain_config::{AppConfig, LoadedConfig, resolve_api_key};
use flowchain_finance::FinanceService;
use flowchain_pipeline::{ChatTurn, FlowRegistry, PipelineEngine};

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Explicit config file, if given.
    pub config_path: Option<PathBuf>,
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
}

impl Context {
    /// Discover and load the app config.
    pub fn load_config(&self) -> Result<LoadedConfig> {
        let loaded = flowchain_config::load_config(self.config_path.as_deref(), None)
            .context("Failed to load configuration")?;
        tracing::debug!(origin = %loaded.origin, flows = loaded.config.flows.len(), "config loaded");
        if self.verbose {
            let dim = Style::new().dim();
            eprintln!("{}", dim.apply_to(format!("Config: {}", loaded.origin)));
        }
        Ok(loaded)
    }

    /// Load config, registry and an HTTP invoker.
    pub fn connect(&self) -> Result<Runtime> {
        let config = self.load_config()?.config;
        let registry = Arc::new(FlowRegistry::from_config(&config)?);

        let api_key = resolve_api_key(&config.api).ok_or_else(|| {
            anyhow!(
                "No API key configured. Set {} or api.apiKey in the config.",
                flowchain_config::API_KEY_ENV
            )
        })?;
        if self.verbose {
            let dim = Style::new().dim();
            eprintln!("{}", dim.apply_to(format!("API key: {}", api_key.source)));
            eprintln!("{}", dim.apply_to(format!("Endpoint: {}", config.api.endpoint)));
        }

        let client = FlowClient::from_config(&config.api, &api_key.value)?;
        tracing::debug!(endpoint = %config.api.endpoint, key_source = %api_key.source, "client ready");
        Ok(Runtime {
            config,
            registry,
            invoker: Arc::new(client),
        })
    }
}

/// Everything a networked command needs.
pub struct Runtime {
    pub config: AppConfig,
    pub registry: Arc<FlowRegistry>,
    pub invoker: SharedInvoker,
}

impl Runtime {
    pub fn engine(&self) -> PipelineEngine {
        PipelineEngine::new(
            self.registry.clone(),
            self.invoker.clone(),
            &self.config.pipeline,
        )
    }

    pub fn finance(&self) -> FinanceService {
        FinanceService::new(self.registry.clone(), self.invoker.clone())
    }
}

/// Read conversation history from a JSON file of `{role, message}` turns.
pub fn read_history(path: Option<&Path>) -> Result<Vec<ChatTurn>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    read_json(path).context("Invalid history file")
}

/// Read and parse a JSON file.
pub fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Print a value as pretty JSON.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
