//! Configuration types.
//!
//! The config document mirrors the blob the demo applications ship in an
//! environment variable:
//!
//! ```json
//! {
//!   "api": { "endpoint": "https://...", "projectId": "p-1", "apiKey": "..." },
//!   "flows": {
//!     "step1": {
//!       "workflowId": "wf-plan",
//!       "name": "Plan",
//!       "mode": "sync",
//!       "inputSchema": { "query": "string", "history": "array" },
//!       "outputSchema": { "steps": "string" },
//!       "dependsOn": []
//!     },
//!     "step3": {
//!       "workflowId": "wf-write",
//!       "name": "Write",
//!       "inputSchema": { "query": "string", "research": "object" },
//!       "outputSchema": { "answer": "string" },
//!       "dependsOn": ["step1"],
//!       "bindings": { "research": { "step": "step2" } }
//!     }
//!   },
//!   "pipeline": { "stepTimeoutMs": 120000 }
//! }
//! ```
//!
//! The key order of `flows` is the registry declaration order.

use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{ConfigError, Result};
use crate::ordered::pairs;

// ─────────────────────────────────────────────────────────────────────────────
// Top-level Config
// ─────────────────────────────────────────────────────────────────────────────

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// Connection settings for the workflow service.
    pub api: ApiConfig,

    /// Flow definitions in declaration order.
    #[serde(
        default,
        serialize_with = "serialize_flows",
        deserialize_with = "deserialize_flows"
    )]
    pub flows: Vec<FlowDefinition>,

    /// Pipeline behaviour settings.
    #[serde(default)]
    pub pipeline: PipelineSettings,
}

impl AppConfig {
    /// Parse and validate a JSON config document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a TOML config document.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Look up a flow definition by id.
    pub fn flow(&self, id: &str) -> Option<&FlowDefinition> {
        self.flows.iter().find(|f| f.id == id)
    }

    /// Check structural constraints that serde cannot express.
    ///
    /// Dependency references are deliberately not checked here; the pipeline
    /// resolver reports unknown dependencies with step context.
    pub fn validate(&self) -> Result<()> {
        if self.api.endpoint.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "endpoint".to_string(),
                context: "api".to_string(),
            });
        }
        if self.api.project_id.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "projectId".to_string(),
                context: "api".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for flow in &self.flows {
            if !seen.insert(flow.id.as_str()) {
                return Err(ConfigError::DuplicateFlow(flow.id.clone()));
            }
            if flow.workflow_id.trim().is_empty() {
                return Err(ConfigError::MissingField {
                    field: "workflowId".to_string(),
                    context: format!("flow '{}'", flow.id),
                });
            }
        }
        Ok(())
    }
}

fn serialize_flows<S: Serializer>(
    flows: &[FlowDefinition],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_map(flows.iter().map(|f| (&f.id, f)))
}

fn deserialize_flows<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Vec<FlowDefinition>, D::Error> {
    let entries: Vec<(String, FlowDefinition)> = pairs::deserialize(deserializer)?;
    Ok(entries
        .into_iter()
        .map(|(id, mut flow)| {
            flow.id = id;
            flow
        })
        .collect())
}

// ─────────────────────────────────────────────────────────────────────────────
// API
// ─────────────────────────────────────────────────────────────────────────────

/// Workflow service connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiConfig {
    /// GraphQL endpoint URL.
    pub endpoint: String,

    /// Project identifier sent with every request.
    pub project_id: String,

    /// API key. Prefer the `FLOWCHAIN_API_KEY` env var over storing it here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Flows
// ─────────────────────────────────────────────────────────────────────────────

/// How the remote workflow is hosted. Informational only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowMode {
    #[default]
    Sync,
    Async,
}

/// One entry in the flow registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowDefinition {
    /// Registry key. Filled from the `flows` map key.
    #[serde(skip)]
    pub id: String,

    /// Human-readable label.
    #[serde(default)]
    pub name: String,

    /// Opaque identifier passed to the workflow service.
    pub workflow_id: String,

    #[serde(default, alias = "type")]
    pub mode: FlowMode,

    /// Expected input fields and their type tags, in order.
    #[serde(default, with = "pairs")]
    pub input_schema: Vec<(String, String)>,

    /// Expected output fields and their type tags.
    #[serde(default, with = "pairs")]
    pub output_schema: Vec<(String, String)>,

    /// Steps whose outputs this step's inputs may read from.
    #[serde(default)]
    pub depends_on: Vec<String>,

    /// Explicit input mappings from another step's output.
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        serialize_with = "serialize_bindings",
        deserialize_with = "deserialize_bindings"
    )]
    pub bindings: Vec<FieldBinding>,

    /// Per-step timeout override in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl FlowDefinition {
    /// Create a minimal definition, mostly useful for tests and tooling.
    pub fn new(id: impl Into<String>, workflow_id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            workflow_id: workflow_id.into(),
            mode: FlowMode::Sync,
            input_schema: Vec::new(),
            output_schema: Vec::new(),
            depends_on: Vec::new(),
            bindings: Vec::new(),
            timeout_ms: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Declare input fields (type tag defaults to `"any"`).
    pub fn with_inputs<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.input_schema = fields
            .into_iter()
            .map(|f| (f.into(), "any".to_string()))
            .collect();
        self
    }

    /// Declare output fields (type tag defaults to `"any"`).
    pub fn with_outputs<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_schema = fields
            .into_iter()
            .map(|f| (f.into(), "any".to_string()))
            .collect();
        self
    }

    pub fn depends_on<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on = deps.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_binding(mut self, binding: FieldBinding) -> Self {
        self.bindings.push(binding);
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// Input field names in declaration order.
    pub fn input_fields(&self) -> impl Iterator<Item = &str> {
        self.input_schema.iter().map(|(name, _)| name.as_str())
    }

    /// Output field names in declaration order.
    pub fn output_fields(&self) -> impl Iterator<Item = &str> {
        self.output_schema.iter().map(|(name, _)| name.as_str())
    }

    /// Display name, falling back to the id.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }

    /// The explicit binding for an input field, if any.
    pub fn binding_for(&self, input: &str) -> Option<&FieldBinding> {
        self.bindings.iter().find(|b| b.input == input)
    }
}

/// Maps an input field to a field of another step's recorded output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldBinding {
    /// Input field on the consuming step.
    pub input: String,
    /// Step whose output is read.
    pub step: String,
    /// Output field to read.
    pub field: String,
}

impl FieldBinding {
    pub fn new(input: impl Into<String>, step: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            step: step.into(),
            field: field.into(),
        }
    }
}

/// Serialized form of a binding: `{ "step": "...", "field": "..." }`.
/// `field` defaults to the input name.
#[derive(Debug, Serialize, Deserialize)]
struct BindingSource {
    step: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    field: Option<String>,
}

fn serialize_bindings<S: Serializer>(
    bindings: &[FieldBinding],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_map(bindings.iter().map(|b| {
        let field = (b.field != b.input).then(|| b.field.clone());
        (
            &b.input,
            BindingSource {
                step: b.step.clone(),
                field,
            },
        )
    }))
}

fn deserialize_bindings<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Vec<FieldBinding>, D::Error> {
    let entries: Vec<(String, BindingSource)> = pairs::deserialize(deserializer)?;
    Ok(entries
        .into_iter()
        .map(|(input, source)| {
            let field = source.field.unwrap_or_else(|| input.clone());
            FieldBinding {
                input,
                step: source.step,
                field,
            }
        })
        .collect())
}

// ─────────────────────────────────────────────────────────────────────────────
// Pipeline
// ─────────────────────────────────────────────────────────────────────────────

/// Pipeline behaviour settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineSettings {
    /// Default per-step timeout in milliseconds. `None` waits indefinitely.
    pub step_timeout_ms: Option<u64>,

    /// Input field name bound to the user's query.
    pub query_field: String,

    /// Input field name bound to the conversation history.
    pub history_field: String,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            step_timeout_ms: Some(120_000),
            query_field: "query".to_string(),
            history_field: "history".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "api": { "endpoint": "https://api.example.com/graphql", "projectId": "proj-1", "apiKey": "k" },
        "flows": {
            "step1": {
                "workflowId": "wf-1",
                "name": "Plan",
                "mode": "sync",
                "inputSchema": { "query": "string", "history": "array" },
                "outputSchema": { "steps": "string" },
                "dependsOn": []
            },
            "step2": {
                "workflowId": "wf-2",
                "name": "Research",
                "inputSchema": { "query": "string", "steps": "string" },
                "outputSchema": { "research": "object", "links": "array" },
                "dependsOn": ["step1"]
            },
            "step3": {
                "workflowId": "wf-3",
                "name": "Write",
                "type": "async",
                "inputSchema": { "query": "string", "research": "object" },
                "outputSchema": { "answer": "string" },
                "dependsOn": ["step1"],
                "bindings": { "research": { "step": "step2" } },
                "timeoutMs": 5000
            }
        }
    }"#;

    #[test]
    fn test_parse_sample() {
        let config = AppConfig::from_json_str(SAMPLE).unwrap();
        assert_eq!(config.api.project_id, "proj-1");
        assert_eq!(config.flows.len(), 3);

        let ids: Vec<&str> = config.flows.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["step1", "step2", "step3"]);

        let step3 = config.flow("step3").unwrap();
        assert_eq!(step3.mode, FlowMode::Async);
        assert_eq!(step3.timeout_ms, Some(5000));
        assert_eq!(
            step3.bindings,
            vec![FieldBinding::new("research", "step2", "research")]
        );
        let inputs: Vec<&str> = step3.input_fields().collect();
        assert_eq!(inputs, vec!["query", "research"]);
    }

    #[test]
    fn test_pipeline_defaults() {
        let config = AppConfig::from_json_str(SAMPLE).unwrap();
        assert_eq!(config.pipeline, PipelineSettings::default());
        assert_eq!(config.pipeline.query_field, "query");
        assert_eq!(config.pipeline.history_field, "history");
    }

    #[test]
    fn test_duplicate_flow_rejected() {
        let json = r#"{
            "api": { "endpoint": "https://x", "projectId": "p" },
            "flows": {
                "a": { "workflowId": "1" },
                "a": { "workflowId": "2" }
            }
        }"#;
        let err = AppConfig::from_json_str(json).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateFlow(id) if id == "a"));
    }

    #[test]
    fn test_missing_project_id_rejected() {
        let json = r#"{ "api": { "endpoint": "https://x", "projectId": "" } }"#;
        let err = AppConfig::from_json_str(json).unwrap_err();
        assert!(err.to_string().contains("projectId"));
    }

    #[test]
    fn test_unknown_dependency_not_checked_here() {
        let json = r#"{
            "api": { "endpoint": "https://x", "projectId": "p" },
            "flows": { "a": { "workflowId": "1", "dependsOn": ["ghost"] } }
        }"#;
        assert!(AppConfig::from_json_str(json).is_ok());
    }

    #[test]
    fn test_toml_config() {
        let toml_str = r#"
[api]
endpoint = "https://api.example.com/graphql"
projectId = "proj-1"

[pipeline]
stepTimeoutMs = 1000
queryField = "userQuery"

[flows.search]
workflowId = "wf-search"
name = "Search"
inputSchema = { userQuery = "string" }
outputSchema = { links = "array" }

[flows.answer]
workflowId = "wf-answer"
dependsOn = ["search"]
bindings = { sources = { step = "search", field = "links" } }
"#;
        let config = AppConfig::from_toml(toml_str).unwrap();
        assert_eq!(config.flows[0].id, "search");
        assert_eq!(config.flows[1].id, "answer");
        assert_eq!(config.pipeline.step_timeout_ms, Some(1000));
        assert_eq!(config.pipeline.query_field, "userQuery");
        assert_eq!(config.pipeline.history_field, "history");
        assert_eq!(
            config.flows[1].binding_for("sources"),
            Some(&FieldBinding::new("sources", "search", "links"))
        );
        assert_eq!(config.flows[1].display_name(), "answer");
    }

    #[test]
    fn test_serialize_roundtrip_keeps_ids() {
        let config = AppConfig::from_json_str(SAMPLE).unwrap();
        let json = serde_json::to_string(&config).unwrap();
        let back = AppConfig::from_json_str(&json).unwrap();
        assert_eq!(back.flows, config.flows);
    }
}
