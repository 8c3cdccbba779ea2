//! HTTP invoker for the managed workflow service.
//!
//! Flows are executed through the service's GraphQL endpoint:
//!
//! ```text
//! POST <endpoint>
//! Authorization: Bearer <api key>
//! x-project-id: <project id>
//!
//! { "query": "query ExecuteWorkflow(...) { executeWorkflow(...) { status result } }",
//!   "variables": { "workflowId": "...", "payload": { ... } } }
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};
use url::Url;

use flowchain_config::ApiConfig;

use crate::error::{InvokeError, Result};
use crate::invoker::{FlowInvoker, ResultEnvelope};

/// Default timeout for a single flow execution request.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Header carrying the project id.
const PROJECT_HEADER: &str = "x-project-id";

const EXECUTE_WORKFLOW_QUERY: &str = "query ExecuteWorkflow($workflowId: String!, $payload: JSON!) { executeWorkflow(workflowId: $workflowId, payload: $payload) { status result } }";

/// GraphQL error codes that indicate rejected credentials.
const AUTH_ERROR_CODES: &[&str] = &["UNAUTHENTICATED", "FORBIDDEN", "UNAUTHORIZED"];

/// HTTP client for the workflow service.
///
/// # Example
///
/// ```no_run
/// use flowchain_client::{FlowClient, FlowInvoker};
///
/// # async fn example() -> flowchain_client::Result<()> {
/// let client = FlowClient::builder()
///     .endpoint("https://api.example.com/graphql")
///     .project_id("proj-1")
///     .api_key("secret")
///     .build()?;
///
/// let envelope = client.execute_flow("wf-123", &Default::default()).await?;
/// println!("{:?}", envelope.result);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct FlowClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: reqwest::Client,
    endpoint: Url,
    timeout: Duration,
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GraphQlRequest<'a> {
    query: &'static str,
    variables: ExecuteVariables<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExecuteVariables<'a> {
    workflow_id: &'a str,
    payload: &'a Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<ExecuteData>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct ExecuteData {
    #[serde(rename = "executeWorkflow", default)]
    execute_workflow: Option<ResultEnvelope>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
    #[serde(default)]
    extensions: Option<GraphQlErrorExtensions>,
}

#[derive(Debug, Deserialize)]
struct GraphQlErrorExtensions {
    #[serde(default)]
    code: Option<String>,
}

impl GraphQlError {
    fn is_auth(&self) -> bool {
        self.extensions
            .as_ref()
            .and_then(|e| e.code.as_deref())
            .is_some_and(|code| AUTH_ERROR_CODES.contains(&code))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Client
// ─────────────────────────────────────────────────────────────────────────────

impl FlowClient {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Build a client from API settings and an already-resolved API key.
    pub fn from_config(api: &ApiConfig, api_key: &str) -> Result<Self> {
        Self::builder()
            .endpoint(&api.endpoint)
            .project_id(&api.project_id)
            .api_key(api_key)
            .build()
    }

    /// The GraphQL endpoint.
    pub fn endpoint(&self) -> &Url {
        &self.inner.endpoint
    }

    async fn post(&self, workflow_id: &str, inputs: &Map<String, Value>) -> Result<ResultEnvelope> {
        let body = GraphQlRequest {
            query: EXECUTE_WORKFLOW_QUERY,
            variables: ExecuteVariables {
                workflow_id,
                payload: inputs,
            },
        };

        let response = self
            .inner
            .http
            .post(self.inner.endpoint.clone())
            .json(&body)
            .timeout(self.inner.timeout)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let text = response.text().await.unwrap_or_default();
            return Err(InvokeError::Auth(format!("HTTP {}: {}", status.as_u16(), text)));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(InvokeError::Invocation(format!(
                "HTTP {}: {}",
                status.as_u16(),
                text
            )));
        }

        let parsed: GraphQlResponse = response.json().await?;
        interpret_response(parsed)
    }
}

/// Turn a decoded GraphQL response into an envelope or a typed error.
fn interpret_response(response: GraphQlResponse) -> Result<ResultEnvelope> {
    if let Some(first) = response.errors.first() {
        if response.errors.iter().any(GraphQlError::is_auth) {
            return Err(InvokeError::Auth(first.message.clone()));
        }
        let message = response
            .errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        return Err(InvokeError::Invocation(message));
    }

    let envelope = response
        .data
        .and_then(|d| d.execute_workflow)
        .ok_or_else(|| InvokeError::InvalidResponse("missing data.executeWorkflow".into()))?;

    if let Some(status) = envelope.status.as_deref()
        && (status.eq_ignore_ascii_case("error") || status.eq_ignore_ascii_case("failed"))
    {
        let message = envelope
            .field("message")
            .or_else(|| envelope.field("error"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("workflow reported status '{}'", status));
        return Err(InvokeError::Invocation(message));
    }

    Ok(envelope)
}

#[async_trait]
impl FlowInvoker for FlowClient {
    async fn execute_flow(
        &self,
        workflow_id: &str,
        inputs: &Map<String, Value>,
    ) -> Result<ResultEnvelope> {
        let started = Instant::now();
        debug!(
            workflow_id,
            fields = inputs.len(),
            endpoint = %self.inner.endpoint,
            "Executing flow"
        );

        let result = self.post(workflow_id, inputs).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(envelope) => debug!(
                workflow_id,
                elapsed_ms,
                status = envelope.status.as_deref().unwrap_or("unknown"),
                "Flow completed"
            ),
            Err(e) => warn!(workflow_id, elapsed_ms, error = %e, "Flow failed"),
        }
        result
    }

    fn name(&self) -> &str {
        "http"
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Builder
// ─────────────────────────────────────────────────────────────────────────────

/// Builder for creating a [`FlowClient`].
#[derive(Debug)]
pub struct ClientBuilder {
    endpoint: Option<String>,
    project_id: Option<String>,
    api_key: Option<String>,
    timeout: Duration,
    user_agent: Option<String>,
}

impl ClientBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            endpoint: None,
            project_id: None,
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
        }
    }

    /// Set the GraphQL endpoint URL.
    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoint = Some(url.into());
        self
    }

    /// Set the project id.
    pub fn project_id(mut self, id: impl Into<String>) -> Self {
        self.project_id = Some(id.into());
        self
    }

    /// Set the API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<FlowClient> {
        let endpoint = self
            .endpoint
            .ok_or_else(|| InvokeError::Config("endpoint is required".to_string()))?;
        let endpoint = Url::parse(&endpoint)?;

        let project_id = self
            .project_id
            .ok_or_else(|| InvokeError::Config("project_id is required".to_string()))?;
        let api_key = self
            .api_key
            .ok_or_else(|| InvokeError::Config("api_key is required".to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let auth = HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|_| InvokeError::Config("Invalid API key".to_string()))?;
        headers.insert(AUTHORIZATION, auth);
        let project = HeaderValue::from_str(&project_id)
            .map_err(|_| InvokeError::Config("Invalid project id".to_string()))?;
        headers.insert(HeaderName::from_static(PROJECT_HEADER), project);

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("flowchain-client/{}", env!("CARGO_PKG_VERSION")));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(user_agent)
            .build()
            .map_err(|e| InvokeError::Config(e.to_string()))?;

        Ok(FlowClient {
            inner: Arc::new(ClientInner {
                http,
                endpoint,
                timeout: self.timeout,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
