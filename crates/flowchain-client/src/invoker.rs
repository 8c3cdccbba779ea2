//! Flow invoker trait and mock implementation.
//!
//! The pipeline only ever sees a [`FlowInvoker`]; the HTTP client is one
//! implementation, [`MockInvoker`] is another for deterministic tests.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;

/// Envelope returned by a flow execution.
///
/// Both fields may be missing; a missing `result` means "no output", not an
/// error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultEnvelope {
    /// Execution status reported by the service (e.g. `"success"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Flow output object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}

impl ResultEnvelope {
    /// Envelope with a successful result.
    pub fn success(result: Value) -> Self {
        Self {
            status: Some("success".to_string()),
            result: Some(result),
        }
    }

    /// Get a field of the result object. `null` counts as absent.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.result
            .as_ref()
            .and_then(|r| r.get(name))
            .filter(|v| !v.is_null())
    }
}

/// Executes a remote workflow by id.
#[async_trait]
pub trait FlowInvoker: Send + Sync {
    /// Execute `workflow_id` with the given payload.
    async fn execute_flow(
        &self,
        workflow_id: &str,
        inputs: &Map<String, Value>,
    ) -> Result<ResultEnvelope>;

    /// Name of this invoker, for logging.
    fn name(&self) -> &str;
}

/// An invoker that can be shared across tasks.
pub type SharedInvoker = Arc<dyn FlowInvoker>;

// ─────────────────────────────────────────────────────────────────────────────
// Mock Invoker
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(any(test, feature = "testing"))]
pub use mock::{MockInvoker, RecordedCall};

#[cfg(any(test, feature = "testing"))]
mod mock {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;
    use crate::error::InvokeError;

    /// A request received by the mock.
    #[derive(Debug, Clone, PartialEq)]
    pub struct RecordedCall {
        pub workflow_id: String,
        pub inputs: Map<String, Value>,
    }

    #[derive(Debug, Clone)]
    struct Scripted {
        response: std::result::Result<ResultEnvelope, InvokeError>,
        delay: Option<Duration>,
    }

    /// A mock invoker returning scripted responses per workflow id.
    ///
    /// Every call is recorded in order. Calling an unscripted workflow returns
    /// an invocation error.
    #[derive(Debug, Default)]
    pub struct MockInvoker {
        scripts: Mutex<HashMap<String, Scripted>>,
        calls: Mutex<Vec<RecordedCall>>,
    }

    impl MockInvoker {
        pub fn new() -> Self {
            Self::default()
        }

        /// Script a successful response whose `result` is `result`.
        pub fn with_result(self, workflow_id: impl Into<String>, result: Value) -> Self {
            self.script(workflow_id, Ok(ResultEnvelope::success(result)), None)
        }

        /// Script a raw envelope (e.g. one with no `result`).
        pub fn with_envelope(self, workflow_id: impl Into<String>, envelope: ResultEnvelope) -> Self {
            self.script(workflow_id, Ok(envelope), None)
        }

        /// Script a failure.
        pub fn with_error(self, workflow_id: impl Into<String>, error: InvokeError) -> Self {
            self.script(workflow_id, Err(error), None)
        }

        /// Script a successful response that only arrives after `delay`.
        pub fn with_delayed_result(
            self,
            workflow_id: impl Into<String>,
            result: Value,
            delay: Duration,
        ) -> Self {
            self.script(workflow_id, Ok(ResultEnvelope::success(result)), Some(delay))
        }

        fn script(
            self,
            workflow_id: impl Into<String>,
            response: std::result::Result<ResultEnvelope, InvokeError>,
            delay: Option<Duration>,
        ) -> Self {
            self.scripts
                .lock()
                .unwrap()
                .insert(workflow_id.into(), Scripted { response, delay });
            self
        }

        /// All calls received, in order.
        pub fn calls(&self) -> Vec<RecordedCall> {
            self.calls.lock().unwrap().clone()
        }

        /// Number of calls received.
        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        /// Payload of the most recent call for a workflow.
        pub fn last_inputs(&self, workflow_id: &str) -> Option<Map<String, Value>> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .rev()
                .find(|c| c.workflow_id == workflow_id)
                .map(|c| c.inputs.clone())
        }

        /// Workflow ids called, in order.
        pub fn called_workflows(&self) -> Vec<String> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(|c| c.workflow_id.clone())
                .collect()
        }
    }

    #[async_trait]
    impl FlowInvoker for MockInvoker {
        async fn execute_flow(
            &self,
            workflow_id: &str,
            inputs: &Map<String, Value>,
        ) -> Result<ResultEnvelope> {
            self.calls.lock().unwrap().push(RecordedCall {
                workflow_id: workflow_id.to_string(),
                inputs: inputs.clone(),
            });

            let scripted = self.scripts.lock().unwrap().get(workflow_id).cloned();
            let Some(scripted) = scripted else {
                return Err(InvokeError::Invocation(format!(
                    "MockInvoker: no response scripted for workflow '{}'",
                    workflow_id
                )));
            };

            if let Some(delay) = scripted.delay {
                tokio::time::sleep(delay).await;
            }
            scripted.response
        }

        fn name(&self) -> &str {
            "mock"
        }
    }
}
