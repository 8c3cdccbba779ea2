//! Step execution: bind, invoke, normalize.

use std::time::{Duration, Instant};

use flowchain_client::SharedInvoker;
use flowchain_config::{FlowDefinition, PipelineSettings};
use tracing::{debug, info, instrument, warn};

use crate::binder::{BindingNames, bind_inputs};
use crate::context::ExecutionContext;
use crate::error::{PipelineError, Result};
use crate::output::StepOutput;

/// Executes single steps through a [`FlowInvoker`](flowchain_client::FlowInvoker).
#[derive(Clone)]
pub struct StepExecutor {
    invoker: SharedInvoker,
    names: BindingNames,
    default_timeout: Option<Duration>,
}

impl StepExecutor {
    pub fn new(invoker: SharedInvoker, settings: &PipelineSettings) -> Self {
        Self {
            invoker,
            names: BindingNames::from(settings),
            default_timeout: settings.step_timeout_ms.map(Duration::from_millis),
        }
    }

    /// Timeout applied to `flow`. A per-flow value overrides the default;
    /// zero disables the timeout.
    pub fn timeout_for(&self, flow: &FlowDefinition) -> Option<Duration> {
        flow.timeout_ms
            .map(Duration::from_millis)
            .or(self.default_timeout)
            .filter(|t| !t.is_zero())
    }

    /// Execute one step against the current context.
    #[instrument(
        name = "step_execute",
        skip(self, flow, ctx),
        fields(step_id = %flow.id, workflow_id = %flow.workflow_id)
    )]
    pub async fn execute(&self, flow: &FlowDefinition, ctx: &ExecutionContext) -> Result<StepOutput> {
        let inputs = bind_inputs(flow, ctx, &self.names);
        debug!(
            invoker = self.invoker.name(),
            inputs = ?inputs.keys().collect::<Vec<_>>(),
            "Invoking step"
        );

        let started = Instant::now();
        let call = self.invoker.execute_flow(&flow.workflow_id, &inputs);
        let outcome = match self.timeout_for(flow) {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    warn!(timeout_ms = limit.as_millis() as u64, "Step timed out");
                    return Err(PipelineError::StepTimeout {
                        step_id: flow.id.clone(),
                        timeout: limit,
                    });
                }
            },
            None => call.await,
        };
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let envelope = outcome.map_err(|source| {
            warn!(elapsed_ms, error = %source, "Step failed");
            PipelineError::StepInvocation {
                step_id: flow.id.clone(),
                source,
            }
        })?;

        let output = StepOutput::from_envelope(&envelope, flow);
        info!(
            elapsed_ms,
            fields = output.fields.len(),
            has_answer = output.answer.is_some(),
            "Step completed"
        );
        Ok(output)
    }
}
