//! Pipeline driver: single-step, streaming and batch runs.
//!
//! All three modes share the same per-step logic and execute steps strictly
//! one after another. They differ only in how failures surface:
//!
//! | Mode        | Step failure                                   |
//! |-------------|------------------------------------------------|
//! | single-step | failed [`StepReport`]                          |
//! | streaming   | failed [`StepReport`], then the stream ends    |
//! | batch       | [`PipelineError::PipelineAborted`], no results |

use std::pin::Pin;
use std::sync::Arc;

use flowchain_client::SharedInvoker;
use flowchain_config::{FlowDefinition, PipelineSettings};
use futures::Stream;
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

use crate::context::{ChatTurn, ExecutionContext, StepResults};
use crate::error::{PipelineError, Result};
use crate::executor::StepExecutor;
use crate::registry::FlowRegistry;
use crate::report::{BatchReport, PipelineAnswer, StepReport};
use crate::resolver::resolve_order;

/// Lazy sequence of step reports from a streaming run.
pub type StepStream = Pin<Box<dyn Stream<Item = StepReport> + Send + 'static>>;

/// Runs the registry's steps against a flow invoker.
///
/// Cheap to clone; the registry is shared read-only, so independent runs can
/// proceed concurrently.
#[derive(Clone)]
pub struct PipelineEngine {
    registry: Arc<FlowRegistry>,
    executor: StepExecutor,
}

impl PipelineEngine {
    pub fn new(
        registry: Arc<FlowRegistry>,
        invoker: SharedInvoker,
        settings: &PipelineSettings,
    ) -> Self {
        Self {
            registry,
            executor: StepExecutor::new(invoker, settings),
        }
    }

    pub fn registry(&self) -> &FlowRegistry {
        &self.registry
    }

    /// Resolved execution order for the full pipeline.
    pub fn execution_order(&self) -> Result<Vec<String>> {
        resolve_order(&self.registry)
    }

    /// Definitions in execution order.
    fn plan(&self) -> Result<Vec<&FlowDefinition>> {
        self.execution_order()?
            .iter()
            .map(|id| {
                self.registry
                    .get(id)
                    .ok_or_else(|| PipelineError::UnknownStep(id.clone()))
            })
            .collect()
    }

    /// Execute one named step with previously collected results.
    ///
    /// No dependency resolution is performed; the caller controls ordering.
    /// Invocation failures and timeouts come back as a failed report.
    pub async fn run_single_step(
        &self,
        query: impl Into<String>,
        history: Vec<ChatTurn>,
        step_id: &str,
        previous: StepResults,
    ) -> Result<StepReport> {
        let flow = self
            .registry
            .get(step_id)
            .ok_or_else(|| PipelineError::UnknownStep(step_id.to_string()))?;

        let ctx = ExecutionContext::with_results(query, history, previous);
        let report = match self.executor.execute(flow, &ctx).await {
            Ok(output) => StepReport::succeeded(flow, output),
            Err(e) => StepReport::failed(flow, &e),
        };
        Ok(report)
    }

    /// Execute all steps, yielding a report as each completes.
    ///
    /// The order is resolved before this returns, so resolution errors are
    /// reported eagerly. The stream ends after the last step or right after
    /// the first failed report. Dropping it stops further invocations.
    pub fn run_streaming(
        &self,
        query: impl Into<String>,
        history: Vec<ChatTurn>,
    ) -> Result<StepStream> {
        let steps: Vec<FlowDefinition> = self.plan()?.into_iter().cloned().collect();
        let executor = self.executor.clone();
        let run_id = Uuid::new_v4();
        let span = info_span!("pipeline_run", %run_id, mode = "streaming");
        let mut ctx = ExecutionContext::new(query, history);

        span.in_scope(|| info!(steps = steps.len(), "Pipeline started"));

        Ok(Box::pin(async_stream::stream! {
            for flow in steps {
                match executor.execute(&flow, &ctx).instrument(span.clone()).await {
                    Ok(output) => {
                        let report = StepReport::succeeded(&flow, output.clone());
                        ctx.record(flow.id.clone(), output);
                        yield report;
                    }
                    Err(e) => {
                        span.in_scope(|| warn!(step_id = %flow.id, error = %e, "Pipeline stopped"));
                        yield StepReport::failed(&flow, &e);
                        return;
                    }
                }
            }
            span.in_scope(|| info!(completed = ctx.results().len(), "Pipeline finished"));
        }))
    }

    /// Execute all steps and return only the aggregated answer.
    ///
    /// The first failing step aborts the run with
    /// [`PipelineError::PipelineAborted`] naming that step.
    pub async fn run_batch(
        &self,
        query: impl Into<String>,
        history: Vec<ChatTurn>,
    ) -> Result<PipelineAnswer> {
        let run_id = Uuid::new_v4();
        let span = info_span!("pipeline_run", %run_id, mode = "batch");
        self.batch_inner(query.into(), history).instrument(span).await
    }

    /// [`run_batch`](Self::run_batch) in its serializable caller-facing form.
    pub async fn run_batch_report(
        &self,
        query: impl Into<String>,
        history: Vec<ChatTurn>,
    ) -> BatchReport {
        BatchReport::from(self.run_batch(query, history).await)
    }

    async fn batch_inner(&self, query: String, history: Vec<ChatTurn>) -> Result<PipelineAnswer> {
        let steps = self.plan()?;
        info!(steps = steps.len(), "Pipeline started");

        let mut ctx = ExecutionContext::new(query, history);
        let mut answer = PipelineAnswer::default();

        for flow in steps {
            let output = self.executor.execute(flow, &ctx).await.map_err(|e| {
                warn!(step_id = %flow.id, error = %e, "Pipeline aborted");
                PipelineError::PipelineAborted {
                    step_name: flow.display_name().to_string(),
                    source: Box::new(e),
                }
            })?;
            answer.absorb(&output);
            ctx.record(flow.id.clone(), output);
        }

        info!(
            completed = ctx.results().len(),
            references = answer.references.len(),
            "Pipeline finished"
        );
        Ok(answer)
    }
}
