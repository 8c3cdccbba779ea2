//! Caller-facing run results.

use flowchain_config::FlowDefinition;
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};
use crate::output::StepOutput;

/// Outcome of one step, as surfaced by single-step and streaming runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepReport {
    pub step_id: String,
    pub step_name: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<StepOutput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StepReport {
    pub fn succeeded(flow: &FlowDefinition, output: StepOutput) -> Self {
        Self {
            step_id: flow.id.clone(),
            step_name: flow.display_name().to_string(),
            success: true,
            data: Some(output),
            error: None,
        }
    }

    pub fn failed(flow: &FlowDefinition, error: &PipelineError) -> Self {
        Self {
            step_id: flow.id.clone(),
            step_name: flow.display_name().to_string(),
            success: false,
            data: None,
            error: Some(error.user_message()),
        }
    }
}

/// Aggregated result of a successful batch run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineAnswer {
    /// Answer text from the step that produced `answer`.
    pub answer: Option<String>,
    /// Last trace seen.
    pub trace: Option<String>,
    /// Links of the step that produced `links`.
    pub references: Vec<String>,
}

impl PipelineAnswer {
    /// Fold one step's output into the aggregate.
    pub(crate) fn absorb(&mut self, output: &StepOutput) {
        if let Some(trace) = &output.trace {
            self.trace = Some(trace.clone());
        }
        if let Some(links) = &output.links {
            self.references = links.clone();
        }
        if let Some(answer) = &output.answer {
            self.answer = Some(answer.clone());
        }
    }
}

/// Serializable form of a batch run: `{ success, answer?, steps?, references?, error? }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Result<PipelineAnswer>> for BatchReport {
    fn from(result: Result<PipelineAnswer>) -> Self {
        match result {
            Ok(answer) => Self {
                success: true,
                answer: answer.answer,
                steps: answer.trace,
                references: Some(answer.references),
                error: None,
            },
            Err(e) => Self {
                success: false,
                answer: None,
                steps: None,
                references: None,
                error: Some(e.user_message()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowchain_client::InvokeError;
    use serde_json::json;

    #[test]
    fn test_step_report_json() {
        let flow = FlowDefinition::new("step1", "wf").with_name("Plan");
        let report = StepReport::succeeded(
            &flow,
            StepOutput {
                trace: Some("t".into()),
                ..Default::default()
            },
        );
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({"stepId": "step1", "stepName": "Plan", "success": true, "data": {"steps": "t"}})
        );
    }

    #[test]
    fn test_failed_report_uses_user_message() {
        let flow = FlowDefinition::new("step1", "wf");
        let err = PipelineError::StepInvocation {
            step_id: "step1".into(),
            source: InvokeError::Auth("401".into()),
        };
        let report = StepReport::failed(&flow, &err);
        assert!(!report.success);
        assert_eq!(report.step_name, "step1");
        assert!(report.error.unwrap().contains("API key"));
    }

    #[test]
    fn test_absorb_keeps_last_trace() {
        let mut answer = PipelineAnswer::default();
        answer.absorb(&StepOutput {
            trace: Some("first".into()),
            links: Some(vec!["https://a".into()]),
            ..Default::default()
        });
        answer.absorb(&StepOutput {
            trace: Some("second".into()),
            answer: Some("done".into()),
            ..Default::default()
        });
        assert_eq!(answer.trace.as_deref(), Some("second"));
        assert_eq!(answer.references, vec!["https://a".to_string()]);
        assert_eq!(answer.answer.as_deref(), Some("done"));
    }

    #[test]
    fn test_batch_report_failure_has_no_partial_results() {
        let report = BatchReport::from(Err(PipelineError::UnknownStep("x".into())));
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({"success": false, "error": "Unknown step: x"})
        );
    }
}
