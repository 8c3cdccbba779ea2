//! Error types for the pipeline.

use std::time::Duration;

use flowchain_client::InvokeError;
use flowchain_config::ConfigError;
use thiserror::Error;

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors that can occur while resolving or running a pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A named step is not in the registry.
    #[error("Unknown step: {0}")]
    UnknownStep(String),

    /// A step depends on (or binds from) an id that is not in the registry.
    #[error("Step '{step}' depends on unknown step '{dependency}'")]
    UnknownDependency { step: String, dependency: String },

    /// The dependency graph contains a cycle, e.g. `a -> b -> a`.
    #[error("Cyclic dependency: {cycle}")]
    CyclicDependency { cycle: String },

    /// The invoker failed while executing a step.
    #[error("Step '{step_id}' failed: {source}")]
    StepInvocation {
        step_id: String,
        #[source]
        source: InvokeError,
    },

    /// A step did not finish within its timeout.
    #[error("Step '{step_id}' timed out after {}ms", timeout.as_millis())]
    StepTimeout { step_id: String, timeout: Duration },

    /// Batch run aborted by a failed step.
    #[error("Error in {step_name}: {source}")]
    PipelineAborted {
        step_name: String,
        #[source]
        source: Box<PipelineError>,
    },

    /// Invalid registry configuration.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl PipelineError {
    /// Id of the step this error is attached to, if any.
    pub fn step_id(&self) -> Option<&str> {
        match self {
            Self::StepInvocation { step_id, .. } | Self::StepTimeout { step_id, .. } => {
                Some(step_id)
            }
            Self::PipelineAborted { source, .. } => source.step_id(),
            _ => None,
        }
    }

    /// Message suitable for showing to an end user.
    pub fn user_message(&self) -> String {
        match self {
            Self::StepInvocation { source, .. } => source.user_message(),
            Self::PipelineAborted { step_name, source } => {
                format!("Error in {}: {}", step_name, source.user_message())
            }
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invocation_user_message_uses_invoker_wording() {
        let err = PipelineError::StepInvocation {
            step_id: "step1".into(),
            source: InvokeError::Network("connection refused".into()),
        };
        assert!(err.user_message().contains("Unable to reach"));
        assert_eq!(err.step_id(), Some("step1"));
    }

    #[test]
    fn test_aborted_names_step() {
        let err = PipelineError::PipelineAborted {
            step_name: "Research".into(),
            source: Box::new(PipelineError::StepInvocation {
                step_id: "step2".into(),
                source: InvokeError::Invocation("quota exceeded".into()),
            }),
        };
        assert_eq!(err.user_message(), "Error in Research: quota exceeded");
        assert_eq!(err.step_id(), Some("step2"));
        assert!(err.to_string().starts_with("Error in Research:"));
    }

    #[test]
    fn test_timeout_display() {
        let err = PipelineError::StepTimeout {
            step_id: "slow".into(),
            timeout: Duration::from_millis(1500),
        };
        assert_eq!(err.to_string(), "Step 'slow' timed out after 1500ms");
    }

    #[test]
    fn test_cycle_display() {
        let err = PipelineError::CyclicDependency {
            cycle: "a -> b -> a".into(),
        };
        assert_eq!(err.to_string(), "Cyclic dependency: a -> b -> a");
    }
}
