//! Error types for finance operations.

use flowchain_client::InvokeError;
use thiserror::Error;

/// Result type for finance operations.
pub type Result<T> = std::result::Result<T, FinanceError>;

/// Errors from finance operations.
#[derive(Debug, Error)]
pub enum FinanceError {
    #[error("No symbols provided")]
    NoSymbols,

    #[error("At most {max} symbols can be compared, got {count}")]
    TooManySymbols { count: usize, max: usize },

    /// The registry has no flow for this operation.
    #[error("Flow '{0}' is not configured")]
    FlowNotConfigured(String),

    #[error(transparent)]
    Invoke(#[from] InvokeError),

    /// A result field had an unexpected shape.
    #[error("Invalid '{field}' in {flow} response: {source}")]
    InvalidResponse {
        flow: String,
        field: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FinanceError {
    /// Message suitable for showing to an end user.
    pub fn user_message(&self) -> String {
        match self {
            Self::Invoke(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}
