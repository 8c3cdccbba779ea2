//! Invoker error types.

use thiserror::Error;

/// Result type for invoker operations.
pub type Result<T> = std::result::Result<T, InvokeError>;

/// Errors surfaced at the invoker boundary.
///
/// The pipeline matches on these variants to choose user-facing wording;
/// message text is never inspected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvokeError {
    /// The service could not be reached (connect failure, timeout, reset).
    #[error("Network error: {0}")]
    Network(String),

    /// Credentials were rejected.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The service ran the flow and reported a failure.
    #[error("Flow execution failed: {0}")]
    Invocation(String),

    /// The response body did not have the expected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The client was misconfigured.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl InvokeError {
    /// Check if this is a connectivity failure.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// Check if this is an authentication failure.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }

    /// Message suitable for showing to an end user.
    ///
    /// Network and authentication failures get a fixed, friendlier wording;
    /// every other error passes its message through unchanged.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => "Unable to reach the workflow service. Please check your \
                                 network connection and try again."
                .to_string(),
            Self::Auth(_) => "Authentication with the workflow service failed. Please check \
                              your API key and project ID."
                .to_string(),
            Self::Invocation(msg) | Self::InvalidResponse(msg) | Self::Config(msg) => msg.clone(),
        }
    }
}

impl From<reqwest::Error> for InvokeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() || err.is_request() {
            InvokeError::Network(err.to_string())
        } else if err.is_decode() {
            InvokeError::InvalidResponse(err.to_string())
        } else {
            InvokeError::Invocation(err.to_string())
        }
    }
}

impl From<url::ParseError> for InvokeError {
    fn from(err: url::ParseError) -> Self {
        InvokeError::Config(format!("invalid endpoint URL: {}", err))
    }
}
