//! Configuration error types.

/// Result type alias for config operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur during configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read a config file.
    #[error("failed to read config file '{path}': {source}")]
    ReadFile {
        path: String,
        source: std::io::Error,
    },

    /// Failed to parse TOML.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Failed to parse JSON.
    #[error("failed to parse JSON config: {0}")]
    ParseJson(#[from] serde_json::Error),

    /// The base64 config blob could not be decoded.
    #[error("failed to decode base64 config: {0}")]
    Decode(String),

    /// Environment variable holding the config blob is missing or empty.
    #[error("environment variable {0} is not set")]
    MissingEnv(String),

    /// Config file has an extension we do not know how to parse.
    #[error("unsupported config file format '{0}' (expected .toml or .json)")]
    UnsupportedFormat(String),

    /// No config source could be found.
    #[error(
        "no configuration found; pass --config, set {env_var}, or create {path}"
    )]
    NotFound { env_var: String, path: String },

    /// Missing required field.
    #[error("missing required field '{field}' in {context}")]
    MissingField { field: String, context: String },

    /// Two flows share the same id.
    #[error("duplicate flow id '{0}'")]
    DuplicateFlow(String),
}
