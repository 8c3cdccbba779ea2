//! API key resolution.
//!
//! Resolution order:
//! 1. Environment variable (`FLOWCHAIN_API_KEY`)
//! 2. Config file value

use crate::ApiConfig;

/// Environment variable checked for the service API key.
pub const API_KEY_ENV: &str = "FLOWCHAIN_API_KEY";

/// Result of API key resolution with provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSecret {
    /// The secret value.
    pub value: String,
    /// Where the secret was found.
    pub source: SecretSource,
}

/// Where a secret was resolved from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretSource {
    /// Environment variable.
    EnvVar(String),
    /// Config document (plaintext).
    ConfigFile,
}

impl std::fmt::Display for SecretSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecretSource::EnvVar(var) => write!(f, "env var {}", var),
            SecretSource::ConfigFile => write!(f, "config file (plaintext)"),
        }
    }
}

/// Resolve the API key for the workflow service.
pub fn resolve_api_key(api: &ApiConfig) -> Option<ResolvedSecret> {
    resolve_api_key_from(API_KEY_ENV, api.api_key.as_deref())
}

/// Resolve an API key from a named env var, falling back to a config value.
pub fn resolve_api_key_from(env_var: &str, config_value: Option<&str>) -> Option<ResolvedSecret> {
    if let Ok(value) = std::env::var(env_var)
        && !value.is_empty()
    {
        return Some(ResolvedSecret {
            value,
            source: SecretSource::EnvVar(env_var.to_string()),
        });
    }

    config_value
        .filter(|v| !v.is_empty())
        .map(|v| ResolvedSecret {
            value: v.to_string(),
            source: SecretSource::ConfigFile,
        })
}
