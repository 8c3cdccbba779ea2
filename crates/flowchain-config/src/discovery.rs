//! Config source discovery.
//!
//! Resolution order (first match wins):
//! 1. Explicit path (CLI `--config`)
//! 2. Base64-encoded JSON blob in an environment variable
//! 3. `~/.config/flowchain/config.toml` (XDG user config)

use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::{AppConfig, ConfigError, Result};

/// Default environment variable holding the base64 config blob.
pub const CONFIG_ENV: &str = "FLOWCHAIN_CONFIG";

/// Default config filename within the XDG config directory.
const USER_CONFIG_FILE: &str = "config.toml";

/// Application name for XDG directory resolution.
const APP_NAME: &str = "flowchain";

/// Environment variable to override the config directory.
const CONFIG_DIR_ENV: &str = "FLOWCHAIN_CONFIG_DIR";

/// Where a loaded config came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    /// A file on disk.
    File(PathBuf),
    /// A base64 blob in the named environment variable.
    Env(String),
}

impl std::fmt::Display for ConfigOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigOrigin::File(path) => write!(f, "{}", path.display()),
            ConfigOrigin::Env(var) => write!(f, "env var {}", var),
        }
    }
}

/// Result of config discovery.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: AppConfig,
    pub origin: ConfigOrigin,
}

/// Discover and load configuration.
///
/// `env_var` names the variable checked for a base64 blob; pass `None` to use
/// [`CONFIG_ENV`].
pub fn load_config(explicit: Option<&Path>, env_var: Option<&str>) -> Result<LoadedConfig> {
    if let Some(path) = explicit {
        return Ok(LoadedConfig {
            config: load_config_file(path)?,
            origin: ConfigOrigin::File(path.to_path_buf()),
        });
    }

    let env_var = env_var.unwrap_or(CONFIG_ENV);
    match load_from_env(env_var) {
        Ok(config) => {
            return Ok(LoadedConfig {
                config,
                origin: ConfigOrigin::Env(env_var.to_string()),
            });
        }
        Err(ConfigError::MissingEnv(_)) => {}
        Err(e) => return Err(e),
    }

    if let Some(path) = xdg_config_path()
        && path.is_file()
    {
        return Ok(LoadedConfig {
            config: load_config_file(&path)?,
            origin: ConfigOrigin::File(path),
        });
    }

    Err(ConfigError::NotFound {
        env_var: env_var.to_string(),
        path: xdg_config_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| format!("~/.config/{}/{}", APP_NAME, USER_CONFIG_FILE)),
    })
}

/// Load config from a specific file path, choosing the parser by extension.
pub fn load_config_file(path: &Path) -> Result<AppConfig> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.display().to_string(),
        source: e,
    })?;

    match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => AppConfig::from_toml(&contents),
        Some("json") => AppConfig::from_json_str(&contents),
        other => Err(ConfigError::UnsupportedFormat(
            other.unwrap_or_default().to_string(),
        )),
    }
}

/// Load config from a base64-encoded JSON blob held in an environment variable.
pub fn load_from_env(var: &str) -> Result<AppConfig> {
    match std::env::var(var) {
        Ok(blob) if !blob.trim().is_empty() => from_base64(&blob),
        _ => Err(ConfigError::MissingEnv(var.to_string())),
    }
}

/// Decode a base64-encoded JSON config document.
pub fn from_base64(blob: &str) -> Result<AppConfig> {
    let bytes = STANDARD
        .decode(blob.trim())
        .map_err(|e| ConfigError::Decode(e.to_string()))?;
    let json = String::from_utf8(bytes).map_err(|e| ConfigError::Decode(e.to_string()))?;
    AppConfig::from_json_str(&json)
}

/// Get the XDG config file path for flowchain.
pub fn xdg_config_path() -> Option<PathBuf> {
    xdg_config_dir().map(|d| d.join(USER_CONFIG_FILE))
}

/// Get the XDG config directory for flowchain.
///
/// Checks `FLOWCHAIN_CONFIG_DIR` first, then falls back to the platform default.
pub fn xdg_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV)
        && !dir.is_empty()
    {
        return Some(PathBuf::from(dir));
    }
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    const JSON: &str = r#"{
        "api": { "endpoint": "https://api.example.com/graphql", "projectId": "proj-1" },
        "flows": { "stock_finder": { "workflowId": "wf-stock" } }
    }"#;

    #[test]
    fn test_from_base64() {
        let blob = STANDARD.encode(JSON);
        let config = from_base64(&blob).unwrap();
        assert_eq!(config.flows[0].id, "stock_finder");
        assert_eq!(config.flows[0].workflow_id, "wf-stock");
    }

    #[test]
    fn test_from_base64_invalid() {
        let err = from_base64("not base64 !!!").unwrap_err();
        assert!(matches!(err, ConfigError::Decode(_)));
    }

    #[test]
    fn test_load_from_env_missing() {
        let err = load_from_env("FLOWCHAIN_TEST_DEFINITELY_UNSET").unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnv(_)));
    }

    #[test]
    fn test_load_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flows.json");
        std::fs::write(&path, JSON).unwrap();

        let loaded = load_config(Some(&path), None).unwrap();
        assert_eq!(loaded.origin, ConfigOrigin::File(path));
        assert_eq!(loaded.config.api.project_id, "proj-1");
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flows.yaml");
        std::fs::write(&path, JSON).unwrap();

        let err = load_config_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(ext) if ext == "yaml"));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config_file(Path::new("/nonexistent/flowchain.toml")).unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }

    #[test]
    fn test_origin_display() {
        assert_eq!(
            ConfigOrigin::Env("FLOWCHAIN_CONFIG".into()).to_string(),
            "env var FLOWCHAIN_CONFIG"
        );
    }
}
