//! Configuration system for flowchain.
//!
//! Provides:
//! - The flow registry source: ordered flow definitions with their schemas,
//!   dependencies and cross-step bindings
//! - Workflow service connection settings
//! - Loading from a base64 env blob, JSON or TOML files, or the XDG config dir
//! - API key resolution (env var → config file)

pub mod discovery;
pub mod error;
pub mod ordered;
pub mod secrets;
pub mod types;

pub use discovery::{
    CONFIG_ENV, ConfigOrigin, LoadedConfig, from_base64, load_config, load_config_file,
    load_from_env, xdg_config_dir, xdg_config_path,
};
pub use error::{ConfigError, Result};
pub use secrets::{API_KEY_ENV, ResolvedSecret, SecretSource, resolve_api_key};
pub use types::*;
