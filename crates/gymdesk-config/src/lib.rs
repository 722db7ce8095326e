//! gymdesk configuration.
//!
//! TOML-based settings for the model endpoint, chat copy, notices, and
//! logging, plus secret resolution for the access password and the model
//! API key. All config sections use defaults so partial configs work.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use gymdesk_config::{load_config, Secrets};
//!
//! let config = load_config(None).expect("failed to load config");
//! let secrets = Secrets::load();
//! println!("model = {}, key set = {}", config.model.name, secrets.api_key.is_some());
//! ```

pub mod schema;
pub mod secrets;
pub mod toml_loader;
pub mod validation;

pub use schema::{GymdeskConfig, CONFIG_SCHEMA_VERSION};
pub use secrets::Secrets;

use std::path::Path;

use gymdesk_common::ConfigError;

/// Load and validate the config.
///
/// With `path = None` this reads `config.toml` from the OS config directory,
/// creating a commented default file if none exists.
pub fn load_config(path: Option<&Path>) -> Result<GymdeskConfig, ConfigError> {
    let config = match path {
        Some(p) => toml_loader::load_from_path(p)?,
        None => toml_loader::load_default()?,
    };
    validation::validate(&config)?;
    Ok(config)
}

/// Serialize a config to a pretty-printed JSON string.
pub fn config_to_json(config: &GymdeskConfig) -> String {
    serde_json::to_string_pretty(config)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize config: {e}\"}}"))
}
