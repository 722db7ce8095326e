//! Secret resolution for the access password and the model API key.
//!
//! Resolution order, per secret:
//! 1. environment (`GYMDESK_PASSWORD`, `OPENAI_API_KEY`; a `.env` file is
//!    loaded into the environment by the binary before this runs)
//! 2. `secrets.toml` in the gymdesk config directory (`PASSWORD`,
//!    `OPENAI_API_KEY` keys)
//!
//! A missing secret is `None`, never an error. Callers turn it into a
//! user-visible "missing credential" condition.

use std::fmt;
use std::path::Path;

use gymdesk_common::ConfigError;
use serde::Deserialize;
use tracing::{debug, warn};

pub const PASSWORD_ENV: &str = "GYMDESK_PASSWORD";
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug, Default, Deserialize)]
struct SecretsFile {
    #[serde(rename = "PASSWORD")]
    password: Option<String>,
    #[serde(rename = "OPENAI_API_KEY")]
    api_key: Option<String>,
}

/// Resolved secrets.
#[derive(Clone, Default)]
pub struct Secrets {
    pub password: Option<String>,
    pub api_key: Option<String>,
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("Secrets")
            .field("password", &redact(&self.password))
            .field("api_key", &redact(&self.api_key))
            .finish()
    }
}

impl Secrets {
    /// Resolve secrets from the process environment and the default
    /// `secrets.toml`. An unreadable secrets file is logged and skipped.
    pub fn load() -> Self {
        let file = crate::toml_loader::config_dir()
            .ok()
            .map(|dir| dir.join("secrets.toml"));
        Self::resolve(|key| std::env::var(key).ok(), file.as_deref())
    }

    /// Resolve secrets from an arbitrary variable lookup and optional file.
    pub fn resolve(env: impl Fn(&str) -> Option<String>, file: Option<&Path>) -> Self {
        let from_file = match file {
            Some(path) if path.exists() => match read_secrets_file(path) {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!("ignoring secrets file: {e}");
                    SecretsFile::default()
                }
            },
            _ => SecretsFile::default(),
        };

        let password = non_empty(env(PASSWORD_ENV)).or_else(|| non_empty(from_file.password));
        let api_key = non_empty(env(API_KEY_ENV)).or_else(|| non_empty(from_file.api_key));

        debug!(
            password = password.is_some(),
            api_key = api_key.is_some(),
            "secrets resolved"
        );

        Self { password, api_key }
    }
}

fn read_secrets_file(path: &Path) -> Result<SecretsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        ConfigError::SecretsError(format!("failed to read {}: {e}", path.display()))
    })?;
    toml::from_str(&content).map_err(|e| {
        ConfigError::SecretsError(format!("failed to parse {}: {e}", path.display()))
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
