//! Model endpoint configuration.

use serde::{Deserialize, Serialize};

/// Chat-completion endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Model identifier sent with every request.
    pub name: String,
    /// Base URL of an OpenAI-compatible API (no trailing `/chat/completions`).
    pub api_base: String,
    /// Upper bound on one model call, in seconds (valid range: 5-600).
    pub request_timeout_secs: u32,
    /// TCP connect timeout, in seconds (valid range: 1-60).
    pub connect_timeout_secs: u32,
    /// Sampling temperature; provider default when unset.
    pub temperature: Option<f64>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: "gpt-4o".into(),
            api_base: "https://api.openai.com/v1".into(),
            request_timeout_secs: 60,
            connect_timeout_secs: 10,
            temperature: None,
        }
    }
}
