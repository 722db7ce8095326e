//! Front-end configuration: notices and logging.

use serde::{Deserialize, Serialize};

/// Notice banner settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NoticesConfig {
    /// Maximum queued banners (valid range: 1-256).
    pub capacity: u32,
    /// Seconds a banner stays visible (valid range: 1-3600).
    pub ttl_secs: u32,
}

impl Default for NoticesConfig {
    fn default() -> Self {
        Self {
            capacity: 16,
            ttl_secs: 8,
        }
    }
}

/// Log level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
#[derive(Default)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
}

impl LogLevel {
    /// `EnvFilter` directive for the gymdesk crates at this level.
    pub fn directive(self) -> &'static str {
        match self {
            LogLevel::Debug => "gymdesk=debug",
            LogLevel::Info => "gymdesk=info",
            LogLevel::Warning => "gymdesk=warn",
            LogLevel::Error => "gymdesk=error",
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct LoggingConfig {
    pub level: LogLevel,
}
