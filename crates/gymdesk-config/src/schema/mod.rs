//! Configuration schema types for gymdesk.
//!
//! All structs use `serde(default)` so partial configs work correctly.
//! Missing fields are filled with the defaults the demo ships with.

mod chat;
mod model;
mod system;

pub use chat::*;
pub use model::*;
pub use system::*;

use serde::{Deserialize, Serialize};

/// Current config schema version.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Root configuration for gymdesk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct GymdeskConfig {
    pub model: ModelConfig,
    pub chat: ChatConfig,
    pub notices: NoticesConfig,
    pub logging: LoggingConfig,
}
