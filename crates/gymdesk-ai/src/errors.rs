//! Turn-level and tool-level error taxonomy.
//!
//! Every `ChatError` ends the current turn only; the session and its
//! transcript stay usable.

use crate::AiError;

/// Failure inside a tool handler or its argument decoding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ToolError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("invalid arguments for {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },

    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Password incorrect")]
    AuthFailure,

    #[error("session is not authorized")]
    NotAuthorized,

    #[error("{0} is required")]
    MissingCredential(&'static str),

    #[error("model requested unknown tool {0:?}")]
    UnknownTool(String),

    #[error("invalid arguments for {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },

    #[error("contact storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("model requested tool {0:?} in a follow-up reply")]
    NestedToolCall(String),

    #[error("tool result {0:?} does not answer any earlier tool call")]
    OrphanToolResult(String),

    #[error("model call failed: {0}")]
    Transport(#[from] AiError),

    #[error("turn cancelled")]
    Cancelled,
}

impl From<ToolError> for ChatError {
    fn from(err: ToolError) -> Self {
        match err {
            ToolError::UnknownTool(name) => ChatError::UnknownTool(name),
            ToolError::InvalidArguments { tool, reason } => {
                ChatError::InvalidArguments { tool, reason }
            }
            ToolError::StorageUnavailable(msg) => ChatError::StorageUnavailable(msg),
        }
    }
}
