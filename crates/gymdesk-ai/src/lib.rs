//! Conversation engine for gymdesk.
//!
//! Provides:
//! - an OpenAI chat-completions client behind the `AiClient` trait
//! - the append-only `Transcript` for one chat session
//! - the closed tool set and its `ToolRegistry`
//! - the shared-password `AccessGate`
//! - `Conversation`, which drives one user turn including a single
//!   tool dispatch and follow-up call

pub mod errors;
pub mod gate;
pub mod openai;
pub mod session;
pub mod token_tracker;
pub mod tools;
pub mod transcript;

use async_trait::async_trait;

pub use errors::{ChatError, ToolError};
pub use gate::{check_access, AccessGate, AccessState};
pub use openai::{OpenAiClient, OpenAiConfig};
pub use session::{Conversation, Session, TurnEvent, TurnReport, TurnState};
pub use token_tracker::TokenTracker;
pub use tools::{ContactSink, MemoryContacts, Tool, ToolRegistry, ToolResult};
pub use transcript::Transcript;

#[async_trait]
pub trait AiClient: Send + Sync {
    /// Send the full message list and the tool schema (possibly empty),
    /// returning the model's single reply.
    async fn send_message(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<AiResponse, AiError>;

    /// Model identifier, used for usage accounting and logs.
    fn model_name(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Message {
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
}

impl Message {
    fn text(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(content.into()),
            tool_call_id: None,
            tool_calls: Vec::new(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::text(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::text(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::text(Role::Assistant, content)
    }

    /// Assistant message as returned by the model: text, tool calls, or both.
    pub fn assistant_reply(content: Option<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: Role::Assistant,
            content,
            tool_call_id: None,
            tool_calls,
        }
    }

    /// Tool result answering the assistant tool call `tool_call_id`.
    pub fn tool(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: Some(content.into()),
            tool_call_id: Some(tool_call_id.into()),
            tool_calls: Vec::new(),
        }
    }

    /// Text content, if present and non-empty.
    pub fn visible_content(&self) -> Option<&str> {
        self.content.as_deref().filter(|c| !c.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
    Tool,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
            Role::Tool => "tool",
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

#[derive(Debug, Clone)]
pub struct AiResponse {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCall>,
    pub usage: TokenUsage,
}

/// A tool invocation requested by the model.
///
/// `arguments` is the JSON-encoded text exactly as the provider sent it;
/// it is echoed back verbatim in later requests.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: String,
}

impl ToolCall {
    /// Decode `arguments` into a JSON object.
    pub fn parse_arguments(&self) -> Result<serde_json::Value, ToolError> {
        let value: serde_json::Value =
            serde_json::from_str(&self.arguments).map_err(|e| ToolError::InvalidArguments {
                tool: self.name.clone(),
                reason: format!("arguments are not valid JSON: {e}"),
            })?;
        if !value.is_object() {
            return Err(ToolError::InvalidArguments {
                tool: self.name.clone(),
                reason: "arguments must be a JSON object".into(),
            });
        }
        Ok(value)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    pub fn total_tokens(&self) -> u64 {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("API error: {0}")]
    ApiError(String),
    #[error("Rate limited")]
    RateLimited,
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Timeout")]
    Timeout,
}
