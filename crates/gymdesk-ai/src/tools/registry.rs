//! Tool dispatch: schema list for requests and handler execution.

use std::sync::Arc;

use gymdesk_common::{new_record_id, NoticeQueue};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::contacts::{ContactSink, MemoryContacts};
use super::definitions::Tool;
use crate::{Message, ToolDefinition, ToolError};

#[derive(Debug, Deserialize)]
struct StoreUsernameArgs {
    username: String,
}

/// Outcome of one tool execution, sent back to the model as a `tool` message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolResult {
    pub id: String,
    pub payload: serde_json::Value,
    pub success: bool,
}

impl ToolResult {
    /// Result reported to the model for a call that could not be executed.
    pub fn failure(error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            id: new_record_id(),
            payload: serde_json::json!({ "success": false, "error": error }),
            success: false,
        }
    }

    /// Wrap the payload into a transcript message answering `tool_call_id`.
    pub fn to_message(&self, tool_call_id: &str) -> Message {
        Message::tool(tool_call_id, self.payload.to_string())
    }
}

pub struct ToolRegistry {
    contacts: Arc<dyn ContactSink>,
}

impl ToolRegistry {
    pub fn new(contacts: Arc<dyn ContactSink>) -> Self {
        Self { contacts }
    }

    /// Tool schemas supplied verbatim on every primary model call.
    pub fn schema_for_request(&self) -> Vec<ToolDefinition> {
        Tool::ALL.iter().map(|t| t.definition()).collect()
    }

    /// Run the tool called `name`.
    ///
    /// Side effects (notices, contact storage) happen only after the
    /// arguments have been validated.
    pub fn dispatch(
        &self,
        name: &str,
        arguments: &serde_json::Value,
        notices: &mut NoticeQueue,
    ) -> Result<ToolResult, ToolError> {
        let tool = Tool::from_name(name).ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        debug!(tool = %name, "dispatching tool");

        match tool {
            Tool::StoreSnapchatUsername => {
                let args: StoreUsernameArgs = decode_args(tool, arguments)?;
                self.store_snapchat_username(&args.username, notices)
            }
        }
    }

    fn store_snapchat_username(
        &self,
        username: &str,
        notices: &mut NoticeQueue,
    ) -> Result<ToolResult, ToolError> {
        self.contacts.store(username)?;
        notices.warning(format!("Your Snapchat username is: {username}"));

        let id = new_record_id();
        let payload = serde_json::json!({
            "id": id,
            "username": username,
            "opted_in": chrono::Local::now().to_rfc3339(),
            "success": true,
        });
        Ok(ToolResult {
            id,
            payload,
            success: true,
        })
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new(Arc::new(MemoryContacts::new()))
    }
}

fn decode_args<T: DeserializeOwned>(tool: Tool, arguments: &serde_json::Value) -> Result<T, ToolError> {
    T::deserialize(arguments).map_err(|e| ToolError::InvalidArguments {
        tool: tool.name().to_string(),
        reason: e.to_string(),
    })
}
