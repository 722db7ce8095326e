//! Tool identities and their declared schemas.

use crate::ToolDefinition;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    StoreSnapchatUsername,
}

impl Tool {
    /// Every tool, in the order schemas are sent to the model.
    pub const ALL: &'static [Tool] = &[Tool::StoreSnapchatUsername];

    /// Wire name used by the model.
    pub fn name(self) -> &'static str {
        match self {
            Tool::StoreSnapchatUsername => "store_snapchat_username",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.name() == name)
    }

    pub fn definition(self) -> ToolDefinition {
        match self {
            Tool::StoreSnapchatUsername => ToolDefinition {
                name: self.name().to_string(),
                description: "Store username provided by user during chat.".to_string(),
                parameters: serde_json::json!({
                    "type": "object",
                    "properties": {
                        "username": { "type": "string" }
                    },
                    "required": ["username"]
                }),
            },
        }
    }
}

/// Convert a tool definition to the OpenAI chat-completions format.
pub fn to_openai_tool(tool: &ToolDefinition) -> serde_json::Value {
    serde_json::json!({
        "type": "function",
        "function": {
            "name": tool.name,
            "description": tool.description,
            "parameters": tool.parameters,
        }
    })
}
