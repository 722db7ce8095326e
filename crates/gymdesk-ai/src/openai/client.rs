//! OpenAI client struct, request building, and response parsing.

use serde_json::{json, Value};

use crate::tools::to_openai_tool;
use crate::{AiError, AiResponse, Message, Role, TokenUsage, ToolCall, ToolDefinition};

use super::config::OpenAiConfig;

/// OpenAI chat-completions client.
pub struct OpenAiClient {
    pub(crate) config: OpenAiConfig,
    pub(crate) http: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Result<Self, AiError> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AiError::NetworkError(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    /// Build the JSON request body. `tools` is omitted when empty.
    pub(crate) fn build_request_body(&self, messages: &[Message], tools: &[ToolDefinition]) -> Value {
        let msgs: Vec<Value> = messages.iter().map(wire_message).collect();

        let mut body = json!({
            "model": self.config.model,
            "messages": msgs,
        });

        if let Some(t) = self.config.temperature {
            body["temperature"] = json!(t);
        }

        if !tools.is_empty() {
            let tool_defs: Vec<_> = tools.iter().map(to_openai_tool).collect();
            body["tools"] = json!(tool_defs);
        }

        body
    }

    /// Parse a non-streaming chat-completions response.
    pub(crate) fn parse_response(&self, json: Value) -> Result<AiResponse, AiError> {
        let message = json["choices"]
            .as_array()
            .and_then(|choices| choices.first())
            .map(|choice| &choice["message"])
            .filter(|m| m.is_object())
            .ok_or_else(|| AiError::ParseError("response has no choices[0].message".into()))?;

        let content = message["content"].as_str().map(String::from);

        let tool_calls = match message["tool_calls"].as_array() {
            Some(calls) => calls
                .iter()
                .map(parse_tool_call)
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };

        let usage = TokenUsage {
            input_tokens: json["usage"]["prompt_tokens"].as_u64().unwrap_or(0),
            output_tokens: json["usage"]["completion_tokens"].as_u64().unwrap_or(0),
        };

        Ok(AiResponse {
            content,
            tool_calls,
            usage,
        })
    }
}

/// Render one transcript message in the chat-completions wire format.
fn wire_message(msg: &Message) -> Value {
    let mut out = json!({
        "role": msg.role.as_str(),
        "content": msg.content,
    });

    match msg.role {
        Role::Assistant if !msg.tool_calls.is_empty() => {
            let calls: Vec<Value> = msg
                .tool_calls
                .iter()
                .map(|c| {
                    json!({
                        "id": c.id,
                        "type": "function",
                        "function": { "name": c.name, "arguments": c.arguments },
                    })
                })
                .collect();
            out["tool_calls"] = json!(calls);
        }
        Role::Tool => {
            out["tool_call_id"] = json!(msg.tool_call_id);
        }
        _ => {}
    }

    out
}

fn parse_tool_call(raw: &Value) -> Result<ToolCall, AiError> {
    let id = raw["id"]
        .as_str()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AiError::ParseError("tool call without id".into()))?;
    let function = &raw["function"];
    let name = function["name"]
        .as_str()
        .ok_or_else(|| AiError::ParseError(format!("tool call {id} without function name")))?;

    // Some compatible servers send an object instead of encoded text.
    let arguments = match &function["arguments"] {
        Value::String(s) => s.clone(),
        Value::Null => "{}".to_string(),
        other => other.to_string(),
    };

    Ok(ToolCall {
        id: id.to_string(),
        name: name.to_string(),
        arguments,
    })
}
