//! Append-only message history for one chat session.

use crate::{ChatError, Message, Role};

#[derive(Debug, Default, Clone)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with the system prompt and the assistant greeting.
    /// No-op when the transcript already has messages.
    pub fn initialize(&mut self, system_prompt: &str, greeting: &str) {
        if self.is_initialized() {
            return;
        }
        self.messages.push(Message::system(system_prompt));
        self.messages.push(Message::assistant(greeting));
    }

    pub fn is_initialized(&self) -> bool {
        !self.messages.is_empty()
    }

    /// Append a message.
    ///
    /// A `tool` message must answer a tool call made by an earlier
    /// assistant message; anything else is appended unchecked.
    pub fn append(&mut self, message: Message) -> Result<(), ChatError> {
        if message.role == Role::Tool {
            let id = message.tool_call_id.as_deref().unwrap_or_default();
            if !self.has_tool_call(id) {
                return Err(ChatError::OrphanToolResult(id.to_string()));
            }
        }
        self.messages.push(message);
        Ok(())
    }

    fn has_tool_call(&self, id: &str) -> bool {
        !id.is_empty()
            && self
                .messages
                .iter()
                .filter(|m| m.role == Role::Assistant)
                .flat_map(|m| m.tool_calls.iter())
                .any(|c| c.id == id)
    }

    pub fn all(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
