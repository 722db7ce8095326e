//! Chat copy: page title, seed prompt, and greeting.

use serde::{Deserialize, Serialize};

pub const DEFAULT_SYSTEM_PROMPT: &str = "\
You are a chatbot put on a gym website. You can use the following tools:

- store_snapchat_username: Store Snapchat username provided by user during chat.

Your job is to help onboard new clients and help them by providing info.
The gym is open in the city of San Francisco. You can use the following information:

Open hours: 08:00 - 22:00 Monday - Friday
Subscription fee: $5.00

If the user shows interest in joining the gym, you can provide more info,
but ask for their Snapchat username so you can send details to them.";

/// Chat session copy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub title: String,
    pub caption: String,
    /// First transcript message; sent to the model, never rendered.
    pub system_prompt: String,
    /// Assistant message shown when a session starts.
    pub greeting: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            title: "Snapchat Demo".into(),
            caption: "Terminal app for demo purposes".into(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
            greeting: "Hello, how can I help?".into(),
        }
    }
}
