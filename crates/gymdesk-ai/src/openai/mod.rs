//! OpenAI chat-completions client.
//!
//! Implements the `AiClient` trait against any OpenAI-compatible
//! `POST {api_base}/chat/completions` endpoint with bearer-token auth.

mod api;
mod client;
mod config;

pub use client::OpenAiClient;
pub use config::OpenAiConfig;
