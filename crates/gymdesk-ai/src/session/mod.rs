//! Conversation session management.
//!
//! A `Session` owns one user's transcript, access state, notices, and token
//! usage. `Conversation` drives turns against a `Session`: it holds the
//! model client and the tool registry, which are shared by all sessions.

mod driver;
mod manager;
mod types;

#[cfg(test)]
mod tests;

pub use driver::Conversation;
pub use manager::Session;
pub use types::{TurnEvent, TurnReport, TurnState};
