//! The tools the model may call.
//!
//! The tool set is closed: `Tool` enumerates every tool, and the registry
//! matches on it exhaustively. Adding a tool means adding a variant.

mod contacts;
mod definitions;
mod registry;

pub use contacts::{ContactSink, MemoryContacts};
pub use definitions::{to_openai_tool, Tool};
pub use registry::{ToolRegistry, ToolResult};
