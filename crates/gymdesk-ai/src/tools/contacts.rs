//! Where captured contact usernames go.

use std::sync::Mutex;

use crate::ToolError;

/// Destination for usernames captured by `store_snapchat_username`.
pub trait ContactSink: Send + Sync {
    fn store(&self, username: &str) -> Result<(), ToolError>;
}

/// Keeps captured usernames in memory for the life of the process.
#[derive(Debug, Default)]
pub struct MemoryContacts {
    usernames: Mutex<Vec<String>>,
}

impl MemoryContacts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn usernames(&self) -> Vec<String> {
        self.usernames
            .lock()
            .map(|list| list.clone())
            .unwrap_or_default()
    }
}

impl ContactSink for MemoryContacts {
    fn store(&self, username: &str) -> Result<(), ToolError> {
        let mut list = self
            .usernames
            .lock()
            .map_err(|_| ToolError::StorageUnavailable("contact list lock poisoned".into()))?;
        list.push(username.to_string());
        Ok(())
    }
}
