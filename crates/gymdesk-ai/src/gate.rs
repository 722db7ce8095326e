//! Shared-password access gate.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tracing::{info, warn};

use crate::ChatError;

/// Constant-time password comparison.
///
/// Both sides are hashed first so the comparison touches the same number of
/// bytes whatever the submitted length or the first differing position.
pub fn check_access(submitted: &str, expected: &str) -> bool {
    let a = Sha256::digest(submitted.as_bytes());
    let b = Sha256::digest(expected.as_bytes());
    a.as_slice().ct_eq(b.as_slice()).into()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessState {
    #[default]
    Unauthorized,
    /// Sticky for the rest of the session.
    Authorized,
}

#[derive(Debug, Default)]
pub struct AccessGate {
    state: AccessState,
    failed_attempts: u32,
}

impl AccessGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check a submitted password against the configured one.
    ///
    /// Once authorized, further calls succeed without comparing anything.
    /// The submitted string is consumed so it does not outlive the check.
    pub fn submit(&mut self, submitted: String, expected: Option<&str>) -> Result<(), ChatError> {
        if self.state == AccessState::Authorized {
            return Ok(());
        }

        let expected = expected.ok_or(ChatError::MissingCredential("access password"))?;

        if check_access(&submitted, expected) {
            self.state = AccessState::Authorized;
            info!(failed_attempts = self.failed_attempts, "session authorized");
            Ok(())
        } else {
            self.state = AccessState::Unauthorized;
            self.failed_attempts = self.failed_attempts.saturating_add(1);
            warn!(failed_attempts = self.failed_attempts, "password rejected");
            Err(ChatError::AuthFailure)
        }
    }

    pub fn state(&self) -> AccessState {
        self.state
    }

    pub fn is_authorized(&self) -> bool {
        self.state == AccessState::Authorized
    }

    pub fn failed_attempts(&self) -> u32 {
        self.failed_attempts
    }
}
