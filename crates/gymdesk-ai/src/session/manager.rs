//! Session struct and its state accessors.

use gymdesk_common::{NoticeQueue, SessionId};
use tracing::debug;

use crate::gate::AccessGate;
use crate::token_tracker::TokenTracker;
use crate::transcript::Transcript;
use crate::ChatError;

/// One user's chat session.
///
/// Turns take `&mut Session`, so two turns can never run on the same
/// transcript at once.
pub struct Session {
    pub(super) id: SessionId,
    pub(super) transcript: Transcript,
    pub(super) gate: AccessGate,
    pub(super) notices: NoticeQueue,
    pub(super) tracker: TokenTracker,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: SessionId::new(),
            transcript: Transcript::new(),
            gate: AccessGate::new(),
            notices: NoticeQueue::default(),
            tracker: TokenTracker::new(),
        }
    }

    pub fn with_notices(mut self, notices: NoticeQueue) -> Self {
        self.notices = notices;
        self
    }

    /// Seed the transcript. Calling it again is a no-op.
    pub fn start(&mut self, system_prompt: &str, greeting: &str) {
        if !self.transcript.is_initialized() {
            debug!(session = %self.id, "seeding transcript");
        }
        self.transcript.initialize(system_prompt, greeting);
    }

    /// Pass the submitted password through the access gate.
    pub fn authorize(&mut self, submitted: String, expected: Option<&str>) -> Result<(), ChatError> {
        self.gate.submit(submitted, expected)
    }

    pub fn is_authorized(&self) -> bool {
        self.gate.is_authorized()
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn gate(&self) -> &AccessGate {
        &self.gate
    }

    pub fn notices_mut(&mut self) -> &mut NoticeQueue {
        &mut self.notices
    }

    pub fn tracker(&self) -> &TokenTracker {
        &self.tracker
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
