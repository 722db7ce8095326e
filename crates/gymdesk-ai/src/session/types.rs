//! Per-turn state machine, progress events, and report.

use gymdesk_common::Notice;

use crate::tools::ToolResult;

/// Where a turn is in the exchange.
///
/// `AwaitingInput -> ModelRequested -> Done` without tools, or
/// `AwaitingInput -> ModelRequested -> ToolRequested -> ToolDispatched ->
/// FollowupRequested -> Done` with one tool round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    AwaitingInput,
    ModelRequested,
    ToolRequested,
    ToolDispatched,
    FollowupRequested,
    Done,
}

impl TurnState {
    pub fn can_advance_to(self, next: TurnState) -> bool {
        use TurnState::*;
        matches!(
            (self, next),
            (AwaitingInput, ModelRequested)
                | (ModelRequested, ToolRequested)
                | (ModelRequested, Done)
                | (ToolRequested, ToolDispatched)
                | (ToolDispatched, FollowupRequested)
                | (FollowupRequested, Done)
        )
    }
}

/// Something the user should see while a turn is still running.
#[derive(Debug, Clone)]
pub enum TurnEvent {
    /// Assistant text, as soon as the reply carrying it arrives.
    Reply(String),
    /// A notice raised by a tool handler, right after the tool ran.
    Notice(Notice),
}

/// What one completed turn did.
#[derive(Debug, Clone)]
pub struct TurnReport {
    /// Every state visited, starting at `AwaitingInput`.
    pub path: Vec<TurnState>,
    /// Assistant text shown to the user, in order.
    pub surfaced: Vec<String>,
    /// Results of successfully dispatched tools.
    pub tool_results: Vec<ToolResult>,
    /// Notices raised by tool handlers, taken out of the session queue
    /// as soon as the tools ran.
    pub notices: Vec<Notice>,
    /// Messages this turn appended to the transcript.
    pub appended: usize,
}

impl TurnReport {
    pub(crate) fn new() -> Self {
        Self {
            path: vec![TurnState::AwaitingInput],
            surfaced: Vec::new(),
            tool_results: Vec::new(),
            notices: Vec::new(),
            appended: 0,
        }
    }

    pub(crate) fn advance(&mut self, next: TurnState) {
        debug_assert!(
            self.state().can_advance_to(next),
            "illegal turn transition {:?} -> {next:?}",
            self.state()
        );
        tracing::trace!(from = ?self.state(), to = ?next, "turn state");
        self.path.push(next);
    }

    pub fn state(&self) -> TurnState {
        self.path.last().copied().unwrap_or(TurnState::AwaitingInput)
    }

    pub fn used_tool(&self) -> bool {
        self.path.contains(&TurnState::ToolRequested)
    }
}
