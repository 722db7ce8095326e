//! Plain-text formatting for the terminal front-end.

use std::fmt::Display;

use gymdesk_ai::{Message, Role, TokenTracker, TurnEvent};
use gymdesk_common::{Notice, NoticeLevel};
use gymdesk_config::schema::ChatConfig;

pub const PROMPT: &str = "> ";
pub const PASSWORD_PROMPT: &str = "Password: ";

/// Title line, underline, and caption.
pub fn header(chat: &ChatConfig) -> String {
    let rule = "=".repeat(chat.title.chars().count().max(1));
    if chat.caption.is_empty() {
        format!("{}\n{rule}\n", chat.title)
    } else {
        format!("{}\n{rule}\n{}\n", chat.title, chat.caption)
    }
}

/// One transcript message as a `role: content` line.
///
/// System prompts, tool payloads, and assistant messages without visible
/// text are not shown.
pub fn message_line(msg: &Message) -> Option<String> {
    match msg.role {
        Role::System | Role::Tool => None,
        Role::User | Role::Assistant => msg
            .visible_content()
            .map(|text| format!("{}: {text}", msg.role.as_str())),
    }
}

pub fn notice_line(notice: &Notice) -> String {
    let tag = match notice.level {
        NoticeLevel::Info => "info",
        NoticeLevel::Warning => "warning",
        NoticeLevel::Error => "error",
    };
    format!("[{tag}] {}", notice.text)
}

/// A mid-turn event, in the same shape as transcript lines and notices.
pub fn event_line(event: &TurnEvent) -> String {
    match event {
        TurnEvent::Reply(text) => format!("{}: {text}", Role::Assistant.as_str()),
        TurnEvent::Notice(notice) => notice_line(notice),
    }
}

pub fn error_line(err: &dyn Display) -> String {
    format!("error: {err}")
}

pub fn usage_line(tracker: &TokenTracker) -> String {
    let total = tracker.total();
    format!(
        "usage: {} calls, {} input + {} output = {} tokens",
        tracker.call_count(),
        total.input_tokens,
        total.output_tokens,
        tracker.total_tokens()
    )
}
