//! Ephemeral notices shown next to the transcript.
//!
//! Tool handlers push notices here; the front-end drains them after each
//! turn. Notices are never part of the transcript.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Severity level for a notice banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A single banner message.
#[derive(Debug, Clone)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
    pub created_at: Instant,
    pub ttl: Duration,
}

impl Notice {
    pub fn new(level: NoticeLevel, text: impl Into<String>, ttl: Duration) -> Self {
        Self {
            level,
            text: text.into(),
            created_at: Instant::now(),
            ttl,
        }
    }

    /// Returns `true` if this notice has outlived its TTL.
    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= self.ttl
    }
}

/// A bounded queue of notices that drops expired entries.
#[derive(Debug)]
pub struct NoticeQueue {
    items: VecDeque<Notice>,
    capacity: usize,
    ttl: Duration,
}

impl NoticeQueue {
    /// Creates a queue holding at most `capacity` notices, each living `ttl`.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
            ttl,
        }
    }

    /// Pushes a notice, evicting expired entries first.
    /// If still at capacity after eviction, the oldest entry is removed.
    pub fn push(&mut self, level: NoticeLevel, text: impl Into<String>) {
        self.evict_expired();
        if self.items.len() >= self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(Notice::new(level, text, self.ttl));
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.push(NoticeLevel::Info, text);
    }

    pub fn warning(&mut self, text: impl Into<String>) {
        self.push(NoticeLevel::Warning, text);
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.push(NoticeLevel::Error, text);
    }

    /// Removes and returns every live notice, oldest first.
    pub fn drain(&mut self) -> Vec<Notice> {
        self.evict_expired();
        self.items.drain(..).collect()
    }

    /// Returns the number of notices currently queued (including expired).
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn evict_expired(&mut self) {
        self.items.retain(|n| !n.is_expired());
    }
}

impl Default for NoticeQueue {
    fn default() -> Self {
        Self::new(16, Duration::from_secs(8))
    }
}
