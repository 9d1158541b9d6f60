//! Transient user-facing notifications.

use std::collections::VecDeque;

use chrono::{DateTime, Local};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub at: DateTime<Local>,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
            at: Local::now(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
            at: Local::now(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }

    /// `HH:MM:SS message`
    pub fn timestamped(&self) -> String {
        format!("{} {}", self.at.format("%H:%M:%S"), self.message)
    }
}

/// Bounded, newest-last history of notices.
#[derive(Debug, Clone)]
pub struct NoticeLog {
    entries: VecDeque<Notice>,
    capacity: usize,
}

impl Default for NoticeLog {
    fn default() -> Self {
        Self::with_capacity(20)
    }
}

impl NoticeLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, notice: Notice) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(notice);
    }

    pub fn extend(&mut self, notice: Option<Notice>) {
        if let Some(notice) = notice {
            self.push(notice);
        }
    }

    pub fn latest(&self) -> Option<&Notice> {
        self.entries.back()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Notice> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
