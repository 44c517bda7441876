//! User-facing notices
//!
//! Fire-and-forget: the façades push a notice and move on. A front-end
//! decides how to show them (toast, status line, log).

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Notice sink
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Writes notices to the log
#[derive(Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => info!(notice = %notice.message, "Notice"),
            NoticeLevel::Error => error!(notice = %notice.message, "Notice"),
        }
    }
}

/// Keeps every notice in memory, in arrival order
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take all notices received so far
    pub fn drain(&self) -> Vec<Notice> {
        match self.notices.lock() {
            Ok(mut notices) => std::mem::take(&mut *notices),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }

    pub fn errors(&self) -> Vec<Notice> {
        self.snapshot()
            .into_iter()
            .filter(|n| n.level == NoticeLevel::Error)
            .collect()
    }

    pub fn successes(&self) -> Vec<Notice> {
        self.snapshot()
            .into_iter()
            .filter(|n| n.level == NoticeLevel::Success)
            .collect()
    }

    fn snapshot(&self) -> Vec<Notice> {
        match self.notices.lock() {
            Ok(notices) => notices.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        match self.notices.lock() {
            Ok(mut notices) => notices.push(notice),
            Err(poisoned) => poisoned.into_inner().push(notice),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_notifier_splits_levels() {
        let sink = RecordingNotifier::new();
        sink.notify(Notice::success("Task created successfully"));
        sink.notify(Notice::error("Failed to create task"));

        assert_eq!(sink.successes().len(), 1);
        assert_eq!(sink.errors()[0].message, "Failed to create task");
        assert_eq!(sink.drain().len(), 2);
        assert!(sink.drain().is_empty());
    }
}
