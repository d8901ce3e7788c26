use std::collections::VecDeque;

use time::OffsetDateTime;
use time::macros::format_description;
use tracing::{error, info, warn};

pub const MAX_ENTRIES: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub at: OffsetDateTime,
    pub level: LogLevel,
    pub message: String,
}

impl LogEntry {
    pub fn clock(&self) -> String {
        let format = format_description!("[hour]:[minute]:[second]");
        self.at
            .format(format)
            .unwrap_or_else(|_| "--:--:--".to_string())
    }
}

/// Bounded activity log shown in the Log panel. Entries are mirrored to
/// `tracing` as they are recorded.
#[derive(Debug, Clone, Default)]
pub struct ActivityLog {
    entries: VecDeque<LogEntry>,
}

impl ActivityLog {
    pub fn push(&mut self, level: LogLevel, message: impl Into<String>) {
        self.push_at(now(), level, message);
    }

    pub fn push_at(&mut self, at: OffsetDateTime, level: LogLevel, message: impl Into<String>) {
        let message = message.into();
        match level {
            LogLevel::Info | LogLevel::Success => info!(?level, "{message}"),
            LogLevel::Warning => warn!("{message}"),
            LogLevel::Error => error!("{message}"),
        }

        self.entries.push_back(LogEntry { at, level, message });
        while self.entries.len() > MAX_ENTRIES {
            self.entries.pop_front();
        }
    }

    pub fn entries(&self) -> impl DoubleEndedIterator<Item = &LogEntry> + ExactSizeIterator {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}
