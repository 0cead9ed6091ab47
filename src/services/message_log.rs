use chrono::Local;
use std::collections::VecDeque;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStyle {
    Error,
    Chat,
    Info,
}

impl LogStyle {
    pub fn class_name(&self) -> &'static str {
        match self {
            LogStyle::Error => "red",
            LogStyle::Chat => "blue",
            LogStyle::Info => "dark-grey",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Local wall clock, `HH:MM:SS`
    pub timestamp: String,
    pub text: String,
    pub style: Option<LogStyle>,
}

impl LogEntry {
    pub fn line(&self) -> String {
        format!("{} {}", self.timestamp, self.text)
    }
}

/// User-visible message window, most recent entry first.
#[derive(Debug, Default)]
pub struct MessageLog {
    entries: VecDeque<LogEntry>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, text: impl Into<String>, style: Option<LogStyle>) {
        let entry = LogEntry {
            timestamp: Local::now().format("%H:%M:%S").to_string(),
            text: text.into(),
            style,
        };
        match style {
            Some(LogStyle::Error) => warn!(target: "leapshare::messages", "{}", entry.text),
            _ => info!(target: "leapshare::messages", "{}", entry.text),
        }
        self.entries.push_front(entry);
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.append(text, Some(LogStyle::Info));
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.append(text, Some(LogStyle::Error));
    }

    pub fn chat(&mut self, identity: &str, text: &str) {
        self.append(format!("{}: {}", identity, text), Some(LogStyle::Chat));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
