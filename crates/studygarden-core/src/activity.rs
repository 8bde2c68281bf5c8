//! Bounded recent-activity feed, newest entry first.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CAPACITY: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LogKind {
    Welcome,
    TaskAdded,
    TaskCompleted,
    TaskReopened,
    TaskRemoved,
    SessionComplete,
    BreakSuggested,
    BreakFinished,
    RewardCollected,
    GardenGrew,
    ItemPlanted,
    GoalSet,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub kind: LogKind,
    pub message: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityLog {
    capacity: usize,
    entries: VecDeque<LogEntry>,
}

impl ActivityLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: VecDeque::new(),
        }
    }

    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        self.entries.truncate(self.capacity);
    }

    pub fn push(&mut self, kind: LogKind, message: impl Into<String>) {
        let message = message.into();
        tracing::trace!(?kind, %message, "activity");
        self.entries.push_front(LogEntry {
            kind,
            message,
            at: Utc::now(),
        });
        self.entries.truncate(self.capacity);
    }

    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}
