use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::garden::GardenItemKind;
use crate::rewards::{Currency, RewardEvent, RewardLedger};
use crate::session::SessionPhase;
use crate::timer::TimerMode;

/// Every state change in the app produces an Event.
/// Front ends drain them after each command and re-render what changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TaskAdded {
        task_id: String,
        text: String,
        time_allocated: u32,
        at: DateTime<Utc>,
    },
    TaskToggled {
        task_id: String,
        completed: bool,
        at: DateTime<Utc>,
    },
    TaskDeleted {
        task_id: String,
        at: DateTime<Utc>,
    },
    TaskSelected {
        task_id: String,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// The controller dropped its task and is back to idle focus.
    SelectionCleared {
        task_id: String,
        at: DateTime<Utc>,
    },
    TimerStarted {
        mode: TimerMode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        mode: TimerMode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    ModeSwitched {
        mode: TimerMode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// Countdown display update, once per tick.
    Countdown {
        mode: TimerMode,
        remaining_secs: u64,
        display: String,
    },
    TimerExpired {
        mode: TimerMode,
        completed_focus_count: u32,
        at: DateTime<Utc>,
    },
    RewardGranted {
        reward: RewardEvent,
        ledger: RewardLedger,
        at: DateTime<Utc>,
    },
    RewardSpent {
        currency: Currency,
        amount: u64,
        ledger: RewardLedger,
        at: DateTime<Utc>,
    },
    ItemPlanted {
        item_id: String,
        kind: GardenItemKind,
        cost: u64,
        currency: Currency,
        ledger: RewardLedger,
        at: DateTime<Utc>,
    },
    /// User-facing prompt for a rejected or noteworthy action.
    Notice {
        level: NoticeLevel,
        message: String,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        phase: SessionPhase,
        mode: TimerMode,
        selected_task_id: Option<String>,
        selected_task_text: Option<String>,
        remaining_secs: u64,
        display: String,
        running: bool,
        completed_focus_count: u32,
        ledger: RewardLedger,
        at: DateTime<Utc>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
}
