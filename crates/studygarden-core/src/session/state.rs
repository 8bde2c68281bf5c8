//! Focus session state.
//!
//! A plain record of mode, selection and countdown. It knows how to count
//! down; deciding what happens at zero is the controller's job.
//!
//! ## Phases
//!
//! ```text
//! Idle --select--> Selected --start--> Running --0--> Expired --> OnBreak
//!  ^                                                                 |
//!  +---------------- (task gone) <-------- break ends ---------------+
//! ```

use serde::{Deserialize, Serialize};

use crate::timer::{format_clock, DurationPolicy, TimerMode};

/// Coarse phase derived from [`SessionState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionPhase {
    /// No task, focus mode, not running.
    Idle,
    /// Task chosen, not running.
    Selected,
    /// Focus countdown active.
    Running,
    /// Countdown at zero, transition pending.
    Expired,
    /// Short or long break, running or not.
    OnBreak,
}

/// Result of feeding one tick to the countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not running, or the tick came from a source that has been disarmed.
    Stale,
    Counting(u64),
    Expired,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    mode: TimerMode,
    /// Weak reference: names a task, never owns it.
    #[serde(default)]
    selected_task_id: Option<String>,
    remaining_seconds: u64,
    #[serde(default)]
    running: bool,
    #[serde(default)]
    completed_focus_count: u32,
    /// Bumped on every start; ticks carrying an older value are ignored.
    #[serde(skip)]
    generation: u64,
}

impl SessionState {
    pub fn new(policy: &DurationPolicy) -> Self {
        Self {
            mode: TimerMode::Focus,
            selected_task_id: None,
            remaining_seconds: policy.default_secs(TimerMode::Focus),
            running: false,
            completed_focus_count: 0,
            generation: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    pub fn selected_task_id(&self) -> Option<&str> {
        self.selected_task_id.as_deref()
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_seconds
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn completed_focus_count(&self) -> u32 {
        self.completed_focus_count
    }

    /// Generation of the currently armed tick source.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Countdown formatted as `MM:SS`.
    pub fn clock(&self) -> String {
        format_clock(self.remaining_seconds)
    }

    pub fn phase(&self) -> SessionPhase {
        if self.mode.is_break() {
            SessionPhase::OnBreak
        } else if self.running {
            SessionPhase::Running
        } else if self.remaining_seconds == 0 {
            SessionPhase::Expired
        } else if self.selected_task_id.is_some() {
            SessionPhase::Selected
        } else {
            SessionPhase::Idle
        }
    }

    // ── Transitions ──────────────────────────────────────────────────

    /// Stored sessions always come back paused.
    pub(crate) fn restored(mut self) -> Self {
        self.running = false;
        self
    }

    /// Stop and load a fresh countdown for `mode`.
    pub(crate) fn load(&mut self, mode: TimerMode, secs: u64) {
        self.running = false;
        self.mode = mode;
        self.remaining_seconds = secs;
    }

    pub(crate) fn select(&mut self, task_id: Option<String>) -> Option<String> {
        std::mem::replace(&mut self.selected_task_id, task_id)
    }

    /// Mark running and return the generation the tick source must be armed with.
    pub(crate) fn begin(&mut self) -> u64 {
        self.running = true;
        self.generation = self.generation.wrapping_add(1);
        self.generation
    }

    pub(crate) fn halt(&mut self) {
        self.running = false;
    }

    pub(crate) fn tick(&mut self, generation: u64) -> TickOutcome {
        if !self.running || generation != self.generation {
            return TickOutcome::Stale;
        }
        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds == 0 {
            self.running = false;
            TickOutcome::Expired
        } else {
            TickOutcome::Counting(self.remaining_seconds)
        }
    }

    pub(crate) fn record_focus(&mut self) -> u32 {
        self.completed_focus_count = self.completed_focus_count.saturating_add(1);
        self.completed_focus_count
    }
}
