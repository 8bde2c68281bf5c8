use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::storage::TimerConfig;
use crate::task::Task;

/// Timer modes. Focus sessions are tied to a task; breaks never are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimerMode {
    Focus,
    ShortBreak,
    LongBreak,
}

impl TimerMode {
    pub fn is_break(self) -> bool {
        matches!(self, TimerMode::ShortBreak | TimerMode::LongBreak)
    }

    pub fn label(self) -> &'static str {
        match self {
            TimerMode::Focus => "Focus",
            TimerMode::ShortBreak => "Short Break",
            TimerMode::LongBreak => "Long Break",
        }
    }
}

impl fmt::Display for TimerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TimerMode::Focus => "focus",
            TimerMode::ShortBreak => "shortBreak",
            TimerMode::LongBreak => "longBreak",
        };
        f.write_str(s)
    }
}

impl FromStr for TimerMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "focus" | "pomodoro" => Ok(TimerMode::Focus),
            "shortbreak" | "short" => Ok(TimerMode::ShortBreak),
            "longbreak" | "long" => Ok(TimerMode::LongBreak),
            _ => Err(CoreError::invalid_input(
                "mode",
                format!("unknown timer mode '{s}' (expected focus, short-break or long-break)"),
            )),
        }
    }
}

/// Duration policy: a focus session on a valid task lasts as long as the task's
/// allocation, everything else uses the fixed defaults.
///
/// Only built through [`DurationPolicy::from_config`] or `Default`, so every
/// length and the long-break interval are non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationPolicy {
    focus_min: u64,
    short_break_min: u64,
    long_break_min: u64,
    /// Every n-th completed focus session is followed by a long break.
    long_break_every: u32,
}

impl DurationPolicy {
    pub fn from_config(cfg: &TimerConfig) -> Self {
        let defaults = Self::default();
        Self {
            focus_min: nonzero_or(cfg.focus_minutes, defaults.focus_min),
            short_break_min: nonzero_or(cfg.short_break_minutes, defaults.short_break_min),
            long_break_min: nonzero_or(cfg.long_break_minutes, defaults.long_break_min),
            long_break_every: if cfg.long_break_every == 0 {
                defaults.long_break_every
            } else {
                cfg.long_break_every
            },
        }
    }

    /// Fixed default length of a mode in seconds.
    pub fn default_secs(&self, mode: TimerMode) -> u64 {
        let minutes = match mode {
            TimerMode::Focus => self.focus_min,
            TimerMode::ShortBreak => self.short_break_min,
            TimerMode::LongBreak => self.long_break_min,
        };
        minutes.saturating_mul(60)
    }

    /// Length of `mode` in seconds given the (already resolved) active task.
    pub fn duration_secs(&self, mode: TimerMode, active: Option<&Task>) -> u64 {
        match (mode, active) {
            (TimerMode::Focus, Some(task)) => task.duration_secs(),
            _ => self.default_secs(mode),
        }
    }

    /// Break that follows the `completed_focus_count`-th focus session.
    pub fn break_after(&self, completed_focus_count: u32) -> TimerMode {
        if completed_focus_count > 0 && completed_focus_count % self.long_break_every == 0 {
            TimerMode::LongBreak
        } else {
            TimerMode::ShortBreak
        }
    }
}

impl Default for DurationPolicy {
    fn default() -> Self {
        Self {
            focus_min: 25,
            short_break_min: 5,
            long_break_min: 15,
            long_break_every: 4,
        }
    }
}

fn nonzero_or(value: u64, fallback: u64) -> u64 {
    if value == 0 {
        fallback
    } else {
        value
    }
}

/// Format seconds as a zero-padded `MM:SS` countdown.
pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
