//! Terminal rendering of controller events.

use std::cell::Cell;
use std::io::Write;

use serde::Serialize;
use studygarden_core::timer::format_clock;
use studygarden_core::{Event, NoticeLevel, RewardLedger, SessionPhase, StudyGarden};

/// Where command output goes: one JSON object per line, or plain text.
pub struct Output {
    json: bool,
    /// A countdown line is on screen without a trailing newline.
    mid_line: Cell<bool>,
}

impl Output {
    pub fn new(json: bool) -> Self {
        Self {
            json,
            mid_line: Cell::new(false),
        }
    }

    pub fn is_json(&self) -> bool {
        self.json
    }

    /// Print everything the controller queued since the last drain.
    pub fn events(&self, app: &mut StudyGarden) -> Result<(), serde_json::Error> {
        for event in app.drain_events() {
            self.event(&event)?;
        }
        Ok(())
    }

    pub fn event(&self, event: &Event) -> Result<(), serde_json::Error> {
        if self.json {
            println!("{}", serde_json::to_string(event)?);
            return Ok(());
        }
        if let Event::Countdown { mode, display, .. } = event {
            print!("\r{} {display}", mode.label());
            let _ = std::io::stdout().flush();
            self.mid_line.set(true);
            return Ok(());
        }
        if let Some(text) = describe(event) {
            self.line(&text);
        }
        Ok(())
    }

    /// Print a result value: pretty JSON, or the given text.
    pub fn value<T: Serialize>(
        &self,
        value: &T,
        text: impl FnOnce() -> String,
    ) -> Result<(), serde_json::Error> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            self.line(&text());
        }
        Ok(())
    }

    /// Print a plain text line. Suppressed in JSON mode.
    pub fn say(&self, text: &str) {
        if !self.json {
            self.line(text);
        }
    }

    fn line(&self, text: &str) {
        if self.mid_line.replace(false) {
            println!();
        }
        println!("{text}");
    }
}

pub fn ledger_line(ledger: &RewardLedger) -> String {
    format!(
        "💧 {} Water Drops | ☀️ {} Sunlight Points",
        ledger.water_drops, ledger.sunlight_points
    )
}

fn describe(event: &Event) -> Option<String> {
    let text = match event {
        Event::TaskAdded {
            task_id,
            text,
            time_allocated,
            ..
        } => format!("Task added: {text} ({time_allocated} min) [{task_id}]"),
        Event::TaskToggled {
            task_id, completed, ..
        } => {
            if *completed {
                format!("Task completed: {task_id}")
            } else {
                format!("Task reopened: {task_id}")
            }
        }
        Event::TaskDeleted { task_id, .. } => format!("Task deleted: {task_id}"),
        Event::TaskSelected {
            task_id,
            remaining_secs,
            ..
        } => format!("Selected {task_id} ({})", format_clock(*remaining_secs)),
        Event::SelectionCleared { task_id, .. } => format!("No longer focusing on {task_id}"),
        Event::TimerStarted {
            mode,
            remaining_secs,
            ..
        } => format!("{} started at {}", mode.label(), format_clock(*remaining_secs)),
        Event::TimerPaused { remaining_secs, .. } => {
            format!("Paused at {}", format_clock(*remaining_secs))
        }
        Event::TimerReset {
            mode,
            remaining_secs,
            ..
        } | Event::ModeSwitched {
            mode,
            remaining_secs,
            ..
        } => format!("{}: {}", mode.label(), format_clock(*remaining_secs)),
        Event::Countdown { .. } => return None,
        Event::TimerExpired {
            mode,
            completed_focus_count,
            ..
        } => format!(
            "{} finished! Focus sessions completed: {completed_focus_count}",
            mode.label()
        ),
        Event::RewardGranted { reward, .. } => {
            format!("+{} {} collected!", reward.amount, reward.currency)
        }
        Event::RewardSpent {
            currency, amount, ..
        } => format!("-{amount} {currency}"),
        Event::ItemPlanted {
            kind,
            cost,
            currency,
            ..
        } => format!("{} Planted a {kind} for {cost} {currency}", kind.icon()),
        Event::Notice { level, message, .. } => match level {
            NoticeLevel::Info => message.clone(),
            NoticeLevel::Warning => format!("warning: {message}"),
        },
        Event::StateSnapshot {
            phase,
            mode,
            selected_task_text,
            display,
            running,
            completed_focus_count,
            ledger,
            ..
        } => {
            let task = match (phase, selected_task_text) {
                (_, Some(text)) => text.as_str(),
                (SessionPhase::OnBreak, None) => "(break)",
                _ => "(none selected)",
            };
            let state = if *running { "running" } else { "paused" };
            format!(
                "Mode:     {} ({state})\nClock:    {display}\nTask:     {task}\nSessions: {completed_focus_count}\n{}",
                mode.label(),
                ledger_line(ledger)
            )
        }
    };
    Some(text)
}
