//! The focus session controller.
//!
//! [`StudyGarden`] owns every piece of app state and is the only thing that
//! mutates it. Front ends call its commands, feed it ticks, and drain the
//! [`Event`]s it queues. Each command writes the entries it touched back to
//! the key-value store before returning.
//!
//! ## Usage
//!
//! ```ignore
//! let mut app = StudyGarden::open(Box::new(Database::open()?), &config)?;
//! app.select_task(&task_id)?;
//! app.start()?;
//! // On every tick from the armed source:
//! app.on_tick(tick)?;
//! for event in app.drain_events() { render(&event) }
//! ```

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};

use super::state::{SessionPhase, SessionState, TickOutcome};
use crate::activity::{ActivityLog, LogKind};
use crate::calendar::{CalendarNotes, DayNote};
use crate::error::{CoreError, Result};
use crate::events::{Event, NoticeLevel};
use crate::garden::{Garden, GardenItem, GardenItemKind};
use crate::rewards::{
    focus_session_reward, task_completion_reward, Currency, RewardEvent, RewardLedger,
};
use crate::storage::{keys, load_json, save_json, Config, KvStore};
use crate::task::{Task, TaskRegistry, Toggle};
use crate::timer::{format_clock, DurationPolicy, NoTicks, Tick, TickSource, TimerMode};

/// Alert hook, called once whenever a countdown reaches zero.
pub trait Notifier: Send {
    fn countdown_finished(&mut self, mode: TimerMode);
}

/// Notifier that does nothing.
#[derive(Debug, Default)]
pub struct Silent;

impl Notifier for Silent {
    fn countdown_finished(&mut self, _mode: TimerMode) {}
}

/// Application state plus the controller that drives it.
pub struct StudyGarden {
    store: Box<dyn KvStore>,
    ticks: Box<dyn TickSource>,
    notifier: Box<dyn Notifier>,
    policy: DurationPolicy,
    tasks: TaskRegistry,
    ledger: RewardLedger,
    garden: Garden,
    calendar: CalendarNotes,
    activity: ActivityLog,
    session: SessionState,
    events: Vec<Event>,
}

impl StudyGarden {
    /// Load every entry from `store` and restore (or create) the session.
    ///
    /// A first run auto-selects the first incomplete task. A stored session is
    /// restored paused, with its selection re-validated.
    ///
    /// # Errors
    /// Returns an error if a stored entry cannot be read or decoded, or if the
    /// session cannot be written back.
    pub fn open(store: Box<dyn KvStore>, config: &Config) -> Result<Self> {
        let policy = DurationPolicy::from_config(&config.timer);
        let tasks: TaskRegistry = load_json(store.as_ref(), keys::TASKS)?.unwrap_or_default();
        let ledger: RewardLedger = load_json(store.as_ref(), keys::REWARDS)?.unwrap_or_default();
        let garden: Garden = load_json(store.as_ref(), keys::GARDEN_ITEMS)?.unwrap_or_default();
        let calendar: CalendarNotes =
            load_json(store.as_ref(), keys::CALENDAR_EVENTS)?.unwrap_or_default();
        let mut activity: ActivityLog = load_json(store.as_ref(), keys::ACTIVITY_LOG)?
            .unwrap_or_else(|| ActivityLog::with_capacity(config.activity.log_capacity));
        activity.set_capacity(config.activity.log_capacity);
        let stored: Option<SessionState> = load_json(store.as_ref(), keys::SESSION)?;

        let first_run = stored.is_none();
        let session = stored
            .map(SessionState::restored)
            .unwrap_or_else(|| SessionState::new(&policy));

        let mut app = Self {
            store,
            ticks: Box::new(NoTicks),
            notifier: Box::new(Silent),
            policy,
            tasks,
            ledger,
            garden,
            calendar,
            activity,
            session,
            events: Vec::new(),
        };

        if first_run {
            app.activity.push(
                LogKind::Welcome,
                "Welcome to your Serene Study Garden! Let's get productive.",
            );
            if let Some(task) = app.tasks.first_active().cloned() {
                app.session.select(Some(task.id.clone()));
                app.session.load(TimerMode::Focus, task.duration_secs());
            }
            app.save_activity()?;
        } else if app.session.selected_task_id().is_some() && app.active_task().is_none() {
            app.return_to_idle();
        }
        app.save_session()?;
        debug!(
            tasks = app.tasks.len(),
            phase = ?app.session.phase(),
            "study garden opened"
        );
        Ok(app)
    }

    pub fn with_ticks(mut self, ticks: Box<dyn TickSource>) -> Self {
        self.ticks.disarm();
        self.ticks = ticks;
        self
    }

    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn tasks(&self) -> &TaskRegistry {
        &self.tasks
    }

    pub fn ledger(&self) -> &RewardLedger {
        &self.ledger
    }

    pub fn garden(&self) -> &Garden {
        &self.garden
    }

    pub fn calendar(&self) -> &CalendarNotes {
        &self.calendar
    }

    pub fn activity(&self) -> &ActivityLog {
        &self.activity
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn phase(&self) -> SessionPhase {
        self.session.phase()
    }

    /// The selected task, re-resolved by id. `None` when nothing is selected
    /// or the task has since been deleted or completed.
    pub fn active_task(&self) -> Option<&Task> {
        self.session
            .selected_task_id()
            .and_then(|id| self.tasks.active(id))
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        let active = self.active_task();
        Event::StateSnapshot {
            phase: self.session.phase(),
            mode: self.session.mode(),
            selected_task_id: active.map(|t| t.id.clone()),
            selected_task_text: active.map(|t| t.text.clone()),
            remaining_secs: self.session.remaining_secs(),
            display: self.session.clock(),
            running: self.session.is_running(),
            completed_focus_count: self.session.completed_focus_count(),
            ledger: self.ledger,
            at: Utc::now(),
        }
    }

    /// Take all queued events, oldest first.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    // ── Tasks ────────────────────────────────────────────────────────

    /// Add a task from form input.
    ///
    /// # Errors
    /// `InvalidInput` for blank text or non-positive minutes.
    pub fn add_task(&mut self, text: &str, minutes: i64) -> Result<Task> {
        let added = self.tasks.add(text, minutes).map(|t| t.clone());
        let task = match added {
            Ok(task) => task,
            Err(e) => return Err(self.reject(e)),
        };
        info!(task_id = %task.id, minutes = task.time_allocated, "task added");
        self.activity.push(
            LogKind::TaskAdded,
            format!("New task sprout added: \"{}\"!", task.text),
        );
        self.events.push(Event::TaskAdded {
            task_id: task.id.clone(),
            text: task.text.clone(),
            time_allocated: task.time_allocated,
            at: Utc::now(),
        });
        self.save_tasks()?;
        self.save_activity()?;
        Ok(task)
    }

    /// Toggle a task's completion flag.
    ///
    /// Completing grants the task-completion reward and, if the task was
    /// selected, returns the controller to idle. Reopening grants nothing.
    ///
    /// # Errors
    /// `TaskNotFound` for an unknown id, or a storage error.
    pub fn complete_task(&mut self, id: &str) -> Result<Toggle> {
        let toggle = match self.tasks.toggle(id) {
            Ok(toggle) => toggle,
            Err(e) => return Err(self.reject(e)),
        };
        match &toggle {
            Toggle::Completed(task) => {
                info!(task_id = %task.id, "task completed");
                self.grant(task_completion_reward(task.time_allocated))?;
                self.activity.push(
                    LogKind::TaskCompleted,
                    format!("Task \"{}\" completed! Well done!", task.text),
                );
                self.activity.push(
                    LogKind::GardenGrew,
                    "Your garden thrives with each completed task!",
                );
                if self.session.selected_task_id() == Some(task.id.as_str()) {
                    self.notice(
                        NoticeLevel::Info,
                        "Task completed! Select another or take a break.",
                    );
                    self.return_to_idle();
                }
            }
            Toggle::Reopened(task) => {
                self.activity.push(
                    LogKind::TaskReopened,
                    format!("Task \"{}\" marked as active again.", task.text),
                );
            }
        }
        self.events.push(Event::TaskToggled {
            task_id: toggle.task().id.clone(),
            completed: toggle.task().completed,
            at: Utc::now(),
        });
        self.save_tasks()?;
        self.save_activity()?;
        self.save_session()?;
        Ok(toggle)
    }

    /// Delete a task once `confirm` agrees. Returns `false` when declined.
    ///
    /// Deleting the selected task returns the controller to idle.
    ///
    /// # Errors
    /// `TaskNotFound` for an unknown id, or a storage error.
    pub fn delete_task(&mut self, id: &str, confirm: impl FnOnce(&Task) -> bool) -> Result<bool> {
        let Some(task) = self.tasks.get(id).cloned() else {
            return Err(self.reject(CoreError::TaskNotFound(id.to_string())));
        };
        if !confirm(&task) {
            debug!(task_id = %id, "deletion declined");
            return Ok(false);
        }
        self.tasks.remove(id)?;
        if self.session.selected_task_id() == Some(id) {
            self.return_to_idle();
        }
        info!(task_id = %id, "task deleted");
        self.activity
            .push(LogKind::TaskRemoved, format!("Task \"{}\" removed.", task.text));
        self.events.push(Event::TaskDeleted {
            task_id: task.id,
            at: Utc::now(),
        });
        self.save_tasks()?;
        self.save_activity()?;
        self.save_session()?;
        Ok(true)
    }

    // ── Session ──────────────────────────────────────────────────────

    /// Choose the task for the next focus session.
    ///
    /// # Errors
    /// `InvalidSelection` when the task is missing or completed; the
    /// controller is then idle.
    pub fn select_task(&mut self, id: &str) -> Result<()> {
        let Some(task) = self.tasks.active(id).cloned() else {
            let message = if self.tasks.get(id).is_some() {
                "This task is already completed. Choose an active task or unmark it.".to_string()
            } else {
                format!("No task with id {id}. Select an active task.")
            };
            self.return_to_idle();
            self.save_session()?;
            return Err(self.reject(CoreError::InvalidSelection(message)));
        };
        self.ticks.disarm();
        self.session.select(Some(task.id.clone()));
        self.session.load(TimerMode::Focus, task.duration_secs());
        debug!(task_id = %task.id, "task selected");
        self.events.push(Event::TaskSelected {
            task_id: task.id,
            remaining_secs: self.session.remaining_secs(),
            at: Utc::now(),
        });
        self.save_session()
    }

    /// Begin (or resume) the countdown. A no-op while already running.
    ///
    /// # Errors
    /// `NoActiveTask` in focus mode without a valid selected task.
    pub fn start(&mut self) -> Result<()> {
        if self.session.is_running() {
            return Ok(());
        }
        let mode = self.session.mode();
        if mode == TimerMode::Focus && self.active_task().is_none() {
            if self.session.selected_task_id().is_some() {
                self.return_to_idle();
                self.save_session()?;
            }
            return Err(self.reject(CoreError::NoActiveTask));
        }
        if self.session.remaining_secs() == 0 {
            let secs = self.duration_for(mode);
            self.session.load(mode, secs);
        }
        let generation = self.session.begin();
        self.ticks.arm(generation);
        debug!(%mode, generation, remaining = self.session.remaining_secs(), "timer started");
        self.events.push(Event::TimerStarted {
            mode,
            remaining_secs: self.session.remaining_secs(),
            at: Utc::now(),
        });
        self.save_session()
    }

    /// # Errors
    /// Returns a storage error if the session cannot be saved.
    pub fn pause(&mut self) -> Result<()> {
        if !self.session.is_running() {
            return Ok(());
        }
        self.ticks.disarm();
        self.session.halt();
        self.events.push(Event::TimerPaused {
            remaining_secs: self.session.remaining_secs(),
            at: Utc::now(),
        });
        self.save_session()
    }

    /// Stop and reload the current mode's full duration.
    ///
    /// # Errors
    /// Returns a storage error if the session cannot be saved.
    pub fn reset(&mut self) -> Result<()> {
        self.ticks.disarm();
        if self.session.selected_task_id().is_some() && self.active_task().is_none() {
            self.session.select(None);
        }
        let mode = self.session.mode();
        let secs = self.duration_for(mode);
        self.session.load(mode, secs);
        self.events.push(Event::TimerReset {
            mode,
            remaining_secs: secs,
            at: Utc::now(),
        });
        self.save_session()
    }

    /// Manually pick a mode. Stops the countdown; the focus count is kept.
    ///
    /// # Errors
    /// Returns a storage error if the session cannot be saved.
    pub fn switch_mode(&mut self, mode: TimerMode) -> Result<()> {
        self.ticks.disarm();
        let secs = self.duration_for(mode);
        self.session.load(mode, secs);
        debug!(%mode, secs, "mode switched");
        self.events.push(Event::ModeSwitched {
            mode,
            remaining_secs: secs,
            at: Utc::now(),
        });
        self.save_session()
    }

    /// Feed one tick. Ticks from a disarmed source are dropped.
    ///
    /// # Errors
    /// Returns a storage error if state cannot be saved.
    pub fn on_tick(&mut self, tick: Tick) -> Result<()> {
        match self.session.tick(tick.generation) {
            TickOutcome::Stale => {
                debug!(generation = tick.generation, "stale tick dropped");
                Ok(())
            }
            TickOutcome::Counting(remaining) => {
                self.push_countdown(remaining);
                self.save_session()
            }
            TickOutcome::Expired => {
                self.push_countdown(0);
                self.on_expire()
            }
        }
    }

    fn on_expire(&mut self) -> Result<()> {
        self.ticks.disarm();
        let mode = self.session.mode();
        self.notifier.countdown_finished(mode);

        if mode == TimerMode::Focus {
            let count = self.session.record_focus();
            info!(count, "focus session complete");
            self.events.push(Event::TimerExpired {
                mode,
                completed_focus_count: count,
                at: Utc::now(),
            });
            match self.active_task().cloned() {
                Some(task) => {
                    self.activity.push(
                        LogKind::SessionComplete,
                        format!("Pomodoro session for \"{}\" complete!", task.text),
                    );
                    self.grant(focus_session_reward(task.time_allocated))?;
                    self.activity.push(
                        LogKind::GardenGrew,
                        "Focused energy helps your garden grow strong!",
                    );
                    self.complete_task(&task.id)?;
                }
                None => warn!("focus session expired without an active task"),
            }

            let next = self.policy.break_after(count);
            self.session.load(next, self.policy.default_secs(next));
            self.activity.push(
                LogKind::BreakSuggested,
                match next {
                    TimerMode::LongBreak => "Time for a Long Break!",
                    _ => "Time for a Short Break!",
                },
            );
        } else {
            self.events.push(Event::TimerExpired {
                mode,
                completed_focus_count: self.session.completed_focus_count(),
                at: Utc::now(),
            });
            self.activity
                .push(LogKind::BreakFinished, "Break finished! Ready to focus again?");
            match self.active_task().map(Task::duration_secs) {
                Some(secs) => self.session.load(TimerMode::Focus, secs),
                None => {
                    if let Some(stale) = self.session.select(None) {
                        self.events.push(Event::SelectionCleared {
                            task_id: stale,
                            at: Utc::now(),
                        });
                    }
                    self.session
                        .load(TimerMode::Focus, self.policy.default_secs(TimerMode::Focus));
                }
            }
        }

        self.events.push(Event::ModeSwitched {
            mode: self.session.mode(),
            remaining_secs: self.session.remaining_secs(),
            at: Utc::now(),
        });
        self.save_activity()?;
        self.save_session()
    }

    // ── Rewards & garden ─────────────────────────────────────────────

    /// Spend currency from the ledger.
    ///
    /// # Errors
    /// `InsufficientFunds` when the balance is too low; nothing changes.
    pub fn spend(&mut self, currency: Currency, amount: u64) -> Result<u64> {
        let balance = match self.ledger.spend(currency, amount) {
            Ok(balance) => balance,
            Err(e) => return Err(self.reject(e)),
        };
        self.events.push(Event::RewardSpent {
            currency,
            amount,
            ledger: self.ledger,
            at: Utc::now(),
        });
        self.save_ledger()?;
        Ok(balance)
    }

    /// Buy and plant a garden item.
    ///
    /// # Errors
    /// `InsufficientFunds` when the item is unaffordable; no item is added.
    pub fn plant(&mut self, kind: GardenItemKind) -> Result<GardenItem> {
        let offer = kind.offer();
        if self.ledger.balance(offer.currency) < offer.cost {
            warn!(%kind, "cannot afford garden item");
            self.notice(
                NoticeLevel::Warning,
                format!("Not enough {} to buy {kind}. Keep focusing!", offer.currency),
            );
            return Err(CoreError::InsufficientFunds {
                currency: offer.currency,
                needed: offer.cost,
                available: self.ledger.balance(offer.currency),
            });
        }
        self.spend(offer.currency, offer.cost)?;
        let item = GardenItem::plant(kind);
        self.garden.push(item.clone());
        info!(%kind, item_id = %item.id, "garden item planted");
        self.activity.push(
            LogKind::ItemPlanted,
            format!("You planted a {kind}! The garden looks lovelier."),
        );
        self.events.push(Event::ItemPlanted {
            item_id: item.id.clone(),
            kind,
            cost: offer.cost,
            currency: offer.currency,
            ledger: self.ledger,
            at: Utc::now(),
        });
        self.save_garden()?;
        self.save_activity()?;
        Ok(item)
    }

    fn grant(&mut self, reward: RewardEvent) -> Result<()> {
        self.ledger.apply(&reward)?;
        info!(currency = %reward.currency, amount = reward.amount, reason = ?reward.reason, "reward granted");
        self.activity.push(
            LogKind::RewardCollected,
            format!("+{} {} collected!", reward.amount, reward.currency),
        );
        self.events.push(Event::RewardGranted {
            reward,
            ledger: self.ledger,
            at: Utc::now(),
        });
        self.save_ledger()
    }

    // ── Calendar ─────────────────────────────────────────────────────

    /// # Errors
    /// `InvalidInput` for blank text, or a storage error.
    pub fn add_note(&mut self, date: NaiveDate, text: &str) -> Result<DayNote> {
        let added = self.calendar.add(date, text).map(|n| n.clone());
        let note = match added {
            Ok(note) => note,
            Err(e) => return Err(self.reject(e)),
        };
        self.activity
            .push(LogKind::GoalSet, format!("Long-term goal set for {date}."));
        self.save_calendar()?;
        self.save_activity()?;
        Ok(note)
    }

    /// # Errors
    /// `NoteNotFound` for an unknown note, or a storage error.
    pub fn toggle_note(&mut self, date: NaiveDate, id: &str) -> Result<bool> {
        let completed = match self.calendar.toggle(date, id) {
            Ok(completed) => completed,
            Err(e) => return Err(self.reject(e)),
        };
        self.save_calendar()?;
        Ok(completed)
    }

    /// # Errors
    /// `NoteNotFound` for an unknown note, or a storage error.
    pub fn delete_note(&mut self, date: NaiveDate, id: &str) -> Result<DayNote> {
        let removed = match self.calendar.delete(date, id) {
            Ok(note) => note,
            Err(e) => return Err(self.reject(e)),
        };
        self.save_calendar()?;
        Ok(removed)
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Duration policy applied to the current selection.
    fn duration_for(&self, mode: TimerMode) -> u64 {
        self.policy.duration_secs(mode, self.active_task())
    }

    /// No task, focus mode, default duration, not running.
    fn return_to_idle(&mut self) {
        self.ticks.disarm();
        if let Some(task_id) = self.session.select(None) {
            self.events.push(Event::SelectionCleared {
                task_id,
                at: Utc::now(),
            });
        }
        self.session
            .load(TimerMode::Focus, self.policy.default_secs(TimerMode::Focus));
    }

    fn push_countdown(&mut self, remaining: u64) {
        self.events.push(Event::Countdown {
            mode: self.session.mode(),
            remaining_secs: remaining,
            display: format_clock(remaining),
        });
    }

    fn notice(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.events.push(Event::Notice {
            level,
            message: message.into(),
            at: Utc::now(),
        });
    }

    /// Surface a recoverable error to the front end and hand it back.
    fn reject(&mut self, err: CoreError) -> CoreError {
        warn!(error = %err, "action rejected");
        self.notice(NoticeLevel::Warning, err.to_string());
        err
    }

    fn save_tasks(&mut self) -> Result<()> {
        save_json(self.store.as_mut(), keys::TASKS, &self.tasks)
    }

    fn save_ledger(&mut self) -> Result<()> {
        save_json(self.store.as_mut(), keys::REWARDS, &self.ledger)
    }

    fn save_garden(&mut self) -> Result<()> {
        save_json(self.store.as_mut(), keys::GARDEN_ITEMS, &self.garden)
    }

    fn save_calendar(&mut self) -> Result<()> {
        save_json(self.store.as_mut(), keys::CALENDAR_EVENTS, &self.calendar)
    }

    fn save_activity(&mut self) -> Result<()> {
        save_json(self.store.as_mut(), keys::ACTIVITY_LOG, &self.activity)
    }

    fn save_session(&mut self) -> Result<()> {
        save_json(self.store.as_mut(), keys::SESSION, &self.session)
    }
}

impl Drop for StudyGarden {
    fn drop(&mut self) {
        self.ticks.disarm();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn open() -> StudyGarden {
        StudyGarden::open(Box::new(MemoryStore::new()), &Config::default()).unwrap()
    }

    #[test]
    fn first_open_logs_welcome_and_is_idle() {
        let app = open();
        assert_eq!(app.phase(), SessionPhase::Idle);
        assert_eq!(app.activity().entries().next().unwrap().kind, LogKind::Welcome);
    }

    #[test]
    fn rejected_actions_queue_a_notice() {
        let mut app = open();
        assert!(app.add_task("", 10).is_err());
        let events = app.drain_events();
        assert!(matches!(
            events.last(),
            Some(Event::Notice {
                level: NoticeLevel::Warning,
                ..
            })
        ));
    }

    #[test]
    fn selecting_halts_a_running_break() {
        let mut app = open();
        let task = app.add_task("Essay", 20).unwrap();
        app.switch_mode(TimerMode::ShortBreak).unwrap();
        app.start().unwrap();
        assert!(app.session().is_running());
        app.select_task(&task.id).unwrap();
        assert!(!app.session().is_running());
        assert_eq!(app.session().mode(), TimerMode::Focus);
        assert_eq!(app.session().remaining_secs(), 20 * 60);
    }

    #[test]
    fn plant_spends_exact_cost() {
        let mut app = open();
        let task = app.add_task("Short", 10).unwrap();
        app.complete_task(&task.id).unwrap();
        assert_eq!(app.ledger().water_drops, 1);
        assert!(app.plant(GardenItemKind::Sapling).is_err());
        assert!(app.garden().items().is_empty());
        assert_eq!(app.ledger().water_drops, 1);
    }
}
