//! # Study Garden Core Library
//!
//! Core logic for Study Garden, a to-do list paired with a Pomodoro-style
//! focus timer and a small reward garden. All state lives in one
//! [`StudyGarden`] value; the CLI (and any other front end) is a thin layer
//! that issues commands, forwards ticks, and renders the queued [`Event`]s.
//!
//! ## Architecture
//!
//! - **Session controller**: state machine over timer mode, selected task and
//!   countdown. Focus completions grant rewards and complete the task.
//! - **Task registry** and **reward ledger**: the two stores the controller
//!   mutates, each persisted as one JSON entry.
//! - **Tick source**: one cancellable one-second interval; ticks are tagged
//!   with a generation so a disarmed source can never move the countdown.
//! - **Storage**: SQLite key-value entries and TOML configuration.
//!
//! ## Key Components
//!
//! - [`StudyGarden`]: the controller and owner of all app state
//! - [`SessionState`]: mode, selection and countdown
//! - [`TaskRegistry`], [`RewardLedger`], [`Garden`], [`CalendarNotes`]
//! - [`Database`]: persistent key-value store
//! - [`Config`]: application configuration

pub mod activity;
pub mod calendar;
pub mod error;
pub mod events;
pub mod garden;
pub mod rewards;
pub mod session;
pub mod storage;
pub mod task;
pub mod timer;

pub use activity::{ActivityLog, LogEntry, LogKind};
pub use calendar::{CalendarNotes, DayNote};
pub use error::{ConfigError, CoreError, StorageError};
pub use events::{Event, NoticeLevel};
pub use garden::{Garden, GardenItem, GardenItemKind, ShopOffer};
pub use rewards::{Currency, RewardEvent, RewardLedger, RewardReason};
pub use session::{Notifier, SessionPhase, SessionState, Silent, StudyGarden};
pub use storage::{Config, Database, KvStore, MemoryStore};
pub use task::{Task, TaskRegistry, Toggle};
pub use timer::{DurationPolicy, IntervalTicker, NoTicks, Tick, TickSource, TimerMode};
