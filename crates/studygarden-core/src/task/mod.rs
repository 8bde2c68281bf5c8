//! Task registry.
//!
//! An ordered list of tasks that is persisted as a whole after every mutation.
//! The session controller only ever names tasks by id; it resolves them through
//! [`TaskRegistry::active`] on every read.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, Result};

/// A to-do item that can back a focus session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub text: String,
    /// Allocated focus time in minutes. Always > 0.
    pub time_allocated: u32,
    #[serde(default)]
    pub completed: bool,
}

impl Task {
    /// Build an incomplete task with a fresh id. Does not validate; use
    /// [`TaskRegistry::add`] for form input.
    pub fn new(text: impl Into<String>, time_allocated: u32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            time_allocated,
            completed: false,
        }
    }

    pub fn duration_secs(&self) -> u64 {
        u64::from(self.time_allocated).saturating_mul(60)
    }
}

/// Outcome of toggling a task's completion flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Toggle {
    /// false -> true
    Completed(Task),
    /// true -> false
    Reopened(Task),
}

impl Toggle {
    pub fn task(&self) -> &Task {
        match self {
            Toggle::Completed(t) | Toggle::Reopened(t) => t,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskRegistry {
    tasks: Vec<Task>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Resolve `id` to a task that can back a focus session.
    pub fn active(&self, id: &str) -> Option<&Task> {
        self.get(id).filter(|t| !t.completed)
    }

    pub fn first_active(&self) -> Option<&Task> {
        self.tasks.iter().find(|t| !t.completed)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Append a task from form input.
    ///
    /// # Errors
    /// `InvalidInput` when the text is blank or `minutes` is not positive.
    pub fn add(&mut self, text: &str, minutes: i64) -> Result<&Task> {
        let text = text.trim();
        if text.is_empty() {
            return Err(CoreError::invalid_input("text", "task description is empty"));
        }
        let minutes = u32::try_from(minutes)
            .ok()
            .filter(|m| *m > 0)
            .ok_or_else(|| {
                CoreError::invalid_input("timeAllocated", format!("{minutes} is not a positive number of minutes"))
            })?;
        self.tasks.push(Task::new(text, minutes));
        let idx = self.tasks.len() - 1;
        Ok(&self.tasks[idx])
    }

    /// Flip the completion flag of `id`.
    ///
    /// # Errors
    /// `TaskNotFound` when no task has that id.
    pub fn toggle(&mut self, id: &str) -> Result<Toggle> {
        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| CoreError::TaskNotFound(id.to_string()))?;
        task.completed = !task.completed;
        Ok(if task.completed {
            Toggle::Completed(task.clone())
        } else {
            Toggle::Reopened(task.clone())
        })
    }

    /// Remove `id`, returning the removed task.
    ///
    /// # Errors
    /// `TaskNotFound` when no task has that id.
    pub fn remove(&mut self, id: &str) -> Result<Task> {
        let idx = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| CoreError::TaskNotFound(id.to_string()))?;
        Ok(self.tasks.remove(idx))
    }
}

/// Parse the minutes field of the task form.
///
/// # Errors
/// `InvalidInput` for non-numeric or non-positive input.
pub fn parse_minutes(raw: &str) -> Result<i64> {
    let minutes: i64 = raw.trim().parse().map_err(|_| {
        CoreError::invalid_input("timeAllocated", format!("'{raw}' is not a number"))
    })?;
    if minutes <= 0 {
        return Err(CoreError::invalid_input(
            "timeAllocated",
            format!("{minutes} is not a positive number of minutes"),
        ));
    }
    Ok(minutes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_rejects_blank_text_and_bad_minutes() {
        let mut reg = TaskRegistry::new();
        assert!(matches!(reg.add("   ", 10), Err(CoreError::InvalidInput { .. })));
        assert!(matches!(reg.add("Read", 0), Err(CoreError::InvalidInput { .. })));
        assert!(matches!(reg.add("Read", -5), Err(CoreError::InvalidInput { .. })));
        assert!(reg.is_empty());
    }

    #[test]
    fn add_trims_and_keeps_order() {
        let mut reg = TaskRegistry::new();
        reg.add("  first ", 10).unwrap();
        reg.add("second", 30).unwrap();
        let texts: Vec<_> = reg.tasks().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, ["first", "second"]);
        assert_ne!(reg.tasks()[0].id, reg.tasks()[1].id);
    }

    #[test]
    fn toggle_reports_direction() {
        let mut reg = TaskRegistry::new();
        let id = reg.add("Write report", 30).unwrap().id.clone();
        assert!(matches!(reg.toggle(&id).unwrap(), Toggle::Completed(_)));
        assert!(reg.active(&id).is_none());
        assert!(matches!(reg.toggle(&id).unwrap(), Toggle::Reopened(_)));
        assert!(reg.active(&id).is_some());
        assert!(matches!(reg.toggle("nope"), Err(CoreError::TaskNotFound(_))));
    }

    #[test]
    fn first_active_skips_completed() {
        let mut reg = TaskRegistry::new();
        let a = reg.add("a", 5).unwrap().id.clone();
        let b = reg.add("b", 5).unwrap().id.clone();
        reg.toggle(&a).unwrap();
        assert_eq!(reg.first_active().map(|t| t.id.clone()), Some(b));
    }

    #[test]
    fn serializes_with_original_field_names() {
        let mut reg = TaskRegistry::new();
        reg.add("Write report", 30).unwrap();
        let json = serde_json::to_value(&reg).unwrap();
        let first = &json.as_array().unwrap()[0];
        assert_eq!(first["text"], "Write report");
        assert_eq!(first["timeAllocated"], 30);
        assert_eq!(first["completed"], false);
        let back: TaskRegistry = serde_json::from_value(json).unwrap();
        assert_eq!(back, reg);
    }

    #[test]
    fn parse_minutes_rejects_non_numeric() {
        assert_eq!(parse_minutes(" 25 ").unwrap(), 25);
        assert!(parse_minutes("abc").is_err());
        assert!(parse_minutes("0").is_err());
        assert!(parse_minutes("-3").is_err());
    }
}
