//! Per-day goal notes.
//!
//! Stored as a map from date to an ordered list of notes. A date with no notes
//! is removed from the map, so [`CalendarNotes::dates_with_notes`] only ever
//! reports days that actually carry something.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayNote {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CalendarNotes {
    days: BTreeMap<NaiveDate, Vec<DayNote>>,
}

impl CalendarNotes {
    pub fn notes_on(&self, date: NaiveDate) -> &[DayNote] {
        self.days.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Days in the given month that have at least one note.
    pub fn dates_with_notes(&self, year: i32, month: u32) -> Vec<NaiveDate> {
        self.days
            .keys()
            .filter(|d| d.year() == year && d.month() == month)
            .copied()
            .collect()
    }

    /// # Errors
    /// `InvalidInput` when `text` is blank.
    pub fn add(&mut self, date: NaiveDate, text: &str) -> Result<&DayNote> {
        let text = text.trim();
        if text.is_empty() {
            return Err(CoreError::invalid_input("text", "goal text is empty"));
        }
        let notes = self.days.entry(date).or_default();
        notes.push(DayNote {
            id: Uuid::new_v4().to_string(),
            text: text.to_string(),
            completed: false,
        });
        Ok(&notes[notes.len() - 1])
    }

    /// Flip a note's completion flag, returning the new value.
    ///
    /// # Errors
    /// `NoteNotFound` when the date has no note with that id.
    pub fn toggle(&mut self, date: NaiveDate, id: &str) -> Result<bool> {
        let note = self
            .days
            .get_mut(&date)
            .and_then(|notes| notes.iter_mut().find(|n| n.id == id))
            .ok_or_else(|| not_found(date, id))?;
        note.completed = !note.completed;
        Ok(note.completed)
    }

    /// # Errors
    /// `NoteNotFound` when the date has no note with that id.
    pub fn delete(&mut self, date: NaiveDate, id: &str) -> Result<DayNote> {
        let notes = self.days.get_mut(&date).ok_or_else(|| not_found(date, id))?;
        let idx = notes
            .iter()
            .position(|n| n.id == id)
            .ok_or_else(|| not_found(date, id))?;
        let removed = notes.remove(idx);
        if notes.is_empty() {
            self.days.remove(&date);
        }
        Ok(removed)
    }
}

fn not_found(date: NaiveDate, id: &str) -> CoreError {
    CoreError::NoteNotFound {
        date,
        id: id.to_string(),
    }
}
