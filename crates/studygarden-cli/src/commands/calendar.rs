use chrono::{Datelike, Local, NaiveDate};
use clap::Subcommand;
use studygarden_core::CoreError;

use super::{open_app, CmdResult};
use crate::render::Output;

#[derive(Subcommand)]
pub enum CalendarAction {
    /// Add a goal note to a day
    Add {
        /// Date (YYYY-MM-DD)
        #[arg(value_parser = parse_date)]
        date: NaiveDate,
        /// Note text
        text: String,
    },
    /// List notes for a month (default: current month)
    List {
        /// Month (YYYY-MM)
        #[arg(long)]
        month: Option<String>,
    },
    /// Toggle a note's completion
    Toggle {
        #[arg(value_parser = parse_date)]
        date: NaiveDate,
        /// Note ID
        id: String,
    },
    /// Delete a note
    Delete {
        #[arg(value_parser = parse_date)]
        date: NaiveDate,
        /// Note ID
        id: String,
    },
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

fn parse_month(raw: &str) -> Result<(i32, u32), CoreError> {
    let first = NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d").map_err(|e| {
        CoreError::InvalidInput {
            field: "month".into(),
            message: format!("expected YYYY-MM: {e}"),
        }
    })?;
    Ok((first.year(), first.month()))
}

pub fn run(action: CalendarAction, out: Output) -> CmdResult {
    let mut app = open_app()?;

    match action {
        CalendarAction::Add { date, text } => {
            let note = app.add_note(date, &text)?;
            out.value(&note, || format!("Goal added for {date} [{}]", note.id))?;
        }
        CalendarAction::List { month } => {
            let (year, month) = match month {
                Some(raw) => parse_month(&raw)?,
                None => {
                    let today = Local::now().date_naive();
                    (today.year(), today.month())
                }
            };
            let calendar = app.calendar();
            let days: Vec<_> = calendar
                .dates_with_notes(year, month)
                .into_iter()
                .map(|date| (date, calendar.notes_on(date)))
                .collect();
            out.value(&days, || {
                if days.is_empty() {
                    return format!("No goals for {year}-{month:02}.");
                }
                let mut lines = Vec::new();
                for (date, notes) in &days {
                    lines.push(date.to_string());
                    for note in *notes {
                        let mark = if note.completed { "x" } else { " " };
                        lines.push(format!("  [{mark}] {}  {}", note.id, note.text));
                    }
                }
                lines.join("\n")
            })?;
        }
        CalendarAction::Toggle { date, id } => {
            let completed = app.toggle_note(date, &id)?;
            out.value(&completed, || {
                if completed {
                    format!("Goal {id} done.")
                } else {
                    format!("Goal {id} reopened.")
                }
            })?;
        }
        CalendarAction::Delete { date, id } => {
            let note = app.delete_note(date, &id)?;
            out.value(&note, || format!("Goal deleted: {}", note.text))?;
        }
    }
    Ok(())
}
