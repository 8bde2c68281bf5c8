//! Task management commands for CLI.

use std::io::{BufRead, Write};

use clap::Subcommand;
use studygarden_core::task::parse_minutes;
use studygarden_core::{CoreError, StudyGarden, Task};

use super::{open_app, CmdResult};
use crate::render::Output;

#[derive(Subcommand)]
pub enum TaskAction {
    /// Add a task
    Add {
        /// Task text
        text: String,
        /// Minutes allocated to the task
        #[arg(allow_hyphen_values = true)]
        minutes: String,
    },
    /// List tasks
    List {
        /// Only show tasks that are not completed
        #[arg(long)]
        active: bool,
    },
    /// Toggle a task's completion
    Done {
        /// Task ID (or unique prefix)
        id: String,
    },
    /// Delete a task
    Delete {
        /// Task ID (or unique prefix)
        id: String,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
    /// Select the task for the next focus session
    Select {
        /// Task ID (or unique prefix)
        id: String,
    },
}

/// Resolve a full id or a unique id prefix to a task id.
///
/// Unknown or ambiguous prefixes are passed through so the controller reports
/// them the same way it reports any other bad id.
pub fn resolve_id(app: &StudyGarden, raw: &str) -> String {
    let tasks = app.tasks().tasks();
    if tasks.iter().any(|t| t.id == raw) {
        return raw.to_string();
    }
    let mut matches = tasks.iter().filter(|t| t.id.starts_with(raw));
    match (matches.next(), matches.next()) {
        (Some(task), None) => task.id.clone(),
        _ => raw.to_string(),
    }
}

fn confirm_delete(task: &Task) -> bool {
    print!("Delete \"{}\"? [y/N] ", task.text);
    let _ = std::io::stdout().flush();
    let mut answer = String::new();
    if std::io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

fn task_line(task: &Task, selected: bool) -> String {
    format!(
        "{} [{}] {}  {} ({} min)",
        if selected { "*" } else { " " },
        if task.completed { "x" } else { " " },
        task.id,
        task.text,
        task.time_allocated
    )
}

pub fn run(action: TaskAction, out: Output) -> CmdResult {
    let mut app = open_app()?;

    match action {
        TaskAction::Add { text, minutes } => {
            let minutes = parse_minutes(&minutes)?;
            app.add_task(&text, minutes)?;
        }
        TaskAction::List { active } => {
            let selected = app.session().selected_task_id();
            let tasks: Vec<&Task> = app
                .tasks()
                .tasks()
                .iter()
                .filter(|t| !active || !t.completed)
                .collect();
            out.value(&tasks, || {
                if tasks.is_empty() {
                    return "No tasks yet. Add one with `studygarden task add`.".to_string();
                }
                tasks
                    .iter()
                    .map(|t| task_line(t, selected == Some(t.id.as_str())))
                    .collect::<Vec<_>>()
                    .join("\n")
            })?;
        }
        TaskAction::Done { id } => {
            let id = resolve_id(&app, &id);
            app.complete_task(&id)?;
        }
        TaskAction::Delete { id, yes } => {
            let id = resolve_id(&app, &id);
            if out.is_json() && !yes {
                return Err(CoreError::InvalidInput {
                    field: "yes".into(),
                    message: "pass --yes to delete in JSON mode".into(),
                }
                .into());
            }
            let deleted = app.delete_task(&id, |task| yes || confirm_delete(task))?;
            if !deleted {
                out.say("Deletion cancelled.");
            }
        }
        TaskAction::Select { id } => {
            let id = resolve_id(&app, &id);
            app.select_task(&id)?;
        }
    }

    out.events(&mut app)?;
    Ok(())
}
