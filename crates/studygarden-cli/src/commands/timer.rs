//! Timer commands. `start` runs the countdown in the foreground.

use clap::Subcommand;
use studygarden_core::{IntervalTicker, StudyGarden, TimerMode};
use tokio::sync::mpsc;

use super::task::resolve_id;
use super::{open_app, CmdResult};
use crate::render::Output;

#[derive(Subcommand)]
pub enum TimerAction {
    /// Print the current timer state
    Status,
    /// Run the countdown in the foreground (Ctrl-C pauses)
    Start {
        /// Select this task first
        #[arg(long)]
        task: Option<String>,
    },
    /// Pause the countdown
    Pause,
    /// Reload the current mode's full duration
    Reset,
    /// Switch to focus, short-break or long-break
    Mode {
        /// Timer mode
        mode: TimerMode,
    },
}

pub fn run(action: TimerAction, out: Output) -> CmdResult {
    let mut app = open_app()?;

    match action {
        TimerAction::Status => {
            out.event(&app.snapshot())?;
            return Ok(());
        }
        TimerAction::Start { task } => {
            if let Some(raw) = task {
                let id = resolve_id(&app, &raw);
                app.select_task(&id)?;
            }
            return run_foreground(app, &out);
        }
        TimerAction::Pause => app.pause()?,
        TimerAction::Reset => app.reset()?,
        TimerAction::Mode { mode } => app.switch_mode(mode)?,
    }

    out.events(&mut app)?;
    Ok(())
}

/// Count down until the timer stops or Ctrl-C pauses it.
fn run_foreground(app: StudyGarden, out: &Output) -> CmdResult {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut app = app.with_ticks(Box::new(IntervalTicker::every_second(tx)));
        app.start()?;
        out.events(&mut app)?;

        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        while app.session().is_running() {
            tokio::select! {
                tick = rx.recv() => {
                    let Some(tick) = tick else { break };
                    app.on_tick(tick)?;
                }
                signal = &mut ctrl_c => {
                    if let Err(e) = signal {
                        tracing::warn!(error = %e, "ctrl-c handler failed");
                    }
                    app.pause()?;
                }
            }
            out.events(&mut app)?;
        }
        Ok::<(), Box<dyn std::error::Error>>(())
    })
}
