use super::{open_app, CmdResult};
use crate::render::Output;

pub fn run(out: Output) -> CmdResult {
    let app = open_app()?;
    let entries: Vec<_> = app.activity().entries().collect();
    out.value(&entries, || {
        entries
            .iter()
            .map(|e| format!("{}  {}", e.at.format("%H:%M"), e.message))
            .collect::<Vec<_>>()
            .join("\n")
    })?;
    Ok(())
}
