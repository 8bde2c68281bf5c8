use clap::Subcommand;
use studygarden_core::garden::shop;
use studygarden_core::GardenItemKind;

use super::{open_app, CmdResult};
use crate::render::{ledger_line, Output};

#[derive(Subcommand)]
pub enum GardenAction {
    /// Show planted items
    Show,
    /// List what the shop sells
    Shop,
    /// Buy and plant an item
    Plant {
        /// sapling or flower
        kind: GardenItemKind,
    },
}

pub fn run(action: GardenAction, out: Output) -> CmdResult {
    let mut app = open_app()?;

    match action {
        GardenAction::Show => {
            let items = app.garden().items();
            out.value(&items, || {
                if items.is_empty() {
                    return "Your garden is empty. Complete tasks to earn rewards!".to_string();
                }
                let row: String = items.iter().map(|i| i.icon.as_str()).collect();
                let counts = GardenItemKind::ALL
                    .iter()
                    .map(|k| format!("{} {k}s", app.garden().count(*k)))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{row}\n{counts}")
            })?;
        }
        GardenAction::Shop => {
            let offers = shop();
            out.value(&offers, || {
                let mut lines: Vec<String> = offers
                    .iter()
                    .map(|o| format!("{} {:<8} {} {}", o.icon, o.kind, o.cost, o.currency))
                    .collect();
                lines.push(ledger_line(app.ledger()));
                lines.join("\n")
            })?;
        }
        GardenAction::Plant { kind } => {
            app.plant(kind)?;
            out.events(&mut app)?;
        }
    }
    Ok(())
}
