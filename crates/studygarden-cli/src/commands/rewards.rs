use clap::Subcommand;
use studygarden_core::Currency;

use super::{open_app, CmdResult};
use crate::render::{ledger_line, Output};

#[derive(Subcommand, Default)]
pub enum RewardsAction {
    /// Show current balances
    #[default]
    Show,
    /// Spend currency from the balance
    Spend {
        /// water or sunlight
        currency: Currency,
        /// Amount to spend
        amount: u64,
    },
}

pub fn run(action: RewardsAction, out: Output) -> CmdResult {
    let mut app = open_app()?;

    match action {
        RewardsAction::Show => {
            let ledger = *app.ledger();
            out.value(&ledger, || ledger_line(&ledger))?;
        }
        RewardsAction::Spend { currency, amount } => {
            app.spend(currency, amount)?;
            out.events(&mut app)?;
        }
    }
    Ok(())
}
