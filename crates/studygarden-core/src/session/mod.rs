mod controller;
mod state;

pub use controller::{Notifier, Silent, StudyGarden};
pub use state::{SessionPhase, SessionState, TickOutcome};
