pub mod calendar;
pub mod config;
pub mod garden;
pub mod log;
pub mod rewards;
pub mod task;
pub mod timer;

use studygarden_core::{Config, Database, StudyGarden};

use crate::notify::BellNotifier;

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Open the app on the on-disk store with the bell notifier attached.
pub fn open_app() -> Result<StudyGarden, Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let db = Database::open()?;
    let app = StudyGarden::open(Box::new(db), &config)?
        .with_notifier(Box::new(BellNotifier::from_config(&config)));
    Ok(app)
}
