use std::io::Write;

use studygarden_core::{Config, Notifier, TimerMode};

/// Rings the terminal bell when a countdown finishes.
pub struct BellNotifier {
    enabled: bool,
}

impl BellNotifier {
    pub fn from_config(config: &Config) -> Self {
        Self {
            enabled: config.notifications.enabled && config.notifications.bell,
        }
    }
}

impl Notifier for BellNotifier {
    fn countdown_finished(&mut self, mode: TimerMode) {
        tracing::debug!(%mode, bell = self.enabled, "countdown finished");
        if !self.enabled {
            return;
        }
        let mut stderr = std::io::stderr();
        if let Err(e) = stderr.write_all(b"\x07").and_then(|()| stderr.flush()) {
            tracing::warn!(error = %e, "could not ring bell");
        }
    }
}
