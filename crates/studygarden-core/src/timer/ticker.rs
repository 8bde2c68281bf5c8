//! One-second tick sources.
//!
//! The controller owns exactly one [`TickSource`]. Every `arm` carries a fresh
//! generation number; ticks are delivered tagged with it so the controller can
//! drop anything emitted by a source it has since disarmed.
//!
//! ```text
//! arm(g) ──> Tick{g} Tick{g} ... ──> disarm()   (queued Tick{g} are stale)
//! ```

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// A single periodic tick, tagged with the generation that armed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub generation: u64,
}

/// A cancellable periodic source.
///
/// `arm` must replace any previously armed source; there is never more than
/// one live interval.
pub trait TickSource: Send {
    fn arm(&mut self, generation: u64);
    fn disarm(&mut self);
}

/// Source that never fires. Used by one-shot commands that only change state.
#[derive(Debug, Default)]
pub struct NoTicks;

impl TickSource for NoTicks {
    fn arm(&mut self, _generation: u64) {}
    fn disarm(&mut self) {}
}

/// Tokio interval task feeding ticks into an mpsc channel.
pub struct IntervalTicker {
    handle: Handle,
    tx: UnboundedSender<Tick>,
    period: Duration,
    task: Option<JoinHandle<()>>,
}

impl IntervalTicker {
    pub fn new(handle: Handle, tx: UnboundedSender<Tick>, period: Duration) -> Self {
        Self {
            handle,
            tx,
            period,
            task: None,
        }
    }

    /// One tick per second on the current runtime.
    ///
    /// # Panics
    /// Panics when called outside a tokio runtime.
    pub fn every_second(tx: UnboundedSender<Tick>) -> Self {
        Self::new(Handle::current(), tx, Duration::from_secs(1))
    }

    pub fn is_armed(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl TickSource for IntervalTicker {
    fn arm(&mut self, generation: u64) {
        self.disarm();
        let tx = self.tx.clone();
        let period = self.period;
        tracing::debug!(generation, ?period, "arming tick source");
        self.task = Some(self.handle.spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx.send(Tick { generation }).is_err() {
                    break;
                }
            }
        }));
    }

    fn disarm(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for IntervalTicker {
    fn drop(&mut self) {
        self.disarm();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn rearming_replaces_previous_interval() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut ticker = IntervalTicker::new(Handle::current(), tx, Duration::from_millis(5));

        ticker.arm(1);
        assert_eq!(rx.recv().await, Some(Tick { generation: 1 }));

        ticker.arm(2);
        // Drain anything generation 1 queued before the abort landed.
        let mut tick = rx.recv().await.unwrap();
        while tick.generation == 1 {
            tick = rx.recv().await.unwrap();
        }
        for _ in 0..3 {
            assert_eq!(rx.recv().await, Some(Tick { generation: 2 }));
        }
        ticker.disarm();
        assert!(!ticker.is_armed());
    }

    #[test]
    fn no_ticks_is_inert() {
        let mut ticks = NoTicks;
        ticks.arm(7);
        ticks.disarm();
    }
}
