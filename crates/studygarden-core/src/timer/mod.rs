mod mode;
mod ticker;

pub use mode::{format_clock, DurationPolicy, TimerMode};
pub use ticker::{IntervalTicker, NoTicks, Tick, TickSource};
