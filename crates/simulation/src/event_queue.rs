//! Ordering key for the simulation event queue.

use std::time::Duration;

/// Key for events in the simulation queue.
///
/// Events are processed in order of time, then insertion sequence, so two
/// events due at the same instant run in the order they were scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct EventKey {
    /// When the event is due.
    pub time: Duration,

    /// Monotonic insertion counter, for FIFO ordering at equal times.
    pub sequence: u64,
}

impl EventKey {
    pub fn new(time: Duration, sequence: u64) -> Self {
        Self { time, sequence }
    }
}
