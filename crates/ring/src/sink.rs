//! Where ring workers publish their notifications.

use arbiter_core::{Notification, TimedNotification};
use tokio::sync::mpsc;
use tokio::time::Instant;

/// Timestamps notifications relative to the start of the run and forwards
/// them to a subscriber, if there is one.
///
/// Cheap to clone; every worker task holds its own copy.
#[derive(Debug, Clone)]
pub struct NotificationSink {
    tx: Option<mpsc::UnboundedSender<TimedNotification>>,
    origin: Instant,
}

impl NotificationSink {
    /// A sink paired with the receiver a log or renderer reads from.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<TimedNotification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                tx: Some(tx),
                origin: Instant::now(),
            },
            rx,
        )
    }

    /// A sink that drops everything.
    pub fn discard() -> Self {
        Self {
            tx: None,
            origin: Instant::now(),
        }
    }

    pub fn emit(&self, notification: Notification) {
        if let Some(tx) = &self.tx {
            // Receiver gone means nobody is listening any more
            let _ = tx.send(TimedNotification::new(self.origin.elapsed(), notification));
        }
    }
}
