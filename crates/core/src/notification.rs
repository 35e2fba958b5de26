//! Observable notifications emitted by both simulations.

use arbiter_types::{Priority, ReaderId, ResourceId, WorkerId, WriterId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// State-change notifications.
///
/// These are what a log window, renderer or report consumes. The engine
/// emits them through [`Action::Emit`](crate::Action::Emit); ring workers
/// send them down a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    // ═══════════════════════════════════════════════════════════════════════
    // Arbitration Engine
    // ═══════════════════════════════════════════════════════════════════════
    /// A writer was registered with this priority.
    WriterAssignedPriority { writer: WriterId, priority: Priority },

    /// A reader was registered with this priority.
    ReaderAssignedPriority { reader: ReaderId, priority: Priority },

    /// A reader moved from waiting to reading.
    ReaderStartedReading { reader: ReaderId },

    /// A reader moved from reading to waiting.
    ReaderStoppedReading { reader: ReaderId },

    /// A writer was granted exclusive access.
    WriterActivated { writer: WriterId, priority: Priority },

    /// The active writer released exclusive access.
    WriterDeactivated { writer: WriterId },

    /// Every reader was granted concurrent access in one step.
    ReadersActivated { count: usize },

    /// No reader is reading and no writer is writing.
    DeadlockDetected,

    /// The previously reported deadlock has cleared.
    DeadlockResolved,

    // ═══════════════════════════════════════════════════════════════════════
    // Resource Ring
    // ═══════════════════════════════════════════════════════════════════════
    /// A worker started waiting for its two resources.
    WorkerWaiting {
        worker: WorkerId,
        left: ResourceId,
        right: ResourceId,
    },

    /// A worker acquired both resources after waiting this long.
    WorkerWaitDuration { worker: WorkerId, waited: Duration },

    /// A worker released both resources after holding them this long.
    WorkerServiceDuration { worker: WorkerId, served: Duration },
}

impl Notification {
    /// Get a human-readable name for this notification type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Notification::WriterAssignedPriority { .. } => "WriterAssignedPriority",
            Notification::ReaderAssignedPriority { .. } => "ReaderAssignedPriority",
            Notification::ReaderStartedReading { .. } => "ReaderStartedReading",
            Notification::ReaderStoppedReading { .. } => "ReaderStoppedReading",
            Notification::WriterActivated { .. } => "WriterActivated",
            Notification::WriterDeactivated { .. } => "WriterDeactivated",
            Notification::ReadersActivated { .. } => "ReadersActivated",
            Notification::DeadlockDetected => "DeadlockDetected",
            Notification::DeadlockResolved => "DeadlockResolved",
            Notification::WorkerWaiting { .. } => "WorkerWaiting",
            Notification::WorkerWaitDuration { .. } => "WorkerWaitDuration",
            Notification::WorkerServiceDuration { .. } => "WorkerServiceDuration",
        }
    }

    /// Check if this is an arbitration engine notification.
    pub fn is_engine(&self) -> bool {
        !self.is_ring()
    }

    /// Check if this is a resource ring notification.
    pub fn is_ring(&self) -> bool {
        matches!(
            self,
            Notification::WorkerWaiting { .. }
                | Notification::WorkerWaitDuration { .. }
                | Notification::WorkerServiceDuration { .. }
        )
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notification::WriterAssignedPriority { writer, priority } => {
                write!(f, "{writer} assigned priority {priority}")
            }
            Notification::ReaderAssignedPriority { reader, priority } => {
                write!(f, "{reader} assigned priority {priority}")
            }
            Notification::ReaderStartedReading { reader } => write!(f, "{reader} started reading"),
            Notification::ReaderStoppedReading { reader } => write!(f, "{reader} stopped reading"),
            Notification::WriterActivated { writer, priority } => {
                write!(f, "writer activated: {writer} (priority {priority})")
            }
            Notification::WriterDeactivated { writer } => {
                write!(f, "writer deactivated: {writer}")
            }
            Notification::ReadersActivated { count } => {
                write!(f, "{count} readers activated for reading")
            }
            Notification::DeadlockDetected => f.write_str("deadlock detected, resolving"),
            Notification::DeadlockResolved => f.write_str("deadlock resolved"),
            Notification::WorkerWaiting {
                worker,
                left,
                right,
            } => write!(f, "{worker} waiting for {left} and {right}"),
            Notification::WorkerWaitDuration { worker, waited } => {
                write!(f, "{worker} waited {:.2}s", waited.as_secs_f64())
            }
            Notification::WorkerServiceDuration { worker, served } => {
                write!(f, "{worker} held its resources for {:.2}s", served.as_secs_f64())
            }
        }
    }
}

/// A notification stamped with the time it was emitted.
///
/// `at` is measured from the start of the run: virtual time for the
/// simulation runner, elapsed wall-clock time for the ring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedNotification {
    pub at: Duration,
    #[serde(flatten)]
    pub notification: Notification,
}

impl TimedNotification {
    pub fn new(at: Duration, notification: Notification) -> Self {
        Self { at, notification }
    }
}

impl fmt::Display for TimedNotification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:>9.3}s] {}", self.at.as_secs_f64(), self.notification)
    }
}
