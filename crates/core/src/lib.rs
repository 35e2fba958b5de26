//! Core types for the arbiter simulations.
//!
//! The arbitration engine is a synchronous state machine: it consumes
//! [`Event`]s and returns [`Action`]s. The runner that hosts it owns the
//! clock and the timer queue and performs every action, so the engine can be
//! driven on a virtual timeline in tests and on a wall clock elsewhere.
//!
//! [`Notification`]s are the observable vocabulary shared by both
//! subsystems: anything that renders or logs the simulations subscribes to
//! them rather than inspecting internal state.

mod generation;
mod notification;
mod traits;

pub use generation::Generation;
pub use notification::{Notification, TimedNotification};
pub use traits::StateMachine;

use std::time::Duration;

/// Deferred transitions the engine can ask the runner to schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimerId {
    /// End the active writer's turn.
    DeactivateWriter,

    /// End the current reading phase and hand over to a writer.
    DeactivateReaders,
}

/// Inputs to the arbitration state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Periodic step driven by the host at a fixed cadence.
    Tick,

    /// A timer set via [`Action::SetTimer`] has fired.
    ///
    /// `generation` is the configuration generation that scheduled it; the
    /// engine drops timers from an older generation.
    TimerFired { id: TimerId, generation: Generation },
}

impl Event {
    /// Get a human-readable name for this event type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Event::Tick => "Tick",
            Event::TimerFired {
                id: TimerId::DeactivateWriter,
                ..
            } => "DeactivateWriterTimer",
            Event::TimerFired {
                id: TimerId::DeactivateReaders,
                ..
            } => "DeactivateReadersTimer",
        }
    }
}

/// Outputs of the arbitration state machine, performed by the runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Deliver `Event::TimerFired { id, generation }` after `duration`.
    SetTimer {
        id: TimerId,
        duration: Duration,
        generation: Generation,
    },

    /// Publish a notification to subscribers.
    Emit(Notification),
}

impl Action {
    /// The notification carried by this action, if any.
    pub fn notification(&self) -> Option<&Notification> {
        match self {
            Action::Emit(n) => Some(n),
            Action::SetTimer { .. } => None,
        }
    }
}
