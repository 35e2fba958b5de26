//! The host-facing contract of a coordination core.

use crate::{Action, Event};
use std::time::Duration;

/// A core driven entirely by its host.
///
/// The host owns the clock and the timers. It stamps the time with
/// [`set_time`](StateMachine::set_time), feeds one [`Event`] at a time into
/// [`handle`](StateMachine::handle), and carries out the returned
/// [`Action`]s: scheduling `TimerFired` events on its own timeline and
/// forwarding notifications to whoever is listening. Nothing inside a core
/// sleeps or spawns.
///
/// # Example
///
/// ```ignore
/// engine.set_time(Duration::from_millis(500));
/// for action in engine.handle(Event::Tick) {
///     match action {
///         Action::SetTimer { id, duration, generation } => {
///             queue.after(duration, Event::TimerFired { id, generation })
///         }
///         Action::Emit(notification) => log.push(notification),
///     }
/// }
/// ```
pub trait StateMachine {
    /// Apply one event. The same state and event always yield the same actions.
    fn handle(&mut self, event: Event) -> Vec<Action>;

    /// Advance the core's notion of now. Called before every `handle`.
    fn set_time(&mut self, now: Duration);

    fn now(&self) -> Duration;
}
