//! Virtual-clock runner for the arbitration engine.

use crate::EventKey;
use arbiter_core::{Action, Event, Notification, StateMachine, TimedNotification};
use arbiter_engine::{ArbitrationEngine, EngineConfig, EngineTiming, Roster};
use arbiter_types::Priority;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, trace, warn};

/// Counters accumulated over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimulationStats {
    /// Events delivered to the engine.
    pub events_processed: u64,

    /// Ticks delivered.
    pub ticks: u64,

    /// Timer events delivered, stale or not.
    pub timers_fired: u64,

    /// Notifications logged.
    pub notifications: u64,

    /// `WriterActivated` notifications.
    pub writer_grants: u64,

    /// `ReadersActivated` notifications.
    pub reading_phases: u64,

    /// `DeadlockDetected` notifications.
    pub deadlocks_detected: u64,

    /// `DeadlockResolved` notifications.
    pub deadlocks_resolved: u64,

    /// Event boundaries at which reader/writer exclusion did not hold.
    pub exclusion_violations: u64,
}

impl SimulationStats {
    fn record(&mut self, notification: &Notification) {
        self.notifications += 1;
        match notification {
            Notification::WriterActivated { .. } => self.writer_grants += 1,
            Notification::ReadersActivated { .. } => self.reading_phases += 1,
            Notification::DeadlockDetected => self.deadlocks_detected += 1,
            Notification::DeadlockResolved => self.deadlocks_resolved += 1,
            _ => {}
        }
    }
}

/// Deterministic host for an [`ArbitrationEngine`].
///
/// Provides the engine's scheduling contract on a virtual clock: a periodic
/// tick at [`EngineTiming::tick_interval`] and one-shot `after(delay, event)`
/// delivery for the timers the engine requests. Notifications are stamped
/// with virtual time and appended to an in-memory log.
pub struct SimulationRunner {
    engine: ArbitrationEngine,
    queue: BTreeMap<EventKey, Event>,
    sequence: u64,
    now: Duration,
    rng: ChaCha8Rng,
    log: Vec<TimedNotification>,
    stats: SimulationStats,
}

impl SimulationRunner {
    /// Create a runner, drawing unpinned priorities from a RNG seeded with `seed`.
    ///
    /// The first tick is due immediately.
    pub fn new(config: &EngineConfig, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let roster = config.roster(&mut rng);
        let mut runner = Self::bare(config.timing, rng);
        runner.install(&roster);
        runner
    }

    /// Create a runner for an explicit roster.
    pub fn with_roster(roster: &Roster, timing: EngineTiming, seed: u64) -> Self {
        let mut runner = Self::bare(timing, ChaCha8Rng::seed_from_u64(seed));
        runner.install(roster);
        runner
    }

    fn bare(timing: EngineTiming, rng: ChaCha8Rng) -> Self {
        Self {
            engine: ArbitrationEngine::new(timing),
            queue: BTreeMap::new(),
            sequence: 0,
            now: Duration::ZERO,
            rng,
            log: Vec::new(),
            stats: SimulationStats::default(),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Accessors
    // ═══════════════════════════════════════════════════════════════════════

    pub fn engine(&self) -> &ArbitrationEngine {
        &self.engine
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn stats(&self) -> SimulationStats {
        self.stats
    }

    /// Every notification logged so far.
    pub fn log(&self) -> &[TimedNotification] {
        &self.log
    }

    /// Take the notifications logged since the last drain.
    pub fn drain_log(&mut self) -> Vec<TimedNotification> {
        std::mem::take(&mut self.log)
    }

    /// Number of events waiting in the queue.
    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Host operations
    // ═══════════════════════════════════════════════════════════════════════

    /// Deliver `event` to the engine once, `delay` from now.
    pub fn after(&mut self, delay: Duration, event: Event) {
        let key = EventKey::new(self.now + delay, self.sequence);
        self.sequence += 1;
        trace!(at = ?key.time, event = event.type_name(), "Scheduled");
        self.queue.insert(key, event);
    }

    /// Replace the engine's configuration, timing included, at the current time.
    ///
    /// Pending events from the old configuration are discarded; the engine's
    /// generation check covers anything already in flight.
    pub fn reconfigure(&mut self, config: &EngineConfig) {
        let roster = config.roster(&mut self.rng);
        self.queue.clear();
        info!(now = ?self.now, timing = ?config.timing, "Reconfiguring simulation");
        self.engine.set_timing(config.timing);
        self.install(&roster);
    }

    /// Add a writer to the running configuration.
    pub fn register_writer(&mut self, priority: Priority) {
        let actions = self.engine.register_writer(priority);
        self.perform(actions);
    }

    /// Process the next event. Returns false when the queue is empty.
    pub fn step(&mut self) -> bool {
        let Some((key, event)) = self.queue.pop_first() else {
            return false;
        };
        self.deliver(key.time, event);
        true
    }

    /// Process every event due at or before `end`, then advance the clock to `end`.
    pub fn run_until(&mut self, end: Duration) {
        while let Some(entry) = self.queue.first_entry() {
            if entry.key().time > end {
                break;
            }
            let (key, event) = entry.remove_entry();
            self.deliver(key.time, event);
        }
        self.now = self.now.max(end);
        self.engine.set_time(self.now);
        debug!(now = ?self.now, stats = ?self.stats, "Run segment complete");
    }

    /// Run for `duration` of virtual time from now.
    pub fn run_for(&mut self, duration: Duration) {
        let end = self.now + duration;
        self.run_until(end);
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Internals
    // ═══════════════════════════════════════════════════════════════════════

    fn install(&mut self, roster: &Roster) {
        let actions = self.engine.configure(roster);
        self.perform(actions);
        self.after(Duration::ZERO, Event::Tick);
    }

    fn deliver(&mut self, at: Duration, event: Event) {
        self.now = at;
        self.engine.set_time(at);
        self.stats.events_processed += 1;

        let is_tick = matches!(event, Event::Tick);
        match event {
            Event::Tick => self.stats.ticks += 1,
            Event::TimerFired { .. } => self.stats.timers_fired += 1,
        }

        let actions = self.engine.handle(event);
        self.perform(actions);

        if !self.engine.exclusion_holds() {
            self.stats.exclusion_violations += 1;
            warn!(
                now = ?self.now,
                active_readers = self.engine.active_readers(),
                writer = ?self.engine.current_writer(),
                "Reader/writer exclusion violated"
            );
        }

        if is_tick {
            self.after(self.engine.timing().tick_interval, Event::Tick);
        }
    }

    fn perform(&mut self, actions: Vec<Action>) {
        for action in actions {
            match action {
                Action::SetTimer {
                    id,
                    duration,
                    generation,
                } => self.after(duration, Event::TimerFired { id, generation }),
                Action::Emit(notification) => {
                    self.stats.record(&notification);
                    debug!(at = ?self.now, "{notification}");
                    self.log.push(TimedNotification::new(self.now, notification));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbiter_test_helpers::{count_kind, priorities};
    use arbiter_types::{Mode, WriterId};
    use tracing_test::traced_test;

    fn writer_priority(readers: usize, writers: usize) -> EngineConfig {
        EngineConfig::new(readers, writers, Mode::WriterPriority).unwrap()
    }

    #[traced_test]
    #[test]
    fn test_first_tick_is_immediate() {
        let mut runner = SimulationRunner::new(&writer_priority(2, 1), 1);
        assert!(runner.step());
        assert_eq!(runner.now(), Duration::ZERO);
        assert_eq!(runner.stats().ticks, 1);
        assert_eq!(runner.engine().current_writer(), Some(WriterId(0)));
    }

    #[test]
    fn test_ticks_follow_cadence() {
        let mut runner = SimulationRunner::new(&writer_priority(1, 1), 1);
        runner.run_until(Duration::from_millis(2000));
        // t = 0, 500, 1000, 1500, 2000
        assert_eq!(runner.stats().ticks, 5);
    }

    #[test]
    fn test_writer_turn_ends_after_active_time() {
        let mut runner = SimulationRunner::new(&writer_priority(2, 2), 3);
        runner.run_until(Duration::from_millis(2999));
        assert!(runner.engine().current_writer().is_some());
        assert_eq!(count_kind(runner.log(), "WriterDeactivated"), 0);

        runner.run_until(Duration::from_millis(3000));
        assert_eq!(count_kind(runner.log(), "WriterDeactivated"), 1);
    }

    #[test]
    fn test_same_seed_same_log() {
        let config = writer_priority(4, 3);
        let mut a = SimulationRunner::new(&config, 77);
        let mut b = SimulationRunner::new(&config, 77);
        a.run_for(Duration::from_secs(60));
        b.run_for(Duration::from_secs(60));
        assert_eq!(a.log(), b.log());
        assert_eq!(a.stats(), b.stats());
    }

    #[traced_test]
    #[test]
    fn test_reconfigure_discards_pending_timers() {
        let mut runner = SimulationRunner::new(&writer_priority(1, 1), 5);
        runner.run_until(Duration::from_millis(100));
        assert!(runner.engine().current_writer().is_some());

        let reader_only = EngineConfig::new(2, 1, Mode::ReaderPriority).unwrap();
        runner.reconfigure(&reader_only);
        runner.drain_log();
        runner.run_until(Duration::from_secs(10));

        // The writer timer from the first configuration never fires
        assert_eq!(count_kind(runner.log(), "WriterDeactivated"), 0);
        assert_eq!(runner.engine().active_readers(), 2);
    }

    #[test]
    fn test_late_writer_resolves_starvation() {
        let roster = Roster::new(priorities(&[3, 4]), vec![], Mode::WriterPriority);
        let mut runner = SimulationRunner::with_roster(&roster, EngineTiming::default(), 0);

        runner.run_until(Duration::from_millis(1000));
        assert_eq!(count_kind(runner.log(), "DeadlockDetected"), 1);
        assert_eq!(count_kind(runner.log(), "DeadlockResolved"), 0);

        runner.register_writer(Priority(2));
        runner.run_until(Duration::from_millis(1500));
        assert_eq!(count_kind(runner.log(), "DeadlockResolved"), 1);
        assert_eq!(runner.engine().current_writer(), Some(WriterId(0)));
    }

    #[test]
    fn test_log_is_time_ordered() {
        let mut runner = SimulationRunner::new(&writer_priority(3, 2), 11);
        runner.run_for(Duration::from_secs(30));
        assert!(runner.log().windows(2).all(|w| w[0].at <= w[1].at));
    }

    #[test]
    fn test_reconfigure_applies_new_timing() {
        let mut runner = SimulationRunner::new(&writer_priority(2, 2), 5);
        let fast = EngineTiming {
            tick_interval: Duration::from_millis(100),
            writer_active_time: Duration::from_millis(250),
            reader_active_time: Duration::from_millis(400),
        };
        runner.reconfigure(&writer_priority(2, 2).with_timing(fast));
        assert_eq!(*runner.engine().timing(), fast);

        runner.run_for(Duration::from_millis(249));
        assert_eq!(count_kind(runner.log(), "WriterDeactivated"), 0);

        runner.run_for(Duration::from_millis(1));
        assert_eq!(count_kind(runner.log(), "WriterDeactivated"), 1);
        // t = 0, 100, 200
        assert_eq!(runner.stats().ticks, 3);
    }
}
