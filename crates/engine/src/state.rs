//! Arbitration engine state machine.

use crate::{EngineTiming, Reader, ReaderState, Roster, Writer};
use arbiter_core::{Action, Event, Generation, Notification, StateMachine, TimerId};
use arbiter_livelock::{StarvationEdge, StarvationTracker};
use arbiter_types::{Mode, Priority, ReaderId, WriterId};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Reader-writer arbitration for one shared resource.
///
/// Single-threaded: the host delivers [`Event::Tick`] at
/// [`EngineTiming::tick_interval`] and fires the timers requested through
/// [`Action::SetTimer`] on the same timeline. No two operations ever run
/// concurrently, so there is no internal locking.
///
/// At every event boundary either readers hold the resource
/// (`active_readers > 0`) or one writer does, never both.
#[derive(Debug)]
pub struct ArbitrationEngine {
    /// Registered writers, in registration order.
    writers: Vec<Writer>,

    /// Registered readers, in registration order.
    readers: Vec<Reader>,

    /// Writer currently holding exclusive access.
    current_writer: Option<WriterId>,

    /// Number of readers in `Reading`.
    active_readers: usize,

    /// Arbitration mode.
    mode: Mode,

    /// Durations of deferred transitions.
    timing: EngineTiming,

    /// Rising/falling edge reporting of the starvation condition.
    starvation: StarvationTracker,

    /// Bumped on every configure; timers from older generations are stale.
    generation: Generation,

    /// Current time, as provided by the runner.
    now: Duration,
}

impl Default for ArbitrationEngine {
    fn default() -> Self {
        Self::new(EngineTiming::default())
    }
}

impl ArbitrationEngine {
    /// Create an engine with no participants.
    pub fn new(timing: EngineTiming) -> Self {
        Self {
            writers: Vec::new(),
            readers: Vec::new(),
            current_writer: None,
            active_readers: 0,
            mode: Mode::default(),
            timing,
            starvation: StarvationTracker::new(),
            generation: Generation::default(),
            now: Duration::ZERO,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Accessors
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn writers(&self) -> &[Writer] {
        &self.writers
    }

    pub fn readers(&self) -> &[Reader] {
        &self.readers
    }

    pub fn current_writer(&self) -> Option<WriterId> {
        self.current_writer
    }

    pub fn active_readers(&self) -> usize {
        self.active_readers
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn timing(&self) -> &EngineTiming {
        &self.timing
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Nobody holds the resource.
    pub fn is_starved(&self) -> bool {
        self.active_readers == 0 && self.current_writer.is_none()
    }

    /// Number of starvation episodes detected since the last configure.
    pub fn starvation_episodes(&self) -> u64 {
        self.starvation.episodes()
    }

    /// Single-writer/multiple-reader exclusion holds.
    pub fn exclusion_holds(&self) -> bool {
        let readers_consistent =
            self.readers.iter().filter(|r| r.is_reading()).count() == self.active_readers;
        let writers_consistent = match self.current_writer {
            Some(id) => self.writers.iter().all(|w| w.active == (w.id == id)),
            None => self.writers.iter().all(|w| !w.active),
        };
        readers_consistent
            && writers_consistent
            && !(self.active_readers > 0 && self.current_writer.is_some())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Configuration
    // ═══════════════════════════════════════════════════════════════════════════

    /// Replace the transition durations. Takes effect for timers scheduled
    /// from now on.
    pub fn set_timing(&mut self, timing: EngineTiming) {
        debug!(?timing, "Engine timing updated");
        self.timing = timing;
    }

    /// Replace every participant and reset all state.
    ///
    /// Timers scheduled before this call carry the old generation and are
    /// ignored when they fire.
    pub fn configure(&mut self, roster: &Roster) -> Vec<Action> {
        self.generation = self.generation.next();
        self.writers.clear();
        self.readers.clear();
        self.current_writer = None;
        self.active_readers = 0;
        self.mode = roster.mode;
        self.starvation.reset();

        info!(
            generation = %self.generation,
            mode = %self.mode,
            writers = roster.writers.len(),
            readers = roster.readers.len(),
            "Engine configured"
        );

        let mut actions = Vec::with_capacity(roster.writers.len() + roster.readers.len());
        for &priority in &roster.writers {
            actions.extend(self.register_writer(priority));
        }
        for &priority in &roster.readers {
            actions.extend(self.register_reader(priority));
        }
        actions
    }

    /// Add a writer to the current configuration.
    pub fn register_writer(&mut self, priority: Priority) -> Vec<Action> {
        let id = WriterId(self.writers.len() as u32);
        self.writers.push(Writer::new(id, priority));
        debug!(writer = %id, priority = priority.get(), "Writer registered");
        vec![Action::Emit(Notification::WriterAssignedPriority {
            writer: id,
            priority,
        })]
    }

    /// Add a reader to the current configuration. It starts out waiting.
    pub fn register_reader(&mut self, priority: Priority) -> Vec<Action> {
        let id = ReaderId(self.readers.len() as u32);
        self.readers.push(Reader::new(id, priority));
        debug!(reader = %id, priority = priority.get(), "Reader registered");
        vec![Action::Emit(Notification::ReaderAssignedPriority {
            reader: id,
            priority,
        })]
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Transitions
    // ═══════════════════════════════════════════════════════════════════════════

    /// One periodic step.
    ///
    /// 1. Nobody writing: writer-priority tries a writer, reader-priority
    ///    activates the readers.
    /// 2. Every reader's state is recomputed from `(writer_active, mode)`.
    /// 3. Starvation check.
    pub fn tick(&mut self) -> Vec<Action> {
        let mut actions = vec![];

        if self.current_writer.is_none() {
            match self.mode {
                Mode::WriterPriority => actions.extend(self.activate_writer()),
                Mode::ReaderPriority => actions.extend(self.activate_readers()),
            }
        }

        actions.extend(self.refresh_readers());
        actions.extend(self.check_deadlock());
        actions
    }

    /// Grant exclusive access to the writer with the lowest priority value.
    ///
    /// Only eligible while no reader is reading and at least one writer is
    /// registered; otherwise a no-op. Ties go to the earliest registered.
    pub fn activate_writer(&mut self) -> Vec<Action> {
        if self.active_readers > 0 || self.writers.is_empty() {
            debug!(
                active_readers = self.active_readers,
                writers = self.writers.len(),
                "Writer not eligible"
            );
            return vec![];
        }

        // Previous holder steps aside without a separate notification
        if let Some(previous) = self.current_writer.take() {
            self.writers[previous.0 as usize].active = false;
        }

        let Some(chosen) = self
            .writers
            .iter_mut()
            .min_by_key(|w| (w.priority, w.id))
        else {
            return vec![];
        };
        chosen.active = true;
        let (id, priority) = (chosen.id, chosen.priority);
        self.current_writer = Some(id);

        info!(writer = %id, priority = priority.get(), now = ?self.now, "Writer activated");

        vec![
            Action::Emit(Notification::WriterActivated {
                writer: id,
                priority,
            }),
            self.timer(TimerId::DeactivateWriter, self.timing.writer_active_time),
        ]
    }

    /// End the active writer's turn and open a reading phase.
    pub fn deactivate_writer(&mut self) -> Vec<Action> {
        let Some(id) = self.current_writer.take() else {
            debug!("Deactivate fired with no active writer");
            return vec![];
        };
        self.writers[id.0 as usize].active = false;
        info!(writer = %id, now = ?self.now, "Writer deactivated");

        let mut actions = vec![Action::Emit(Notification::WriterDeactivated { writer: id })];
        actions.extend(self.activate_readers());
        actions.push(self.timer(TimerId::DeactivateReaders, self.timing.reader_active_time));
        actions
    }

    /// Put every reader into `Reading` in one step.
    ///
    /// Readers are visited in ascending priority order but the whole set
    /// transitions within this call.
    pub fn activate_readers(&mut self) -> Vec<Action> {
        let mut order: Vec<usize> = (0..self.readers.len()).collect();
        order.sort_by_key(|&i| (self.readers[i].priority, self.readers[i].id));
        for i in order {
            self.readers[i].state = ReaderState::Reading;
        }
        self.active_readers = self.readers.len();

        debug!(count = self.active_readers, "Readers activated");
        vec![Action::Emit(Notification::ReadersActivated {
            count: self.active_readers,
        })]
    }

    /// Stop every reading reader, then hand over to a writer.
    pub fn deactivate_readers(&mut self) -> Vec<Action> {
        let mut actions = vec![];
        for reader in self.readers.iter_mut().filter(|r| r.is_reading()) {
            reader.state = ReaderState::Waiting;
            self.active_readers -= 1;
            actions.push(Action::Emit(Notification::ReaderStoppedReading {
                reader: reader.id,
            }));
        }
        debug!(stopped = actions.len(), "Reading phase ended");

        actions.extend(self.activate_writer());
        actions
    }

    /// Report starvation edges, forcing progress on the rising edge.
    pub fn check_deadlock(&mut self) -> Vec<Action> {
        match self.starvation.observe(self.is_starved()) {
            Some(StarvationEdge::Detected) => {
                warn!(
                    mode = %self.mode,
                    writers = self.writers.len(),
                    readers = self.readers.len(),
                    "Deadlock detected, resolving"
                );
                let mut actions = vec![Action::Emit(Notification::DeadlockDetected)];
                actions.extend(self.resolve_deadlock());
                actions
            }
            Some(StarvationEdge::Resolved) => {
                info!(episode = self.starvation.episodes(), "Deadlock resolved");
                vec![Action::Emit(Notification::DeadlockResolved)]
            }
            None => vec![],
        }
    }

    /// Force progress by giving the highest-precedence writer a turn.
    pub fn resolve_deadlock(&mut self) -> Vec<Action> {
        self.activate_writer()
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Internals
    // ═══════════════════════════════════════════════════════════════════════════

    fn refresh_readers(&mut self) -> Vec<Action> {
        let should_read = self.current_writer.is_none() && self.mode.permits_concurrent_reading();
        let mut actions = vec![];

        for reader in &mut self.readers {
            match (reader.state, should_read) {
                (ReaderState::Waiting, true) => {
                    reader.state = ReaderState::Reading;
                    self.active_readers += 1;
                    actions.push(Action::Emit(Notification::ReaderStartedReading {
                        reader: reader.id,
                    }));
                }
                (ReaderState::Reading, false) => {
                    reader.state = ReaderState::Waiting;
                    self.active_readers -= 1;
                    actions.push(Action::Emit(Notification::ReaderStoppedReading {
                        reader: reader.id,
                    }));
                }
                _ => {}
            }
        }
        actions
    }

    fn on_timer(&mut self, id: TimerId, generation: Generation) -> Vec<Action> {
        if generation != self.generation {
            debug!(
                timer = ?id,
                timer_generation = %generation,
                current = %self.generation,
                "Dropping stale timer"
            );
            return vec![];
        }
        match id {
            TimerId::DeactivateWriter => self.deactivate_writer(),
            TimerId::DeactivateReaders => self.deactivate_readers(),
        }
    }

    fn timer(&self, id: TimerId, duration: Duration) -> Action {
        Action::SetTimer {
            id,
            duration,
            generation: self.generation,
        }
    }
}

impl StateMachine for ArbitrationEngine {
    fn handle(&mut self, event: Event) -> Vec<Action> {
        let actions = match event {
            Event::Tick => self.tick(),
            Event::TimerFired { id, generation } => self.on_timer(id, generation),
        };
        debug_assert!(self.exclusion_holds(), "reader/writer exclusion violated");
        actions
    }

    fn set_time(&mut self, now: Duration) {
        self.now = now;
    }

    fn now(&self) -> Duration {
        self.now
    }
}
