//! Configuration for the arbitration engine.

use crate::ConfigError;
use arbiter_types::{Mode, Priority, PriorityOverrides, ReaderId, WriterId};
use rand::Rng;
use std::ops::RangeInclusive;
use std::time::Duration;

/// Reader counts accepted from host configuration.
pub const READER_COUNT_RANGE: RangeInclusive<usize> = 1..=10;

/// Writer counts accepted from host configuration.
pub const WRITER_COUNT_RANGE: RangeInclusive<usize> = 1..=5;

/// Durations of the engine's deferred transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineTiming {
    /// Cadence at which the host should deliver `Event::Tick`.
    pub tick_interval: Duration,

    /// How long a writer keeps exclusive access once activated.
    pub writer_active_time: Duration,

    /// How long the reading phase after a writer's turn lasts.
    pub reader_active_time: Duration,
}

impl Default for EngineTiming {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(500),
            writer_active_time: Duration::from_millis(3000),
            reader_active_time: Duration::from_millis(4000),
        }
    }
}

/// The explicit participant set handed to
/// [`ArbitrationEngine::configure`](crate::ArbitrationEngine::configure).
///
/// Ids are positional: the i-th entry of `readers` is `ReaderId(i)`. Unlike
/// [`EngineConfig`], a roster is not bounds-checked, so it can describe
/// degenerate setups (no writers at all) directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    pub readers: Vec<Priority>,
    pub writers: Vec<Priority>,
    pub mode: Mode,
}

impl Roster {
    pub fn new(readers: Vec<Priority>, writers: Vec<Priority>, mode: Mode) -> Self {
        Self {
            readers,
            writers,
            mode,
        }
    }
}

/// Host-facing configuration for one arbitration run.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Number of readers, within [`READER_COUNT_RANGE`].
    pub num_readers: usize,

    /// Number of writers, within [`WRITER_COUNT_RANGE`].
    pub num_writers: usize,

    /// Arbitration mode.
    pub mode: Mode,

    /// Pinned priorities by display name (`W1`, `R2`, ...).
    pub priority_overrides: PriorityOverrides,

    /// Deferred transition durations.
    pub timing: EngineTiming,
}

impl EngineConfig {
    /// Create a validated configuration.
    pub fn new(num_readers: usize, num_writers: usize, mode: Mode) -> Result<Self, ConfigError> {
        if !READER_COUNT_RANGE.contains(&num_readers) {
            return Err(ConfigError::ReaderCountOutOfRange {
                count: num_readers,
                allowed: READER_COUNT_RANGE,
            });
        }
        if !WRITER_COUNT_RANGE.contains(&num_writers) {
            return Err(ConfigError::WriterCountOutOfRange {
                count: num_writers,
                allowed: WRITER_COUNT_RANGE,
            });
        }
        Ok(Self {
            num_readers,
            num_writers,
            mode,
            priority_overrides: PriorityOverrides::new(),
            timing: EngineTiming::default(),
        })
    }

    /// Create a configuration with the mode given as host text (`"reader"`, `"writer"`).
    pub fn parse(num_readers: usize, num_writers: usize, mode: &str) -> Result<Self, ConfigError> {
        Self::new(num_readers, num_writers, mode.parse()?)
    }

    /// Pin the priority of the participant displayed as `name`.
    pub fn with_priority(mut self, name: &str, value: u32) -> Result<Self, ConfigError> {
        if !self.names().any(|n| n == name) {
            return Err(ConfigError::UnknownPriorityTarget(name.to_string()));
        }
        let priority = Priority::new(value).map_err(|source| ConfigError::PriorityOutOfRange {
            name: name.to_string(),
            source,
        })?;
        self.priority_overrides.insert(name, priority);
        Ok(self)
    }

    /// Set the transition durations.
    pub fn with_timing(mut self, timing: EngineTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Display names of every participant, writers first.
    pub fn names(&self) -> impl Iterator<Item = String> {
        let writers = (0..self.num_writers as u32).map(|i| WriterId(i).name());
        let readers = (0..self.num_readers as u32).map(|i| ReaderId(i).name());
        writers.chain(readers)
    }

    /// Resolve every participant's priority, drawing the unpinned ones from `rng`.
    ///
    /// Writers are drawn before readers, in id order, so a seeded RNG always
    /// yields the same roster.
    pub fn roster(&self, rng: &mut impl Rng) -> Roster {
        let writers = (0..self.num_writers as u32)
            .map(|i| self.priority_overrides.resolve(&WriterId(i).name(), rng))
            .collect();
        let readers = (0..self.num_readers as u32)
            .map(|i| self.priority_overrides.resolve(&ReaderId(i).name(), rng))
            .collect();
        Roster::new(readers, writers, self.mode)
    }
}
