//! Configuration for the resource ring.

use crate::RingError;
use arbiter_types::{Priority, PriorityOverrides, WorkerId};
use rand::Rng;
use std::collections::HashMap;
use std::time::Duration;

/// Fewest workers a ring can have: with one, left and right coincide.
pub const MIN_WORKERS: usize = 2;

/// How a worker acquires its two resources.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AcquisitionPolicy {
    /// One coordinating gate serialises every worker's left-then-right
    /// acquisition, turning it into an atomic two-resource step.
    #[default]
    GlobalGate,

    /// No gate; every worker takes the lower-indexed resource first. Equally
    /// free of circular wait, and non-adjacent workers acquire in parallel.
    OrderedPair,

    /// Left then right with nothing coordinating them. Can deadlock.
    #[cfg(test)]
    Unguarded,
}

/// Simulated latencies of one worker cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingTiming {
    /// Contention delay before acquisition, drawn uniformly from this range.
    pub wait_latency: (Duration, Duration),

    /// Steps a worker takes while holding both resources.
    pub travel_steps: u32,

    /// Latency of one step.
    pub step_latency: Duration,

    /// Pause after releasing, drawn uniformly from this range.
    pub idle: (Duration, Duration),

    /// Delay between taking the first and the second resource.
    pub acquire_gap: Duration,
}

impl Default for RingTiming {
    fn default() -> Self {
        Self {
            wait_latency: (Duration::from_millis(500), Duration::from_millis(1500)),
            travel_steps: 150,
            step_latency: Duration::from_millis(50),
            idle: (Duration::from_millis(1000), Duration::from_millis(2000)),
            acquire_gap: Duration::ZERO,
        }
    }
}

impl RingTiming {
    /// How long a worker holds both resources per cycle.
    pub fn service_time(&self) -> Duration {
        self.step_latency * self.travel_steps
    }

    pub(crate) fn draw_wait(&self, rng: &mut impl Rng) -> Duration {
        draw(self.wait_latency, rng)
    }

    pub(crate) fn draw_idle(&self, rng: &mut impl Rng) -> Duration {
        draw(self.idle, rng)
    }
}

fn draw((low, high): (Duration, Duration), rng: &mut impl Rng) -> Duration {
    if high <= low {
        low
    } else {
        rng.gen_range(low..=high)
    }
}

/// One worker's resolved identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerSpec {
    pub id: WorkerId,
    pub name: String,
    pub priority: Priority,
}

/// Configuration for one ring run.
#[derive(Debug, Clone)]
pub struct RingConfig {
    /// Number of workers, and of resources.
    pub num_workers: usize,

    /// Names for the first `names.len()` workers; the rest use `worker-{i}`.
    pub names: Vec<String>,

    /// Pinned priorities by worker name.
    pub priority_overrides: PriorityOverrides,

    /// Acquisition design.
    pub policy: AcquisitionPolicy,

    /// Simulated latencies.
    pub timing: RingTiming,

    /// Cycles each worker runs before stopping; `None` runs until shutdown.
    pub cycles: Option<u64>,

    /// Seed for priorities and per-worker latency draws.
    pub seed: u64,
}

impl RingConfig {
    /// Create a validated configuration with default names and timing.
    pub fn new(num_workers: usize) -> Result<Self, RingError> {
        if num_workers < MIN_WORKERS {
            return Err(RingError::TooFewWorkers {
                count: num_workers,
                min: MIN_WORKERS,
            });
        }
        Ok(Self {
            num_workers,
            names: Vec::new(),
            priority_overrides: PriorityOverrides::new(),
            policy: AcquisitionPolicy::default(),
            timing: RingTiming::default(),
            cycles: None,
            seed: 12345,
        })
    }

    /// Name the first workers. Names must be non-empty and distinct.
    pub fn with_names(mut self, names: Vec<String>) -> Result<Self, RingError> {
        if names.len() > self.num_workers {
            return Err(RingError::TooManyNames {
                names: names.len(),
                workers: self.num_workers,
            });
        }
        if let Some(index) = names.iter().position(|n| n.trim().is_empty()) {
            return Err(RingError::EmptyName { index });
        }
        // Unnamed workers fall back to `worker-{i}`, so those count too
        let mut seen = HashMap::new();
        for index in 0..self.num_workers {
            let name = names
                .get(index)
                .cloned()
                .unwrap_or_else(|| format!("worker-{index}"));
            if let Some(first) = seen.insert(name.clone(), index) {
                return Err(RingError::DuplicateName {
                    name,
                    first,
                    second: index,
                });
            }
        }
        self.names = names;
        Ok(self)
    }

    /// Pin the priority of the worker called `name`.
    pub fn with_priority(mut self, name: &str, value: u32) -> Result<Self, RingError> {
        if !(0..self.num_workers).any(|i| self.name_of(i) == name) {
            return Err(RingError::UnknownPriorityTarget(name.to_string()));
        }
        let priority = Priority::new(value).map_err(|source| RingError::PriorityOutOfRange {
            name: name.to_string(),
            source,
        })?;
        self.priority_overrides.insert(name, priority);
        Ok(self)
    }

    /// Set the acquisition policy.
    pub fn with_policy(mut self, policy: AcquisitionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the simulated latencies.
    pub fn with_timing(mut self, timing: RingTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Stop each worker after `cycles` cycles.
    pub fn with_cycles(mut self, cycles: u64) -> Self {
        self.cycles = Some(cycles);
        self
    }

    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Name of the worker at `index`.
    pub fn name_of(&self, index: usize) -> String {
        self.names
            .get(index)
            .cloned()
            .unwrap_or_else(|| format!("worker-{index}"))
    }

    /// Resolve every worker, drawing unpinned priorities from `rng` in id order.
    pub fn workers(&self, rng: &mut impl Rng) -> Vec<WorkerSpec> {
        (0..self.num_workers)
            .map(|i| {
                let name = self.name_of(i);
                let priority = self.priority_overrides.resolve(&name, rng);
                WorkerSpec {
                    id: WorkerId(i as u32),
                    name,
                    priority,
                }
            })
            .collect()
    }
}
