//! The two runs the driver offers.

use crate::{PriorityAssignment, SimulatorError};
use arbiter_core::TimedNotification;
use arbiter_engine::EngineConfig;
use arbiter_ring::{
    AcquisitionPolicy, EfficiencyReport, NotificationSink, Ring, RingConfig, WorkerSample,
};
use arbiter_simulation::{SimulationRunner, SimulationStats};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;

// ═══════════════════════════════════════════════════════════════════════════
// Reader-writer arbitration
// ═══════════════════════════════════════════════════════════════════════════

/// A reader-writer run on the virtual clock.
#[derive(Debug, Clone)]
pub struct RwScenario {
    pub config: EngineConfig,
    pub duration: Duration,
    pub seed: u64,
}

/// What a reader-writer run produced.
#[derive(Debug, Clone)]
pub struct RwOutcome {
    pub log: Vec<TimedNotification>,
    pub stats: SimulationStats,
}

impl RwScenario {
    /// Validate counts, mode and priority pins into a scenario.
    pub fn new(
        readers: usize,
        writers: usize,
        mode: &str,
        priorities: &[PriorityAssignment],
        duration: Duration,
        seed: u64,
    ) -> Result<Self, SimulatorError> {
        let mut config = EngineConfig::parse(readers, writers, mode)?;
        for pin in priorities {
            config = config.with_priority(&pin.name, pin.value)?;
        }
        Ok(Self {
            config,
            duration,
            seed,
        })
    }

    /// Run to completion. Deterministic for a given seed.
    pub fn run(&self) -> RwOutcome {
        info!(
            readers = self.config.num_readers,
            writers = self.config.num_writers,
            mode = %self.config.mode,
            duration = ?self.duration,
            seed = self.seed,
            "Running reader-writer arbitration"
        );

        let mut runner = SimulationRunner::new(&self.config, self.seed);
        runner.run_for(self.duration);

        RwOutcome {
            stats: runner.stats(),
            log: runner.drain_log(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Resource ring
// ═══════════════════════════════════════════════════════════════════════════

/// A resource ring run on the tokio clock.
#[derive(Debug, Clone)]
pub struct RingScenario {
    pub config: RingConfig,
    pub duration: Duration,
}

/// What a ring run produced.
#[derive(Debug, Clone)]
pub struct RingOutcome {
    pub report: Option<EfficiencyReport>,
    pub samples: Vec<WorkerSample>,
    pub violations: u64,
    pub log: Vec<TimedNotification>,
}

impl RingScenario {
    pub fn new(
        workers: usize,
        policy: AcquisitionPolicy,
        priorities: &[PriorityAssignment],
        duration: Duration,
        seed: u64,
    ) -> Result<Self, SimulatorError> {
        let mut config = RingConfig::new(workers)?
            .with_policy(policy)
            .with_seed(seed);
        for pin in priorities {
            config = config.with_priority(&pin.name, pin.value)?;
        }
        Ok(Self { config, duration })
    }

    /// Run the ring until `duration` elapses, or until every worker has
    /// spent its cycle budget if that comes first.
    pub async fn run(&self) -> Result<RingOutcome, SimulatorError> {
        let (sink, mut rx) = NotificationSink::channel();
        let mut handle = Ring::new(self.config.clone()).start(sink)?;

        let finished = tokio::select! {
            result = handle.join() => {
                result?;
                true
            }
            _ = tokio::time::sleep(self.duration) => false,
        };
        if !finished {
            handle.shutdown().await;
        }

        let outcome = RingOutcome {
            report: handle.report(),
            samples: handle.samples(),
            violations: handle.violations(),
            log: Vec::new(),
        };
        drop(handle);

        info!(
            workers = self.config.num_workers,
            finished,
            violations = outcome.violations,
            "Ring run complete"
        );

        Ok(RingOutcome {
            log: drain(&mut rx),
            ..outcome
        })
    }
}

fn drain(rx: &mut mpsc::UnboundedReceiver<TimedNotification>) -> Vec<TimedNotification> {
    let mut log = Vec::new();
    while let Ok(timed) = rx.try_recv() {
        log.push(timed);
    }
    log
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbiter_test_helpers::count_kind;
    use arbiter_types::Mode;

    #[test]
    fn test_rw_scenario_validates() {
        assert!(matches!(
            RwScenario::new(0, 1, "reader", &[], Duration::from_secs(1), 1),
            Err(SimulatorError::Engine(_))
        ));
        assert!(RwScenario::new(2, 1, "sideways", &[], Duration::from_secs(1), 1).is_err());

        let pins = [PriorityAssignment {
            name: "W9".into(),
            value: 1,
        }];
        assert!(RwScenario::new(2, 1, "writer", &pins, Duration::from_secs(1), 1).is_err());
    }

    #[test]
    fn test_rw_scenario_is_deterministic() {
        let pins = [PriorityAssignment {
            name: "W1".into(),
            value: 4,
        }];
        let scenario =
            RwScenario::new(3, 2, "writer", &pins, Duration::from_secs(20), 7).unwrap();
        assert_eq!(scenario.config.mode, Mode::WriterPriority);

        let a = scenario.run();
        let b = scenario.run();
        assert_eq!(a.log, b.log);
        assert_eq!(a.stats.exclusion_violations, 0);
        assert!(count_kind(&a.log, "WriterActivated") > 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ring_scenario_stops_at_duration() {
        let scenario = RingScenario::new(
            4,
            AcquisitionPolicy::GlobalGate,
            &[],
            Duration::from_secs(60),
            5,
        )
        .unwrap();

        let outcome = scenario.run().await.unwrap();
        assert_eq!(outcome.violations, 0);
        assert!(outcome.report.is_some());
        assert!(count_kind(&outcome.log, "WorkerServiceDuration") > 0);
        assert!(outcome.log.iter().all(|t| t.at <= Duration::from_secs(61)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ring_scenario_rejects_one_worker() {
        assert!(matches!(
            RingScenario::new(1, AcquisitionPolicy::OrderedPair, &[], Duration::ZERO, 0),
            Err(SimulatorError::Ring(_))
        ));
    }
}
