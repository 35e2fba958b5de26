//! Starting a ring and supervising its workers.

use crate::worker::{run_worker, RingShared};
use crate::{check_feasibility, ClaimTable, EfficiencyReport, NotificationSink, RingConfig};
use crate::{RingError, WorkerSample, WorkerSpec};
use arbiter_types::WorkerId;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// A ring of workers, ready to start.
#[derive(Debug, Clone)]
pub struct Ring {
    config: RingConfig,
    claims: ClaimTable,
}

impl Ring {
    /// A ring declaring the default plan from [`ClaimTable::for_ring`].
    pub fn new(config: RingConfig) -> Self {
        let claims = ClaimTable::for_ring(config.num_workers);
        Self { config, claims }
    }

    /// Replace the declared allocation plan.
    pub fn with_claims(mut self, claims: ClaimTable) -> Self {
        self.claims = claims;
        self
    }

    pub fn config(&self) -> &RingConfig {
        &self.config
    }

    pub fn claims(&self) -> &ClaimTable {
        &self.claims
    }

    /// Check the plan and spawn one task per worker.
    ///
    /// Returns [`RingError::UnsafeAllocation`] without spawning anything if
    /// the declared claims admit no safe completion order.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn start(self, sink: NotificationSink) -> Result<RingHandle, RingError> {
        let config = self.config;
        let claims = self.claims;

        if !check_feasibility(
            config.num_workers,
            &claims.max_claim,
            &claims.allocated,
            claims.available,
        ) {
            warn!(workers = config.num_workers, "Allocation plan rejected");
            return Err(RingError::UnsafeAllocation);
        }

        let workers = config.workers(&mut ChaCha8Rng::seed_from_u64(config.seed));
        let shared = Arc::new(RingShared::new(
            config.num_workers,
            config.policy,
            config.timing,
            config.cycles,
            sink,
        ));

        info!(
            workers = config.num_workers,
            policy = ?config.policy,
            cycles = ?config.cycles,
            seed = config.seed,
            "Starting ring"
        );

        let tasks = workers
            .iter()
            .map(|spec| {
                let rng = ChaCha8Rng::seed_from_u64(
                    config.seed.wrapping_add(spec.id.0 as u64 + 1),
                );
                let task = tokio::spawn(run_worker(shared.clone(), spec.clone(), rng));
                (spec.id, task)
            })
            .collect();

        Ok(RingHandle {
            shared,
            workers,
            tasks,
        })
    }
}

/// A running ring. Dropping the handle aborts every worker.
#[derive(Debug)]
pub struct RingHandle {
    shared: Arc<RingShared>,
    workers: Vec<WorkerSpec>,
    tasks: Vec<(WorkerId, JoinHandle<()>)>,
}

impl RingHandle {
    /// The resolved workers, by id.
    pub fn workers(&self) -> &[WorkerSpec] {
        &self.workers
    }

    /// Report over each worker's latest sample.
    pub fn report(&self) -> Option<EfficiencyReport> {
        self.shared.board.report()
    }

    pub fn samples(&self) -> Vec<WorkerSample> {
        self.shared.board.snapshot()
    }

    /// Current holder of every resource.
    pub fn holders(&self) -> Vec<Option<WorkerId>> {
        self.shared.ledger.holders()
    }

    /// Double holds and foreign releases observed so far.
    pub fn violations(&self) -> u64 {
        self.shared.ledger.violations()
    }

    /// Wait for every worker to finish.
    ///
    /// Only returns on its own when the ring was configured with a cycle
    /// bound or has been [closed](Self::close). The first failure is returned
    /// after all workers are joined.
    pub async fn join(&mut self) -> Result<(), RingError> {
        let mut first_error = None;
        // Tasks leave the list only once finished, so a cancelled join keeps
        // the rest under the handle's control.
        while let Some((worker, task)) = self.tasks.first_mut() {
            let worker = *worker;
            let outcome = task.await.map_err(|e| RingError::WorkerAborted {
                worker,
                reason: e.to_string(),
            });
            self.tasks.remove(0);
            if let Err(e) = outcome {
                warn!(%worker, error = %e, "Worker failed");
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Stop handing out resources.
    ///
    /// Workers waiting for a resource stop at once; a worker in service
    /// finishes its cycle and stops at its next acquisition. Follow with
    /// [`join`](Self::join) to wait for them.
    pub fn close(&self) {
        info!(workers = self.workers.len(), "Closing ring");
        self.shared.close();
    }

    /// Close the ring, abort every worker and wait for them to stop.
    pub async fn shutdown(&mut self) {
        self.shared.close();
        for (_, task) in &self.tasks {
            task.abort();
        }
        for (_, task) in self.tasks.drain(..) {
            let _ = task.await;
        }
        info!(workers = self.workers.len(), "Ring shut down");
    }
}

impl Drop for RingHandle {
    fn drop(&mut self) {
        self.shared.close();
        for (_, task) in &self.tasks {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AcquisitionPolicy, RingTiming};
    use arbiter_test_helpers::count_kind;
    use std::time::Duration;
    use tokio::time::timeout;
    use tracing_test::traced_test;

    /// Fixed latencies so every worker reaches for its resources at once.
    fn lockstep_timing() -> RingTiming {
        RingTiming {
            wait_latency: (Duration::from_secs(1), Duration::from_secs(1)),
            acquire_gap: Duration::from_millis(100),
            ..Default::default()
        }
    }

    fn ring(workers: usize, policy: AcquisitionPolicy) -> Ring {
        Ring::new(
            RingConfig::new(workers)
                .unwrap()
                .with_policy(policy)
                .with_timing(lockstep_timing())
                .with_cycles(1),
        )
    }

    #[tokio::test(start_paused = true)]
    #[traced_test]
    async fn test_gate_prevents_circular_wait() {
        let mut handle = ring(5, AcquisitionPolicy::GlobalGate)
            .start(NotificationSink::discard())
            .unwrap();

        timeout(Duration::from_secs(300), handle.join())
            .await
            .expect("gated ring stalled")
            .unwrap();

        assert_eq!(handle.violations(), 0);
        assert!(handle.holders().iter().all(Option::is_none));
        assert!(handle.samples().iter().all(|s| s.cycles == 1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unguarded_ring_stalls() {
        let mut handle = ring(5, AcquisitionPolicy::Unguarded)
            .start(NotificationSink::discard())
            .unwrap();

        let outcome = timeout(Duration::from_secs(300), handle.join()).await;
        assert!(outcome.is_err(), "every worker should hold its left and wait");

        let holders = handle.holders();
        for (i, holder) in holders.iter().enumerate() {
            assert_eq!(*holder, Some(WorkerId(i as u32)));
        }
        assert!(handle.report().is_none());

        handle.close();
        handle.join().await.unwrap();
        assert!(handle.holders().iter().all(Option::is_none));
        assert_eq!(handle.violations(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_mid_acquisition_clears_holders() {
        let mut handle = ring(4, AcquisitionPolicy::Unguarded)
            .start(NotificationSink::discard())
            .unwrap();

        // Past the wait and the gap: every worker holds its left, blocked on its right
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(handle.holders().iter().all(Option::is_some));

        handle.shutdown().await;
        assert_eq!(handle.holders(), vec![None; 4]);
        assert_eq!(handle.violations(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_mid_acquisition_releases_claims() {
        let handle = ring(3, AcquisitionPolicy::Unguarded)
            .start(NotificationSink::discard())
            .unwrap();
        let shared = handle.shared.clone();

        tokio::time::sleep(Duration::from_secs(5)).await;
        drop(handle);
        // Aborted tasks are torn down on the next scheduler pass
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert_eq!(shared.ledger.holders(), vec![None; 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_lets_serving_worker_finish_cycle() {
        let mut handle = ring(3, AcquisitionPolicy::GlobalGate)
            .start(NotificationSink::discard())
            .unwrap();

        // One worker is in service, the rest are queued behind it
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(handle.holders().iter().any(Option::is_some));

        handle.close();
        handle.join().await.unwrap();

        let completed: u64 = handle.samples().iter().map(|s| s.cycles).sum();
        assert_eq!(completed, 1);
        assert!(handle.holders().iter().all(Option::is_none));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ordered_pair_completes() {
        let mut handle = ring(5, AcquisitionPolicy::OrderedPair)
            .start(NotificationSink::discard())
            .unwrap();

        timeout(Duration::from_secs(300), handle.join())
            .await
            .expect("ordered ring stalled")
            .unwrap();
        assert_eq!(handle.violations(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_service_time_matches_travel() {
        let mut handle = ring(3, AcquisitionPolicy::GlobalGate)
            .start(NotificationSink::discard())
            .unwrap();
        handle.join().await.unwrap();

        let report = handle.report().unwrap();
        let per_worker = report.average_service;
        assert!(per_worker >= Duration::from_millis(7500));
        assert!(per_worker < Duration::from_millis(7600));
        assert_eq!(report.workers, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_notifications_per_cycle() {
        let (sink, mut rx) = NotificationSink::channel();
        let mut handle = ring(2, AcquisitionPolicy::GlobalGate).start(sink).unwrap();
        handle.join().await.unwrap();
        drop(handle);

        let mut log = Vec::new();
        while let Ok(timed) = rx.try_recv() {
            log.push(timed);
        }
        assert_eq!(count_kind(&log, "WorkerWaiting"), 2);
        assert_eq!(count_kind(&log, "WorkerWaitDuration"), 2);
        assert_eq!(count_kind(&log, "WorkerServiceDuration"), 2);
        assert!(log.windows(2).all(|w| w[0].at <= w[1].at));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unsafe_plan_spawns_nothing() {
        let (sink, mut rx) = NotificationSink::channel();
        let claims = ClaimTable::new(vec![[2, 1]; 3], vec![[0, 0]; 3], [1, 1]);

        let result = ring(3, AcquisitionPolicy::GlobalGate)
            .with_claims(claims)
            .start(sink);

        assert!(matches!(result, Err(RingError::UnsafeAllocation)));
        assert!(rx.recv().await.is_none());
    }
}
