//! The per-worker protocol.

use crate::{AcquisitionPolicy, LatencyBoard, NotificationSink, ResourceLedger};
use crate::{RingTiming, WorkerSpec};
use arbiter_core::Notification;
use arbiter_types::{ResourceId, WorkerId};
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;
use tokio::sync::{Mutex, Semaphore, SemaphorePermit};
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

/// State shared by every worker on one ring.
#[derive(Debug)]
pub(crate) struct RingShared {
    /// One single-permit semaphore per ring position.
    resources: Vec<Semaphore>,

    /// Coordinating gate for [`AcquisitionPolicy::GlobalGate`].
    gate: Mutex<()>,

    pub(crate) ledger: ResourceLedger,
    pub(crate) board: LatencyBoard,
    policy: AcquisitionPolicy,
    timing: RingTiming,
    cycles: Option<u64>,
    sink: NotificationSink,
}

/// One held resource. The ledger entry is cleared before the permit goes,
/// however the holder stops: release, failed second acquisition or abort.
struct Claim<'a> {
    ledger: &'a ResourceLedger,
    worker: WorkerId,
    resource: ResourceId,
    _permit: SemaphorePermit<'a>,
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        self.ledger.release(self.resource, self.worker);
    }
}

impl RingShared {
    pub(crate) fn new(
        num_resources: usize,
        policy: AcquisitionPolicy,
        timing: RingTiming,
        cycles: Option<u64>,
        sink: NotificationSink,
    ) -> Self {
        Self {
            resources: (0..num_resources).map(|_| Semaphore::new(1)).collect(),
            gate: Mutex::new(()),
            ledger: ResourceLedger::new(num_resources),
            board: LatencyBoard::new(num_resources),
            policy,
            timing,
            cycles,
            sink,
        }
    }

    fn size(&self) -> u32 {
        self.resources.len() as u32
    }

    /// `None` once the ring has been closed.
    async fn take(&self, worker: WorkerId, resource: ResourceId) -> Option<Claim<'_>> {
        let permit = self.resources[resource.index()].acquire().await.ok()?;
        self.ledger.claim(resource, worker);
        Some(Claim {
            ledger: &self.ledger,
            worker,
            resource,
            _permit: permit,
        })
    }

    /// Take `first` then `second`, pausing for the configured gap in between.
    async fn take_in_order(
        &self,
        worker: WorkerId,
        first: ResourceId,
        second: ResourceId,
    ) -> Option<[Claim<'_>; 2]> {
        let a = self.take(worker, first).await?;
        if !self.timing.acquire_gap.is_zero() {
            sleep(self.timing.acquire_gap).await;
        }
        let b = self.take(worker, second).await?;
        Some([a, b])
    }

    async fn acquire(
        &self,
        worker: WorkerId,
        left: ResourceId,
        right: ResourceId,
    ) -> Option<[Claim<'_>; 2]> {
        match self.policy {
            AcquisitionPolicy::GlobalGate => {
                let _gate = self.gate.lock().await;
                self.take_in_order(worker, left, right).await
            }
            AcquisitionPolicy::OrderedPair => {
                let (first, second) = if left <= right {
                    (left, right)
                } else {
                    (right, left)
                };
                self.take_in_order(worker, first, second).await
            }
            #[cfg(test)]
            AcquisitionPolicy::Unguarded => self.take_in_order(worker, left, right).await,
        }
    }

    /// Refuse every further acquisition, including ones already waiting.
    pub(crate) fn close(&self) {
        for resource in &self.resources {
            resource.close();
        }
    }
}

/// Run one worker until its cycle budget is spent or the ring is closed.
///
/// Each cycle: announce the wait, sit out the contention delay, acquire both
/// resources under the ring's policy, hold them for the service time,
/// release, idle.
pub(crate) async fn run_worker(shared: Arc<RingShared>, spec: WorkerSpec, mut rng: ChaCha8Rng) {
    let id = spec.id;
    let left = id.left();
    let right = id.right(shared.size());
    let timing = shared.timing;
    let mut completed = 0u64;

    info!(worker = %id, name = %spec.name, priority = spec.priority.get(), %left, %right, "Worker started");

    while shared.cycles.map_or(true, |limit| completed < limit) {
        let wait_start = Instant::now();
        debug!(worker = %id, %left, %right, "Waiting for resources");
        shared.sink.emit(Notification::WorkerWaiting {
            worker: id,
            left,
            right,
        });

        sleep(timing.draw_wait(&mut rng)).await;
        let Some(held) = shared.acquire(id, left, right).await else {
            info!(worker = %id, completed, "Ring closed, worker stopping");
            return;
        };

        let waited = wait_start.elapsed();
        shared.board.record_wait(id, waited);
        debug!(worker = %id, waited = ?waited, "Resources acquired");
        shared.sink.emit(Notification::WorkerWaitDuration { worker: id, waited });

        let service_start = Instant::now();
        sleep(timing.service_time()).await;
        let served = service_start.elapsed();
        drop(held);

        shared.board.record_service(id, served);
        debug!(worker = %id, served = ?served, "Resources released");
        shared.sink.emit(Notification::WorkerServiceDuration { worker: id, served });

        completed += 1;
        if shared.cycles == Some(completed) {
            break;
        }
        sleep(timing.draw_idle(&mut rng)).await;
    }

    info!(worker = %id, completed, "Worker finished");
}
