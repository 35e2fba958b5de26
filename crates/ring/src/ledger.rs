//! Record of which worker holds which resource.
//!
//! The semaphores do the actual exclusion; the ledger mirrors them so hosts
//! can observe occupancy and so a double hold would be caught rather than
//! silently tolerated.

use arbiter_types::{ResourceId, WorkerId};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::warn;

#[derive(Debug)]
pub struct ResourceLedger {
    holders: Mutex<Vec<Option<WorkerId>>>,
    violations: AtomicU64,
}

impl ResourceLedger {
    pub fn new(num_resources: usize) -> Self {
        Self {
            holders: Mutex::new(vec![None; num_resources]),
            violations: AtomicU64::new(0),
        }
    }

    /// Record `worker` as holder of `resource`.
    pub fn claim(&self, resource: ResourceId, worker: WorkerId) {
        let mut holders = self.holders.lock();
        if let Some(existing) = holders[resource.index()] {
            self.violations.fetch_add(1, Ordering::Relaxed);
            warn!(%resource, %worker, holder = %existing, "Resource claimed twice");
        }
        holders[resource.index()] = Some(worker);
    }

    /// Clear `worker` as holder of `resource`.
    pub fn release(&self, resource: ResourceId, worker: WorkerId) {
        let mut holders = self.holders.lock();
        if holders[resource.index()] == Some(worker) {
            holders[resource.index()] = None;
        } else {
            self.violations.fetch_add(1, Ordering::Relaxed);
            warn!(%resource, %worker, holder = ?holders[resource.index()], "Release by non-holder");
        }
    }

    /// Current holder of every resource.
    pub fn holders(&self) -> Vec<Option<WorkerId>> {
        self.holders.lock().clone()
    }

    /// Double claims and foreign releases observed so far.
    pub fn violations(&self) -> u64 {
        self.violations.load(Ordering::Relaxed)
    }
}
