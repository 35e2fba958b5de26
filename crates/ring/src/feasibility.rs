//! Offline safety check for the ring's allocation plan.
//!
//! Banker's-style: a plan is safe if some order exists in which every worker
//! can obtain its full declared claim from what is available, finish, and
//! return what it was allocated. The check runs once, before any worker is
//! spawned, and a negative answer stops the run.

use arbiter_types::WorkerId;
use tracing::debug;

/// Per-worker claims over the two ring slots a worker needs (left, right).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimTable {
    /// Maximum each worker may ever hold, per slot.
    pub max_claim: Vec<[u32; 2]>,

    /// What each worker holds when the check runs.
    pub allocated: Vec<[u32; 2]>,

    /// Free units per slot.
    pub available: [u32; 2],
}

impl ClaimTable {
    pub fn new(max_claim: Vec<[u32; 2]>, allocated: Vec<[u32; 2]>, available: [u32; 2]) -> Self {
        Self {
            max_claim,
            allocated,
            available,
        }
    }

    /// The plan every ring run declares: each worker claims one unit of each
    /// slot, holds nothing yet, and one unit of each slot is free.
    pub fn for_ring(num_workers: usize) -> Self {
        Self {
            max_claim: vec![[1, 1]; num_workers],
            allocated: vec![[0, 0]; num_workers],
            available: [1, 1],
        }
    }

    /// Number of workers described.
    pub fn num_workers(&self) -> usize {
        self.max_claim.len()
    }

    /// See [`check_feasibility`].
    pub fn is_safe(&self) -> bool {
        check_feasibility(
            self.num_workers(),
            &self.max_claim,
            &self.allocated,
            self.available,
        )
    }

    /// See [`safe_sequence`].
    pub fn safe_sequence(&self) -> Option<Vec<WorkerId>> {
        safe_sequence(
            self.num_workers(),
            &self.max_claim,
            &self.allocated,
            self.available,
        )
    }
}

/// Whether the declared claims admit a safe completion order.
///
/// Deterministic and side-effect free. Matrices whose length differs from
/// `num_workers` describe no valid plan and are reported unsafe.
pub fn check_feasibility(
    num_workers: usize,
    max_claim: &[[u32; 2]],
    allocated: &[[u32; 2]],
    available: [u32; 2],
) -> bool {
    safe_sequence(num_workers, max_claim, allocated, available).is_some()
}

/// The completion order found by the safety scan, or `None` if unsafe.
///
/// Repeatedly scans the unfinished workers from the lowest id for one whose
/// unmet claim fits in `available`; that worker finishes, returns its
/// allocation, and the scan restarts from the beginning.
pub fn safe_sequence(
    num_workers: usize,
    max_claim: &[[u32; 2]],
    allocated: &[[u32; 2]],
    available: [u32; 2],
) -> Option<Vec<WorkerId>> {
    if max_claim.len() != num_workers || allocated.len() != num_workers {
        debug!(
            num_workers,
            max_claim = max_claim.len(),
            allocated = allocated.len(),
            "Claim table shape mismatch"
        );
        return None;
    }

    let mut work = available;
    let mut finished = vec![false; num_workers];
    let mut sequence = Vec::with_capacity(num_workers);

    while sequence.len() < num_workers {
        let next = (0..num_workers).find(|&i| {
            !finished[i]
                && (0..2).all(|j| max_claim[i][j].saturating_sub(allocated[i][j]) <= work[j])
        });

        let Some(i) = next else {
            debug!(
                finished = sequence.len(),
                num_workers,
                ?work,
                "No worker can finish; plan is unsafe"
            );
            return None;
        };

        for j in 0..2 {
            work[j] += allocated[i][j];
        }
        finished[i] = true;
        sequence.push(WorkerId(i as u32));
    }

    Some(sequence)
}
