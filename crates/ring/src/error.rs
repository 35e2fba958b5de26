//! Error types for the resource ring.

use arbiter_types::{PriorityOutOfRange, WorkerId};
use thiserror::Error;

/// Errors configuring, starting or running the ring.
#[derive(Debug, Error)]
pub enum RingError {
    /// A ring needs at least two positions for left and right to differ.
    #[error("ring needs at least {min} workers, got {count}")]
    TooFewWorkers { count: usize, min: usize },

    /// More names supplied than there are workers.
    #[error("{names} names supplied for {workers} workers")]
    TooManyNames { names: usize, workers: usize },

    /// A worker name was empty.
    #[error("worker {index} has an empty name")]
    EmptyName { index: usize },

    /// Two workers were given the same name.
    #[error("worker name {name:?} used by workers {first} and {second}")]
    DuplicateName {
        name: String,
        first: usize,
        second: usize,
    },

    /// Priority override names a worker that does not exist.
    #[error("priority override for unknown worker {0:?}")]
    UnknownPriorityTarget(String),

    /// Priority override value outside the accepted range.
    #[error("invalid priority for {name:?}: {source}")]
    PriorityOutOfRange {
        name: String,
        #[source]
        source: PriorityOutOfRange,
    },

    /// The declared claims admit no safe completion order. Nothing was started.
    #[error("allocation plan is unsafe: declared claims may deadlock")]
    UnsafeAllocation,

    /// A worker task was cancelled or panicked.
    #[error("{worker} did not finish: {reason}")]
    WorkerAborted { worker: WorkerId, reason: String },
}
