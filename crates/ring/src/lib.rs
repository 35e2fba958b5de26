//! Resource ring protocol.
//!
//! N workers sit on a ring of N resources. Worker `i` needs resource `i` (its
//! left) and resource `(i + 1) % N` (its right) at the same time, so every
//! resource is contended by exactly two neighbours.
//!
//! # Architecture
//!
//! ```text
//! RingConfig ──► Ring::start ──► check_feasibility ──✗──► RingError::UnsafeAllocation
//!                                       │ ✓
//!                                       ▼
//!                       ┌─────── RingShared ───────┐
//!                       │ Semaphore(1) × N         │
//!                       │ gate: Mutex<()>          │
//!                       │ ResourceLedger           │
//!                       │ LatencyBoard             │
//!                       └──────────────────────────┘
//!                          ▲        ▲          ▲
//!                    worker 0   worker 1 ... worker N-1   (tokio tasks)
//!                          │
//!                          ▼
//!                   NotificationSink ──► TimedNotification stream
//! ```
//!
//! Circular wait is ruled out by the [`AcquisitionPolicy`]: either one gate
//! serialises each worker's two acquisitions, or every worker takes the
//! lower-indexed resource first.

mod config;
mod error;
mod feasibility;
mod ledger;
mod report;
mod ring;
mod sink;
mod worker;

pub use config::{AcquisitionPolicy, RingConfig, RingTiming, WorkerSpec, MIN_WORKERS};
pub use error::RingError;
pub use feasibility::{check_feasibility, safe_sequence, ClaimTable};
pub use ledger::ResourceLedger;
pub use report::{efficiency_report, EfficiencyReport, LatencyBoard, WorkerSample};
pub use ring::{Ring, RingHandle};
pub use sink::NotificationSink;
