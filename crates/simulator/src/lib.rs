//! Arbiter Simulator
//!
//! Drives the two coordination cores from the command line:
//!
//! - **rw**: the reader-writer arbitration engine on the deterministic
//!   virtual clock, printing its event log.
//! - **ring**: the resource ring on tokio, printing the efficiency report.
//!
//! # Example
//!
//! ```ignore
//! use arbiter_simulator::RwScenario;
//! use std::time::Duration;
//!
//! let scenario = RwScenario::new(3, 2, "writer", &[], Duration::from_secs(30), 42)?;
//! let outcome = scenario.run();
//! for line in &outcome.log {
//!     println!("{line}");
//! }
//! ```

mod assignment;
mod error;
mod scenario;

pub use assignment::{parse_policy, PriorityAssignment};
pub use error::SimulatorError;
pub use scenario::{RingOutcome, RingScenario, RwOutcome, RwScenario};
