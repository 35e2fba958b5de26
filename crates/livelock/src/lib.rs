//! Starvation detection for the arbitration engine.
//!
//! The engine can reach a state where nobody holds the shared resource: no
//! reader is reading and no writer is writing. It does not prevent that
//! state; it detects it on a tick, reports it once, and forces progress by
//! granting a writer access. This crate owns the edge-reporting half of that
//! loop so the engine only has to feed it one boolean per tick.

mod tracker;

pub use tracker::{StarvationEdge, StarvationTracker};
