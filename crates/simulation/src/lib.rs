//! Deterministic simulation runner.
//!
//! This crate hosts the arbitration engine on a virtual clock. Given the same
//! configuration and seed, it produces identical notification logs every
//! run, and an hour of simulated arbitration takes milliseconds.
//!
//! # Event flow
//!
//! ```text
//!   after(delay, event)            SetTimer { id, duration, generation }
//!          │                                      ▲
//!          ▼                                      │
//!   queue: (time, sequence) ──pop──► set_time ──► handle(event) ──► Vec<Action>
//!          ▲                                      │
//!          │                                      ▼
//!   Tick every tick_interval            Emit(n) ──► log: Vec<TimedNotification>
//! ```
//!
//! Events due at the same instant run in the order they were scheduled.

mod event_queue;
mod runner;

pub use event_queue::EventKey;
pub use runner::{SimulationRunner, SimulationStats};
