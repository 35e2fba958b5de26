//! Reader-writer arbitration engine.
//!
//! This crate provides a synchronous state machine that decides who may use
//! a single shared resource: any number of readers together, or exactly one
//! writer.
//!
//! # Architecture
//!
//! The engine processes events synchronously:
//!
//! - `Event::Tick` → Activate a writer or the readers, recompute reader
//!   states, check for starvation
//! - `Event::TimerFired(DeactivateWriter)` → End the writer's turn, open a
//!   reading phase
//! - `Event::TimerFired(DeactivateReaders)` → End the reading phase, hand
//!   over to the highest-precedence writer
//!
//! ```text
//! activate_writer ──(writer_active_time)──► deactivate_writer
//!        ▲                                        │
//!        │                                 activate_readers
//!        │                                        │
//! deactivate_readers ◄──(reader_active_time)──────┘
//! ```
//!
//! Starvation (nobody holding the resource) is detected on ticks, reported
//! once per episode and resolved by granting a writer access.
//!
//! All timing and notification I/O is performed by the runner via returned
//! `Action`s.

mod config;
mod error;
mod participants;
mod state;

pub use config::{EngineConfig, EngineTiming, Roster, READER_COUNT_RANGE, WRITER_COUNT_RANGE};
pub use error::ConfigError;
pub use participants::{Reader, ReaderState, Writer};
pub use state::ArbitrationEngine;
