//! Errors surfaced by the command-line driver.

use arbiter_engine::ConfigError;
use arbiter_ring::RingError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimulatorError {
    /// A `NAME=P` argument that could not be parsed.
    #[error("invalid priority assignment {input:?}: {reason}")]
    InvalidAssignment { input: String, reason: String },

    #[error("policy must be 'gate' or 'ordered', got {0:?}")]
    UnknownPolicy(String),

    #[error(transparent)]
    Engine(#[from] ConfigError),

    #[error(transparent)]
    Ring(#[from] RingError),
}
