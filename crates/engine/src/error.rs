//! Error types for engine configuration.

use arbiter_types::{ParseModeError, PriorityOutOfRange};
use std::ops::RangeInclusive;
use thiserror::Error;

/// Errors building an [`EngineConfig`](crate::EngineConfig) from host input.
///
/// Out-of-range counts are rejected, never clamped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Reader count outside the accepted range.
    #[error("reader count {count} outside {allowed:?}")]
    ReaderCountOutOfRange {
        count: usize,
        allowed: RangeInclusive<usize>,
    },

    /// Writer count outside the accepted range.
    #[error("writer count {count} outside {allowed:?}")]
    WriterCountOutOfRange {
        count: usize,
        allowed: RangeInclusive<usize>,
    },

    /// Mode string not recognised.
    #[error(transparent)]
    UnknownMode(#[from] ParseModeError),

    /// Priority override names a participant that does not exist.
    #[error("priority override for unknown participant {0:?}")]
    UnknownPriorityTarget(String),

    /// Priority override value outside the accepted range.
    #[error("invalid priority for {name:?}: {source}")]
    PriorityOutOfRange {
        name: String,
        #[source]
        source: PriorityOutOfRange,
    },
}
