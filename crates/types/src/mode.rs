//! Arbitration mode.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Which side of the reader-writer problem gets precedence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Readers read concurrently whenever no writer is active.
    #[default]
    ReaderPriority,

    /// Writers are granted access as soon as they are eligible.
    WriterPriority,
}

impl Mode {
    /// Whether readers may hold the resource while no writer is active.
    pub fn permits_concurrent_reading(self) -> bool {
        matches!(self, Mode::ReaderPriority)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::ReaderPriority => f.write_str("reader-priority"),
            Mode::WriterPriority => f.write_str("writer-priority"),
        }
    }
}

/// Unrecognised mode string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown mode {0:?} (expected \"reader\" or \"writer\")")]
pub struct ParseModeError(pub String);

impl FromStr for Mode {
    type Err = ParseModeError;

    /// Accepts `reader`/`writer`, optionally suffixed with `-priority` or
    /// ` priority`, ignoring case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        let head = normalized
            .strip_suffix("priority")
            .map(|h| h.trim_end_matches(['-', ' ', '_']))
            .unwrap_or(&normalized);
        match head {
            "reader" => Ok(Mode::ReaderPriority),
            "writer" => Ok(Mode::WriterPriority),
            _ => Err(ParseModeError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mode_variants() {
        assert_eq!("reader".parse(), Ok(Mode::ReaderPriority));
        assert_eq!("  Writer ".parse(), Ok(Mode::WriterPriority));
        assert_eq!("writer-priority".parse(), Ok(Mode::WriterPriority));
        assert_eq!("reader priority".parse(), Ok(Mode::ReaderPriority));
        assert!("both".parse::<Mode>().is_err());
        assert!("".parse::<Mode>().is_err());
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for mode in [Mode::ReaderPriority, Mode::WriterPriority] {
            assert_eq!(mode.to_string().parse(), Ok(mode));
        }
    }
}
