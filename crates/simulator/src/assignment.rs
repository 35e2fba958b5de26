//! `NAME=P` priority pins given on the command line.

use crate::SimulatorError;
use arbiter_ring::AcquisitionPolicy;
use std::str::FromStr;

/// One pinned priority, e.g. `W2=3` or `express=9`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityAssignment {
    pub name: String,
    pub value: u32,
}

impl FromStr for PriorityAssignment {
    type Err = SimulatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| SimulatorError::InvalidAssignment {
            input: s.to_string(),
            reason: reason.to_string(),
        };

        let (name, value) = s.split_once('=').ok_or_else(|| invalid("expected NAME=P"))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(invalid("empty name"));
        }
        let value = value
            .trim()
            .parse()
            .map_err(|_| invalid("priority is not a non-negative integer"))?;

        Ok(Self {
            name: name.to_string(),
            value,
        })
    }
}

/// Parse the `--policy` flag.
pub fn parse_policy(s: &str) -> Result<AcquisitionPolicy, SimulatorError> {
    match s.trim().to_lowercase().as_str() {
        "gate" | "global-gate" => Ok(AcquisitionPolicy::GlobalGate),
        "ordered" | "ordered-pair" => Ok(AcquisitionPolicy::OrderedPair),
        _ => Err(SimulatorError::UnknownPolicy(s.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assignment() {
        let a: PriorityAssignment = "W2=3".parse().unwrap();
        assert_eq!(a.name, "W2");
        assert_eq!(a.value, 3);

        let a: PriorityAssignment = " express = 9 ".parse().unwrap();
        assert_eq!(a.name, "express");
        assert_eq!(a.value, 9);
    }

    #[test]
    fn test_reject_malformed_assignment() {
        for input in ["W2", "=3", "W2=", "W2=-1", "W2=high"] {
            assert!(
                matches!(
                    input.parse::<PriorityAssignment>(),
                    Err(SimulatorError::InvalidAssignment { .. })
                ),
                "{input}"
            );
        }
    }

    #[test]
    fn test_parse_policy() {
        assert_eq!(parse_policy("gate").unwrap(), AcquisitionPolicy::GlobalGate);
        assert_eq!(parse_policy("Ordered").unwrap(), AcquisitionPolicy::OrderedPair);
        assert!(matches!(
            parse_policy("none"),
            Err(SimulatorError::UnknownPolicy(_))
        ));
    }
}
