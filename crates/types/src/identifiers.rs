//! Domain-specific identifier types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Writer identifier.
///
/// Zero-based index into the engine's writer set. Displayed 1-based (`W1`,
/// `W2`, ...) since that is the name hosts use for priority overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WriterId(pub u32);

impl WriterId {
    /// Display name used in logs and priority overrides.
    pub fn name(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for WriterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "W{}", self.0 + 1)
    }
}

/// Reader identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReaderId(pub u32);

impl ReaderId {
    /// Display name used in logs and priority overrides.
    pub fn name(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ReaderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{}", self.0 + 1)
    }
}

/// Worker identifier on the resource ring.
///
/// A worker's id is also its position on the ring: it needs resource `id`
/// on its left and `(id + 1) mod n` on its right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkerId(pub u32);

impl WorkerId {
    /// Resource on the worker's left (same index as the worker).
    pub fn left(self) -> ResourceId {
        ResourceId(self.0)
    }

    /// Resource on the worker's right, wrapping around a ring of `ring_size`.
    ///
    /// # Panics
    ///
    /// Panics if `ring_size` is zero.
    pub fn right(self, ring_size: u32) -> ResourceId {
        assert!(ring_size > 0, "ring must have at least one position");
        ResourceId((self.0 + 1) % ring_size)
    }

    /// Index form, for addressing per-worker slots.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Worker({})", self.0)
    }
}

/// Resource (ring position) identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(pub u32);

impl ResourceId {
    /// Index form, for addressing per-resource slots.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Resource({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_are_one_based() {
        assert_eq!(WriterId(0).name(), "W1");
        assert_eq!(ReaderId(4).name(), "R5");
    }

    #[test]
    fn test_ring_neighbours_wrap() {
        let ring = 4;
        assert_eq!(WorkerId(0).left(), ResourceId(0));
        assert_eq!(WorkerId(0).right(ring), ResourceId(1));

        // Last worker's right is the first worker's left
        assert_eq!(WorkerId(3).right(ring), WorkerId(0).left());
    }

    #[test]
    fn test_single_position_ring() {
        // Degenerate ring: left and right coincide
        assert_eq!(WorkerId(0).right(1), ResourceId(0));
    }
}
