//! Configuration generation tracking.

/// Opaque tag identifying one configuration of the engine.
///
/// Every (re)configuration bumps the generation. Timers carry the generation
/// that scheduled them, so a deferred transition left over from a previous
/// configuration can be recognised and dropped when it fires.
///
/// # Example
///
/// ```ignore
/// // In the engine:
/// self.generation = self.generation.next();
///
/// // Later, when a timer fires:
/// if generation != self.generation {
///     return vec![]; // stale
/// }
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Generation(pub u64);

impl Generation {
    /// Create a new generation tag.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// The generation following this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Get the raw value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Generation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "gen-{}", self.0)
    }
}
